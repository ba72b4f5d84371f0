/// Condition code, stored with the same bit layout as the `nzp` field of `BR`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunFlag {
    N = 0b100,
    Z = 0b010,
    P = 0b001,
}

impl RunFlag {
    /// Classify a value: zero first, then sign bit.
    pub fn of(val: u16) -> RunFlag {
        match val {
            0 => RunFlag::Z,
            x if x >> 15 == 1 => RunFlag::N,
            _ => RunFlag::P,
        }
    }
}

/// General purpose registers, program counter and condition code.
#[derive(Clone, Debug)]
pub struct Registers {
    /// 8x 16-bit registers
    reg: [u16; 8],
    /// Program counter
    pc: u16,
    /// Condition code
    flag: RunFlag,
}

impl Registers {
    pub fn new(pc: u16) -> Self {
        Registers {
            reg: [0; 8],
            pc,
            flag: RunFlag::Z,
        }
    }

    /// Only the low 3 bits of `reg` are used.
    #[inline]
    pub fn get(&self, reg: u16) -> u16 {
        self.reg[(reg & 0b111) as usize]
    }

    #[inline]
    pub fn set(&mut self, reg: u16, val: u16) {
        self.reg[(reg & 0b111) as usize] = val;
    }

    /// Write to a register and update the condition code from the new value.
    pub fn set_with_flags(&mut self, reg: u16, val: u16) {
        self.set(reg, val);
        self.set_flags(val);
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn set_pc(&mut self, pc: u16) {
        self.pc = pc;
    }

    /// Return current PC and move it to the next word.
    pub fn fetch_incr(&mut self) -> u16 {
        let pc = self.pc;
        self.pc = pc.wrapping_add(1);
        pc
    }

    pub fn flag(&self) -> RunFlag {
        self.flag
    }

    pub fn set_flags(&mut self, val: u16) {
        self.flag = RunFlag::of(val);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn flags_cover_every_value() {
        let mut regs = Registers::new(0x3000);
        for val in 0..=u16::MAX {
            regs.set_flags(val);
            let expected = if val == 0 {
                RunFlag::Z
            } else if val & 0x8000 != 0 {
                RunFlag::N
            } else {
                RunFlag::P
            };
            assert_eq!(regs.flag(), expected, "flag for {val:#06x}");
        }
    }

    #[test]
    fn register_index_masked() {
        let mut regs = Registers::new(0);
        regs.set(0b1011, 42);
        assert_eq!(regs.get(3), 42);
        assert_eq!(regs.flag(), RunFlag::Z);
    }

    #[test]
    fn pc_wraps_on_fetch() {
        let mut regs = Registers::new(0xffff);
        assert_eq!(regs.fetch_incr(), 0xffff);
        assert_eq!(regs.pc(), 0x0000);
    }
}
