//! Splitting of raw instruction words into an opcode and its operand fields.

/// Top nibble of an instruction word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Opcode {
    Br,
    Add,
    Ld,
    St,
    Jsr,
    And,
    Ldr,
    Str,
    Rti,
    Not,
    Ldi,
    Sti,
    Jmp,
    Res,
    Lea,
    Trap,
}

impl Opcode {
    const TABLE: [Opcode; 16] = [
        Opcode::Br,   // 0x0
        Opcode::Add,  // 0x1
        Opcode::Ld,   // 0x2
        Opcode::St,   // 0x3
        Opcode::Jsr,  // 0x4
        Opcode::And,  // 0x5
        Opcode::Ldr,  // 0x6
        Opcode::Str,  // 0x7
        Opcode::Rti,  // 0x8
        Opcode::Not,  // 0x9
        Opcode::Ldi,  // 0xA
        Opcode::Sti,  // 0xB
        Opcode::Jmp,  // 0xC
        Opcode::Res,  // 0xD
        Opcode::Lea,  // 0xE
        Opcode::Trap, // 0xF
    ];

    pub fn of(instr: u16) -> Opcode {
        Self::TABLE[(instr >> 12) as usize]
    }
}

/// Second operand of `ADD`/`AND`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
    Reg(u16),
    /// Already sign-extended
    Imm(u16),
}

/// Destination of `JSR`/`JSRR`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JsrTarget {
    /// Sign-extended offset from incremented PC
    Offset(u16),
    Reg(u16),
}

/// A decoded instruction. Register fields are indices `0..8`, offsets are
/// sign-extended to 16 bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction {
    Br { nzp: u16, offset: u16 },
    Add { dr: u16, sr1: u16, operand: Operand },
    Ld { dr: u16, offset: u16 },
    St { sr: u16, offset: u16 },
    Jsr { target: JsrTarget },
    And { dr: u16, sr1: u16, operand: Operand },
    Ldr { dr: u16, base: u16, offset: u16 },
    Str { sr: u16, base: u16, offset: u16 },
    Rti,
    Not { dr: u16, sr: u16 },
    Ldi { dr: u16, offset: u16 },
    Sti { sr: u16, offset: u16 },
    Jmp { base: u16 },
    Res,
    Lea { dr: u16, offset: u16 },
    Trap { vect: u8 },
}

impl Instruction {
    pub fn decode(instr: u16) -> Instruction {
        let high = (instr >> 9) & 0b111;
        let mid = (instr >> 6) & 0b111;
        let offset9 = sign_extend(instr, 9);

        match Opcode::of(instr) {
            Opcode::Br => Instruction::Br {
                nzp: high,
                offset: offset9,
            },
            Opcode::Add => Instruction::Add {
                dr: high,
                sr1: mid,
                operand: operand(instr),
            },
            Opcode::Ld => Instruction::Ld {
                dr: high,
                offset: offset9,
            },
            Opcode::St => Instruction::St {
                sr: high,
                offset: offset9,
            },
            Opcode::Jsr => Instruction::Jsr {
                target: if instr & 0x0800 != 0 {
                    JsrTarget::Offset(sign_extend(instr, 11))
                } else {
                    JsrTarget::Reg(mid)
                },
            },
            Opcode::And => Instruction::And {
                dr: high,
                sr1: mid,
                operand: operand(instr),
            },
            Opcode::Ldr => Instruction::Ldr {
                dr: high,
                base: mid,
                offset: sign_extend(instr, 6),
            },
            Opcode::Str => Instruction::Str {
                sr: high,
                base: mid,
                offset: sign_extend(instr, 6),
            },
            Opcode::Rti => Instruction::Rti,
            Opcode::Not => Instruction::Not { dr: high, sr: mid },
            Opcode::Ldi => Instruction::Ldi {
                dr: high,
                offset: offset9,
            },
            Opcode::Sti => Instruction::Sti {
                sr: high,
                offset: offset9,
            },
            Opcode::Jmp => Instruction::Jmp { base: mid },
            Opcode::Res => Instruction::Res,
            Opcode::Lea => Instruction::Lea {
                dr: high,
                offset: offset9,
            },
            Opcode::Trap => Instruction::Trap {
                vect: (instr & 0xFF) as u8,
            },
        }
    }
}

fn operand(instr: u16) -> Operand {
    if instr & 0b10_0000 == 0 {
        Operand::Reg(instr & 0b111)
    } else {
        Operand::Imm(sign_extend(instr, 5))
    }
}

/// Sign-extend the low `bits` bits of `val` to 16 bits. Higher input bits are ignored.
#[inline]
pub fn sign_extend(val: u16, bits: u32) -> u16 {
    debug_assert!(bits > 0 && bits < 16);
    // Sign bit
    let sign = val & (1u16 << (bits - 1));
    // Bits lower than sign bit
    let magnitude = val & ((1u16 << bits) - 1);
    // Positive input: all bits unset; 0x0000
    // Negative input: sign bit and above will be set, lower bits will be reset
    //      Eg. bits=14 -> 0xE000
    let sign_extension = (!sign).wrapping_add(1); // sign * -1
    magnitude | sign_extension
}
