use tracing::{debug, trace};

use crate::console::Console;
use crate::decode::{Instruction, JsrTarget, Operand};
use crate::error::{LoadError, RuntimeError};
use crate::image::Image;

mod memory;
mod register;
mod trap;

pub use memory::{Memory, DDR, DSR, KBDR, KBSR, MEMORY_MAX};
pub use register::{Registers, RunFlag};
pub use trap::TrapVect;

/// Instructions executed between checks for an interrupt from the console.
const INTERRUPT_POLL_INTERVAL: u32 = 0x1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Running,
    Halted,
}

/// Represents complete program state during runtime.
pub struct RunState<C> {
    mem: Memory,
    regs: Registers,
    status: Status,
    console: C,
}

impl<C: Console> RunState<C> {
    /// Load an image and point PC at its origin.
    pub fn new(image: &Image, console: C) -> Self {
        let mut mem = Memory::new();
        mem.load(image.origin(), image.words());
        debug!(
            origin = %format_args!("{:#06x}", image.origin()),
            len = image.words().len(),
            "loaded image"
        );
        RunState {
            mem,
            regs: Registers::new(image.origin()),
            status: Status::Running,
            console,
        }
    }

    /// Load an image in word form: origin first, then the program.
    pub fn from_raw(raw: &[u16], console: C) -> Result<Self, LoadError> {
        Ok(Self::new(&Image::from_words(raw)?, console))
    }

    /// Run until the program halts.
    pub fn run(&mut self) -> Result<(), RuntimeError> {
        debug!(pc = %format_args!("{:#06x}", self.regs.pc()), "running");
        let mut steps: u32 = 0;
        while self.status == Status::Running {
            if steps % INTERRUPT_POLL_INTERVAL == 0 && self.console.interrupted()? {
                debug!("interrupted");
                return Err(RuntimeError::Interrupted);
            }
            if let Err(err) = self.step() {
                debug!(%err, "execution stopped");
                return Err(err);
            }
            steps = steps.wrapping_add(1);
        }
        Ok(())
    }

    /// Fetch, decode and execute a single instruction.
    pub fn step(&mut self) -> Result<(), RuntimeError> {
        // PC incremented before instruction is performed
        let addr = self.regs.fetch_incr();
        let instr = self.read(addr)?;
        let decoded = Instruction::decode(instr);
        trace!(
            pc = %format_args!("{addr:#06x}"),
            instr = %format_args!("{instr:#06x}"),
            ?decoded,
            "step"
        );

        match decoded {
            Instruction::Br { nzp, offset } => {
                if self.regs.flag() as u16 & nzp != 0 {
                    self.jump_relative(offset);
                }
            }
            Instruction::Add { dr, sr1, operand } => {
                let res = self.regs.get(sr1).wrapping_add(self.operand(operand));
                self.regs.set_with_flags(dr, res);
            }
            Instruction::And { dr, sr1, operand } => {
                let res = self.regs.get(sr1) & self.operand(operand);
                self.regs.set_with_flags(dr, res);
            }
            Instruction::Not { dr, sr } => {
                let res = !self.regs.get(sr);
                self.regs.set_with_flags(dr, res);
            }
            Instruction::Ld { dr, offset } => {
                let val = self.read(self.pc_relative(offset))?;
                self.regs.set_with_flags(dr, val);
            }
            Instruction::Ldi { dr, offset } => {
                let ptr = self.read(self.pc_relative(offset))?;
                let val = self.read(ptr)?;
                self.regs.set_with_flags(dr, val);
            }
            Instruction::Ldr { dr, base, offset } => {
                let val = self.read(self.regs.get(base).wrapping_add(offset))?;
                self.regs.set_with_flags(dr, val);
            }
            Instruction::Lea { dr, offset } => {
                let val = self.pc_relative(offset);
                self.regs.set_with_flags(dr, val);
            }
            Instruction::St { sr, offset } => {
                self.write(self.pc_relative(offset), self.regs.get(sr))?;
            }
            Instruction::Sti { sr, offset } => {
                let ptr = self.read(self.pc_relative(offset))?;
                self.write(ptr, self.regs.get(sr))?;
            }
            Instruction::Str { sr, base, offset } => {
                let ptr = self.regs.get(base).wrapping_add(offset);
                self.write(ptr, self.regs.get(sr))?;
            }
            Instruction::Jsr { target } => {
                // Target is resolved before R7 is overwritten, for `JSRR R7`
                let dest = match target {
                    JsrTarget::Offset(offset) => self.pc_relative(offset),
                    JsrTarget::Reg(base) => self.regs.get(base),
                };
                self.regs.set(7, self.regs.pc());
                self.regs.set_pc(dest);
            }
            Instruction::Jmp { base } => {
                self.regs.set_pc(self.regs.get(base));
            }
            Instruction::Trap { vect } => self.trap(vect, addr)?,
            Instruction::Rti => return Err(RuntimeError::PrivilegedInstruction { pc: addr }),
            Instruction::Res => return Err(RuntimeError::ReservedOpcode { pc: addr, instr }),
        }

        Ok(())
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn reg(&self, reg: u16) -> u16 {
        self.regs.get(reg)
    }

    pub fn set_reg(&mut self, reg: u16, val: u16) {
        self.regs.set(reg, val);
    }

    pub fn pc(&self) -> u16 {
        self.regs.pc()
    }

    pub fn flag(&self) -> RunFlag {
        self.regs.flag()
    }

    pub fn memory(&self) -> &Memory {
        &self.mem
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.mem
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut C {
        &mut self.console
    }

    #[inline]
    fn read(&mut self, addr: u16) -> Result<u16, RuntimeError> {
        self.mem.read(addr, &mut self.console)
    }

    #[inline]
    fn write(&mut self, addr: u16, val: u16) -> Result<(), RuntimeError> {
        self.mem.write(addr, val, &mut self.console)
    }

    #[inline]
    fn pc_relative(&self, offset: u16) -> u16 {
        self.regs.pc().wrapping_add(offset)
    }

    fn jump_relative(&mut self, offset: u16) {
        self.regs.set_pc(self.pc_relative(offset));
    }

    fn operand(&self, operand: Operand) -> u16 {
        match operand {
            Operand::Reg(reg) => self.regs.get(reg),
            Operand::Imm(imm) => imm,
        }
    }
}
