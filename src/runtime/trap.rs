use colored::Colorize;
use tracing::debug;

use super::{RunState, Status};
use crate::console::Console;
use crate::error::RuntimeError;

/// Service routines reachable through `TRAP`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrapVect {
    /// Read a character without echo
    Getc = 0x20,
    /// Write the character in R0
    Out = 0x21,
    /// Write a string of one character per word
    Puts = 0x22,
    /// Prompt for a character and echo it
    In = 0x23,
    /// Write a string of two characters per word
    Putsp = 0x24,
    Halt = 0x25,
}

impl TryFrom<u8> for TrapVect {
    type Error = u8;
    fn try_from(vect: u8) -> Result<Self, Self::Error> {
        let trap = match vect {
            0x20 => TrapVect::Getc,
            0x21 => TrapVect::Out,
            0x22 => TrapVect::Puts,
            0x23 => TrapVect::In,
            0x24 => TrapVect::Putsp,
            0x25 => TrapVect::Halt,
            _ => return Err(vect),
        };
        Ok(trap)
    }
}

const IN_PROMPT: &str = "Enter a character: ";

impl<C: Console> RunState<C> {
    /// Execute the routine for `vect`. `pc` is the address of the `TRAP` instruction.
    pub(super) fn trap(&mut self, vect: u8, pc: u16) -> Result<(), RuntimeError> {
        let trap = TrapVect::try_from(vect)
            .map_err(|vect| RuntimeError::UnknownTrap { pc, vect })?;

        match trap {
            TrapVect::Getc => {
                let ch = self.console.read_byte()?;
                self.regs.set_with_flags(0, ch as u16);
            }
            TrapVect::Out => {
                let ch = (self.regs.get(0) & 0xFF) as u8;
                self.console.write_bytes(&[ch])?;
                self.console.flush()?;
            }
            TrapVect::Puts => {
                let mut string = Vec::new();
                let mut addr = self.regs.get(0);
                loop {
                    let word = self.mem.get(addr);
                    if word == 0 {
                        break;
                    }
                    string.push((word & 0xFF) as u8);
                    addr = addr.wrapping_add(1);
                }
                self.console.write_bytes(&string)?;
                self.console.flush()?;
            }
            TrapVect::In => {
                self.console.write_bytes(IN_PROMPT.as_bytes())?;
                self.console.flush()?;
                let ch = self.console.read_byte()?;
                self.console.write_bytes(&[ch])?;
                self.console.flush()?;
                self.regs.set_with_flags(0, ch as u16);
            }
            TrapVect::Putsp => {
                let mut string = Vec::new();
                let mut addr = self.regs.get(0);
                loop {
                    let word = self.mem.get(addr);
                    if word == 0 {
                        break;
                    }
                    // Low byte first, high byte is padding when zero
                    string.push((word & 0xFF) as u8);
                    let high = (word >> 8) as u8;
                    if high != 0 {
                        string.push(high);
                    }
                    addr = addr.wrapping_add(1);
                }
                self.console.write_bytes(&string)?;
                self.console.flush()?;
            }
            TrapVect::Halt => {
                let notice = format!("\n{:>12}\n", "Halted".cyan());
                self.console.write_bytes(notice.as_bytes())?;
                self.console.flush()?;
                self.status = Status::Halted;
                debug!(pc = %format_args!("{pc:#06x}"), "halted");
            }
        }

        Ok(())
    }
}
