use tracing::trace;

use crate::console::Console;
use crate::error::RuntimeError;

/// LC3 can address 128KB of memory.
pub const MEMORY_MAX: usize = 0x10000;

/// Keyboard status register
pub const KBSR: u16 = 0xFE00;
/// Keyboard data register
pub const KBDR: u16 = 0xFE02;
/// Display status register
pub const DSR: u16 = 0xFE04;
/// Display data register
pub const DDR: u16 = 0xFE06;

/// Set in a status register when its device is ready.
const READY: u16 = 0x8000;

/// Word-addressed system memory, with device registers mapped over it.
///
/// Every `u16` is a valid address. Device registers are never stored: reads
/// are computed from the console and writes only reach the display.
pub struct Memory {
    /// System memory - 128KB in size.
    cells: Box<[u16]>,
}

impl Memory {
    pub fn new() -> Self {
        Memory {
            cells: vec![0; MEMORY_MAX].into_boxed_slice(),
        }
    }

    /// Read a word, going through the device registers.
    ///
    /// Reading [`KBDR`] blocks until a character is available and takes it.
    pub fn read(&self, addr: u16, console: &mut impl Console) -> Result<u16, RuntimeError> {
        let val = match addr {
            KBSR => {
                if console.input_ready()? {
                    READY
                } else {
                    0
                }
            }
            KBDR => {
                let byte = console.read_byte()?;
                trace!(byte, "keyboard data read");
                byte as u16
            }
            DSR => READY,
            DDR => 0,
            _ => self.get(addr),
        };
        Ok(val)
    }

    /// Write a word, going through the device registers.
    ///
    /// Writes to the keyboard and display status registers are ignored.
    pub fn write(
        &mut self,
        addr: u16,
        val: u16,
        console: &mut impl Console,
    ) -> Result<(), RuntimeError> {
        match addr {
            KBSR | KBDR | DSR => (),
            DDR => {
                console.write_bytes(&[(val & 0xFF) as u8])?;
                console.flush()?;
            }
            _ => self.set(addr, val),
        }
        Ok(())
    }

    /// Read the stored cell, bypassing device registers.
    #[inline]
    pub fn get(&self, addr: u16) -> u16 {
        self.cells[addr as usize]
    }

    /// Write the stored cell, bypassing device registers.
    #[inline]
    pub fn set(&mut self, addr: u16, val: u16) {
        self.cells[addr as usize] = val;
    }

    /// Copy `words` into memory starting at `origin`.
    ///
    /// Caller must ensure the words fit below the end of memory, as
    /// [`crate::Image`] does.
    pub(crate) fn load(&mut self, origin: u16, words: &[u16]) {
        let start = origin as usize;
        self.cells[start..start + words.len()].copy_from_slice(words);
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::console::BufferedConsole;

    #[test]
    fn keyboard_status_without_input() {
        let mem = Memory::new();
        let mut console = BufferedConsole::new();
        assert_eq!(mem.read(KBSR, &mut console).unwrap(), 0);
    }

    #[test]
    fn keyboard_data_takes_each_char_once() {
        let mem = Memory::new();
        let mut console = BufferedConsole::with_input("ab");

        assert_ne!(mem.read(KBSR, &mut console).unwrap(), 0);
        assert_eq!(mem.read(KBDR, &mut console).unwrap(), b'a' as u16);
        assert_ne!(mem.read(KBSR, &mut console).unwrap(), 0);
        assert_eq!(mem.read(KBDR, &mut console).unwrap(), b'b' as u16);
        assert_eq!(mem.read(KBSR, &mut console).unwrap(), 0);
        assert!(matches!(
            mem.read(KBDR, &mut console),
            Err(RuntimeError::InputClosed)
        ));
    }

    #[test]
    fn device_writes_not_stored() {
        let mut mem = Memory::new();
        let mut console = BufferedConsole::new();
        mem.write(KBSR, 0xffff, &mut console).unwrap();
        mem.write(KBDR, b'x' as u16, &mut console).unwrap();
        assert_eq!(mem.read(KBSR, &mut console).unwrap(), 0);
        assert_eq!(mem.get(KBSR), 0);
        assert_eq!(mem.get(KBDR), 0);
    }

    #[test]
    fn display_registers() {
        let mut mem = Memory::new();
        let mut console = BufferedConsole::new();
        assert_eq!(mem.read(DSR, &mut console).unwrap(), READY);
        mem.write(DDR, 0x1f00 | b'!' as u16, &mut console).unwrap();
        assert_eq!(console.output(), b"!");
    }

    #[test]
    fn plain_cells() {
        let mut mem = Memory::new();
        let mut console = BufferedConsole::new();
        mem.write(0xffff, 7, &mut console).unwrap();
        assert_eq!(mem.read(0xffff, &mut console).unwrap(), 7);
        mem.load(0x3000, &[1, 2, 3]);
        assert_eq!(mem.get(0x3002), 3);
        assert_eq!(mem.get(0x3003), 0);
    }
}
