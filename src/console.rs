//! Host input and output as seen by a running program.
//!
//! Every byte a program reads or writes goes through a [`Console`]: trap
//! routines use it directly and the memory-mapped keyboard and display
//! registers are backed by it. [`crate::term`] provides the consoles used by
//! the binary; [`BufferedConsole`] keeps everything in memory.

use std::collections::VecDeque;

use crate::error::RuntimeError;

pub trait Console {
    /// Whether [`Console::read_byte`] would return without blocking.
    fn input_ready(&mut self) -> Result<bool, RuntimeError>;

    /// Block until a byte of input is available, then take it.
    fn read_byte(&mut self) -> Result<u8, RuntimeError>;

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), RuntimeError>;

    fn flush(&mut self) -> Result<(), RuntimeError>;

    /// Whether the user asked for execution to stop.
    ///
    /// Checked by the run loop between instructions. Consoles which cannot be
    /// interrupted never report it.
    fn interrupted(&mut self) -> Result<bool, RuntimeError> {
        Ok(false)
    }
}

/// Console reading from an input queue and writing to an output buffer.
///
/// A blocking read on an empty queue can never be satisfied, so it fails with
/// [`RuntimeError::InputClosed`].
#[derive(Debug, Default, Clone)]
pub struct BufferedConsole {
    input: VecDeque<u8>,
    output: Vec<u8>,
    interrupted: bool,
}

impl BufferedConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(input: impl AsRef<[u8]>) -> Self {
        Self {
            input: input.as_ref().iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn push_input(&mut self, input: impl AsRef<[u8]>) {
        self.input.extend(input.as_ref());
    }

    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Output as text, replacing any invalid UTF-8.
    pub fn output_str(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }

    /// Make the next interrupt check report an interrupt.
    pub fn interrupt(&mut self) {
        self.interrupted = true;
    }
}

impl Console for BufferedConsole {
    fn input_ready(&mut self) -> Result<bool, RuntimeError> {
        Ok(!self.input.is_empty())
    }

    fn read_byte(&mut self) -> Result<u8, RuntimeError> {
        self.input.pop_front().ok_or(RuntimeError::InputClosed)
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), RuntimeError> {
        self.output.extend_from_slice(bytes);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), RuntimeError> {
        Ok(())
    }

    fn interrupted(&mut self) -> Result<bool, RuntimeError> {
        Ok(self.interrupted)
    }
}
