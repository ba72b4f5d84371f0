//! Consoles backed by the host's standard streams.

use std::collections::VecDeque;
use std::io::{self, stdin, stdout, Read, Stdout, Write};
use std::thread;
use std::time::Duration;

use crossbeam_channel as cbc;
use crossterm::event::{self, Event, KeyEvent};
use crossterm::terminal;
use tracing::{debug, warn};

use crate::console::Console;
use crate::error::RuntimeError;

/// Terminal raw mode, held for the lifetime of the value.
///
/// Dropping the guard restores the mode the terminal was in before.
#[derive(Debug)]
pub struct RawMode {
    _private: (),
}

impl RawMode {
    /// Must only be called if terminal is NOT in raw mode.
    pub fn enable() -> io::Result<Self> {
        debug_assert!(
            !terminal::is_raw_mode_enabled().is_ok_and(|is| is),
            "terminal should not be in raw mode to enable raw mode",
        );
        terminal::enable_raw_mode()?;
        debug!("enabled raw terminal");
        Ok(RawMode { _private: () })
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        match terminal::disable_raw_mode() {
            Ok(()) => debug!("restored terminal"),
            Err(err) => warn!(%err, "failed to restore terminal"),
        }
    }
}

/// Similar to [`crossterm::event::KeyCode`] but only contains relevant information.
#[derive(Debug, PartialEq, Eq)]
enum Key {
    Char(char),
    Enter,
    Tab,
    Backspace,
    /// `Ctrl+C`
    Interrupt,
}

impl TryFrom<Event> for Key {
    type Error = ();
    fn try_from(event: Event) -> Result<Self, Self::Error> {
        if let Event::Key(event) = event {
            return event.try_into();
        }
        Err(())
    }
}

impl TryFrom<KeyEvent> for Key {
    type Error = ();
    fn try_from(event: KeyEvent) -> Result<Self, Self::Error> {
        use event::{KeyCode, KeyEventKind, KeyModifiers as Mod};

        if matches!(event.kind, KeyEventKind::Release) {
            return Err(());
        }

        let key = match (event.modifiers, event.code) {
            (Mod::CONTROL, KeyCode::Char('c')) => Key::Interrupt,

            (_, KeyCode::Enter) | (_, KeyCode::Char('\n')) => Key::Enter,
            (_, KeyCode::Tab) => Key::Tab,
            (_, KeyCode::Backspace) => Key::Backspace,

            // Normal character
            (Mod::NONE | Mod::SHIFT, KeyCode::Char(ch)) => Key::Char(ch),

            _ => return Err(()),
        };

        Ok(key)
    }
}

/// Console for an interactive terminal.
///
/// The terminal is in raw mode while this value exists, so keys are read as
/// soon as they are pressed and are never echoed by the terminal itself.
pub struct TermConsole {
    /// Bytes of keys already read but not yet taken by the program.
    ///
    /// Multi-byte characters are encoded as UTF-8 and taken one byte at a time.
    pending: VecDeque<u8>,
    interrupted: bool,
    out: Stdout,
    _raw: RawMode,
}

impl TermConsole {
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            pending: VecDeque::new(),
            interrupted: false,
            out: stdout(),
            _raw: RawMode::enable()?,
        })
    }

    fn push_key(&mut self, key: Key) {
        match key {
            Key::Char(ch) => {
                let mut bytes = [0u8; 4];
                self.pending
                    .extend(ch.encode_utf8(&mut bytes).as_bytes().iter().copied());
            }
            Key::Enter => self.pending.push_back(b'\n'),
            Key::Tab => self.pending.push_back(b'\t'),
            Key::Backspace => self.pending.push_back(0x08),
            Key::Interrupt => self.interrupted = true,
        }
    }

    /// Consume every event which is available without blocking.
    fn drain_events(&mut self) -> io::Result<()> {
        while event::poll(Duration::ZERO)? {
            if let Ok(key) = event::read()?.try_into() {
                self.push_key(key);
            }
        }
        Ok(())
    }

    fn check_interrupt(&self) -> Result<(), RuntimeError> {
        if self.interrupted {
            return Err(RuntimeError::Interrupted);
        }
        Ok(())
    }
}

impl Console for TermConsole {
    fn input_ready(&mut self) -> Result<bool, RuntimeError> {
        self.drain_events()?;
        self.check_interrupt()?;
        Ok(!self.pending.is_empty())
    }

    fn read_byte(&mut self) -> Result<u8, RuntimeError> {
        loop {
            self.check_interrupt()?;
            if let Some(byte) = self.pending.pop_front() {
                return Ok(byte);
            }
            if let Ok(key) = event::read()?.try_into() {
                self.push_key(key);
            }
        }
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), RuntimeError> {
        write_crlf(&mut self.out.lock(), bytes)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), RuntimeError> {
        self.out.flush()?;
        Ok(())
    }

    fn interrupted(&mut self) -> Result<bool, RuntimeError> {
        self.drain_events()?;
        Ok(self.interrupted)
    }
}

/// Write `bytes`, turning each line feed into a carriage return and line feed.
///
/// Raw mode disables output processing, so the terminal won't do it.
fn write_crlf(out: &mut impl Write, bytes: &[u8]) -> io::Result<()> {
    for line in bytes.split_inclusive(|&b| b == b'\n') {
        match line.split_last() {
            Some((b'\n', rest)) => {
                out.write_all(rest)?;
                out.write_all(b"\r\n")?;
            }
            _ => out.write_all(line)?,
        }
    }
    Ok(())
}

/// Console for redirected input, such as a pipe or a file.
///
/// Input is read on a separate thread so that the keyboard status register
/// can be polled without blocking. A read error ends the input and is
/// reported to the program once every byte before it has been taken.
pub struct PipedConsole {
    input: cbc::Receiver<io::Result<u8>>,
    /// Taken from the channel by a readiness check, not yet consumed.
    peeked: Option<io::Result<u8>>,
    out: Stdout,
}

impl PipedConsole {
    /// Console reading from standard input.
    pub fn new() -> Self {
        Self::from_reader(stdin())
    }

    pub fn from_reader<R: Read + Send + 'static>(reader: R) -> Self {
        let (tx, rx) = cbc::unbounded();
        thread::spawn(move || {
            for byte in reader.bytes() {
                let failed = byte.is_err();
                if tx.send(byte).is_err() || failed {
                    break;
                }
            }
            debug!("input closed");
        });
        Self {
            input: rx,
            peeked: None,
            out: stdout(),
        }
    }
}

impl Default for PipedConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for PipedConsole {
    fn input_ready(&mut self) -> Result<bool, RuntimeError> {
        if self.peeked.is_none() {
            self.peeked = self.input.try_recv().ok();
        }
        match self.peeked.take() {
            Some(Ok(byte)) => {
                self.peeked = Some(Ok(byte));
                Ok(true)
            }
            Some(Err(err)) => Err(err.into()),
            None => Ok(false),
        }
    }

    fn read_byte(&mut self) -> Result<u8, RuntimeError> {
        let byte = match self.peeked.take() {
            Some(byte) => byte,
            None => self.input.recv().map_err(|_| RuntimeError::InputClosed)?,
        };
        Ok(byte?)
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), RuntimeError> {
        self.out.lock().write_all(bytes)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), RuntimeError> {
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crossterm::event::{KeyCode, KeyEventKind, KeyEventState, KeyModifiers};

    fn key(code: KeyCode, modifiers: KeyModifiers, kind: KeyEventKind) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind,
            state: KeyEventState::NONE,
        }
    }

    struct BrokenPipe;

    impl Read for BrokenPipe {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe broke"))
        }
    }

    #[test]
    fn line_feeds_get_carriage_returns() {
        let mut out = Vec::new();
        write_crlf(&mut out, b"ab\ncd\n\nef").unwrap();
        assert_eq!(out, b"ab\r\ncd\r\n\r\nef");

        let mut out = Vec::new();
        write_crlf(&mut out, b"").unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn piped_input_in_order() {
        let mut console = PipedConsole::from_reader(io::Cursor::new(b"hi".to_vec()));
        assert_eq!(console.read_byte().unwrap(), b'h');
        assert_eq!(console.read_byte().unwrap(), b'i');
        assert!(matches!(
            console.read_byte(),
            Err(RuntimeError::InputClosed)
        ));
    }

    #[test]
    fn piped_read_error_is_reported() {
        let input = io::Cursor::new(b"a".to_vec()).chain(BrokenPipe);
        let mut console = PipedConsole::from_reader(input);
        assert_eq!(console.read_byte().unwrap(), b'a');
        assert!(matches!(console.read_byte(), Err(RuntimeError::Io(_))));
    }

    #[test]
    fn piped_read_error_reported_by_status_poll() {
        let mut console = PipedConsole::from_reader(BrokenPipe);
        // The reader thread may not have sent the error yet
        let err = loop {
            match console.input_ready() {
                Ok(false) => thread::yield_now(),
                Ok(true) => panic!("no input should be ready"),
                Err(err) => break err,
            }
        };
        assert!(matches!(err, RuntimeError::Io(_)));
    }

    #[test]
    fn key_from_event() {
        let press = KeyEventKind::Press;
        assert_eq!(
            Key::try_from(key(KeyCode::Char('a'), KeyModifiers::NONE, press)),
            Ok(Key::Char('a'))
        );
        assert_eq!(
            Key::try_from(key(KeyCode::Char('A'), KeyModifiers::SHIFT, press)),
            Ok(Key::Char('A'))
        );
        assert_eq!(
            Key::try_from(key(KeyCode::Char('c'), KeyModifiers::CONTROL, press)),
            Ok(Key::Interrupt)
        );
        assert_eq!(
            Key::try_from(key(KeyCode::Enter, KeyModifiers::NONE, press)),
            Ok(Key::Enter)
        );
        assert_eq!(
            Key::try_from(key(KeyCode::Left, KeyModifiers::NONE, press)),
            Err(())
        );
        assert_eq!(
            Key::try_from(key(KeyCode::Char('a'), KeyModifiers::NONE, KeyEventKind::Release)),
            Err(())
        );
    }
}
