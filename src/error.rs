use std::io;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

// Loader errors

#[derive(Debug, Error, Diagnostic)]
pub enum LoadError {
    #[error("Could not read program image `{}`", path.display())]
    #[diagnostic(
        code(load::read),
        help("check that the path exists and points to an assembled `.obj` file")
    )]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Program image is empty.")]
    #[diagnostic(
        code(load::empty),
        help("an image must start with a 16-bit origin address")
    )]
    Empty,

    #[error("Program image is not aligned to 16 bits ({len} bytes).")]
    #[diagnostic(
        code(load::unaligned),
        help("images are made of big-endian 16-bit words; the file may be truncated")
    )]
    Unaligned { len: usize },

    #[error("Program of {len} words at origin {origin:#06x} does not fit in memory.")]
    #[diagnostic(
        code(load::too_long),
        help("the last word must be placed at or below address 0xffff")
    )]
    TooLong { origin: u16, len: usize },
}

// Runtime errors

#[derive(Debug, Error, Diagnostic)]
pub enum RuntimeError {
    #[error("Encountered reserved opcode in {instr:#06x} at {pc:#06x}.")]
    #[diagnostic(
        code(runtime::reserved_opcode),
        help("opcode 0b1101 is reserved; the image may be corrupted or built for another machine")
    )]
    ReservedOpcode { pc: u16, instr: u16 },

    #[error("Attempted RTI at {pc:#06x} while in user mode.")]
    #[diagnostic(
        code(runtime::privileged),
        help("returning from interrupts is not supported by this machine")
    )]
    PrivilegedInstruction { pc: u16 },

    #[error("Called a trap with an unknown vector of {vect:#04x} at {pc:#06x}.")]
    #[diagnostic(
        code(runtime::unknown_trap),
        help("supported vectors are 0x20 to 0x25 (GETC, OUT, PUTS, IN, PUTSP, HALT)")
    )]
    UnknownTrap { pc: u16, vect: u8 },

    #[error("Execution was interrupted.")]
    #[diagnostic(code(runtime::interrupted))]
    Interrupted,

    #[error("Input closed while the program was waiting for a character.")]
    #[diagnostic(
        code(runtime::input_closed),
        help("provide more input, or run the program in an interactive terminal")
    )]
    InputClosed,

    #[error("Console failure: {0}")]
    #[diagnostic(code(runtime::io))]
    Io(#[from] io::Error),
}
