// Decoding
pub mod decode;
pub use decode::{Instruction, Opcode};

// Loading
mod image;
pub use image::Image;

// Running
pub mod runtime;
pub use runtime::{RunState, Status};

// Host I/O
pub mod console;
pub use console::{BufferedConsole, Console};
pub mod term;

mod error;
pub use error::{LoadError, RuntimeError};
