//! Error types

use core::fmt;

/// Enum to hold various error types
#[derive(Debug)]
pub enum ReadlineError {
    /// A public entry point was used while the engine was in a state
    /// that forbids it, e.g. starting a line read while one is active
    /// or misusing the completion protocol.
    IllegalState(&'static str),
    /// Input the engine explicitly does not support, e.g. control code
    /// points passed to [`crate::completion::Completion::complete`].
    Unsupported(&'static str),
    /// A keymap source line could not be parsed. Carries the 1-based
    /// line number.
    KeymapParse(usize),
    ReadError(embedded_io::ErrorKind),
    WriteError(embedded_io::ErrorKind),
}

impl fmt::Display for ReadlineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadlineError::IllegalState(what) => write!(f, "illegal state: {}", what),
            ReadlineError::Unsupported(what) => write!(f, "unsupported: {}", what),
            ReadlineError::KeymapParse(line) => {
                write!(f, "invalid keymap binding on line {}", line)
            }
            ReadlineError::ReadError(kind) => write!(f, "read error: {:?}", kind),
            ReadlineError::WriteError(kind) => write!(f, "write error: {:?}", kind),
        }
    }
}

impl std::error::Error for ReadlineError {}

impl embedded_io::Error for ReadlineError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match *self {
            ReadlineError::IllegalState(_) => embedded_io::ErrorKind::InvalidInput,
            ReadlineError::Unsupported(_) => embedded_io::ErrorKind::Unsupported,
            ReadlineError::KeymapParse(_) => embedded_io::ErrorKind::InvalidData,
            ReadlineError::ReadError(e) => e.kind(),
            ReadlineError::WriteError(e) => e.kind(),
        }
    }
}
