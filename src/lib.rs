//! Readline engine for byte-oriented terminal connections.
//!
//! The engine is event driven and IO agnostic. It attaches to any
//! [`connection::TtyConnection`], decodes the incoming byte stream
//! into key and function events against a [`keymap::Keymap`], and
//! renders the edited line with minimal terminal output. Multi-line
//! input through quoting, history navigation and an asynchronous
//! completion protocol are built in.
//!
//! ```
//! use std::sync::Arc;
//!
//! use termline::driver::TtyDriver;
//! use termline::readline::ReadlineBuilder;
//! use termline::terminal::Dimension;
//!
//! let conn = Arc::new(TtyDriver::new(Vec::new(), Dimension::new(80, 24)));
//! let readline = ReadlineBuilder::new().install(Arc::clone(&conn));
//!
//! readline
//!     .readline("% ", |line| println!("got: {line}"))
//!     .unwrap();
//! conn.feed(b"hello\r");
//! conn.run_scheduled();
//! ```

pub mod completion;
pub mod connection;
pub mod decoder;
pub mod driver;
pub mod error;
pub mod event;
pub mod functions;
pub mod history;
mod interaction;
pub mod keymap;
pub mod keys;
pub mod line_buffer;
pub mod quoting;
pub mod readline;
pub mod terminal;
#[cfg(test)]
pub(crate) mod testlib;
mod utf8;

pub use crate::completion::Completion;
pub use crate::error::ReadlineError;
pub use crate::readline::{Readline, ReadlineBuilder};
