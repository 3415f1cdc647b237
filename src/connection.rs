//! The connection seam between the engine and a real terminal.

use crate::terminal::Dimension;

/// Receives raw bytes read from the terminal.
pub type InputHandler = Box<dyn Fn(&[u8]) + Send + Sync>;

/// Receives the new size when the terminal is resized.
pub type ResizeHandler = Box<dyn Fn(Dimension) + Send + Sync>;

/// Deferred work to run on the connection's event context.
pub type Task = Box<dyn FnOnce() + Send>;

/// A byte-oriented, event-driven terminal connection.
///
/// The engine installs its handlers when a line read starts and
/// restores the previous ones on uninstall, so a connection can be
/// shared between the engine and other consumers over time.
pub trait TtyConnection: Send + Sync + 'static {
    /// Write raw bytes to the terminal. Failures are the connection's
    /// concern; the engine fires and forgets.
    fn write_bytes(&self, bytes: &[u8]);

    /// Current terminal dimensions.
    fn size(&self) -> Dimension;

    /// Queue a task to run on the connection's event context.
    fn schedule(&self, task: Task);

    /// Install an input handler, returning the previous one.
    fn set_input_handler(&self, handler: Option<InputHandler>) -> Option<InputHandler>;

    /// Install a resize handler, returning the previous one.
    fn set_resize_handler(&self, handler: Option<ResizeHandler>) -> Option<ResizeHandler>;

    fn write(&self, text: &str) {
        self.write_bytes(text.as_bytes());
    }

    fn write_code_points(&self, chars: &[char]) {
        let mut bytes = Vec::with_capacity(chars.len());
        let mut utf8 = [0; 4];

        for c in chars {
            bytes.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
        }

        self.write_bytes(&bytes);
    }
}
