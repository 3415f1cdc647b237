//! Connection plumbing over [`embedded_io`] readers and writers.
//!
//! [`TtyDriver`] adapts a plain byte writer into a [`TtyConnection`]
//! and pumps a byte reader into the installed input handler, either
//! blocking or async.

use std::collections::VecDeque;
use std::sync::Mutex;

use embedded_io::Error as _;

use crate::connection::{InputHandler, ResizeHandler, Task, TtyConnection};
use crate::error::ReadlineError;
use crate::terminal::Dimension;

pub struct TtyDriver<W> {
    output: Mutex<W>,
    size: Mutex<Dimension>,
    input_handler: Mutex<Option<InputHandler>>,
    resize_handler: Mutex<Option<ResizeHandler>>,
    tasks: Mutex<VecDeque<Task>>,
}

impl<W> TtyDriver<W>
where
    W: embedded_io::Write + Send + 'static,
{
    pub fn new(output: W, size: Dimension) -> Self {
        Self {
            output: Mutex::new(output),
            size: Mutex::new(size),
            input_handler: Mutex::new(None),
            resize_handler: Mutex::new(None),
            tasks: Mutex::new(VecDeque::new()),
        }
    }

    /// Hand bytes read from the terminal to the installed input
    /// handler. Bytes arriving while no handler is installed are
    /// dropped.
    pub fn feed(&self, data: &[u8]) {
        let handler = self.input_handler.lock().unwrap().take();

        if let Some(handler) = handler {
            handler(data);

            // The handler may have replaced itself while it ran.
            let mut slot = self.input_handler.lock().unwrap();
            if slot.is_none() {
                *slot = Some(handler);
            }
        } else {
            tracing::debug!(len = data.len(), "input dropped, no handler installed");
        }
    }

    /// Record a new terminal size and notify the resize handler.
    pub fn set_size(&self, size: Dimension) {
        *self.size.lock().unwrap() = size;

        let handler = self.resize_handler.lock().unwrap().take();

        if let Some(handler) = handler {
            handler(size);

            let mut slot = self.resize_handler.lock().unwrap();
            if slot.is_none() {
                *slot = Some(handler);
            }
        }
    }

    /// Run tasks queued through [`TtyConnection::schedule`].
    pub fn run_scheduled(&self) {
        loop {
            let task = self.tasks.lock().unwrap().pop_front();

            match task {
                Some(task) => task(),
                None => break,
            }
        }
    }

    /// Read from `input` until end of stream, feeding the engine and
    /// running scheduled tasks after each chunk.
    pub fn pump<R>(&self, mut input: R) -> Result<(), ReadlineError>
    where
        R: embedded_io::Read,
    {
        let mut buf = [0u8; 256];

        loop {
            let n = input
                .read(&mut buf)
                .map_err(|err| ReadlineError::ReadError(err.kind()))?;

            if n == 0 {
                return Ok(());
            }

            self.feed(&buf[0..n]);
            self.run_scheduled();
        }
    }

    /// Async variant of [`Self::pump`].
    pub async fn pump_async<R>(&self, mut input: R) -> Result<(), ReadlineError>
    where
        R: embedded_io_async::Read,
    {
        let mut buf = [0u8; 256];

        loop {
            let n = input
                .read(&mut buf)
                .await
                .map_err(|err| ReadlineError::ReadError(err.kind()))?;

            if n == 0 {
                return Ok(());
            }

            self.feed(&buf[0..n]);
            self.run_scheduled();
        }
    }
}

impl<W> TtyConnection for TtyDriver<W>
where
    W: embedded_io::Write + Send + 'static,
{
    fn write_bytes(&self, bytes: &[u8]) {
        let mut output = self.output.lock().unwrap();

        if let Err(err) = output.write_all(bytes).and_then(|()| output.flush()) {
            tracing::warn!(kind = ?err.kind(), "terminal write failed");
        }
    }

    fn size(&self) -> Dimension {
        *self.size.lock().unwrap()
    }

    fn schedule(&self, task: Task) {
        self.tasks.lock().unwrap().push_back(task);
    }

    fn set_input_handler(&self, handler: Option<InputHandler>) -> Option<InputHandler> {
        let mut slot = self.input_handler.lock().unwrap();
        core::mem::replace(&mut *slot, handler)
    }

    fn set_resize_handler(&self, handler: Option<ResizeHandler>) -> Option<ResizeHandler> {
        let mut slot = self.resize_handler.lock().unwrap();
        core::mem::replace(&mut *slot, handler)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use crossbeam::channel::{unbounded, Receiver};

    use super::*;
    use crate::readline::{Readline, ReadlineBuilder};

    fn setup() -> (Arc<TtyDriver<Vec<u8>>>, Readline<TtyDriver<Vec<u8>>>) {
        let driver = Arc::new(TtyDriver::new(Vec::new(), Dimension::new(80, 24)));
        let readline = ReadlineBuilder::new().install(Arc::clone(&driver));
        (driver, readline)
    }

    fn read_line(readline: &Readline<TtyDriver<Vec<u8>>>) -> Receiver<String> {
        let (tx, rx) = unbounded();
        readline
            .readline("% ", move |line| tx.send(line).unwrap())
            .unwrap();
        rx
    }

    #[test]
    fn pump_reads_until_eof() {
        let (driver, readline) = setup();
        let rx = read_line(&readline);

        driver.pump(&b"hello\r"[..]).unwrap();

        assert_eq!(rx.recv().unwrap(), "hello");
    }

    #[test]
    fn feed_from_reader_thread() {
        let (driver, readline) = setup();
        let rx = read_line(&readline);

        let (byte_tx, byte_rx) = unbounded::<u8>();
        let feeder = Arc::clone(&driver);
        let handle = thread::spawn(move || {
            while let Ok(byte) = byte_rx.recv() {
                feeder.feed(&[byte]);
                feeder.run_scheduled();
            }
        });

        for &byte in b"one\r" {
            byte_tx.send(byte).unwrap();
        }

        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), "one");

        drop(byte_tx);
        handle.join().unwrap();
    }

    #[test]
    fn input_without_handler_is_dropped() {
        let driver = TtyDriver::<Vec<u8>>::new(Vec::new(), Dimension::default());

        // Nothing installed; must not panic.
        driver.feed(b"stray");
    }

    #[tokio::test]
    async fn pump_async_reads_until_eof() {
        let (driver, readline) = setup();
        let rx = read_line(&readline);

        driver.pump_async(&b"async\r"[..]).await.unwrap();

        assert_eq!(rx.recv().unwrap(), "async");
    }
}
