//! The readline engine.
//!
//! The engine installs itself on a [`TtyConnection`], decodes incoming
//! bytes into events and runs one [`Interaction`] at a time. All
//! mutable state sits behind a single mutex; user callbacks are always
//! invoked with the mutex released so they may call back into the
//! engine.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use crate::completion::Completion;
use crate::connection::{InputHandler, ResizeHandler, TtyConnection};
use crate::decoder::EventDecoder;
use crate::error::ReadlineError;
use crate::functions::Function;
use crate::history::History;
use crate::interaction::{CompletionHandler, Interaction, PostAction};
use crate::keymap::Keymap;
use crate::terminal::{Device, Dimension};

/// Handler for raw input decoded while no line read is active.
pub type ReadHandler = Box<dyn Fn(Vec<char>) + Send + Sync>;

/// Handler observing terminal size changes.
pub type SizeHandler = Box<dyn Fn(Dimension) + Send + Sync>;

pub(crate) struct Shared<C: TtyConnection> {
    pub(crate) decoder: EventDecoder,
    pub(crate) interaction: Option<Interaction<C>>,
    /// Set while a completion is outstanding; freezes event delivery.
    pub(crate) completing: bool,
    pub(crate) history: History,
    pub(crate) size: Dimension,
    default_read_handler: Option<ReadHandler>,
    default_size_handler: Option<SizeHandler>,
    prev_input_handler: Option<InputHandler>,
    prev_resize_handler: Option<ResizeHandler>,
}

pub(crate) struct Engine<C: TtyConnection> {
    pub(crate) conn: Arc<C>,
    pub(crate) device: Device,
    pub(crate) functions: HashMap<String, Arc<dyn Function>>,
    pub(crate) shared: Mutex<Shared<C>>,
}

enum Step<C: TtyConnection> {
    Idle,
    Handled,
    Post(PostAction<C>),
    RawRead(ReadHandler, Vec<char>),
}

impl<C: TtyConnection> Engine<C> {
    /// Drain decoded events into the active interaction, or into the
    /// default read handler when no read is active.
    pub(crate) fn deliver(self: &Arc<Self>) {
        loop {
            let step = {
                let mut guard = self.shared.lock().unwrap();
                let shared = &mut *guard;

                if shared.interaction.is_some() {
                    if shared.completing {
                        Step::Idle
                    } else if let Some(event) = shared.decoder.next() {
                        let mut interaction = shared.interaction.take().unwrap();
                        let size = shared.size;
                        let post = interaction.handle_event(
                            event,
                            self,
                            &mut shared.history,
                            &mut shared.completing,
                            size,
                        );

                        let finished = matches!(post, Some(PostAction::Deliver { .. }));
                        if !finished {
                            shared.interaction = Some(interaction);
                        }

                        match post {
                            Some(post) => Step::Post(post),
                            None => Step::Handled,
                        }
                    } else {
                        Step::Idle
                    }
                } else if shared.decoder.has_next() && shared.default_read_handler.is_some() {
                    let chars = shared.decoder.drain_code_points();
                    let handler = shared.default_read_handler.take().unwrap();
                    Step::RawRead(handler, chars)
                } else {
                    Step::Idle
                }
            };

            match step {
                Step::Idle => break,
                Step::Handled => continue,
                Step::Post(PostAction::Deliver { handler, line }) => {
                    handler(line);
                }
                Step::Post(PostAction::Complete {
                    handler,
                    completion,
                }) => {
                    handler(completion);
                }
                Step::RawRead(handler, chars) => {
                    handler(chars);
                    let mut shared = self.shared.lock().unwrap();
                    if shared.default_read_handler.is_none() {
                        shared.default_read_handler = Some(handler);
                    }
                }
            }
        }
    }

    /// Schedule delivery of data that arrived while delivery was
    /// frozen.
    pub(crate) fn schedule_pending(self: &Arc<Self>) {
        let has_pending = self.shared.lock().unwrap().decoder.has_next();

        if has_pending {
            let engine = Arc::clone(self);
            self.conn.schedule(Box::new(move || engine.deliver()));
        }
    }

    fn handle_input(self: &Arc<Self>, data: &[u8]) {
        self.shared.lock().unwrap().decoder.append(data);
        self.deliver();
    }

    fn handle_resize(self: &Arc<Self>, dim: Dimension) {
        let handler = {
            let mut shared = self.shared.lock().unwrap();
            let old = shared.size;

            if let Some(mut interaction) = shared.interaction.take() {
                if !shared.completing && old.width != dim.width {
                    interaction.resize(old.width, dim.width, self);
                }
                shared.interaction = Some(interaction);
            }

            shared.size = dim;
            shared.default_size_handler.take()
        };

        if let Some(handler) = handler {
            handler(dim);
            let mut shared = self.shared.lock().unwrap();
            if shared.default_size_handler.is_none() {
                shared.default_size_handler = Some(handler);
            }
        }
    }
}

/// Builder for a [`Readline`] engine.
pub struct ReadlineBuilder {
    keymap: Keymap,
    device: Device,
    functions: HashMap<String, Arc<dyn Function>>,
    history_capacity: Option<usize>,
}

impl ReadlineBuilder {
    pub fn new() -> Self {
        Self {
            keymap: Keymap::default(),
            device: Device::xterm(),
            functions: HashMap::new(),
            history_capacity: None,
        }
    }

    pub fn keymap(mut self, keymap: Keymap) -> Self {
        self.keymap = keymap;
        self
    }

    pub fn device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    /// Register an editing function under the name keymap bindings
    /// refer to it by. Builtins of the same name take precedence.
    pub fn function(mut self, name: impl Into<String>, function: impl Function + 'static) -> Self {
        self.functions.insert(name.into(), Arc::new(function));
        self
    }

    /// Bound the history to `max_entries` lines.
    pub fn history_capacity(mut self, max_entries: usize) -> Self {
        self.history_capacity = Some(max_entries);
        self
    }

    /// Install the engine on a connection, taking over its input and
    /// resize handlers until [`Readline::uninstall`].
    pub fn install<C: TtyConnection>(self, conn: Arc<C>) -> Readline<C> {
        let keymap = Arc::new(self.keymap);
        let history = match self.history_capacity {
            Some(max) => History::with_capacity(max),
            None => History::new(),
        };

        let engine = Arc::new(Engine {
            conn: Arc::clone(&conn),
            device: self.device,
            functions: self.functions,
            shared: Mutex::new(Shared {
                decoder: EventDecoder::new(keymap),
                interaction: None,
                completing: false,
                history,
                size: conn.size(),
                default_read_handler: None,
                default_size_handler: None,
                prev_input_handler: None,
                prev_resize_handler: None,
            }),
        });

        // Handlers hold weak references so dropping the Readline and
        // the connection does not leak through the cycle.
        let weak: Weak<Engine<C>> = Arc::downgrade(&engine);
        let prev_input = conn.set_input_handler(Some(Box::new(move |data: &[u8]| {
            if let Some(engine) = weak.upgrade() {
                engine.handle_input(data);
            }
        })));

        let weak: Weak<Engine<C>> = Arc::downgrade(&engine);
        let prev_resize = conn.set_resize_handler(Some(Box::new(move |dim: Dimension| {
            if let Some(engine) = weak.upgrade() {
                engine.handle_resize(dim);
            }
        })));

        {
            let mut shared = engine.shared.lock().unwrap();
            shared.prev_input_handler = prev_input;
            shared.prev_resize_handler = prev_resize;
        }

        tracing::debug!("readline installed");
        Readline { engine }
    }
}

impl Default for ReadlineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A readline engine installed on a connection.
pub struct Readline<C: TtyConnection> {
    engine: Arc<Engine<C>>,
}

impl<C: TtyConnection> Readline<C> {
    /// Start reading a line. The handler receives the logical line
    /// once the user accepts it.
    pub fn readline(
        &self,
        prompt: &str,
        request_handler: impl FnOnce(String) + Send + 'static,
    ) -> Result<(), ReadlineError> {
        self.start(prompt, Box::new(request_handler), None)
    }

    /// Start reading a line with completion support.
    pub fn readline_with_completion(
        &self,
        prompt: &str,
        request_handler: impl FnOnce(String) + Send + 'static,
        completion_handler: impl Fn(Completion<C>) + Send + Sync + 'static,
    ) -> Result<(), ReadlineError> {
        self.start(
            prompt,
            Box::new(request_handler),
            Some(Arc::new(completion_handler)),
        )
    }

    fn start(
        &self,
        prompt: &str,
        request_handler: Box<dyn FnOnce(String) + Send>,
        completion_handler: Option<CompletionHandler<C>>,
    ) -> Result<(), ReadlineError> {
        {
            let mut shared = self.engine.shared.lock().unwrap();

            if shared.interaction.is_some() {
                return Err(ReadlineError::IllegalState("already reading a line"));
            }

            shared.interaction = Some(Interaction::new(
                prompt.to_string(),
                request_handler,
                completion_handler,
            ));
        }

        self.engine.conn.write(prompt);
        Ok(())
    }

    /// Schedule delivery of input buffered before this read started.
    pub fn schedule_pending(&self) {
        self.engine.schedule_pending();
    }

    /// Handler for decoded input arriving while no read is active.
    pub fn set_read_handler(&self, handler: Option<ReadHandler>) {
        self.engine.shared.lock().unwrap().default_read_handler = handler;
    }

    /// Handler observing size changes, called after the engine has
    /// adjusted the active line.
    pub fn set_size_handler(&self, handler: Option<SizeHandler>) {
        self.engine.shared.lock().unwrap().default_size_handler = handler;
    }

    /// Last known terminal size.
    pub fn size(&self) -> Dimension {
        self.engine.shared.lock().unwrap().size
    }

    /// Snapshot of the history, most recent line first.
    pub fn history(&self) -> Vec<String> {
        self.engine
            .shared
            .lock()
            .unwrap()
            .history
            .iter()
            .map(str::to_string)
            .collect()
    }

    /// Add a line as the most recent history entry.
    pub fn add_history_entry(&self, line: impl Into<String>) {
        self.engine.shared.lock().unwrap().history.add(line.into());
    }

    /// Replace the history wholesale, most recent line first.
    pub fn set_history(&self, lines: impl IntoIterator<Item = impl Into<String>>) {
        let lines = lines.into_iter().map(Into::into);
        self.engine.shared.lock().unwrap().history.replace(lines);
    }

    /// Detach from the connection, restoring the handlers that were
    /// installed before.
    pub fn uninstall(&self) {
        let (prev_input, prev_resize) = {
            let mut shared = self.engine.shared.lock().unwrap();
            (
                shared.prev_input_handler.take(),
                shared.prev_resize_handler.take(),
            )
        };

        self.engine.conn.set_input_handler(prev_input);
        self.engine.conn.set_resize_handler(prev_resize);
        tracing::debug!("readline uninstalled");
    }
}
