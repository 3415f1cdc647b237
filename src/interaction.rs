//! State of one line read, from prompt to delivered line.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::completion::Completion;
use crate::connection::TtyConnection;
use crate::event::{Event, KeyEvent};
use crate::functions::{Builtin, FunctionContext};
use crate::history::History;
use crate::keys::Key;
use crate::line_buffer::LineBuffer;
use crate::quoting::{Quote, QuoteParser};
use crate::readline::Engine;
use crate::terminal::{Dimension, Position};

pub(crate) type RequestHandler = Box<dyn FnOnce(String) + Send>;
pub(crate) type CompletionHandler<C> = Arc<dyn Fn(Completion<C>) + Send + Sync>;

/// Work that must run after the engine lock is released, so user
/// callbacks can reenter the engine.
pub(crate) enum PostAction<C: TtyConnection> {
    Deliver {
        handler: RequestHandler,
        line: String,
    },
    Complete {
        handler: CompletionHandler<C>,
        completion: Completion<C>,
    },
}

pub(crate) struct Interaction<C: TtyConnection> {
    pub(crate) prompt: String,
    request_handler: Option<RequestHandler>,
    completion_handler: Option<CompletionHandler<C>>,
    pub(crate) buffer: LineBuffer,
    /// Logical content of lines already accepted in this read.
    pub(crate) lines: Vec<Vec<char>>,
    /// Quoting state carried across physical lines.
    pub(crate) parsed: QuoteParser,
    history_index: isize,
    data: HashMap<String, Box<dyn Any + Send>>,
}

impl<C: TtyConnection> Interaction<C> {
    pub(crate) fn new(
        prompt: String,
        request_handler: RequestHandler,
        completion_handler: Option<CompletionHandler<C>>,
    ) -> Self {
        Self {
            prompt,
            request_handler: Some(request_handler),
            completion_handler,
            buffer: LineBuffer::new(),
            lines: Vec::new(),
            parsed: QuoteParser::new(),
            history_index: -1,
            data: HashMap::new(),
        }
    }

    pub(crate) fn handle_event(
        &mut self,
        event: Event,
        engine: &Arc<Engine<C>>,
        history: &mut History,
        completing: &mut bool,
        size: Dimension,
    ) -> Option<PostAction<C>> {
        let width = size.width;

        match event {
            Event::Key(key) => {
                if matches!(key.code_points(), ['\r']) {
                    self.enter(engine, history)
                } else if matches!(key.code_points(), ['\t']) {
                    self.start_completion(engine, completing, size)
                } else if let Some(builtin) = builtin_for_key(&key) {
                    let copy = self.buffer.clone();
                    self.apply_builtin(builtin, history);
                    self.redraw_from(&copy, engine, width);
                    None
                } else {
                    let copy = self.buffer.clone();
                    for c in key.code_points() {
                        self.buffer.insert(*c);
                    }
                    self.redraw_from(&copy, engine, width);
                    None
                }
            }
            Event::Function(function) => {
                let copy = self.buffer.clone();

                if let Some(builtin) = Builtin::from_name(function.name()) {
                    self.apply_builtin(builtin, history);
                } else if let Some(custom) = engine.functions.get(function.name()) {
                    let custom = Arc::clone(custom);
                    custom.apply(&mut FunctionContext {
                        buffer: &mut self.buffer,
                        history,
                        history_index: &mut self.history_index,
                        data: &mut self.data,
                    });
                } else {
                    tracing::warn!(name = function.name(), "unbound editing function");
                }

                self.redraw_from(&copy, engine, width);
                None
            }
        }
    }

    fn apply_builtin(&mut self, builtin: Builtin, history: &mut History) {
        builtin.apply(&mut FunctionContext {
            buffer: &mut self.buffer,
            history,
            history_index: &mut self.history_index,
            data: &mut self.data,
        });
    }

    /// Accept the visible line. Either opens a continuation line or
    /// delivers the accumulated logical line.
    fn enter(
        &mut self,
        engine: &Arc<Engine<C>>,
        history: &mut History,
    ) -> Option<PostAction<C>> {
        let typed: Vec<char> = self.buffer.chars().to_vec();
        for c in typed {
            self.parsed.accept(c);
        }
        self.buffer.clear();

        if self.parsed.escaped() {
            // A trailing backslash continues the line; the carriage
            // return itself ends up in the logical text.
            self.parsed.accept('\r');
            self.prompt = "> ".to_string();
            engine.conn.write("\n> ");
            return None;
        }

        self.lines.push(self.parsed.take_buffer());

        if self.parsed.quote() != Quote::None {
            engine.conn.write("\n> ");
            self.prompt = "> ".to_string();
            return None;
        }

        let mut line = String::new();
        for (i, l) in self.lines.iter().enumerate() {
            if i > 0 {
                line.push('\n');
            }
            line.extend(l.iter());
        }
        self.lines.clear();

        history.add(line.clone());
        engine.conn.write("\n");
        tracing::trace!(len = line.len(), "line accepted");

        self.request_handler
            .take()
            .map(|handler| PostAction::Deliver { handler, line })
    }

    /// Hand a completion request to the completion handler, freezing
    /// event delivery until it calls `end`.
    fn start_completion(
        &mut self,
        engine: &Arc<Engine<C>>,
        completing: &mut bool,
        size: Dimension,
    ) -> Option<PostAction<C>> {
        let handler = Arc::clone(self.completion_handler.as_ref()?);

        let mut index = self.buffer.cursor();
        while index > 0 && self.buffer.chars()[index - 1] != ' ' {
            index -= 1;
        }

        // The whole logical line so far, quoting resolved.
        let mut full = QuoteParser::new();
        for l in &self.lines {
            full.accept_all(l.iter().copied());
            full.accept('\n');
        }
        full.accept_all(self.parsed.buffer().iter().copied());
        full.accept_all(self.buffer.chars().iter().copied());

        // Quoting context of the word being completed.
        let mut prefix = QuoteParser::new();
        prefix.accept_all(self.buffer.chars()[index..self.buffer.cursor()].iter().copied());

        *completing = true;

        let completion = Completion::new(
            Arc::clone(engine),
            full.take_buffer(),
            prefix,
            self.buffer.clone(),
            size,
        );

        Some(PostAction::Complete {
            handler,
            completion,
        })
    }

    /// Diff the screen from `copy` to the current buffer, both laid
    /// out behind the prompt.
    pub(crate) fn redraw_from(&mut self, copy: &LineBuffer, engine: &Engine<C>, width: usize) {
        let mut old = prompt_line(&self.prompt, copy);
        let new = prompt_line(&self.prompt, &self.buffer);
        let mut out = Vec::new();

        old.update(&new, &mut out, width, &engine.device);
        engine.conn.write_bytes(&out);
    }

    /// Repaint after the terminal width changed, erasing the old
    /// layout upward from the cursor row and rewriting under the new
    /// width.
    pub(crate) fn resize(&mut self, old_width: usize, new_width: usize, engine: &Engine<C>) {
        let region = prompt_line(&self.prompt, &self.buffer);

        let cursor = Position::from_offset(region.cursor(), new_width);
        let end = Position::from_offset(region.len(), old_width);
        let end_row = end.row + end.column / new_width.max(1);

        let mut out = vec![b'\r'];
        let mut row = cursor.row;

        while row != end_row {
            if row > end_row {
                out.extend_from_slice(engine.device.cursor_up.as_bytes());
                row -= 1;
            } else {
                out.push(b'\n');
                row += 1;
            }
        }

        while row > 0 {
            out.extend_from_slice(engine.device.erase_line_backward.as_bytes());
            out.extend_from_slice(engine.device.cursor_up.as_bytes());
            row -= 1;
        }
        out.extend_from_slice(engine.device.erase_line_backward.as_bytes());

        out.extend_from_slice(self.prompt.as_bytes());

        let mut screen = LineBuffer::from(self.prompt.as_str());
        screen.update(&region, &mut out, new_width, &engine.device);

        engine.conn.write_bytes(&out);
    }
}

/// Prompt and buffer as one rendered region.
pub(crate) fn prompt_line(prompt: &str, buffer: &LineBuffer) -> LineBuffer {
    let mut chars: Vec<char> = prompt.chars().collect();
    let offset = chars.len();

    chars.extend_from_slice(buffer.chars());

    let mut line = LineBuffer::from_chars(chars);
    line.set_cursor(offset + buffer.cursor());
    line
}

/// Default action for keys that decode without a function binding.
fn builtin_for_key(key: &KeyEvent) -> Option<Builtin> {
    if matches!(key.code_points(), ['\u{7f}'] | ['\u{8}']) {
        return Some(Builtin::BackwardDeleteChar);
    }

    let keyed = Key::ALL
        .iter()
        .find(|k| k.code_points() == key.code_points())?;

    Some(match keyed {
        Key::Up => Builtin::PreviousHistory,
        Key::Down => Builtin::NextHistory,
        Key::Right => Builtin::ForwardChar,
        Key::Left => Builtin::BackwardChar,
        Key::Home => Builtin::BeginningOfLine,
        Key::End => Builtin::EndOfLine,
        Key::Delete => Builtin::DeleteChar,
    })
}
