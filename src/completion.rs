//! The asynchronous completion protocol.
//!
//! A [`Completion`] is handed to the completion handler when the user
//! requests completion. The handler may run on any thread and at any
//! later time; the engine freezes event delivery until the handler
//! calls [`Completion::end`]. The protocol is a small state machine
//! driven by atomic compare-and-swap, so concurrent misuse fails with
//! an error instead of corrupting the line.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::connection::TtyConnection;
use crate::error::ReadlineError;
use crate::interaction::prompt_line;
use crate::line_buffer::LineBuffer;
use crate::quoting::{Quote, QuoteParser};
use crate::readline::Engine;
use crate::terminal::Dimension;

#[derive(Debug, Eq, PartialEq, Copy, Clone, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub(crate) enum CompletionStatus {
    /// Neither inline completion nor suggestions have started.
    Pending = 0,
    /// At least one block of suggestions has been written.
    Completing = 1,
    /// Text has been inlined into the buffer.
    Inlining = 2,
    Completed = 3,
}

/// Handle for answering one completion request.
pub struct Completion<C: TtyConnection> {
    engine: Arc<Engine<C>>,
    line: Vec<char>,
    prefix: QuoteParser,
    snapshot: LineBuffer,
    size: Dimension,
    status: AtomicU8,
}

impl<C: TtyConnection> Completion<C> {
    pub(crate) fn new(
        engine: Arc<Engine<C>>,
        line: Vec<char>,
        prefix: QuoteParser,
        snapshot: LineBuffer,
        size: Dimension,
    ) -> Self {
        Self {
            engine,
            line,
            prefix,
            snapshot,
            size,
            status: AtomicU8::new(CompletionStatus::Pending.into()),
        }
    }

    /// The whole logical line being edited, quoting resolved.
    pub fn line(&self) -> String {
        self.line.iter().collect()
    }

    /// The logical text of the word under completion, from the last
    /// space up to the cursor.
    pub fn prefix(&self) -> String {
        self.prefix.buffer().iter().collect()
    }

    /// Terminal size at the time completion was requested.
    pub fn size(&self) -> Dimension {
        self.size
    }

    fn status(&self) -> CompletionStatus {
        CompletionStatus::try_from(self.status.load(Ordering::SeqCst))
            .unwrap_or(CompletionStatus::Completed)
    }

    fn transition(&self, from: CompletionStatus, to: CompletionStatus) -> bool {
        self.status
            .compare_exchange(from.into(), to.into(), Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Insert `text` into the buffer at the cursor, escaped for the
    /// quoting context of the prefix. With `terminal` the completed
    /// word is closed off with its quote and a space.
    ///
    /// Only valid as the first and only answer; suggestions cannot
    /// follow.
    pub fn complete(&self, text: &str, terminal: bool) -> Result<(), ReadlineError> {
        if !self.transition(CompletionStatus::Pending, CompletionStatus::Inlining) {
            return Err(ReadlineError::IllegalState("completion already answered"));
        }

        if text.is_empty() && !terminal {
            return Ok(());
        }

        if text.chars().any(|c| (c as u32) < 32) {
            return Err(ReadlineError::Unsupported(
                "control characters in completion text",
            ));
        }

        let mut state = self.prefix.clone();
        let mut inserted: Vec<char> = Vec::new();

        let push = |state: &mut QuoteParser, inserted: &mut Vec<char>, c: char| {
            inserted.push(c);
            state.accept(c);
        };

        for c in text.chars() {
            match state.quote() {
                Quote::Weak => match c {
                    '\\' | '"' => {
                        if !state.escaped() {
                            push(&mut state, &mut inserted, '\\');
                        }
                        push(&mut state, &mut inserted, c);
                    }
                    _ => {
                        if !state.escaped() {
                            push(&mut state, &mut inserted, c);
                        }
                    }
                },
                Quote::Strong => {
                    if c == '\'' {
                        // Close, escape the quote, reopen.
                        push(&mut state, &mut inserted, '\'');
                        push(&mut state, &mut inserted, '\\');
                        push(&mut state, &mut inserted, c);
                        push(&mut state, &mut inserted, '\'');
                    } else {
                        push(&mut state, &mut inserted, c);
                    }
                }
                Quote::None => {
                    if state.escaped() {
                        push(&mut state, &mut inserted, c);
                    } else {
                        match c {
                            ' ' | '"' | '\'' | '\\' => {
                                push(&mut state, &mut inserted, '\\');
                                push(&mut state, &mut inserted, c);
                            }
                            _ => push(&mut state, &mut inserted, c),
                        }
                    }
                }
            }
        }

        if terminal {
            match state.quote() {
                Quote::Weak => {
                    if !state.escaped() {
                        push(&mut state, &mut inserted, '"');
                        push(&mut state, &mut inserted, ' ');
                    }
                }
                Quote::Strong => {
                    push(&mut state, &mut inserted, '\'');
                    push(&mut state, &mut inserted, ' ');
                }
                Quote::None => {
                    if !state.escaped() {
                        push(&mut state, &mut inserted, ' ');
                    }
                }
            }
        }

        let mut shared = self.engine.shared.lock().unwrap();

        let Some(interaction) = shared.interaction.as_mut() else {
            return Err(ReadlineError::IllegalState("no active line read"));
        };

        interaction.buffer.insert_chars(&inserted);

        let mut old = prompt_line(&interaction.prompt, &self.snapshot);
        let new = prompt_line(&interaction.prompt, &interaction.buffer);
        let mut out = Vec::new();
        old.update(&new, &mut out, self.size.width, &self.engine.device);

        drop(shared);
        self.engine.conn.write_bytes(&out);
        Ok(())
    }

    /// Write a block of suggestions below the edited line. May be
    /// called repeatedly; the first call moves off the edited line.
    pub fn suggest(&self, text: &str) -> Result<(), ReadlineError> {
        loop {
            let current = self.status();

            match current {
                CompletionStatus::Pending | CompletionStatus::Completing => {
                    if self.transition(current, CompletionStatus::Completing) {
                        if current == CompletionStatus::Pending {
                            self.engine.conn.write("\n");
                        }
                        self.engine.conn.write(text);
                        return Ok(());
                    }
                    // Raced with another caller, reevaluate.
                }
                _ => {
                    return Err(ReadlineError::IllegalState(
                        "completion already inlined or ended",
                    ))
                }
            }
        }
    }

    /// Finish the completion and resume event delivery. After
    /// suggestions, the prompt and buffer are redrawn below them.
    pub fn end(&self) -> Result<(), ReadlineError> {
        loop {
            let current = self.status();

            if current == CompletionStatus::Completed {
                return Err(ReadlineError::IllegalState("completion already ended"));
            }

            if !self.transition(current, CompletionStatus::Completed) {
                continue;
            }

            let mut shared = self.engine.shared.lock().unwrap();
            let mut redraw = None;

            if current == CompletionStatus::Completing {
                if let Some(interaction) = shared.interaction.as_mut() {
                    // Suggestions moved the cursor off the edited
                    // line; rewrite the prompt and buffer below them.
                    let prompt = if interaction.lines.is_empty()
                        && interaction.parsed.buffer().is_empty()
                    {
                        interaction.prompt.clone()
                    } else {
                        "> ".to_string()
                    };

                    let mut screen = LineBuffer::new();
                    let target = prompt_line(&prompt, &interaction.buffer);
                    let mut out = Vec::new();
                    screen.update(&target, &mut out, self.size.width, &self.engine.device);
                    redraw = Some(out);
                }
            }

            shared.completing = false;
            drop(shared);

            if let Some(out) = redraw {
                self.engine.conn.write_bytes(&out);
            }

            self.engine.schedule_pending();
            return Ok(());
        }
    }
}
