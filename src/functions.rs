//! Editing functions dispatched from decoded function events.
//!
//! A fixed set of builtins covers cursor movement, deletion and
//! history navigation. Anything else goes through the [`Function`]
//! trait, registered by name when the engine is built.

use std::any::Any;
use std::collections::HashMap;

use crate::history::History;
use crate::line_buffer::LineBuffer;

/// Editing state handed to a function while it runs.
pub struct FunctionContext<'a> {
    /// The visible line being edited.
    pub buffer: &'a mut LineBuffer,
    pub history: &'a History,
    /// Current history position, `-1` when not navigating.
    pub history_index: &'a mut isize,
    /// Scratch storage shared between function invocations.
    pub data: &'a mut HashMap<String, Box<dyn Any + Send>>,
}

/// A named editing function installed alongside the builtins.
pub trait Function: Send + Sync {
    fn apply(&self, ctx: &mut FunctionContext<'_>);
}

/// Functions the engine always knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    PreviousHistory,
    NextHistory,
    BackwardChar,
    ForwardChar,
    BeginningOfLine,
    EndOfLine,
    BackwardDeleteChar,
    DeleteChar,
}

impl Builtin {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "previous-history" => Some(Builtin::PreviousHistory),
            "next-history" => Some(Builtin::NextHistory),
            "backward-char" => Some(Builtin::BackwardChar),
            "forward-char" => Some(Builtin::ForwardChar),
            "beginning-of-line" => Some(Builtin::BeginningOfLine),
            "end-of-line" => Some(Builtin::EndOfLine),
            "backward-delete-char" => Some(Builtin::BackwardDeleteChar),
            "delete-char" => Some(Builtin::DeleteChar),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Builtin::PreviousHistory => "previous-history",
            Builtin::NextHistory => "next-history",
            Builtin::BackwardChar => "backward-char",
            Builtin::ForwardChar => "forward-char",
            Builtin::BeginningOfLine => "beginning-of-line",
            Builtin::EndOfLine => "end-of-line",
            Builtin::BackwardDeleteChar => "backward-delete-char",
            Builtin::DeleteChar => "delete-char",
        }
    }

    pub fn apply(&self, ctx: &mut FunctionContext<'_>) {
        match self {
            Builtin::PreviousHistory => {
                let next = *ctx.history_index + 1;
                if (next as usize) < ctx.history.len() {
                    *ctx.history_index = next;
                    let entry: Vec<char> = ctx
                        .history
                        .get(next as usize)
                        .unwrap_or_default()
                        .chars()
                        .collect();
                    ctx.buffer.replace_with(&entry);
                }
            }
            Builtin::NextHistory => {
                if *ctx.history_index > 0 {
                    *ctx.history_index -= 1;
                    let entry: Vec<char> = ctx
                        .history
                        .get(*ctx.history_index as usize)
                        .unwrap_or_default()
                        .chars()
                        .collect();
                    ctx.buffer.replace_with(&entry);
                } else if *ctx.history_index == 0 {
                    *ctx.history_index = -1;
                    ctx.buffer.clear();
                }
            }
            Builtin::BackwardChar => {
                ctx.buffer.move_left();
            }
            Builtin::ForwardChar => {
                ctx.buffer.move_right();
            }
            Builtin::BeginningOfLine => {
                ctx.buffer.set_cursor(0);
            }
            Builtin::EndOfLine => {
                let end = ctx.buffer.len();
                ctx.buffer.set_cursor(end);
            }
            Builtin::BackwardDeleteChar => {
                ctx.buffer.delete_before_cursor();
            }
            Builtin::DeleteChar => {
                ctx.buffer.delete_at_cursor();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        buffer: LineBuffer,
        history: History,
        history_index: isize,
        data: HashMap<String, Box<dyn Any + Send>>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                buffer: LineBuffer::new(),
                history: History::new(),
                history_index: -1,
                data: HashMap::new(),
            }
        }

        fn apply(&mut self, builtin: Builtin) {
            builtin.apply(&mut FunctionContext {
                buffer: &mut self.buffer,
                history: &self.history,
                history_index: &mut self.history_index,
                data: &mut self.data,
            });
        }
    }

    #[test]
    fn names_round_trip() {
        for builtin in [
            Builtin::PreviousHistory,
            Builtin::NextHistory,
            Builtin::BackwardChar,
            Builtin::ForwardChar,
            Builtin::BeginningOfLine,
            Builtin::EndOfLine,
            Builtin::BackwardDeleteChar,
            Builtin::DeleteChar,
        ] {
            assert_eq!(Builtin::from_name(builtin.name()), Some(builtin));
        }
        assert_eq!(Builtin::from_name("no-such-function"), None);
    }

    #[test]
    fn cursor_and_deletion() {
        let mut fx = Fixture::new();
        fx.buffer.insert_str("hello");

        fx.apply(Builtin::BeginningOfLine);
        assert_eq!(fx.buffer.cursor(), 0);

        fx.apply(Builtin::ForwardChar);
        assert_eq!(fx.buffer.cursor(), 1);

        fx.apply(Builtin::DeleteChar);
        assert_eq!(fx.buffer.as_string(), "hllo");

        fx.apply(Builtin::BackwardDeleteChar);
        assert_eq!(fx.buffer.as_string(), "llo");

        fx.apply(Builtin::EndOfLine);
        assert_eq!(fx.buffer.cursor(), 3);

        fx.apply(Builtin::BackwardChar);
        assert_eq!(fx.buffer.cursor(), 2);
    }

    #[test]
    fn history_navigation() {
        let mut fx = Fixture::new();
        fx.history.add("older".to_string());
        fx.history.add("newer".to_string());

        fx.apply(Builtin::PreviousHistory);
        assert_eq!(fx.buffer.as_string(), "newer");
        assert_eq!(fx.history_index, 0);

        fx.apply(Builtin::PreviousHistory);
        assert_eq!(fx.buffer.as_string(), "older");
        assert_eq!(fx.history_index, 1);

        // Already at the oldest entry.
        fx.apply(Builtin::PreviousHistory);
        assert_eq!(fx.buffer.as_string(), "older");
        assert_eq!(fx.history_index, 1);

        fx.apply(Builtin::NextHistory);
        assert_eq!(fx.buffer.as_string(), "newer");
        assert_eq!(fx.history_index, 0);

        fx.apply(Builtin::NextHistory);
        assert_eq!(fx.buffer.as_string(), "");
        assert_eq!(fx.history_index, -1);

        fx.apply(Builtin::NextHistory);
        assert_eq!(fx.history_index, -1);
    }
}
