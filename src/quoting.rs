//! Quoting state for multi-line input.
//!
//! The enter handler feeds the visible buffer through a [`QuoteParser`]
//! to decide whether a line is complete or needs a continuation
//! prompt, and completion uses the state to escape inserted text.

/// Quoting context at a point in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quote {
    /// Outside any quotes.
    None,
    /// Inside double quotes, where backslash still escapes.
    Weak,
    /// Inside single quotes, where every character is literal.
    Strong,
}

/// Incremental parser tracking quote and escape state while
/// accumulating the logical (unquoted) text.
#[derive(Debug, Clone)]
pub struct QuoteParser {
    quote: Quote,
    escaped: bool,
    buffer: Vec<char>,
}

impl QuoteParser {
    pub fn new() -> Self {
        Self {
            quote: Quote::None,
            escaped: false,
            buffer: Vec::new(),
        }
    }

    pub fn quote(&self) -> Quote {
        self.quote
    }

    pub fn escaped(&self) -> bool {
        self.escaped
    }

    /// Logical text accumulated so far, with quoting resolved.
    pub fn buffer(&self) -> &[char] {
        &self.buffer
    }

    pub fn take_buffer(&mut self) -> Vec<char> {
        core::mem::take(&mut self.buffer)
    }

    /// True when no quote or escape is left open.
    pub fn is_complete(&self) -> bool {
        self.quote == Quote::None && !self.escaped
    }

    pub fn accept(&mut self, c: char) {
        match self.quote {
            Quote::None => {
                if self.escaped {
                    self.buffer.push(c);
                    self.escaped = false;
                } else {
                    match c {
                        '\\' => self.escaped = true,
                        '\'' => self.quote = Quote::Strong,
                        '"' => self.quote = Quote::Weak,
                        _ => self.buffer.push(c),
                    }
                }
            }
            Quote::Strong => {
                if c == '\'' {
                    self.quote = Quote::None;
                } else {
                    self.buffer.push(c);
                }
            }
            Quote::Weak => {
                if self.escaped {
                    match c {
                        '\\' | '"' => self.buffer.push(c),
                        _ => {
                            self.buffer.push('\\');
                            self.buffer.push(c);
                        }
                    }
                    self.escaped = false;
                } else {
                    match c {
                        '\\' => self.escaped = true,
                        '"' => self.quote = Quote::None,
                        _ => self.buffer.push(c),
                    }
                }
            }
        }
    }

    pub fn accept_all(&mut self, chars: impl IntoIterator<Item = char>) {
        for c in chars {
            self.accept(c);
        }
    }
}

impl Default for QuoteParser {
    fn default() -> Self {
        Self::new()
    }
}
