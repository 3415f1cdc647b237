//! The visible line and its diff-based rendering.
//!
//! A [`LineBuffer`] holds code points and a cursor. Rendering works by
//! diffing the current buffer against a target buffer and emitting the
//! minimal cursor movement and rewrites, wrapping explicitly at the
//! terminal width. All positions are relative to the start of the
//! rendered region, so the renderer never needs the absolute screen
//! position.

use crate::terminal::{Device, Position};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineBuffer {
    chars: Vec<char>,
    cursor: usize,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self {
            chars: Vec::new(),
            cursor: 0,
        }
    }

    pub fn from_chars(chars: Vec<char>) -> Self {
        let cursor = chars.len();
        Self { chars, cursor }
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn as_string(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor.min(self.chars.len());
    }

    pub fn insert(&mut self, c: char) {
        self.chars.insert(self.cursor, c);
        self.cursor += 1;
    }

    pub fn insert_chars(&mut self, chars: &[char]) {
        for &c in chars {
            self.insert(c);
        }
    }

    pub fn insert_str(&mut self, s: &str) {
        for c in s.chars() {
            self.insert(c);
        }
    }

    /// Remove the character before the cursor. Returns false at the
    /// start of the buffer.
    pub fn delete_before_cursor(&mut self) -> bool {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.chars.remove(self.cursor);
            true
        } else {
            false
        }
    }

    /// Remove the character under the cursor. Returns false at the end
    /// of the buffer.
    pub fn delete_at_cursor(&mut self) -> bool {
        if self.cursor < self.chars.len() {
            self.chars.remove(self.cursor);
            true
        } else {
            false
        }
    }

    pub fn move_left(&mut self) -> bool {
        if self.cursor > 0 {
            self.cursor -= 1;
            true
        } else {
            false
        }
    }

    pub fn move_right(&mut self) -> bool {
        if self.cursor < self.chars.len() {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) {
        self.chars.clear();
        self.cursor = 0;
    }

    pub fn replace_with(&mut self, chars: &[char]) {
        self.chars.clear();
        self.chars.extend_from_slice(chars);
        self.cursor = self.chars.len();
    }

    /// Position of the cursor in text wrapped at `width`.
    pub fn cursor_position(&self, width: usize) -> Position {
        Position::from_offset(self.cursor, width)
    }

    /// Emit the terminal output that transforms the on-screen text
    /// from `self` to `target`, then become `target`.
    ///
    /// Row wraps are written explicitly as `\n\r`, so a buffer ending
    /// exactly at a width multiple leaves the cursor at the start of
    /// the next row.
    pub fn update(&mut self, target: &LineBuffer, out: &mut Vec<u8>, width: usize, device: &Device) {
        let width = width.max(1);

        let shared = self
            .chars
            .iter()
            .zip(target.chars.iter())
            .take_while(|(a, b)| a == b)
            .count();

        move_cursor(
            out,
            Position::from_offset(self.cursor, width),
            Position::from_offset(shared, width),
            device,
        );

        let mut utf8 = [0; 4];
        for (i, c) in target.chars[shared..].iter().enumerate() {
            out.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());

            if (shared + i + 1) % width == 0 {
                out.extend_from_slice(b"\n\r");
            }
        }

        if self.chars.len() > target.chars.len() {
            out.extend_from_slice(device.erase_below.as_bytes());
        }

        move_cursor(
            out,
            Position::from_offset(target.chars.len(), width),
            Position::from_offset(target.cursor, width),
            device,
        );

        *self = target.clone();
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for LineBuffer {
    fn from(s: &str) -> Self {
        Self::from_chars(s.chars().collect())
    }
}

// Cursor-up preserves the column; a line feed returns it to zero.
fn move_cursor(out: &mut Vec<u8>, from: Position, to: Position, device: &Device) {
    let mut column = from.column;

    for _ in to.row..from.row {
        out.extend_from_slice(device.cursor_up.as_bytes());
    }

    if from.row < to.row {
        for _ in from.row..to.row {
            out.push(b'\n');
        }
        column = 0;
    }

    if column != to.column {
        out.push(b'\r');
        device.cursor_forward(out, to.column);
    }
}
