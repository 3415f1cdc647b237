//! Events produced by the sequence decoder.

use crate::keys::Key;

/// A decoded key: one or more code points to be handled literally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    code_points: Vec<char>,
}

impl KeyEvent {
    pub fn new(code_points: Vec<char>) -> Self {
        Self { code_points }
    }

    pub fn code_points(&self) -> &[char] {
        &self.code_points
    }

    pub fn len(&self) -> usize {
        self.code_points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code_points.is_empty()
    }

    pub fn get_at(&self, index: usize) -> Option<char> {
        self.code_points.get(index).copied()
    }
}

impl From<char> for KeyEvent {
    fn from(c: char) -> Self {
        Self::new(vec![c])
    }
}

impl From<Key> for KeyEvent {
    fn from(key: Key) -> Self {
        Self::new(key.code_points())
    }
}

/// A decoded binding naming an editing function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionEvent {
    name: String,
}

impl FunctionEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Tagged event variant; immutable once produced by the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    Function(FunctionEvent),
}

impl Event {
    pub(crate) fn code_points(&self) -> Vec<char> {
        match self {
            Event::Key(key) => key.code_points().to_vec(),
            Event::Function(_) => Vec::new(),
        }
    }
}
