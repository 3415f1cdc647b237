//! Line history, newest entry first.

use std::collections::VecDeque;

/// Accepted lines in most-recent-first order, optionally bounded.
#[derive(Debug)]
pub struct History {
    entries: VecDeque<String>,
    max_entries: Option<usize>,
}

impl History {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
            max_entries: None,
        }
    }

    /// History that keeps at most `max_entries` lines, dropping the
    /// oldest on overflow.
    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_entries: Some(max_entries),
        }
    }

    /// Add a line as the most recent entry.
    pub fn add(&mut self, line: String) {
        self.entries.push_front(line);

        if let Some(max) = self.max_entries {
            while self.entries.len() > max {
                self.entries.pop_back();
            }
        }
    }

    /// Replace the whole history, most recent line first. The
    /// capacity bound still applies.
    pub fn replace(&mut self, lines: impl IntoIterator<Item = String>) {
        self.entries.clear();
        self.entries.extend(lines);

        if let Some(max) = self.max_entries {
            self.entries.truncate(max);
        }
    }

    /// Entry by recency, `0` being the most recent.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_first() {
        let mut history = History::new();
        history.add("first".to_string());
        history.add("second".to_string());

        assert_eq!(history.get(0), Some("second"));
        assert_eq!(history.get(1), Some("first"));
        assert_eq!(history.get(2), None);
    }

    #[test]
    fn bounded_drops_oldest() {
        let mut history = History::with_capacity(2);
        history.add("a".to_string());
        history.add("b".to_string());
        history.add("c".to_string());

        assert_eq!(history.len(), 2);
        assert_eq!(history.get(0), Some("c"));
        assert_eq!(history.get(1), Some("b"));
    }

    #[test]
    fn replace_swaps_contents() {
        let mut history = History::with_capacity(2);
        history.add("old".to_string());

        history.replace(["a", "b", "c"].map(String::from));

        assert_eq!(history.len(), 2);
        assert_eq!(history.get(0), Some("a"));
        assert_eq!(history.get(1), Some("b"));
    }
}
