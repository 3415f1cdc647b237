//! The binding table mapping byte sequences to editing functions or
//! pure keys.
//!
//! A keymap is built once, from the predefined keys plus an optional
//! inputrc-style source, and is read-only afterwards; the decoder
//! holds it behind a shared reference.

use crate::error::ReadlineError;
use crate::event::{Event, FunctionEvent, KeyEvent};
use crate::keys::{ControlCharacter, Key};

/// What a matched sequence resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingAction {
    /// Named editing function, emitted as a [`FunctionEvent`].
    Function(String),
    /// Pure key, emitted as a [`KeyEvent`] carrying the sequence.
    Key(Key),
}

#[derive(Debug, Clone)]
struct Binding {
    sequence: Vec<u8>,
    action: BindingAction,
}

/// Result of matching pending bytes against the table.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct SequenceMatch {
    /// Longest prefix of the input that is still a prefix of at least
    /// one binding.
    pub(crate) walked: usize,
    /// Length and event of the longest binding fully contained in the
    /// walked prefix, if any.
    pub(crate) complete: Option<(usize, Event)>,
    /// True if a binding strictly longer than the input starts with
    /// the whole input, i.e. more bytes could still extend the match.
    pub(crate) extendable: bool,
}

/// Immutable mapping from byte sequences to binding actions.
#[derive(Debug, Clone)]
pub struct Keymap {
    bindings: Vec<Binding>,
}

impl Default for Keymap {
    fn default() -> Self {
        let bindings = Key::ALL
            .iter()
            .map(|&key| Binding {
                sequence: key.sequence().to_vec(),
                action: BindingAction::Key(key),
            })
            .collect();

        Self { bindings }
    }
}

impl Keymap {
    /// Parse an inputrc-style source on top of the predefined keys.
    ///
    /// Each non-empty, non-comment line has the form
    /// `"<sequence>": <function-name>`. Inside the quoted sequence
    /// `\e` is escape, `\C-x` a control chord, and `\\`, `\"` the
    /// literal characters.
    ///
    /// ```
    /// use termline::keymap::Keymap;
    ///
    /// let keymap = Keymap::parse("\"ab\": foo\n\"\\e[A\": previous-history\n").unwrap();
    /// ```
    pub fn parse(source: &str) -> Result<Self, ReadlineError> {
        let mut keymap = Self::default();

        for (index, line) in source.lines().enumerate() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (sequence, name) =
                parse_binding_line(line).ok_or(ReadlineError::KeymapParse(index + 1))?;

            keymap.bind(sequence, BindingAction::Function(name));
        }

        Ok(keymap)
    }

    /// Add or replace a binding. Only used while building the table.
    pub fn bind(&mut self, sequence: Vec<u8>, action: BindingAction) {
        if let Some(existing) = self
            .bindings
            .iter_mut()
            .find(|binding| binding.sequence == sequence)
        {
            existing.action = action;
        } else {
            self.bindings.push(Binding { sequence, action });
        }
    }

    fn event_for(&self, binding: &Binding) -> Event {
        match &binding.action {
            BindingAction::Function(name) => Event::Function(FunctionEvent::new(name.clone())),
            BindingAction::Key(key) => Event::Key(KeyEvent::from(*key)),
        }
    }

    /// Walk `input` against the table byte by byte.
    pub(crate) fn match_sequence(&self, input: &[u8]) -> SequenceMatch {
        let mut walked = 0;
        let mut complete = None;

        for len in 1..=input.len() {
            let prefix = &input[0..len];

            if self
                .bindings
                .iter()
                .any(|binding| binding.sequence.starts_with(prefix))
            {
                walked = len;

                if let Some(binding) = self
                    .bindings
                    .iter()
                    .find(|binding| binding.sequence == prefix)
                {
                    complete = Some((len, self.event_for(binding)));
                }
            } else {
                break;
            }
        }

        let extendable = walked == input.len()
            && self
                .bindings
                .iter()
                .any(|binding| binding.sequence.len() > input.len() && binding.sequence.starts_with(input));

        SequenceMatch {
            walked,
            complete,
            extendable,
        }
    }
}

fn parse_binding_line(line: &str) -> Option<(Vec<u8>, String)> {
    let rest = line.strip_prefix('"')?;
    let mut sequence = Vec::new();
    let mut chars = rest.chars();

    loop {
        match chars.next()? {
            '"' => break,
            '\\' => match chars.next()? {
                'e' => sequence.push(0x1b),
                '\\' => sequence.push(b'\\'),
                '"' => sequence.push(b'"'),
                'C' => {
                    if chars.next()? != '-' {
                        return None;
                    }
                    let chord = ControlCharacter::from_chord(chars.next()?)?;
                    sequence.push(chord.into());
                }
                _ => return None,
            },
            c => {
                let mut buf = [0; 4];
                sequence.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
        }
    }

    let rest = chars.as_str().trim_start().strip_prefix(':')?;
    let name = rest.trim();

    if sequence.is_empty() || name.is_empty() {
        return None;
    }

    Some((sequence, name.to_string()))
}
