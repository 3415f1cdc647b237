//! Byte stream to event decoding.
//!
//! Raw terminal bytes are appended as they arrive and turned into
//! [`Event`]s on demand. A sequence that is still a strict prefix of a
//! longer binding is held back until more bytes arrive or the caller
//! forces a decision with [`EventDecoder::reduce`].

use std::collections::VecDeque;
use std::sync::Arc;

use crate::event::{Event, KeyEvent};
use crate::keymap::Keymap;
use crate::utf8;

const REPLACEMENT: char = '\u{fffd}';

/// Turns appended bytes into key and function events against a keymap.
pub struct EventDecoder {
    keymap: Arc<Keymap>,
    pending: Vec<u8>,
    queue: VecDeque<Event>,
}

impl EventDecoder {
    pub fn new(keymap: Arc<Keymap>) -> Self {
        Self {
            keymap,
            pending: Vec::new(),
            queue: VecDeque::new(),
        }
    }

    /// Buffer raw bytes. No events are produced until they are asked
    /// for, so a partially received escape sequence never decodes
    /// early.
    pub fn append(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
    }

    /// True if at least one event can be produced without forcing.
    pub fn has_next(&mut self) -> bool {
        if !self.queue.is_empty() {
            return true;
        }

        self.decode_step(false)
    }

    /// Next event, if one can be produced without forcing.
    pub fn next(&mut self) -> Option<Event> {
        if self.has_next() {
            self.queue.pop_front()
        } else {
            None
        }
    }

    /// Force pending bytes into events where an unambiguous reading
    /// exists, returning everything decoded so far.
    ///
    /// Bytes that match no complete binding yet but could still grow
    /// into one remain pending.
    pub fn reduce(&mut self) -> Vec<Event> {
        while self.decode_step(true) {}

        self.queue.drain(..).collect()
    }

    /// Perform at most one forced decode step and return the event it
    /// produced, or a previously queued one.
    pub fn reduce_once(&mut self) -> Option<Event> {
        if self.queue.is_empty() {
            self.decode_step(true);
        }

        self.queue.pop_front()
    }

    /// Drain everything, queued events first and then pending bytes as
    /// literal code points. Used when raw input bypasses the editor.
    pub fn drain_code_points(&mut self) -> Vec<char> {
        let mut out = Vec::new();

        for event in self.queue.drain(..) {
            out.extend(event.code_points());
        }

        let mut bytes = core::mem::take(&mut self.pending);

        while !bytes.is_empty() {
            match utf8::decode_first(&bytes) {
                Ok(Some((c, len))) => {
                    out.push(c);
                    bytes.drain(0..len);
                }
                Ok(None) => break,
                Err(()) => {
                    out.push(REPLACEMENT);
                    bytes.remove(0);
                }
            }
        }

        self.pending = bytes;
        out
    }

    /// Try to move one event from pending bytes to the queue. Returns
    /// true if an event was queued.
    fn decode_step(&mut self, forced: bool) -> bool {
        if self.pending.is_empty() {
            return false;
        }

        let matched = self.keymap.match_sequence(&self.pending);

        if matched.walked < self.pending.len() {
            // A later byte ruled out every longer binding, so the
            // front of the buffer is decided.
            return match matched.complete {
                Some((len, event)) => self.emit(event, len),
                None => self.emit_literal(),
            };
        }

        // Every pending byte is still on a path through the table.
        match matched.complete {
            Some((len, event)) if len == self.pending.len() && !matched.extendable => {
                self.emit(event, len)
            }
            Some((len, event)) if forced => self.emit(event, len),
            Some(_) => false,
            None if matched.walked == 0 => self.emit_literal(),
            None => false,
        }
    }

    fn emit(&mut self, event: Event, consumed: usize) -> bool {
        self.pending.drain(0..consumed);
        self.queue.push_back(event);
        true
    }

    /// Decode the front of the buffer as a literal code point.
    fn emit_literal(&mut self) -> bool {
        match utf8::decode_first(&self.pending) {
            Ok(Some((c, len))) => {
                self.pending.drain(0..len);
                self.queue.push_back(Event::Key(KeyEvent::from(c)));
                true
            }
            Ok(None) => false,
            Err(()) => {
                self.pending.remove(0);
                self.queue.push_back(Event::Key(KeyEvent::from(REPLACEMENT)));
                true
            }
        }
    }
}
