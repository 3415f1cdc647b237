//! Control characters and predefined named keys.

use num_enum::{IntoPrimitive, TryFromPrimitive};

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Eq, PartialEq, Copy, Clone, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum ControlCharacter {
    NUL = 0x0,
    CtrlA = 0x1,
    CtrlB = 0x2,
    CtrlC = 0x3,
    CtrlD = 0x4,
    CtrlE = 0x5,
    CtrlF = 0x6,
    CtrlG = 0x7,
    CtrlH = 0x8,
    Tab = 0x9,
    LineFeed = 0xA,
    CtrlK = 0xB,
    CtrlL = 0xC,
    CarriageReturn = 0xD,
    CtrlN = 0xE,
    CtrlO = 0xF,
    CtrlP = 0x10,
    CtrlQ = 0x11,
    CtrlR = 0x12,
    CtrlS = 0x13,
    CtrlT = 0x14,
    CtrlU = 0x15,
    CtrlV = 0x16,
    CtrlW = 0x17,
    CtrlX = 0x18,
    CtrlY = 0x19,
    CtrlZ = 0x1A,
    Escape = 0x1B,
    FS = 0x1C,
    GS = 0x1D,
    RS = 0x1E,
    US = 0x1F,
    Backspace = 0x7F,
}

impl ControlCharacter {
    /// Control character for a `\C-x` style chord, or None if the
    /// letter has no control counterpart.
    pub(crate) fn from_chord(letter: char) -> Option<Self> {
        let upper = letter.to_ascii_uppercase();
        if upper.is_ascii_uppercase() {
            Self::try_from(upper as u8 & 0x1f).ok()
        } else {
            None
        }
    }
}

/// Keys with predefined byte sequences, available in every keymap.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum Key {
    Up,
    Down,
    Right,
    Left,
    Home,
    End,
    Delete,
}

impl Key {
    pub const ALL: [Key; 7] = [
        Key::Up,
        Key::Down,
        Key::Right,
        Key::Left,
        Key::Home,
        Key::End,
        Key::Delete,
    ];

    /// The byte sequence sent by a terminal for this key.
    pub fn sequence(&self) -> &'static [u8] {
        match self {
            Key::Up => &[27, 91, 65],
            Key::Down => &[27, 91, 66],
            Key::Right => &[27, 91, 67],
            Key::Left => &[27, 91, 68],
            Key::Home => &[27, 91, 72],
            Key::End => &[27, 91, 70],
            Key::Delete => &[27, 91, 51, 126],
        }
    }

    /// The key's sequence as code points, as carried by the key event
    /// the decoder emits when this key is recognized.
    pub fn code_points(&self) -> Vec<char> {
        self.sequence().iter().map(|&b| b as char).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_character_round_trip() {
        assert_eq!(u8::from(ControlCharacter::Tab), 0x9);
        assert_eq!(
            ControlCharacter::try_from(0xD).unwrap(),
            ControlCharacter::CarriageReturn
        );
        assert!(ControlCharacter::try_from(0x41).is_err());
    }

    #[test]
    fn control_chord() {
        assert_eq!(
            ControlCharacter::from_chord('a'),
            Some(ControlCharacter::CtrlA)
        );
        assert_eq!(
            ControlCharacter::from_chord('M'),
            Some(ControlCharacter::CarriageReturn)
        );
        assert_eq!(ControlCharacter::from_chord('5'), None);
    }

    #[test]
    fn key_sequences_are_unique() {
        for (i, a) in Key::ALL.iter().enumerate() {
            for b in Key::ALL.iter().skip(i + 1) {
                assert_ne!(a.sequence(), b.sequence());
            }
        }
    }
}
