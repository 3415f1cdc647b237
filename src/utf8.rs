//! Incremental UTF-8 decoding for the sequence decoder.

enum Utf8ByteType {
    SingleByte,
    StartTwoByte,
    StartThreeByte,
    StartFourByte,
    Continuation,
    Invalid,
}

trait Utf8Byte {
    fn utf8_byte_type(&self) -> Utf8ByteType;
    fn utf8_is_continuation(&self) -> bool;
}

impl Utf8Byte for u8 {
    fn utf8_byte_type(&self) -> Utf8ByteType {
        let byte = *self;

        if byte & 0b10000000 == 0 {
            Utf8ByteType::SingleByte
        } else if byte & 0b11000000 == 0b10000000 {
            Utf8ByteType::Continuation
        } else if byte & 0b11100000 == 0b11000000 {
            Utf8ByteType::StartTwoByte
        } else if byte & 0b11110000 == 0b11100000 {
            Utf8ByteType::StartThreeByte
        } else if byte & 0b11111000 == 0b11110000 {
            Utf8ByteType::StartFourByte
        } else {
            Utf8ByteType::Invalid
        }
    }

    fn utf8_is_continuation(&self) -> bool {
        matches!(self.utf8_byte_type(), Utf8ByteType::Continuation)
    }
}

#[derive(Debug, Eq, PartialEq)]
pub(crate) enum Utf8DecoderStatus {
    Continuation,
    Done(char),
    Error,
}

/// Streaming decoder for a single UTF-8 code point.
#[derive(Debug, Eq, PartialEq)]
pub(crate) struct Utf8Decoder {
    remaining: usize,
    buf: [u8; 4],
    pos: usize,
}

impl Utf8Decoder {
    pub(crate) fn new() -> Self {
        Self {
            remaining: 0,
            buf: [0; 4],
            pos: 0,
        }
    }

    fn to_char(&self) -> Utf8DecoderStatus {
        match core::str::from_utf8(&self.buf[0..self.pos]) {
            Ok(s) => match s.chars().next() {
                Some(c) => Utf8DecoderStatus::Done(c),
                None => Utf8DecoderStatus::Error,
            },
            Err(_) => Utf8DecoderStatus::Error,
        }
    }

    pub(crate) fn advance(&mut self, byte: u8) -> Utf8DecoderStatus {
        if self.pos == 0 {
            self.buf[0] = byte;
            self.pos = 1;

            match byte.utf8_byte_type() {
                Utf8ByteType::SingleByte => self.to_char(),
                Utf8ByteType::StartTwoByte => {
                    self.remaining = 1;
                    Utf8DecoderStatus::Continuation
                }
                Utf8ByteType::StartThreeByte => {
                    self.remaining = 2;
                    Utf8DecoderStatus::Continuation
                }
                Utf8ByteType::StartFourByte => {
                    self.remaining = 3;
                    Utf8DecoderStatus::Continuation
                }
                Utf8ByteType::Continuation | Utf8ByteType::Invalid => Utf8DecoderStatus::Error,
            }
        } else if byte.utf8_is_continuation() {
            self.buf[self.pos] = byte;
            self.pos += 1;
            self.remaining -= 1;

            if self.remaining == 0 {
                self.to_char()
            } else {
                Utf8DecoderStatus::Continuation
            }
        } else {
            Utf8DecoderStatus::Error
        }
    }
}

/// Decode the first code point of `bytes`.
///
/// Returns the code point and its encoded length, `Ok(None)` if the
/// slice ends inside a multi-byte sequence, or `Err(())` on invalid
/// input.
pub(crate) fn decode_first(bytes: &[u8]) -> Result<Option<(char, usize)>, ()> {
    let mut decoder = Utf8Decoder::new();

    for (i, &byte) in bytes.iter().enumerate() {
        match decoder.advance(byte) {
            Utf8DecoderStatus::Continuation => (),
            Utf8DecoderStatus::Done(c) => return Ok(Some((c, i + 1))),
            Utf8DecoderStatus::Error => return Err(()),
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii() {
        let mut decoder = Utf8Decoder::new();

        assert_eq!(decoder.advance(b'a'), Utf8DecoderStatus::Done('a'));
    }

    #[test]
    fn twobyte() {
        let mut decoder = Utf8Decoder::new();
        let bytes = "æ".as_bytes();

        assert_eq!(decoder.advance(bytes[0]), Utf8DecoderStatus::Continuation);
        assert_eq!(decoder.advance(bytes[1]), Utf8DecoderStatus::Done('æ'));
    }

    #[test]
    fn threebyte() {
        let mut decoder = Utf8Decoder::new();
        let bytes = "€".as_bytes();

        assert_eq!(decoder.advance(bytes[0]), Utf8DecoderStatus::Continuation);
        assert_eq!(decoder.advance(bytes[1]), Utf8DecoderStatus::Continuation);
        assert_eq!(decoder.advance(bytes[2]), Utf8DecoderStatus::Done('€'));
    }

    #[test]
    fn fourbyte() {
        let mut decoder = Utf8Decoder::new();
        let bytes = "😂".as_bytes();

        assert_eq!(decoder.advance(bytes[0]), Utf8DecoderStatus::Continuation);
        assert_eq!(decoder.advance(bytes[1]), Utf8DecoderStatus::Continuation);
        assert_eq!(decoder.advance(bytes[2]), Utf8DecoderStatus::Continuation);
        assert_eq!(decoder.advance(bytes[3]), Utf8DecoderStatus::Done('😂'));
    }

    #[test]
    fn invalid_start() {
        let mut decoder = Utf8Decoder::new();

        assert_eq!(decoder.advance(0b10000000), Utf8DecoderStatus::Error);
    }

    #[test]
    fn invalid_continuation() {
        let mut decoder = Utf8Decoder::new();

        assert_eq!(decoder.advance(0b11000000), Utf8DecoderStatus::Continuation);
        assert_eq!(decoder.advance(0b00000000), Utf8DecoderStatus::Error);
    }

    #[test]
    fn first_of_slice() {
        assert_eq!(decode_first("abc".as_bytes()), Ok(Some(('a', 1))));
        assert_eq!(decode_first("æx".as_bytes()), Ok(Some(('æ', 2))));
        assert_eq!(decode_first(&"æ".as_bytes()[0..1]), Ok(None));
        assert_eq!(decode_first(&[]), Ok(None));
        assert_eq!(decode_first(&[0b10000000]), Err(()));
    }
}
