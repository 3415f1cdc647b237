//! Screen geometry and terminal capabilities.

/// Width and height of the terminal in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimension {
    pub width: usize,
    pub height: usize,
}

impl Dimension {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }
}

impl Default for Dimension {
    fn default() -> Self {
        Self {
            width: 80,
            height: 24,
        }
    }
}

/// Zero-based cell position, row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub row: usize,
    pub column: usize,
}

impl Position {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    /// Position of a character offset in text wrapped at `width`.
    pub fn from_offset(offset: usize, width: usize) -> Self {
        let width = width.max(1);

        Self {
            row: offset / width,
            column: offset % width,
        }
    }
}

/// Control sequences the renderer emits. The xterm set is what the
/// engine uses by default.
#[derive(Debug, Clone, Copy)]
pub struct Device {
    pub cursor_up: &'static str,
    pub erase_line_backward: &'static str,
    pub erase_below: &'static str,
    pub bell: &'static str,
}

impl Device {
    pub const fn xterm() -> Self {
        Self {
            cursor_up: "\x1b[1A",
            erase_line_backward: "\x1b[1K",
            erase_below: "\x1b[J",
            bell: "\x07",
        }
    }

    /// Move the cursor `n` cells to the right.
    pub fn cursor_forward(&self, out: &mut Vec<u8>, n: usize) {
        if n > 0 {
            out.extend_from_slice(format!("\x1b[{}C", n).as_bytes());
        }
    }
}

impl Default for Device {
    fn default() -> Self {
        Self::xterm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_wraps_at_width() {
        assert_eq!(Position::from_offset(0, 10), Position::new(0, 0));
        assert_eq!(Position::from_offset(9, 10), Position::new(0, 9));
        assert_eq!(Position::from_offset(10, 10), Position::new(1, 0));
        assert_eq!(Position::from_offset(25, 10), Position::new(2, 5));
    }

    #[test]
    fn zero_width_is_clamped() {
        assert_eq!(Position::from_offset(5, 0), Position::new(5, 0));
    }

    #[test]
    fn cursor_forward_zero_is_silent() {
        let device = Device::xterm();
        let mut out = Vec::new();

        device.cursor_forward(&mut out, 0);
        assert!(out.is_empty());

        device.cursor_forward(&mut out, 3);
        assert_eq!(out, b"\x1b[3C");
    }
}
