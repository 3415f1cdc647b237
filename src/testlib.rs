use std::collections::VecDeque;
use std::string::String;
use std::sync::Mutex;
use std::vec::Vec;

use crate::connection::{InputHandler, ResizeHandler, Task, TtyConnection};
use crate::terminal::{Dimension, Position};

/// Interprets engine output the way an xterm without autowrap would,
/// so tests can assert on visible screen content.
pub struct MockScreen {
    screen: Vec<Vec<char>>,
    pub cursor: Position,
    rows: usize,
    columns: usize,
    pub bell: bool,
    state: ParseState,
    pending_utf8: Vec<u8>,
}

enum ParseState {
    Normal,
    Escape,
    Csi(String),
}

impl MockScreen {
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            screen: vec![vec!['\0'; columns]; rows],
            cursor: Position::new(0, 0),
            rows,
            columns,
            bell: false,
            state: ParseState::Normal,
            pending_utf8: Vec::new(),
        }
    }

    pub fn render(rows: usize, columns: usize, output: &[u8]) -> Self {
        let mut screen = Self::new(rows, columns);
        screen.advance_all(output);
        screen
    }

    pub fn advance_all(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.advance(byte);
        }
    }

    pub fn screen_as_string(&self) -> String {
        self.screen
            .iter()
            .map(|v| v.iter().take_while(|&&c| c != '\0').collect::<String>())
            .collect::<Vec<String>>()
            .join("\n")
            .trim_end_matches('\n')
            .to_string()
    }

    fn advance(&mut self, byte: u8) {
        match &mut self.state {
            ParseState::Normal => match byte {
                0x1b => self.state = ParseState::Escape,
                b'\r' => self.cursor.column = 0,
                b'\n' => self.line_feed(),
                0x07 => self.bell = true,
                _ => {
                    self.pending_utf8.push(byte);
                    if let Ok(s) = core::str::from_utf8(&self.pending_utf8) {
                        if let Some(c) = s.chars().next() {
                            self.pending_utf8.clear();
                            self.print(c);
                        }
                    }
                }
            },
            ParseState::Escape => {
                if byte == b'[' {
                    self.state = ParseState::Csi(String::new());
                } else {
                    self.state = ParseState::Normal;
                }
            }
            ParseState::Csi(params) => {
                if byte.is_ascii_digit() {
                    params.push(byte as char);
                } else {
                    let n = params.parse::<usize>().unwrap_or(0);
                    self.state = ParseState::Normal;
                    self.csi(byte, n);
                }
            }
        }
    }

    fn print(&mut self, c: char) {
        if self.cursor.row < self.rows && self.cursor.column < self.columns {
            self.screen[self.cursor.row][self.cursor.column] = c;
        }
        self.cursor.column += 1;
    }

    // Line feed with output translation, as a cooked-mode terminal
    // applies it.
    fn line_feed(&mut self) {
        if self.cursor.row + 1 == self.rows {
            self.screen.remove(0);
            self.screen.push(vec!['\0'; self.columns]);
        } else {
            self.cursor.row += 1;
        }
        self.cursor.column = 0;
    }

    fn csi(&mut self, command: u8, n: usize) {
        match command {
            b'A' => self.cursor.row = self.cursor.row.saturating_sub(n.max(1)),
            b'C' => self.cursor.column += n.max(1),
            b'K' => {
                // Only the erase-backward form is emitted.
                assert_eq!(n, 1);
                for column in 0..=self.cursor.column.min(self.columns - 1) {
                    self.screen[self.cursor.row][column] = '\0';
                }
            }
            b'J' => {
                for row in self.cursor.row..self.rows {
                    let start = if row == self.cursor.row {
                        self.cursor.column
                    } else {
                        0
                    };
                    for column in start..self.columns {
                        self.screen[row][column] = '\0';
                    }
                }
            }
            _ => panic!("unexpected CSI {}", command as char),
        }
    }
}

/// In-memory connection capturing output and dispatching fed input to
/// the installed handler.
pub struct MockConn {
    output: Mutex<Vec<u8>>,
    size: Mutex<Dimension>,
    input_handler: Mutex<Option<InputHandler>>,
    resize_handler: Mutex<Option<ResizeHandler>>,
    tasks: Mutex<VecDeque<Task>>,
}

impl MockConn {
    pub fn new(size: Dimension) -> Self {
        Self {
            output: Mutex::new(Vec::new()),
            size: Mutex::new(size),
            input_handler: Mutex::new(None),
            resize_handler: Mutex::new(None),
            tasks: Mutex::new(VecDeque::new()),
        }
    }

    pub fn feed(&self, data: &[u8]) {
        let handler = self.input_handler.lock().unwrap().take();

        if let Some(handler) = handler {
            handler(data);
            let mut slot = self.input_handler.lock().unwrap();
            if slot.is_none() {
                *slot = Some(handler);
            }
        }
    }

    pub fn feed_str(&self, data: &str) {
        self.feed(data.as_bytes());
    }

    pub fn resize_to(&self, size: Dimension) {
        let handler = self.resize_handler.lock().unwrap().take();

        if let Some(handler) = handler {
            handler(size);
            let mut slot = self.resize_handler.lock().unwrap();
            if slot.is_none() {
                *slot = Some(handler);
            }
        }
    }

    pub fn run_tasks(&self) {
        loop {
            let task = self.tasks.lock().unwrap().pop_front();
            match task {
                Some(task) => task(),
                None => break,
            }
        }
    }

    pub fn output(&self) -> Vec<u8> {
        self.output.lock().unwrap().clone()
    }

    pub fn output_string(&self) -> String {
        String::from_utf8_lossy(&self.output()).into_owned()
    }

    pub fn take_output(&self) -> Vec<u8> {
        core::mem::take(&mut self.output.lock().unwrap())
    }

    pub fn screen(&self, rows: usize) -> MockScreen {
        let columns = self.size.lock().unwrap().width;
        MockScreen::render(rows, columns, &self.output())
    }
}

impl TtyConnection for MockConn {
    fn write_bytes(&self, bytes: &[u8]) {
        self.output.lock().unwrap().extend_from_slice(bytes);
    }

    fn size(&self) -> Dimension {
        *self.size.lock().unwrap()
    }

    fn schedule(&self, task: Task) {
        self.tasks.lock().unwrap().push_back(task);
    }

    fn set_input_handler(&self, handler: Option<InputHandler>) -> Option<InputHandler> {
        let mut slot = self.input_handler.lock().unwrap();
        core::mem::replace(&mut *slot, handler)
    }

    fn set_resize_handler(&self, handler: Option<ResizeHandler>) -> Option<ResizeHandler> {
        let mut slot = self.resize_handler.lock().unwrap();
        core::mem::replace(&mut *slot, handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_prints_and_wraps() {
        let screen = MockScreen::render(4, 4, b"abcd\n\ref");
        assert_eq!(screen.screen_as_string(), "abcd\nef");
    }

    #[test]
    fn screen_cursor_movement() {
        let mut screen = MockScreen::new(4, 10);
        screen.advance_all(b"hello\r\x1b[2CX");
        assert_eq!(screen.screen_as_string(), "heXlo");
    }

    #[test]
    fn screen_erase_below() {
        let mut screen = MockScreen::new(4, 4);
        screen.advance_all(b"abcd\n\refgh\x1b[1A\r\x1b[2C\x1b[J");
        assert_eq!(screen.screen_as_string(), "ab");
    }

    #[test]
    fn screen_erase_line_backward() {
        let mut screen = MockScreen::new(2, 10);
        screen.advance_all(b"hello\x1b[1K");
        assert_eq!(screen.screen_as_string(), "");
    }
}
