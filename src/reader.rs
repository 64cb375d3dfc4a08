//! Positional cursor over a command input string.
//!
//! A [`StringReader`] owns the input (shared via `Arc<str>`) and a byte
//! cursor. Every primitive tokenizer either advances the cursor past the
//! consumed prefix and returns a value, or fails with the cursor restored
//! to its pre-call position. Cloning a reader is cheap, so each candidate
//! branch of a parse receives an independent copy.

use std::sync::Arc;

use crate::diagnostics::CommandError;

const SYNTAX_ESCAPE: char = '\\';
const SYNTAX_DOUBLE_QUOTE: char = '"';
const SYNTAX_SINGLE_QUOTE: char = '\'';

#[derive(Debug, Clone)]
pub struct StringReader {
    string: Arc<str>,
    cursor: usize,
}

impl StringReader {
    pub fn new(string: impl Into<Arc<str>>) -> Self {
        Self {
            string: string.into(),
            cursor: 0,
        }
    }

    /// The full input string.
    pub fn string(&self) -> &str {
        &self.string
    }

    /// Shared handle to the full input, for contexts and error reporting.
    pub fn string_arc(&self) -> Arc<str> {
        Arc::clone(&self.string)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor;
    }

    pub fn total_length(&self) -> usize {
        self.string.len()
    }

    pub fn remaining_length(&self) -> usize {
        self.string.len() - self.cursor
    }

    /// Everything before the cursor.
    pub fn consumed(&self) -> &str {
        &self.string[..self.cursor]
    }

    /// Everything from the cursor onward.
    pub fn remaining(&self) -> &str {
        &self.string[self.cursor..]
    }

    /// True if at least `length` bytes remain.
    pub fn can_read_n(&self, length: usize) -> bool {
        self.cursor + length <= self.string.len()
    }

    pub fn can_read(&self) -> bool {
        self.can_read_n(1)
    }

    /// The next character, without advancing.
    pub fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    /// The character at the given byte offset past the cursor.
    pub fn peek_at(&self, offset: usize) -> Option<char> {
        self.string[self.cursor + offset..].chars().next()
    }

    /// Reads and returns the next character, advancing past it.
    pub fn read(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.cursor += c.len_utf8();
        Some(c)
    }

    /// Advances past the next character.
    pub fn skip(&mut self) {
        if let Some(c) = self.peek() {
            self.cursor += c.len_utf8();
        }
    }

    pub fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.skip();
        }
    }

    /// Characters permitted in a number body.
    pub fn is_allowed_number(c: char) -> bool {
        c.is_ascii_digit() || c == '.' || c == '-'
    }

    /// Whether `c` opens a quoted string.
    pub fn is_quoted_string_start(c: char) -> bool {
        c == SYNTAX_DOUBLE_QUOTE || c == SYNTAX_SINGLE_QUOTE
    }

    /// Characters permitted in an unquoted string.
    pub fn is_allowed_in_unquoted_string(c: char) -> bool {
        c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.' || c == '+'
    }

    fn read_number_body(&mut self) -> (usize, String) {
        let start = self.cursor;
        while matches!(self.peek(), Some(c) if Self::is_allowed_number(c)) {
            self.skip();
        }
        (start, self.string[start..self.cursor].to_string())
    }

    pub fn read_int(&mut self) -> Result<i32, CommandError> {
        let (start, number) = self.read_number_body();
        if number.is_empty() {
            return Err(CommandError::reader_expected_int(self));
        }
        number.parse().map_err(|_| {
            self.cursor = start;
            CommandError::reader_invalid_int(self, number)
        })
    }

    pub fn read_long(&mut self) -> Result<i64, CommandError> {
        let (start, number) = self.read_number_body();
        if number.is_empty() {
            return Err(CommandError::reader_expected_long(self));
        }
        number.parse().map_err(|_| {
            self.cursor = start;
            CommandError::reader_invalid_long(self, number)
        })
    }

    pub fn read_float(&mut self) -> Result<f32, CommandError> {
        let (start, number) = self.read_number_body();
        if number.is_empty() {
            return Err(CommandError::reader_expected_float(self));
        }
        number.parse().map_err(|_| {
            self.cursor = start;
            CommandError::reader_invalid_float(self, number)
        })
    }

    pub fn read_double(&mut self) -> Result<f64, CommandError> {
        let (start, number) = self.read_number_body();
        if number.is_empty() {
            return Err(CommandError::reader_expected_double(self));
        }
        number.parse().map_err(|_| {
            self.cursor = start;
            CommandError::reader_invalid_double(self, number)
        })
    }

    /// Reads the longest run of unquoted-string characters; may be empty.
    pub fn read_unquoted_string(&mut self) -> String {
        let start = self.cursor;
        while matches!(self.peek(), Some(c) if Self::is_allowed_in_unquoted_string(c)) {
            self.skip();
        }
        self.string[start..self.cursor].to_string()
    }

    /// Reads a quoted string; the opening quote determines the terminator.
    pub fn read_quoted_string(&mut self) -> Result<String, CommandError> {
        let Some(next) = self.peek() else {
            return Ok(String::new());
        };
        if !Self::is_quoted_string_start(next) {
            return Err(CommandError::reader_expected_start_of_quote(self));
        }
        self.skip();
        self.read_string_until(next)
    }

    /// Reads until the terminator. Backslash escapes only the terminator and
    /// backslash itself.
    pub fn read_string_until(&mut self, terminator: char) -> Result<String, CommandError> {
        let mut result = String::new();
        let mut escaped = false;
        while let Some(c) = self.read() {
            if escaped {
                if c == terminator || c == SYNTAX_ESCAPE {
                    result.push(c);
                    escaped = false;
                } else {
                    self.cursor -= c.len_utf8();
                    return Err(CommandError::reader_invalid_escape(self, c));
                }
            } else if c == SYNTAX_ESCAPE {
                escaped = true;
            } else if c == terminator {
                return Ok(result);
            } else {
                result.push(c);
            }
        }
        Err(CommandError::reader_expected_end_of_quote(self))
    }

    /// Reads a string in either quoted or unquoted form.
    pub fn read_string(&mut self) -> Result<String, CommandError> {
        match self.peek() {
            Some(next) if Self::is_quoted_string_start(next) => {
                self.skip();
                self.read_string_until(next)
            }
            Some(_) => Ok(self.read_unquoted_string()),
            None => Ok(String::new()),
        }
    }

    /// Reads exactly `true` or `false`.
    pub fn read_boolean(&mut self) -> Result<bool, CommandError> {
        let start = self.cursor;
        let value = self.read_string()?;
        if value.is_empty() {
            return Err(CommandError::reader_expected_bool(self));
        }
        match value.as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => {
                self.cursor = start;
                Err(CommandError::reader_invalid_bool(self, value))
            }
        }
    }

    /// Requires the next character to equal `c` and consumes it.
    pub fn expect(&mut self, c: char) -> Result<(), CommandError> {
        if self.peek() != Some(c) {
            return Err(CommandError::reader_expected_symbol(self, c));
        }
        self.skip();
        Ok(())
    }
}

impl From<&str> for StringReader {
    fn from(string: &str) -> Self {
        Self::new(string)
    }
}

impl From<String> for StringReader {
    fn from(string: String) -> Self {
        Self::new(string)
    }
}

impl From<Arc<str>> for StringReader {
    fn from(string: Arc<str>) -> Self {
        Self::new(string)
    }
}
