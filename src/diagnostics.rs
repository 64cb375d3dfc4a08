//! Unified error type for every failure mode of the dispatcher.
//!
//! All parse, tokenizer, bound-check and dispatch errors are represented by
//! [`CommandError`]. Each variant carries its structured payload plus an
//! [`ErrorContext`] locating the failure in the original input. During a
//! parse, errors are collected per branch rather than propagated; during
//! execution they surface through `Result`.

use std::sync::Arc;

use miette::Diagnostic;
use thiserror::Error;

use crate::reader::StringReader;

/// How many characters of leading input to show before the error marker.
pub const CONTEXT_AMOUNT: usize = 10;

/// Positional context for an error: the offending input and a cursor offset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorContext {
    /// The full input string being parsed, if known.
    pub input: Option<Arc<str>>,
    /// Byte offset into `input` where the failure occurred.
    pub cursor: Option<usize>,
}

impl ErrorContext {
    /// An empty context (no source, no position).
    pub fn none() -> Self {
        Self {
            input: None,
            cursor: None,
        }
    }

    /// Snapshot the reader's input and current cursor.
    pub fn at(reader: &StringReader) -> Self {
        Self {
            input: Some(reader.string_arc()),
            cursor: Some(reader.cursor()),
        }
    }

    /// Context at an explicit position within the given input.
    pub fn at_cursor(input: Arc<str>, cursor: usize) -> Self {
        Self {
            input: Some(input),
            cursor: Some(cursor),
        }
    }

    /// Renders the nearby input with a marker at the cursor position, e.g.
    /// `...ck abc<--[HERE]`. Returns `None` when no position is attached.
    pub fn snippet(&self) -> Option<String> {
        let input = self.input.as_deref()?;
        let cursor = self.cursor?.min(input.len());

        let mut out = String::new();
        let start = cursor.saturating_sub(CONTEXT_AMOUNT);
        if start > 0 {
            out.push_str("...");
        }
        out.push_str(&input[start..cursor]);
        out.push_str("<--[HERE]");
        Some(out)
    }
}

/// Every error the dispatcher can produce, with structured payloads.
///
/// The `Display` impl renders the bare message; [`CommandError::formatted`]
/// appends the positional snippet and is what the REPL and CLI print.
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum CommandError {
    #[error("expected an integer")]
    #[diagnostic(code(edict::reader::expected_int))]
    ReaderExpectedInt { ctx: ErrorContext },

    #[error("invalid integer '{value}'")]
    #[diagnostic(code(edict::reader::invalid_int))]
    ReaderInvalidInt { value: String, ctx: ErrorContext },

    #[error("expected a long")]
    #[diagnostic(code(edict::reader::expected_long))]
    ReaderExpectedLong { ctx: ErrorContext },

    #[error("invalid long '{value}'")]
    #[diagnostic(code(edict::reader::invalid_long))]
    ReaderInvalidLong { value: String, ctx: ErrorContext },

    #[error("expected a float")]
    #[diagnostic(code(edict::reader::expected_float))]
    ReaderExpectedFloat { ctx: ErrorContext },

    #[error("invalid float '{value}'")]
    #[diagnostic(code(edict::reader::invalid_float))]
    ReaderInvalidFloat { value: String, ctx: ErrorContext },

    #[error("expected a double")]
    #[diagnostic(code(edict::reader::expected_double))]
    ReaderExpectedDouble { ctx: ErrorContext },

    #[error("invalid double '{value}'")]
    #[diagnostic(code(edict::reader::invalid_double))]
    ReaderInvalidDouble { value: String, ctx: ErrorContext },

    #[error("expected a boolean, 'true' or 'false'")]
    #[diagnostic(code(edict::reader::expected_bool))]
    ReaderExpectedBool { ctx: ErrorContext },

    #[error("invalid boolean '{value}', expected 'true' or 'false'")]
    #[diagnostic(code(edict::reader::invalid_bool))]
    ReaderInvalidBool { value: String, ctx: ErrorContext },

    #[error("expected a quote to start a string")]
    #[diagnostic(code(edict::reader::expected_start_of_quote))]
    ReaderExpectedStartOfQuote { ctx: ErrorContext },

    #[error("unclosed quoted string")]
    #[diagnostic(code(edict::reader::expected_end_of_quote))]
    ReaderExpectedEndOfQuote { ctx: ErrorContext },

    #[error("invalid escape sequence '\\{character}' in quoted string")]
    #[diagnostic(code(edict::reader::invalid_escape))]
    ReaderInvalidEscape { character: char, ctx: ErrorContext },

    #[error("expected '{symbol}'")]
    #[diagnostic(code(edict::reader::expected_symbol))]
    ReaderExpectedSymbol { symbol: char, ctx: ErrorContext },

    #[error("integer {found} is below the minimum of {min}")]
    #[diagnostic(code(edict::range::integer_too_low))]
    IntegerTooLow {
        found: i32,
        min: i32,
        ctx: ErrorContext,
    },

    #[error("integer {found} exceeds the maximum of {max}")]
    #[diagnostic(code(edict::range::integer_too_high))]
    IntegerTooHigh {
        found: i32,
        max: i32,
        ctx: ErrorContext,
    },

    #[error("long {found} is below the minimum of {min}")]
    #[diagnostic(code(edict::range::long_too_low))]
    LongTooLow {
        found: i64,
        min: i64,
        ctx: ErrorContext,
    },

    #[error("long {found} exceeds the maximum of {max}")]
    #[diagnostic(code(edict::range::long_too_high))]
    LongTooHigh {
        found: i64,
        max: i64,
        ctx: ErrorContext,
    },

    #[error("float {found} is below the minimum of {min}")]
    #[diagnostic(code(edict::range::float_too_low))]
    FloatTooLow {
        found: f32,
        min: f32,
        ctx: ErrorContext,
    },

    #[error("float {found} exceeds the maximum of {max}")]
    #[diagnostic(code(edict::range::float_too_high))]
    FloatTooHigh {
        found: f32,
        max: f32,
        ctx: ErrorContext,
    },

    #[error("double {found} is below the minimum of {min}")]
    #[diagnostic(code(edict::range::double_too_low))]
    DoubleTooLow {
        found: f64,
        min: f64,
        ctx: ErrorContext,
    },

    #[error("double {found} exceeds the maximum of {max}")]
    #[diagnostic(code(edict::range::double_too_high))]
    DoubleTooHigh {
        found: f64,
        max: f64,
        ctx: ErrorContext,
    },

    #[error("expected literal '{expected}'")]
    #[diagnostic(code(edict::node::literal_incorrect))]
    LiteralIncorrect { expected: String, ctx: ErrorContext },

    #[error("unknown command")]
    #[diagnostic(code(edict::dispatcher::unknown_command))]
    DispatcherUnknownCommand { ctx: ErrorContext },

    #[error("incorrect argument for command")]
    #[diagnostic(code(edict::dispatcher::unknown_argument))]
    DispatcherUnknownArgument { ctx: ErrorContext },

    #[error("expected whitespace to end one argument, but found trailing data")]
    #[diagnostic(code(edict::dispatcher::expected_argument_separator))]
    DispatcherExpectedArgumentSeparator { ctx: ErrorContext },

    #[error("could not parse command: {message}")]
    #[diagnostic(code(edict::dispatcher::parse_exception))]
    DispatcherParseException { message: String, ctx: ErrorContext },
}

impl CommandError {
    pub fn reader_expected_int(reader: &StringReader) -> Self {
        Self::ReaderExpectedInt {
            ctx: ErrorContext::at(reader),
        }
    }

    pub fn reader_invalid_int(reader: &StringReader, value: impl Into<String>) -> Self {
        Self::ReaderInvalidInt {
            value: value.into(),
            ctx: ErrorContext::at(reader),
        }
    }

    pub fn reader_expected_long(reader: &StringReader) -> Self {
        Self::ReaderExpectedLong {
            ctx: ErrorContext::at(reader),
        }
    }

    pub fn reader_invalid_long(reader: &StringReader, value: impl Into<String>) -> Self {
        Self::ReaderInvalidLong {
            value: value.into(),
            ctx: ErrorContext::at(reader),
        }
    }

    pub fn reader_expected_float(reader: &StringReader) -> Self {
        Self::ReaderExpectedFloat {
            ctx: ErrorContext::at(reader),
        }
    }

    pub fn reader_invalid_float(reader: &StringReader, value: impl Into<String>) -> Self {
        Self::ReaderInvalidFloat {
            value: value.into(),
            ctx: ErrorContext::at(reader),
        }
    }

    pub fn reader_expected_double(reader: &StringReader) -> Self {
        Self::ReaderExpectedDouble {
            ctx: ErrorContext::at(reader),
        }
    }

    pub fn reader_invalid_double(reader: &StringReader, value: impl Into<String>) -> Self {
        Self::ReaderInvalidDouble {
            value: value.into(),
            ctx: ErrorContext::at(reader),
        }
    }

    pub fn reader_expected_bool(reader: &StringReader) -> Self {
        Self::ReaderExpectedBool {
            ctx: ErrorContext::at(reader),
        }
    }

    pub fn reader_invalid_bool(reader: &StringReader, value: impl Into<String>) -> Self {
        Self::ReaderInvalidBool {
            value: value.into(),
            ctx: ErrorContext::at(reader),
        }
    }

    pub fn reader_expected_start_of_quote(reader: &StringReader) -> Self {
        Self::ReaderExpectedStartOfQuote {
            ctx: ErrorContext::at(reader),
        }
    }

    pub fn reader_expected_end_of_quote(reader: &StringReader) -> Self {
        Self::ReaderExpectedEndOfQuote {
            ctx: ErrorContext::at(reader),
        }
    }

    pub fn reader_invalid_escape(reader: &StringReader, character: char) -> Self {
        Self::ReaderInvalidEscape {
            character,
            ctx: ErrorContext::at(reader),
        }
    }

    pub fn reader_expected_symbol(reader: &StringReader, symbol: char) -> Self {
        Self::ReaderExpectedSymbol {
            symbol,
            ctx: ErrorContext::at(reader),
        }
    }

    pub fn integer_too_low(reader: &StringReader, found: i32, min: i32) -> Self {
        Self::IntegerTooLow {
            found,
            min,
            ctx: ErrorContext::at(reader),
        }
    }

    pub fn integer_too_high(reader: &StringReader, found: i32, max: i32) -> Self {
        Self::IntegerTooHigh {
            found,
            max,
            ctx: ErrorContext::at(reader),
        }
    }

    pub fn long_too_low(reader: &StringReader, found: i64, min: i64) -> Self {
        Self::LongTooLow {
            found,
            min,
            ctx: ErrorContext::at(reader),
        }
    }

    pub fn long_too_high(reader: &StringReader, found: i64, max: i64) -> Self {
        Self::LongTooHigh {
            found,
            max,
            ctx: ErrorContext::at(reader),
        }
    }

    pub fn float_too_low(reader: &StringReader, found: f32, min: f32) -> Self {
        Self::FloatTooLow {
            found,
            min,
            ctx: ErrorContext::at(reader),
        }
    }

    pub fn float_too_high(reader: &StringReader, found: f32, max: f32) -> Self {
        Self::FloatTooHigh {
            found,
            max,
            ctx: ErrorContext::at(reader),
        }
    }

    pub fn double_too_low(reader: &StringReader, found: f64, min: f64) -> Self {
        Self::DoubleTooLow {
            found,
            min,
            ctx: ErrorContext::at(reader),
        }
    }

    pub fn double_too_high(reader: &StringReader, found: f64, max: f64) -> Self {
        Self::DoubleTooHigh {
            found,
            max,
            ctx: ErrorContext::at(reader),
        }
    }

    pub fn literal_incorrect(reader: &StringReader, expected: impl Into<String>) -> Self {
        Self::LiteralIncorrect {
            expected: expected.into(),
            ctx: ErrorContext::at(reader),
        }
    }

    pub fn unknown_command(reader: &StringReader) -> Self {
        Self::DispatcherUnknownCommand {
            ctx: ErrorContext::at(reader),
        }
    }

    pub fn unknown_argument(reader: &StringReader) -> Self {
        Self::DispatcherUnknownArgument {
            ctx: ErrorContext::at(reader),
        }
    }

    pub fn expected_argument_separator(reader: &StringReader) -> Self {
        Self::DispatcherExpectedArgumentSeparator {
            ctx: ErrorContext::at(reader),
        }
    }

    /// Wrapper for non-syntax failures raised inside custom argument types.
    pub fn parse_exception(reader: &StringReader, message: impl Into<String>) -> Self {
        Self::DispatcherParseException {
            message: message.into(),
            ctx: ErrorContext::at(reader),
        }
    }

    /// The positional context attached to this error.
    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::ReaderExpectedInt { ctx }
            | Self::ReaderInvalidInt { ctx, .. }
            | Self::ReaderExpectedLong { ctx }
            | Self::ReaderInvalidLong { ctx, .. }
            | Self::ReaderExpectedFloat { ctx }
            | Self::ReaderInvalidFloat { ctx, .. }
            | Self::ReaderExpectedDouble { ctx }
            | Self::ReaderInvalidDouble { ctx, .. }
            | Self::ReaderExpectedBool { ctx }
            | Self::ReaderInvalidBool { ctx, .. }
            | Self::ReaderExpectedStartOfQuote { ctx }
            | Self::ReaderExpectedEndOfQuote { ctx }
            | Self::ReaderInvalidEscape { ctx, .. }
            | Self::ReaderExpectedSymbol { ctx, .. }
            | Self::IntegerTooLow { ctx, .. }
            | Self::IntegerTooHigh { ctx, .. }
            | Self::LongTooLow { ctx, .. }
            | Self::LongTooHigh { ctx, .. }
            | Self::FloatTooLow { ctx, .. }
            | Self::FloatTooHigh { ctx, .. }
            | Self::DoubleTooLow { ctx, .. }
            | Self::DoubleTooHigh { ctx, .. }
            | Self::LiteralIncorrect { ctx, .. }
            | Self::DispatcherUnknownCommand { ctx }
            | Self::DispatcherUnknownArgument { ctx }
            | Self::DispatcherExpectedArgumentSeparator { ctx }
            | Self::DispatcherParseException { ctx, .. } => ctx,
        }
    }

    /// Byte offset of the failure in the input, if known.
    pub fn cursor(&self) -> Option<usize> {
        self.context().cursor
    }

    /// The input string the failure occurred in, if known.
    pub fn input(&self) -> Option<&str> {
        self.context().input.as_deref()
    }

    /// The message plus positional context, e.g.
    /// `expected an integer at position 5: kick <--[HERE]`.
    pub fn formatted(&self) -> String {
        match (self.cursor(), self.context().snippet()) {
            (Some(cursor), Some(snippet)) => {
                format!("{} at position {}: {}", self, cursor, snippet)
            }
            _ => self.to_string(),
        }
    }
}

/// Prints an error report to stderr the way the CLI and REPL surface it.
pub fn print_error(error: CommandError) {
    let report = miette::Report::new(error);
    eprintln!("{report:?}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_truncates_long_context() {
        let ctx = ErrorContext::at_cursor(Arc::from("this is a fairly long input"), 20);
        assert_eq!(ctx.snippet().unwrap(), "...fairly lon<--[HERE]");
    }

    #[test]
    fn snippet_short_context_has_no_ellipsis() {
        let ctx = ErrorContext::at_cursor(Arc::from("kick abc"), 5);
        assert_eq!(ctx.snippet().unwrap(), "kick <--[HERE]");
    }

    #[test]
    fn formatted_without_context_is_bare_message() {
        let err = CommandError::ReaderExpectedInt {
            ctx: ErrorContext::none(),
        };
        assert_eq!(err.formatted(), "expected an integer");
    }
}
