//! String argument flavours: single word, quotable phrase, greedy rest.

use crate::args::{ArgValue, ArgumentType};
use crate::diagnostics::CommandError;
use crate::reader::StringReader;

/// Which shape of string this argument accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringKind {
    /// A single unquoted word.
    SingleWord,
    /// A quoted string, or a single word when unquoted.
    QuotablePhrase,
    /// Everything to the end of the input, taken verbatim.
    GreedyPhrase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringArgumentType {
    kind: StringKind,
}

impl StringArgumentType {
    pub fn word() -> Self {
        Self {
            kind: StringKind::SingleWord,
        }
    }

    pub fn string() -> Self {
        Self {
            kind: StringKind::QuotablePhrase,
        }
    }

    pub fn greedy() -> Self {
        Self {
            kind: StringKind::GreedyPhrase,
        }
    }

    pub fn kind(&self) -> StringKind {
        self.kind
    }

    /// Quotes and escapes `input` when it contains characters that cannot
    /// appear in an unquoted string; otherwise returns it unchanged.
    pub fn escape_if_required(input: &str) -> String {
        if input.chars().all(StringReader::is_allowed_in_unquoted_string) {
            input.to_string()
        } else {
            Self::escape(input)
        }
    }

    fn escape(input: &str) -> String {
        let mut result = String::with_capacity(input.len() + 2);
        result.push('"');
        for c in input.chars() {
            if c == '\\' || c == '"' {
                result.push('\\');
            }
            result.push(c);
        }
        result.push('"');
        result
    }
}

#[async_trait::async_trait]
impl<S: Send + Sync> ArgumentType<S> for StringArgumentType {
    fn parse(&self, reader: &mut StringReader) -> Result<ArgValue, CommandError> {
        let text = match self.kind {
            StringKind::GreedyPhrase => {
                let text = reader.remaining().to_string();
                reader.set_cursor(reader.total_length());
                text
            }
            StringKind::SingleWord => reader.read_unquoted_string(),
            StringKind::QuotablePhrase => reader.read_string()?,
        };
        Ok(ArgValue::String(text))
    }

    fn examples(&self) -> Vec<String> {
        let examples: &[&str] = match self.kind {
            StringKind::SingleWord => &["word", "words_with_underscores"],
            StringKind::QuotablePhrase => &["\"quoted phrase\"", "word", "\"\""],
            StringKind::GreedyPhrase => &["word", "words with spaces", "\"and symbols\""],
        };
        examples.iter().map(|s| s.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_if_required_leaves_plain_words() {
        assert_eq!(StringArgumentType::escape_if_required("hello"), "hello");
        assert_eq!(StringArgumentType::escape_if_required("a.b-c+d_e"), "a.b-c+d_e");
    }

    #[test]
    fn escape_if_required_quotes_and_escapes() {
        assert_eq!(
            StringArgumentType::escape_if_required("hello world"),
            "\"hello world\""
        );
        assert_eq!(
            StringArgumentType::escape_if_required("say \"hi\""),
            "\"say \\\"hi\\\"\""
        );
        assert_eq!(
            StringArgumentType::escape_if_required("back\\slash"),
            "\"back\\\\slash\""
        );
    }
}
