//! Pluggable parsers for typed argument slots.
//!
//! An [`ArgumentType`] consumes a prefix of the input and yields an
//! [`ArgValue`]. Built-ins cover bounded numerics, booleans, and three
//! string flavours; custom types implement the same trait and may attach
//! asynchronous suggestion generation.

use async_trait::async_trait;

use crate::context::CommandContext;
use crate::diagnostics::CommandError;
use crate::reader::StringReader;
use crate::suggest::{Suggestions, SuggestionsBuilder};

mod boolean;
mod numeric;
mod string;
mod value;

pub use boolean::BoolArgumentType;
pub use numeric::{DoubleArgumentType, FloatArgumentType, IntegerArgumentType, LongArgumentType};
pub use string::{StringArgumentType, StringKind};
pub use value::ArgValue;

/// A pluggable parser for one typed slot in the command grammar.
///
/// Contract: `parse` either consumes a prefix of the input and returns a
/// value, or fails with the reader restored to its pre-call position.
#[async_trait]
pub trait ArgumentType<S>: Send + Sync {
    /// Parses a value from the reader.
    fn parse(&self, reader: &mut StringReader) -> Result<ArgValue, CommandError>;

    /// Parses with access to the command source. Defaults to [`parse`].
    ///
    /// [`parse`]: ArgumentType::parse
    fn parse_with_source(
        &self,
        reader: &mut StringReader,
        _source: &S,
    ) -> Result<ArgValue, CommandError> {
        self.parse(reader)
    }

    /// Completion candidates for this type's domain. Defaults to none.
    async fn list_suggestions(
        &self,
        _context: &CommandContext<S>,
        _builder: SuggestionsBuilder,
    ) -> Result<Suggestions, CommandError>
    where
        S: Sync,
    {
        Ok(Suggestions::empty())
    }

    /// Example inputs, used by ambiguity detection. Defaults to none.
    fn examples(&self) -> Vec<String> {
        Vec::new()
    }
}

/// An unbounded integer argument.
pub fn integer() -> IntegerArgumentType {
    IntegerArgumentType::any()
}

/// An unbounded long argument.
pub fn long() -> LongArgumentType {
    LongArgumentType::any()
}

/// An unbounded float argument.
pub fn float() -> FloatArgumentType {
    FloatArgumentType::any()
}

/// An unbounded double argument.
pub fn double() -> DoubleArgumentType {
    DoubleArgumentType::any()
}

/// A `true`/`false` argument.
pub fn boolean() -> BoolArgumentType {
    BoolArgumentType
}

/// A single unquoted word.
pub fn word() -> StringArgumentType {
    StringArgumentType::word()
}

/// A quoted-or-unquoted phrase.
pub fn string() -> StringArgumentType {
    StringArgumentType::string()
}

/// Everything to the end of the input, taken verbatim.
pub fn greedy_string() -> StringArgumentType {
    StringArgumentType::greedy()
}
