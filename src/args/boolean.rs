//! The `true`/`false` argument type.

use crate::args::{ArgValue, ArgumentType};
use crate::context::CommandContext;
use crate::diagnostics::CommandError;
use crate::reader::StringReader;
use crate::suggest::{Suggestions, SuggestionsBuilder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoolArgumentType;

#[async_trait::async_trait]
impl<S: Send + Sync> ArgumentType<S> for BoolArgumentType {
    fn parse(&self, reader: &mut StringReader) -> Result<ArgValue, CommandError> {
        Ok(ArgValue::Bool(reader.read_boolean()?))
    }

    async fn list_suggestions(
        &self,
        _context: &CommandContext<S>,
        mut builder: SuggestionsBuilder,
    ) -> Result<Suggestions, CommandError> {
        if "true".starts_with(builder.remaining_lowercase()) {
            builder.suggest("true");
        }
        if "false".starts_with(builder.remaining_lowercase()) {
            builder.suggest("false");
        }
        Ok(builder.build())
    }

    fn examples(&self) -> Vec<String> {
        vec!["true".to_string(), "false".to_string()]
    }
}
