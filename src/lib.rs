//! A tree-based command dispatcher for textual command interfaces.
//!
//! Commands are declared as a tree of literal keywords and typed argument
//! slots; the dispatcher parses input against that tree, binds arguments,
//! reports errors with positional context, produces completion
//! suggestions, and runs the matched handler, including redirection and
//! forking across nodes.
//!
//! ```rust
//! use edict::prelude::*;
//!
//! let mut dispatcher: CommandDispatcher<()> = CommandDispatcher::new();
//! dispatcher.register(
//!     literal("kick").then(
//!         argument("id", IntegerArgumentType::between(0, 100))
//!             .executes(|ctx| Ok(ctx.get_integer("id"))),
//!     ),
//! );
//! assert_eq!(dispatcher.execute_input("kick 5", ()).unwrap(), 5);
//! ```

pub use crate::diagnostics::{CommandError, ErrorContext};

pub mod args;
pub mod builder;
pub mod cli;
pub mod context;
pub mod diagnostics;
pub mod dispatcher;
pub mod reader;
pub mod repl;
pub mod suggest;
pub mod tree;

/// The common imports for building and driving a command tree.
pub mod prelude {
    pub use crate::args::{
        boolean, double, float, greedy_string, integer, long, string, word, ArgValue,
        ArgumentType, BoolArgumentType, DoubleArgumentType, FloatArgumentType,
        IntegerArgumentType, LongArgumentType, StringArgumentType,
    };
    pub use crate::builder::{argument, literal};
    pub use crate::context::{CommandContext, StringRange};
    pub use crate::diagnostics::{CommandError, ErrorContext};
    pub use crate::dispatcher::{CommandDispatcher, ParseResults};
    pub use crate::reader::StringReader;
    pub use crate::suggest::{Suggestion, SuggestionProvider, Suggestions, SuggestionsBuilder};
    pub use crate::tree::NodeId;
}
