//! Binary entry point: a demo console wired to a small command tree.

use std::process;

use clap::{Parser, Subcommand};
use futures::executor::block_on;

use crate::args::{greedy_string, integer, IntegerArgumentType};
use crate::builder::{argument, literal};
use crate::diagnostics::print_error;
use crate::dispatcher::CommandDispatcher;

/// The demo console's command source.
#[derive(Debug, Clone)]
pub struct ConsoleSource {
    pub name: String,
    pub admin: bool,
}

impl ConsoleSource {
    pub fn new(name: impl Into<String>, admin: bool) -> Self {
        Self {
            name: name.into(),
            admin,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "edict",
    version,
    about = "A tree-based command dispatcher, driven from a demo console."
)]
pub struct EdictArgs {
    #[command(subcommand)]
    pub command: ArgsCommand,

    /// Act with administrative rights.
    #[arg(long, global = true)]
    pub admin: bool,
}

#[derive(Debug, Subcommand)]
pub enum ArgsCommand {
    /// Dispatch a command line against the demo tree.
    Run {
        /// The command line to parse and execute.
        #[arg(required = true)]
        line: String,
    },
    /// Start an interactive shell.
    Repl,
    /// Show completion candidates for a partial input.
    Complete {
        /// The partial command line.
        input: String,
        /// Cursor position; defaults to the end of the input.
        #[arg(long)]
        cursor: Option<usize>,
    },
    /// List every executable path in the demo tree.
    Usage,
}

/// Builds the tree the demo console dispatches against.
pub fn demo_dispatcher() -> CommandDispatcher<ConsoleSource> {
    let mut dispatcher = CommandDispatcher::new();

    dispatcher.register(literal("say").then(
        argument("message", greedy_string())
            .executes(|ctx| Ok(ctx.get_string("message").len() as i32)),
    ));

    dispatcher.register(
        literal("add").then(
            argument("a", integer()).then(
                argument("b", integer())
                    .executes(|ctx| Ok(ctx.get_integer("a") + ctx.get_integer("b"))),
            ),
        ),
    );

    dispatcher.register(
        literal("kick")
            .requires(|source: &ConsoleSource| source.admin)
            .then(
                argument("id", IntegerArgumentType::between(0, 100))
                    .executes(|ctx| Ok(ctx.get_integer("id"))),
            ),
    );

    let root = dispatcher.root();
    dispatcher.register(literal("repeat").redirect(root));

    dispatcher
}

/// The main entry point for the CLI.
pub fn run() {
    let args = EdictArgs::parse();
    let dispatcher = demo_dispatcher();
    let source = ConsoleSource::new("console", args.admin);

    match args.command {
        ArgsCommand::Run { line } => match dispatcher.execute_input(line.as_str(), source) {
            Ok(result) => println!("{result}"),
            Err(error) => {
                print_error(error);
                process::exit(1);
            }
        },

        ArgsCommand::Repl => {
            crate::repl::Repl::new(dispatcher, source).run();
        }

        ArgsCommand::Complete { input, cursor } => {
            let parse = dispatcher.parse(input.as_str(), source);
            let suggestions = match cursor {
                Some(cursor) => {
                    block_on(dispatcher.get_completion_suggestions_at(&parse, cursor))
                }
                None => block_on(dispatcher.get_completion_suggestions(&parse)),
            };
            for suggestion in suggestions.list() {
                println!("{}", suggestion.text());
            }
        }

        ArgsCommand::Usage => {
            for usage in dispatcher.get_all_usage(dispatcher.root(), &source, true) {
                println!("{usage}");
            }
        }
    }
}
