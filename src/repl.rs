//! Interactive shell over a dispatcher.
//!
//! Reads lines from stdin, dispatches them against the command tree, and
//! prints results or positional errors. Colon-commands control the shell
//! itself; everything else is handed to the dispatcher.

use std::io::{self, Write};

use futures::executor::block_on;

use crate::diagnostics::{print_error, CommandError};
use crate::dispatcher::CommandDispatcher;
use crate::suggest::Suggestions;
use crate::tree::NodeId;

/// Shell state that persists across evaluated lines.
pub struct Repl<S> {
    dispatcher: CommandDispatcher<S>,
    source: S,
}

enum ReplCommand {
    Continue,
    Quit,
}

impl<S: Clone + Send + Sync> Repl<S> {
    pub fn new(dispatcher: CommandDispatcher<S>, source: S) -> Self {
        Self { dispatcher, source }
    }

    /// Dispatches one line against the tree.
    pub fn eval_line(&mut self, input: &str) -> Result<i32, CommandError> {
        self.dispatcher.execute_input(input, self.source.clone())
    }

    /// Completion candidates for a partial input line.
    pub fn complete(&self, input: &str) -> Suggestions {
        let parse = self.dispatcher.parse(input, self.source.clone());
        block_on(self.dispatcher.get_completion_suggestions(&parse))
    }

    /// Main loop: prompt, read, dispatch, print.
    pub fn run(&mut self) {
        println!("edict shell");
        println!("Type :help for help, :quit to exit");
        println!();

        loop {
            print!("edict> ");
            let _ = io::stdout().flush();

            let mut line = String::new();
            match io::stdin().read_line(&mut line) {
                Ok(0) => {
                    println!("\nGoodbye!");
                    break;
                }
                Ok(_) => {
                    let line = line.trim_end_matches(['\r', '\n']);
                    if line.is_empty() {
                        continue;
                    }
                    if let Some(command) = line.strip_prefix(':') {
                        match self.handle_repl_command(command) {
                            ReplCommand::Continue => continue,
                            ReplCommand::Quit => break,
                        }
                    }
                    match self.eval_line(line) {
                        Ok(result) => println!("-> {result}"),
                        Err(error) => print_error(error),
                    }
                }
                Err(error) => {
                    eprintln!("Error reading input: {error}");
                    break;
                }
            }
        }
    }

    fn handle_repl_command(&mut self, command: &str) -> ReplCommand {
        let (name, rest) = match command.split_once(' ') {
            Some((name, rest)) => (name, rest),
            None => (command, ""),
        };
        match name {
            "help" | "h" => {
                println!("Shell commands:");
                println!("  :help, :h             Show this help");
                println!("  :quit, :q             Exit the shell");
                println!("  :usage                List every registered command");
                println!("  :complete <input>     Show completions for a partial line");
                println!();
                println!("Anything else is dispatched as a command.");
                ReplCommand::Continue
            }
            "quit" | "q" => {
                println!("Goodbye!");
                ReplCommand::Quit
            }
            "usage" => {
                for usage in self.usage_lines() {
                    println!("  {usage}");
                }
                ReplCommand::Continue
            }
            "complete" => {
                let suggestions = self.complete(rest);
                if suggestions.is_empty() {
                    println!("(no completions)");
                } else {
                    for suggestion in suggestions.list() {
                        println!("  {}", suggestion.apply(rest));
                    }
                }
                ReplCommand::Continue
            }
            _ => {
                println!("Unknown command: :{name}. Type :help for available commands.");
                ReplCommand::Continue
            }
        }
    }

    /// Smart usage for every top-level command, literals first, then by
    /// name.
    fn usage_lines(&self) -> Vec<String> {
        let tree = self.dispatcher.tree();
        let mut usages: Vec<(NodeId, String)> =
            self.dispatcher.get_smart_usage(self.dispatcher.root(), &self.source);
        usages.sort_by(|(a, _), (b, _)| tree.node(*a).sorted_key().cmp(&tree.node(*b).sorted_key()));
        usages.into_iter().map(|(_, usage)| usage).collect()
    }
}
