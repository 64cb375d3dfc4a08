//! Flattening and running a chain of redirected contexts.

use crate::context::CommandContext;
use crate::diagnostics::CommandError;
use crate::tree::ResultConsumer;

/// A redirection chain split into its modifier contexts and the single
/// executable tail.
pub struct ContextChain<S> {
    modifiers: Vec<CommandContext<S>>,
    executable: CommandContext<S>,
}

/// Which kind of work the front of the chain performs next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Modify,
    Execute,
}

impl<S: Clone> ContextChain<S> {
    /// Splits `root`'s child chain into modifiers plus an executable.
    /// Returns `None` when the tail has no handler to run.
    pub fn try_flatten(root: CommandContext<S>) -> Option<ContextChain<S>> {
        let mut modifiers = Vec::new();
        let mut current = root;

        while let Some(child) = current.child() {
            let child = child.clone();
            modifiers.push(current);
            current = child;
        }

        if current.command().is_none() {
            return None;
        }

        Some(ContextChain {
            modifiers,
            executable: current,
        })
    }

    /// Routes one source through a modifier context. Without a modifier the
    /// source passes through unchanged. A syntax error notifies the consumer
    /// and, in forked mode, drops the source instead of propagating.
    pub fn run_modifier(
        modifier: &CommandContext<S>,
        source: S,
        consumer: &ResultConsumer<S>,
        forked: bool,
    ) -> Result<Vec<S>, CommandError> {
        let Some(source_modifier) = modifier.redirect_modifier().cloned() else {
            return Ok(vec![source]);
        };

        let context = modifier.copy_for(source);
        match source_modifier.as_ref()(&context) {
            Ok(sources) => Ok(sources),
            Err(error) => {
                consumer.as_ref()(&context, false, 0);
                if forked {
                    Ok(Vec::new())
                } else {
                    Err(error)
                }
            }
        }
    }

    /// Runs the executable tail for one source. In forked mode a success
    /// counts as 1 and a syntax error counts as 0; otherwise the handler's
    /// result is returned and errors propagate.
    pub fn run_executable(
        executable: &CommandContext<S>,
        source: S,
        consumer: &ResultConsumer<S>,
        forked: bool,
    ) -> Result<i32, CommandError> {
        let context = executable.copy_for(source);
        let Some(command) = context.command().cloned() else {
            return Ok(0);
        };

        match command.as_ref()(&context) {
            Ok(result) => {
                consumer.as_ref()(&context, true, result);
                Ok(if forked { 1 } else { result })
            }
            Err(error) => {
                consumer.as_ref()(&context, false, 0);
                if forked {
                    Ok(0)
                } else {
                    Err(error)
                }
            }
        }
    }

    /// Applies every modifier in order, fanning the source set out, then
    /// runs the executable for each resulting source.
    pub fn execute_all(&self, source: S, consumer: &ResultConsumer<S>) -> Result<i32, CommandError> {
        if self.modifiers.is_empty() {
            return Self::run_executable(&self.executable, source, consumer, false);
        }

        let mut forked = false;
        let mut current_sources = vec![source];

        for modifier in &self.modifiers {
            forked |= modifier.is_forked();

            let mut next_sources = Vec::new();
            for source_to_run in current_sources {
                next_sources.extend(Self::run_modifier(modifier, source_to_run, consumer, forked)?);
            }
            if next_sources.is_empty() {
                return Ok(0);
            }
            current_sources = next_sources;
        }

        let mut result = 0;
        for execution_source in current_sources {
            result += Self::run_executable(&self.executable, execution_source, consumer, forked)?;
        }
        Ok(result)
    }

    pub fn stage(&self) -> Stage {
        if self.modifiers.is_empty() {
            Stage::Execute
        } else {
            Stage::Modify
        }
    }

    /// The context the next call to the chain would act on.
    pub fn top_context(&self) -> &CommandContext<S> {
        self.modifiers.first().unwrap_or(&self.executable)
    }

    /// The chain with its first modifier peeled off, or `None` when only
    /// the executable remains.
    pub fn next_stage(&self) -> Option<ContextChain<S>> {
        if self.modifiers.is_empty() {
            return None;
        }
        Some(ContextChain {
            modifiers: self.modifiers[1..].to_vec(),
            executable: self.executable.clone(),
        })
    }
}
