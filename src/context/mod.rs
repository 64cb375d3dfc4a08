//! Parse state: ranges, parsed records, and the command context.
//!
//! A [`CommandContextBuilder`] accumulates state while the dispatcher walks
//! the tree; [`CommandContext`] is the immutable snapshot handed to
//! handlers, redirect modifiers and suggestion providers.

use std::any::Any;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::args::ArgValue;
use crate::tree::{Command, NodeId, RedirectModifier};

mod builder;
mod chain;

pub use builder::{CommandContextBuilder, SuggestionContext};
pub use chain::{ContextChain, Stage};

/// A half-open `[start, end)` interval of byte offsets over the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct StringRange {
    pub start: usize,
    pub end: usize,
}

impl StringRange {
    /// An empty range at `pos`.
    pub fn at(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    pub fn between(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// The smallest range covering both `a` and `b`.
    pub fn encompassing(a: StringRange, b: StringRange) -> Self {
        Self {
            start: a.start.min(b.start),
            end: a.end.max(b.end),
        }
    }

    /// Projects this range onto `input`.
    pub fn get<'s>(&self, input: &'s str) -> &'s str {
        &input[self.start..self.end]
    }

    pub fn contains(&self, pos: usize) -> bool {
        self.start <= pos && pos < self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }
}

/// One parsed argument: where it came from and what it parsed to.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedArgument {
    pub range: StringRange,
    pub value: ArgValue,
}

/// One matched node, in traversal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedNode {
    pub node: NodeId,
    pub range: StringRange,
}

/// An immutable snapshot of one successful parse.
///
/// Redirection links contexts into a singly linked chain through `child`;
/// [`ContextChain::try_flatten`] splits that chain into modifiers plus one
/// executable tail.
#[derive(Clone)]
pub struct CommandContext<S> {
    pub(crate) source: S,
    pub(crate) input: Arc<str>,
    pub(crate) arguments: im::Vector<(String, ParsedArgument)>,
    pub(crate) command: Option<Command<S>>,
    pub(crate) root: NodeId,
    pub(crate) nodes: im::Vector<ParsedNode>,
    pub(crate) range: StringRange,
    pub(crate) child: Option<Arc<CommandContext<S>>>,
    pub(crate) modifier: Option<RedirectModifier<S>>,
    pub(crate) forks: bool,
}

impl<S> CommandContext<S> {
    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn range(&self) -> StringRange {
        self.range
    }

    pub fn root_node(&self) -> NodeId {
        self.root
    }

    pub fn command(&self) -> Option<&Command<S>> {
        self.command.as_ref()
    }

    pub fn child(&self) -> Option<&CommandContext<S>> {
        self.child.as_deref()
    }

    /// The deepest context in the redirection chain.
    pub fn last_child(&self) -> &CommandContext<S> {
        let mut current = self;
        while let Some(child) = current.child() {
            current = child;
        }
        current
    }

    pub fn nodes(&self) -> impl Iterator<Item = &ParsedNode> {
        self.nodes.iter()
    }

    pub fn has_nodes(&self) -> bool {
        !self.nodes.is_empty()
    }

    pub fn redirect_modifier(&self) -> Option<&RedirectModifier<S>> {
        self.modifier.as_ref()
    }

    pub fn is_forked(&self) -> bool {
        self.forks
    }

    /// Looks up a parsed argument by name.
    pub fn argument(&self, name: &str) -> Option<&ParsedArgument> {
        self.arguments
            .iter()
            .find(|entry| entry.0 == name)
            .map(|entry| &entry.1)
    }

    fn required(&self, name: &str) -> &ParsedArgument {
        match self.argument(name) {
            Some(parsed) => parsed,
            None => panic!("no such argument '{name}' exists on this command"),
        }
    }

    fn typed<T>(&self, name: &str, expected: &str, project: impl Fn(&ArgValue) -> Option<T>) -> T {
        let parsed = self.required(name);
        match project(&parsed.value) {
            Some(value) => value,
            None => panic!(
                "argument '{name}' is defined as {}, not {expected}",
                parsed.value.type_name()
            ),
        }
    }

    /// Retrieves an `i32` argument.
    ///
    /// # Panics
    /// If no argument of that name exists, or it has a different type.
    pub fn get_integer(&self, name: &str) -> i32 {
        self.typed(name, "integer", ArgValue::as_integer)
    }

    /// Retrieves an `i64` argument. Panics like [`get_integer`](Self::get_integer).
    pub fn get_long(&self, name: &str) -> i64 {
        self.typed(name, "long", ArgValue::as_long)
    }

    /// Retrieves an `f32` argument. Panics like [`get_integer`](Self::get_integer).
    pub fn get_float(&self, name: &str) -> f32 {
        self.typed(name, "float", ArgValue::as_float)
    }

    /// Retrieves an `f64` argument. Panics like [`get_integer`](Self::get_integer).
    pub fn get_double(&self, name: &str) -> f64 {
        self.typed(name, "double", ArgValue::as_double)
    }

    /// Retrieves a `bool` argument. Panics like [`get_integer`](Self::get_integer).
    pub fn get_bool(&self, name: &str) -> bool {
        self.typed(name, "bool", ArgValue::as_bool)
    }

    /// Retrieves a string argument. Panics like [`get_integer`](Self::get_integer).
    pub fn get_string(&self, name: &str) -> &str {
        let parsed = self.required(name);
        match parsed.value.as_str() {
            Some(value) => value,
            None => panic!(
                "argument '{name}' is defined as {}, not string",
                parsed.value.type_name()
            ),
        }
    }

    /// Retrieves a custom argument payload by downcast.
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.argument(name).and_then(|parsed| parsed.value.downcast())
    }
}

impl<S: Clone> CommandContext<S> {
    /// The same context seen from a different source.
    pub fn copy_for(&self, source: S) -> CommandContext<S> {
        let mut copy = self.clone();
        copy.source = source;
        copy
    }
}
