//! Mutable accumulator for an in-progress parse.

use std::sync::Arc;

use crate::context::{CommandContext, ParsedArgument, ParsedNode, StringRange};
use crate::tree::{Command, CommandNode, NodeId};

/// Accumulates arguments, matched nodes and the covered range while the
/// dispatcher walks the tree. Cloned once per candidate branch; the `im`
/// collections make that copy O(1).
#[derive(Clone)]
pub struct CommandContextBuilder<S> {
    source: S,
    root: NodeId,
    arguments: im::Vector<(String, ParsedArgument)>,
    nodes: im::Vector<ParsedNode>,
    command: Option<Command<S>>,
    child: Option<Box<CommandContextBuilder<S>>>,
    range: StringRange,
    modifier: Option<crate::tree::RedirectModifier<S>>,
    forks: bool,
}

/// Where suggestions should be generated: the node whose children are the
/// candidates, and the input offset completions start at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestionContext {
    pub parent: NodeId,
    pub start_pos: usize,
}

impl<S> CommandContextBuilder<S> {
    /// A fresh builder anchored at `start`, rooted at `root`.
    pub fn new(source: S, root: NodeId, start: usize) -> Self {
        Self {
            source,
            root,
            arguments: im::Vector::new(),
            nodes: im::Vector::new(),
            command: None,
            child: None,
            range: StringRange::at(start),
            modifier: None,
            forks: false,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn with_source(&mut self, source: S) -> &mut Self {
        self.source = source;
        self
    }

    pub fn root_node(&self) -> NodeId {
        self.root
    }

    pub fn range(&self) -> StringRange {
        self.range
    }

    pub fn command(&self) -> Option<&Command<S>> {
        self.command.as_ref()
    }

    pub fn with_command(&mut self, command: Option<Command<S>>) -> &mut Self {
        self.command = command;
        self
    }

    pub fn with_argument(&mut self, name: impl Into<String>, argument: ParsedArgument) -> &mut Self {
        self.arguments.push_back((name.into(), argument));
        self
    }

    pub fn arguments(&self) -> impl Iterator<Item = &(String, ParsedArgument)> {
        self.arguments.iter()
    }

    /// Records a matched node, widening the covered range and adopting the
    /// node's redirect modifier and fork flag.
    pub fn with_node(&mut self, id: NodeId, node: &CommandNode<S>, range: StringRange) -> &mut Self {
        self.nodes.push_back(ParsedNode { node: id, range });
        self.range = StringRange::encompassing(self.range, range);
        self.modifier = node.redirect_modifier().cloned();
        self.forks = node.is_fork();
        self
    }

    pub fn nodes(&self) -> impl Iterator<Item = &ParsedNode> {
        self.nodes.iter()
    }

    pub fn with_child(&mut self, child: CommandContextBuilder<S>) -> &mut Self {
        self.child = Some(Box::new(child));
        self
    }

    pub fn child(&self) -> Option<&CommandContextBuilder<S>> {
        self.child.as_deref()
    }

    /// The deepest builder in the redirection chain.
    pub fn last_child(&self) -> &CommandContextBuilder<S> {
        let mut result = self;
        while let Some(child) = result.child() {
            result = child;
        }
        result
    }

    /// Locates the node-before-cursor for suggestion generation. Returns
    /// `None` when the cursor precedes the builder's anchored range.
    pub fn find_suggestion_context(&self, cursor: usize) -> Option<SuggestionContext> {
        if self.range.start > cursor {
            return None;
        }

        if self.range.end < cursor {
            if let Some(child) = self.child() {
                return child.find_suggestion_context(cursor);
            }
            if let Some(last) = self.nodes.back() {
                return Some(SuggestionContext {
                    parent: last.node,
                    start_pos: last.range.end + 1,
                });
            }
            return Some(SuggestionContext {
                parent: self.root,
                start_pos: self.range.start,
            });
        }

        let mut prev = self.root;
        for node in &self.nodes {
            if node.range.start <= cursor && cursor <= node.range.end {
                return Some(SuggestionContext {
                    parent: prev,
                    start_pos: node.range.start,
                });
            }
            prev = node.node;
        }
        Some(SuggestionContext {
            parent: prev,
            start_pos: self.range.start,
        })
    }
}

impl<S: Clone> CommandContextBuilder<S> {
    /// Freezes the accumulated state into an immutable context.
    pub fn build(&self, input: &Arc<str>) -> CommandContext<S> {
        CommandContext {
            source: self.source.clone(),
            input: Arc::clone(input),
            arguments: self.arguments.clone(),
            command: self.command.clone(),
            root: self.root,
            nodes: self.nodes.clone(),
            range: self.range,
            child: self.child.as_ref().map(|child| Arc::new(child.build(input))),
            modifier: self.modifier.clone(),
            forks: self.forks,
        }
    }
}
