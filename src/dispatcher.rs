//! The command dispatcher: registration, parsing, execution, usage
//! rendering, path addressing, and completion.
//!
//! Parsing never fails: every candidate branch is tried with its own
//! reader and context copy, branch errors are collected per node, and the
//! surviving branches are ranked. Error surfacing happens in
//! [`CommandDispatcher::execute`], which inspects the returned
//! [`ParseResults`].

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::Arc;

use futures::future;

use crate::builder::LiteralBuilder;
use crate::context::{CommandContext, CommandContextBuilder, ContextChain};
use crate::diagnostics::CommandError;
use crate::reader::StringReader;
use crate::suggest::{Suggestions, SuggestionsBuilder};
use crate::tree::{CommandTree, NodeId, NodeKind, ResultConsumer};

/// The only token separator the dispatcher accepts.
pub const ARGUMENT_SEPARATOR: char = ' ';

/// Outcome of one top-level parse attempt. Consumable when the reader is
/// exhausted; otherwise a diagnostic, with per-node branch errors.
pub struct ParseResults<S> {
    pub(crate) context: CommandContextBuilder<S>,
    pub(crate) reader: StringReader,
    pub(crate) exceptions: Vec<(NodeId, CommandError)>,
}

impl<S> ParseResults<S> {
    pub fn context(&self) -> &CommandContextBuilder<S> {
        &self.context
    }

    pub fn reader(&self) -> &StringReader {
        &self.reader
    }

    /// Branch errors recorded during the parse, in visit order.
    pub fn exceptions(&self) -> &[(NodeId, CommandError)] {
        &self.exceptions
    }
}

pub struct CommandDispatcher<S> {
    tree: CommandTree<S>,
    consumer: ResultConsumer<S>,
}

impl<S> CommandDispatcher<S> {
    pub fn new() -> Self {
        Self {
            tree: CommandTree::new(),
            consumer: Arc::new(|_, _, _| {}),
        }
    }

    /// Attaches a literal subtree to the root. The root accepts only
    /// literal children, enforced by the parameter type.
    pub fn register(&mut self, command: LiteralBuilder<S>) -> NodeId {
        let root = self.tree.root();
        self.tree.attach(root, command.build())
    }

    /// Installs the hook notified after every command execution with
    /// `(context, success, result)`.
    pub fn set_consumer(&mut self, consumer: ResultConsumer<S>) {
        self.consumer = consumer;
    }

    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    pub fn tree(&self) -> &CommandTree<S> {
        &self.tree
    }

    /// Scans the tree for sibling pairs that accept the same example
    /// inputs, reporting each as `(parent, child, sibling, examples)`.
    pub fn find_ambiguities<F>(&self, consumer: &mut F)
    where
        F: FnMut(NodeId, NodeId, NodeId, &BTreeSet<String>),
    {
        self.tree.find_ambiguities(consumer);
    }

    /// Enumerates every executable sub-path under `node` in simple form.
    /// With `restricted`, paths invisible to `source` are omitted.
    pub fn get_all_usage(&self, node: NodeId, source: &S, restricted: bool) -> Vec<String> {
        let mut result = Vec::new();
        self.all_usage(node, source, &mut result, "", restricted);
        result
    }

    fn all_usage(
        &self,
        node: NodeId,
        source: &S,
        result: &mut Vec<String>,
        prefix: &str,
        restricted: bool,
    ) {
        let current = self.tree.node(node);
        if restricted && !current.can_use(source) {
            return;
        }

        if current.command().is_some() {
            result.push(prefix.to_string());
        }

        if let Some(target) = current.redirect() {
            let redirect = self.redirect_text(target);
            if prefix.is_empty() {
                result.push(format!("{} {redirect}", current.usage_text()));
            } else {
                result.push(format!("{prefix} {redirect}"));
            }
        } else {
            for &child in current.children() {
                let child_usage = self.tree.node(child).usage_text();
                let new_prefix = if prefix.is_empty() {
                    child_usage
                } else {
                    format!("{prefix} {child_usage}")
                };
                self.all_usage(child, source, result, &new_prefix, restricted);
            }
        }
    }

    /// Renders each child of `node` in compact form, using `<required>`,
    /// `[optional]`, `(a|b)` and `-> target` (with `...` for the root).
    pub fn get_smart_usage(&self, node: NodeId, source: &S) -> Vec<(NodeId, String)> {
        let mut result = Vec::new();
        let optional_for_children = self.tree.node(node).command().is_some();
        for &child in self.tree.node(node).children() {
            if self.tree.node(child).can_use(source) {
                if let Some(usage) = self.smart_usage(child, source, optional_for_children, false) {
                    result.push((child, usage));
                }
            }
        }
        result
    }

    fn smart_usage(&self, node: NodeId, source: &S, optional: bool, deep: bool) -> Option<String> {
        let current = self.tree.node(node);
        if !current.can_use(source) {
            return None;
        }

        let self_text = if optional {
            format!("[{}]", current.usage_text())
        } else {
            current.usage_text()
        };
        // Children become optional once this node is itself executable.
        let child_optional = current.command().is_some();

        if !deep {
            if let Some(target) = current.redirect() {
                return Some(format!("{self_text} {}", self.redirect_text(target)));
            }

            let children: Vec<NodeId> = current
                .children()
                .iter()
                .copied()
                .filter(|&child| self.tree.node(child).can_use(source))
                .collect();

            if children.len() == 1 {
                if let Some(usage) = self.smart_usage(children[0], source, child_optional, child_optional) {
                    return Some(format!("{self_text} {usage}"));
                }
            } else if children.len() > 1 {
                let mut child_usage: Vec<String> = Vec::new();
                for &child in &children {
                    if let Some(usage) = self.smart_usage(child, source, child_optional, true) {
                        if !child_usage.contains(&usage) {
                            child_usage.push(usage);
                        }
                    }
                }
                if child_usage.len() == 1 {
                    let usage = child_usage.remove(0);
                    let wrapped = if child_optional {
                        format!("[{usage}]")
                    } else {
                        usage
                    };
                    return Some(format!("{self_text} {wrapped}"));
                } else if child_usage.len() > 1 {
                    let mut alternatives = String::from(if child_optional { "[" } else { "(" });
                    for (count, &child) in children.iter().enumerate() {
                        if count > 0 {
                            alternatives.push('|');
                        }
                        alternatives.push_str(&self.tree.node(child).usage_text());
                    }
                    alternatives.push_str(if child_optional { "]" } else { ")" });
                    return Some(format!("{self_text} {alternatives}"));
                }
            }
        }

        Some(self_text)
    }

    fn redirect_text(&self, target: NodeId) -> String {
        if target == self.tree.root() {
            "...".to_string()
        } else {
            format!("-> {}", self.tree.node(target).usage_text())
        }
    }

    /// The first path from the root to `target`, as node names. Empty when
    /// the node is unreachable without following redirects.
    pub fn get_path(&self, target: NodeId) -> Vec<String> {
        let mut path = Vec::new();
        if self.find_path(self.tree.root(), target, &mut path) {
            path
        } else {
            Vec::new()
        }
    }

    fn find_path(&self, current: NodeId, target: NodeId, path: &mut Vec<String>) -> bool {
        if current == target {
            return true;
        }
        for &child in self.tree.node(current).children() {
            path.push(self.tree.node(child).name().to_string());
            if self.find_path(child, target, path) {
                return true;
            }
            path.pop();
        }
        false
    }

    /// Resolves a path produced by [`get_path`](Self::get_path).
    pub fn find_node<I, T>(&self, path: I) -> Option<NodeId>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut node = self.tree.root();
        for name in path {
            node = self.tree.node(node).child(name.as_ref())?;
        }
        Some(node)
    }

    /// Every node chain reachable from `node` (or the root) through child
    /// edges, including the single-element chain of the start node itself.
    pub fn get_all_paths(&self, node: Option<NodeId>) -> Vec<Vec<NodeId>> {
        let mut result = Vec::new();
        self.add_paths(node.unwrap_or_else(|| self.tree.root()), &mut result, &[]);
        result
    }

    fn add_paths(&self, node: NodeId, result: &mut Vec<Vec<NodeId>>, parents: &[NodeId]) {
        let mut current = parents.to_vec();
        current.push(node);
        result.push(current.clone());
        for &child in self.tree.node(node).children() {
            self.add_paths(child, result, &current);
        }
    }
}

impl<S: Clone> CommandDispatcher<S> {
    /// Parses `input` against the tree. Never fails; diagnostics live in
    /// the returned record.
    pub fn parse(&self, input: impl Into<StringReader>, source: S) -> ParseResults<S> {
        let reader = input.into();
        let context = CommandContextBuilder::new(source, self.tree.root(), reader.cursor());
        self.parse_nodes(self.tree.root(), &reader, context)
    }

    fn parse_nodes(
        &self,
        node: NodeId,
        original_reader: &StringReader,
        context_so_far: CommandContextBuilder<S>,
    ) -> ParseResults<S> {
        let source = context_so_far.source().clone();
        let mut errors: Vec<(NodeId, CommandError)> = Vec::new();
        let mut potentials: Vec<ParseResults<S>> = Vec::new();

        for child in self.tree.relevant_nodes(node, original_reader) {
            if !self.tree.node(child).can_use(&source) {
                continue;
            }

            // Each candidate branch gets its own reader and context copy,
            // so siblings stay isolated.
            let mut context = context_so_far.clone();
            let mut reader = original_reader.clone();

            let attempt = self
                .tree
                .parse_node(child, &mut reader, &mut context)
                .and_then(|()| {
                    if reader.can_read() && reader.peek() != Some(ARGUMENT_SEPARATOR) {
                        Err(CommandError::expected_argument_separator(&reader))
                    } else {
                        Ok(())
                    }
                });
            if let Err(error) = attempt {
                errors.push((child, error));
                continue;
            }

            context.with_command(self.tree.node(child).command().cloned());

            let redirect = self.tree.node(child).redirect();
            if reader.can_read_n(if redirect.is_some() { 1 } else { 2 }) {
                reader.skip();
                match redirect {
                    Some(target) => {
                        let child_context =
                            CommandContextBuilder::new(source.clone(), target, reader.cursor());
                        let parse = self.parse_nodes(target, &reader, child_context);
                        context.with_child(parse.context);
                        return ParseResults {
                            context,
                            reader: parse.reader,
                            exceptions: parse.exceptions,
                        };
                    }
                    None => potentials.push(self.parse_nodes(child, &reader, context)),
                }
            } else {
                potentials.push(ParseResults {
                    context,
                    reader,
                    exceptions: Vec::new(),
                });
            }
        }

        if potentials.is_empty() {
            return ParseResults {
                context: context_so_far,
                reader: original_reader.clone(),
                exceptions: errors,
            };
        }

        if potentials.len() > 1 {
            // Rank: exhausted input first, then error-free branches. The
            // sort is stable, so ties keep visit order.
            potentials.sort_by(|a, b| {
                match (a.reader.can_read(), b.reader.can_read()) {
                    (false, true) => return Ordering::Less,
                    (true, false) => return Ordering::Greater,
                    _ => {}
                }
                match (a.exceptions.is_empty(), b.exceptions.is_empty()) {
                    (true, false) => Ordering::Less,
                    (false, true) => Ordering::Greater,
                    _ => Ordering::Equal,
                }
            });
        }
        potentials.remove(0)
    }

    /// Executes a parsed command, surfacing any parse diagnostics first.
    pub fn execute(&self, parse: &ParseResults<S>) -> Result<i32, CommandError> {
        if parse.reader.can_read() {
            return Err(if parse.exceptions.len() == 1 {
                parse.exceptions[0].1.clone()
            } else if parse.context.range().is_empty() {
                CommandError::unknown_command(&parse.reader)
            } else {
                CommandError::unknown_argument(&parse.reader)
            });
        }

        let command = parse.reader.string_arc();
        let original = parse.context.build(&command);

        let Some(chain) = ContextChain::try_flatten(original.clone()) else {
            self.consumer.as_ref()(&original, false, 0);
            return Err(CommandError::unknown_command(&parse.reader));
        };

        chain.execute_all(original.source().clone(), &self.consumer)
    }

    /// Parses and executes in one step.
    pub fn execute_input(
        &self,
        input: impl Into<StringReader>,
        source: S,
    ) -> Result<i32, CommandError> {
        let parse = self.parse(input, source);
        self.execute(&parse)
    }
}

impl<S: Clone + Send + Sync> CommandDispatcher<S> {
    /// Completion candidates at the end of the parsed input.
    pub async fn get_completion_suggestions(&self, parse: &ParseResults<S>) -> Suggestions {
        self.get_completion_suggestions_at(parse, parse.reader.total_length())
            .await
    }

    /// Completion candidates at an arbitrary cursor position.
    ///
    /// Every child of the node before the cursor is queried, regardless of
    /// its requirement predicate; the per-child futures are awaited
    /// together and merged. A failing child contributes nothing.
    pub async fn get_completion_suggestions_at(
        &self,
        parse: &ParseResults<S>,
        cursor: usize,
    ) -> Suggestions {
        let Some(suggestion_context) = parse.context.find_suggestion_context(cursor) else {
            return Suggestions::empty();
        };
        let parent = suggestion_context.parent;
        let start = suggestion_context.start_pos.min(cursor);

        let full_input = parse.reader.string_arc();
        let truncated: Arc<str> = Arc::from(&full_input[..cursor]);
        let truncated_lowercase: Arc<str> = Arc::from(truncated.to_lowercase().as_str());

        let context = parse.context.build(&truncated);
        let futures: Vec<_> = self
            .tree
            .node(parent)
            .children()
            .iter()
            .map(|&child| {
                self.list_suggestions(
                    child,
                    &context,
                    SuggestionsBuilder::with_lowercase(
                        Arc::clone(&truncated),
                        Arc::clone(&truncated_lowercase),
                        start,
                    ),
                )
            })
            .collect();

        let collected = future::join_all(futures).await;
        let suggestions = collected
            .into_iter()
            .map(|result| result.unwrap_or_else(|_| Suggestions::empty()))
            .collect();
        Suggestions::merge(&full_input, suggestions)
    }

    async fn list_suggestions(
        &self,
        node: NodeId,
        context: &CommandContext<S>,
        mut builder: SuggestionsBuilder,
    ) -> Result<Suggestions, CommandError> {
        match self.tree.node(node).kind() {
            NodeKind::Root => Ok(Suggestions::empty()),
            NodeKind::Literal {
                literal,
                literal_lowercase,
            } => {
                if literal_lowercase.starts_with(builder.remaining_lowercase()) {
                    builder.suggest(literal.clone());
                    Ok(builder.build())
                } else {
                    Ok(Suggestions::empty())
                }
            }
            NodeKind::Argument {
                ty,
                custom_suggestions,
                ..
            } => match custom_suggestions {
                Some(provider) => provider.suggestions(context, builder).await,
                None => ty.list_suggestions(context, builder).await,
            },
        }
    }
}

impl<S> Default for CommandDispatcher<S> {
    fn default() -> Self {
        Self::new()
    }
}
