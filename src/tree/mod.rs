//! The command tree: an arena of nodes addressed by [`NodeId`].
//!
//! Nodes are created through the fluent builders in [`crate::builder`] and
//! attached via [`CommandTree::attach`], which enforces the structural
//! invariants: child names are unique (a duplicate literal merges its
//! handler and grandchildren into the existing node), the root accepts only
//! literals, and redirecting nodes carry no children of their own. Redirect
//! edges are plain `NodeId`s, so cycles through the redirect edge (e.g.
//! back to the root) are representable without ownership cycles.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::args::ArgumentType;
use crate::builder::{ArgumentBuilder, BuilderBase, BuiltKind, BuiltNode, ChildBuilder, LiteralBuilder};
use crate::context::{CommandContext, CommandContextBuilder, ParsedArgument, StringRange};
use crate::diagnostics::CommandError;
use crate::reader::StringReader;
use crate::suggest::SuggestionProvider;

/// A handler attached to an executable node.
pub type Command<S> =
    Arc<dyn Fn(&CommandContext<S>) -> Result<i32, CommandError> + Send + Sync>;

/// A per-node visibility gate over the source.
pub type Requirement<S> = Arc<dyn Fn(&S) -> bool + Send + Sync>;

/// Maps the context of a redirecting node to the set of sources the target
/// runs for.
pub type RedirectModifier<S> =
    Arc<dyn Fn(&CommandContext<S>) -> Result<Vec<S>, CommandError> + Send + Sync>;

/// Observes the completion of each executed command.
pub type ResultConsumer<S> = Arc<dyn Fn(&CommandContext<S>, bool, i32) + Send + Sync>;

/// Stable handle to a node in the tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// The per-variant state of a node.
pub enum NodeKind<S> {
    Root,
    Literal {
        literal: String,
        literal_lowercase: String,
    },
    Argument {
        name: String,
        ty: Arc<dyn ArgumentType<S>>,
        custom_suggestions: Option<Arc<dyn SuggestionProvider<S>>>,
    },
}

pub struct CommandNode<S> {
    kind: NodeKind<S>,
    children: Vec<NodeId>,
    children_by_name: HashMap<String, NodeId>,
    literals: HashMap<String, NodeId>,
    arguments: HashMap<String, NodeId>,
    command: Option<Command<S>>,
    requirement: Requirement<S>,
    redirect: Option<NodeId>,
    modifier: Option<RedirectModifier<S>>,
    forks: bool,
}

impl<S> CommandNode<S> {
    pub fn kind(&self) -> &NodeKind<S> {
        &self.kind
    }

    /// The node's name: the literal text, the argument name, or `""` for
    /// the root.
    pub fn name(&self) -> &str {
        match &self.kind {
            NodeKind::Root => "",
            NodeKind::Literal { literal, .. } => literal,
            NodeKind::Argument { name, .. } => name,
        }
    }

    /// How the node renders in usage strings.
    pub fn usage_text(&self) -> String {
        match &self.kind {
            NodeKind::Root => String::new(),
            NodeKind::Literal { literal, .. } => literal.clone(),
            NodeKind::Argument { name, .. } => format!("<{name}>"),
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self.kind, NodeKind::Literal { .. })
    }

    /// Children in insertion order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn child(&self, name: &str) -> Option<NodeId> {
        self.children_by_name.get(name).copied()
    }

    pub fn command(&self) -> Option<&Command<S>> {
        self.command.as_ref()
    }

    pub fn redirect(&self) -> Option<NodeId> {
        self.redirect
    }

    pub fn redirect_modifier(&self) -> Option<&RedirectModifier<S>> {
        self.modifier.as_ref()
    }

    pub fn is_fork(&self) -> bool {
        self.forks
    }

    /// Whether the node is visible to `source`. The root always is.
    pub fn can_use(&self, source: &S) -> bool {
        self.requirement.as_ref()(source)
    }

    /// Example inputs used by ambiguity detection.
    pub fn examples(&self) -> Vec<String> {
        match &self.kind {
            NodeKind::Root => Vec::new(),
            NodeKind::Literal { literal, .. } => vec![literal.clone()],
            NodeKind::Argument { ty, .. } => ty.examples(),
        }
    }

    /// Ordering key: literals sort before arguments, then by name.
    pub fn sorted_key(&self) -> (bool, &str) {
        (!self.is_literal(), self.name())
    }

    /// Recreates a detached builder carrying this node's handler,
    /// requirement and forwarding data. Children are not copied; the root
    /// has no builder.
    pub fn create_builder(&self) -> Option<ChildBuilder<S>> {
        let base = BuilderBase {
            children: Vec::new(),
            command: self.command.clone(),
            requirement: Arc::clone(&self.requirement),
            redirect: self.redirect,
            modifier: self.modifier.clone(),
            forks: self.forks,
        };
        match &self.kind {
            NodeKind::Root => None,
            NodeKind::Literal { literal, .. } => Some(ChildBuilder::Literal(LiteralBuilder {
                literal: literal.clone(),
                base,
            })),
            NodeKind::Argument {
                name,
                ty,
                custom_suggestions,
            } => Some(ChildBuilder::Argument(ArgumentBuilder {
                name: name.clone(),
                ty: Arc::clone(ty),
                suggestions: custom_suggestions.clone(),
                base,
            })),
        }
    }
}

/// The arena holding every node of one dispatcher.
pub struct CommandTree<S> {
    nodes: Vec<CommandNode<S>>,
}

impl<S> CommandTree<S> {
    pub fn new() -> Self {
        Self {
            nodes: vec![CommandNode {
                kind: NodeKind::Root,
                children: Vec::new(),
                children_by_name: HashMap::new(),
                literals: HashMap::new(),
                arguments: HashMap::new(),
                command: None,
                requirement: Arc::new(|_| true),
                redirect: None,
                modifier: None,
                forks: false,
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &CommandNode<S> {
        &self.nodes[id.0]
    }

    /// Inserts a built subtree under `parent`. A child whose name already
    /// exists merges its handler and grandchildren into the existing node
    /// instead of replacing it; the existing node's id is returned.
    pub(crate) fn attach(&mut self, parent: NodeId, built: BuiltNode<S>) -> NodeId {
        if let Some(existing) = self.nodes[parent.0].children_by_name.get(built.name()).copied() {
            if let Some(command) = built.command {
                self.nodes[existing.0].command = Some(command);
            }
            for child in built.children {
                self.attach(existing, child);
            }
            return existing;
        }

        let id = NodeId(self.nodes.len());
        let name = built.name().to_string();
        let is_literal = matches!(built.kind, BuiltKind::Literal(_));
        let kind = match built.kind {
            BuiltKind::Literal(literal) => {
                let literal_lowercase = literal.to_lowercase();
                NodeKind::Literal {
                    literal,
                    literal_lowercase,
                }
            }
            BuiltKind::Argument {
                name,
                ty,
                suggestions,
            } => NodeKind::Argument {
                name,
                ty,
                custom_suggestions: suggestions,
            },
        };
        self.nodes.push(CommandNode {
            kind,
            children: Vec::new(),
            children_by_name: HashMap::new(),
            literals: HashMap::new(),
            arguments: HashMap::new(),
            command: built.command,
            requirement: built.requirement,
            redirect: built.redirect,
            modifier: built.modifier,
            forks: built.forks,
        });

        let parent_node = &mut self.nodes[parent.0];
        parent_node.children.push(id);
        parent_node.children_by_name.insert(name.clone(), id);
        if is_literal {
            parent_node.literals.insert(name, id);
        } else {
            parent_node.arguments.insert(name, id);
        }

        for child in built.children {
            self.attach(id, child);
        }
        id
    }

    /// The subset of `id`'s children worth trying against the next token:
    /// the exactly-matching literal when one exists, otherwise every
    /// argument child.
    pub fn relevant_nodes(&self, id: NodeId, reader: &StringReader) -> Vec<NodeId> {
        let node = self.node(id);
        if !node.literals.is_empty() {
            let remaining = reader.remaining();
            let end = remaining.find(' ').unwrap_or(remaining.len());
            if let Some(&literal) = node.literals.get(&remaining[..end]) {
                return vec![literal];
            }
        }
        node.children
            .iter()
            .copied()
            .filter(|&child| matches!(self.node(child).kind, NodeKind::Argument { .. }))
            .collect()
    }

    /// Whether `input` fully satisfies node `id` on its own (allowing a
    /// trailing space).
    pub fn is_valid_input(&self, id: NodeId, input: &str) -> bool {
        match &self.node(id).kind {
            NodeKind::Root => false,
            NodeKind::Literal { literal, .. } => {
                let mut reader = StringReader::new(input);
                Self::parse_literal(&mut reader, literal).is_some()
            }
            NodeKind::Argument { ty, .. } => {
                let mut reader = StringReader::new(input);
                match ty.parse(&mut reader) {
                    Ok(_) => !reader.can_read() || reader.peek() == Some(' '),
                    Err(_) => false,
                }
            }
        }
    }

    /// Matches `literal` followed by a word boundary. On success the reader
    /// sits past the literal and the end offset is returned; on failure the
    /// reader is untouched.
    fn parse_literal(reader: &mut StringReader, literal: &str) -> Option<usize> {
        let start = reader.cursor();
        if reader.remaining().starts_with(literal) {
            let end = start + literal.len();
            reader.set_cursor(end);
            if !reader.can_read() || reader.peek() == Some(' ') {
                return Some(end);
            }
            reader.set_cursor(start);
        }
        None
    }

    /// Compares every child's examples against its siblings and reports
    /// inputs both would accept. Best-effort, author-time only.
    pub fn find_ambiguities<F>(&self, consumer: &mut F)
    where
        F: FnMut(NodeId, NodeId, NodeId, &BTreeSet<String>),
    {
        self.find_ambiguities_from(self.root(), consumer);
    }

    fn find_ambiguities_from<F>(&self, parent: NodeId, consumer: &mut F)
    where
        F: FnMut(NodeId, NodeId, NodeId, &BTreeSet<String>),
    {
        let mut matches = BTreeSet::new();
        let children = self.node(parent).children.clone();

        for &child in &children {
            for &sibling in &children {
                if child == sibling {
                    continue;
                }
                for input in self.node(child).examples() {
                    if self.is_valid_input(sibling, &input) {
                        matches.insert(input);
                    }
                }
                if !matches.is_empty() {
                    consumer(parent, child, sibling, &matches);
                    matches.clear();
                }
            }
            self.find_ambiguities_from(child, consumer);
        }
    }
}

impl<S: Clone> CommandTree<S> {
    /// Matches node `id` against the reader, recording the result in the
    /// context builder. Root matches nothing and records nothing.
    pub(crate) fn parse_node(
        &self,
        id: NodeId,
        reader: &mut StringReader,
        context: &mut CommandContextBuilder<S>,
    ) -> Result<(), CommandError> {
        let node = self.node(id);
        match &node.kind {
            NodeKind::Root => Ok(()),
            NodeKind::Literal { literal, .. } => {
                let start = reader.cursor();
                match Self::parse_literal(reader, literal) {
                    Some(end) => {
                        context.with_node(id, node, StringRange::between(start, end));
                        Ok(())
                    }
                    None => Err(CommandError::literal_incorrect(reader, literal.as_str())),
                }
            }
            NodeKind::Argument { name, ty, .. } => {
                let start = reader.cursor();
                let value = ty.parse_with_source(reader, context.source())?;
                let range = StringRange::between(start, reader.cursor());
                context.with_argument(name.clone(), ParsedArgument { range, value });
                context.with_node(id, node, range);
                Ok(())
            }
        }
    }
}

impl<S> Default for CommandTree<S> {
    fn default() -> Self {
        Self::new()
    }
}
