//! Fluent construction of command subtrees.
//!
//! [`literal`] and [`argument`] start detached builders; `.then()` nests
//! children, `.executes()` attaches a handler, `.requires()` a visibility
//! gate, and `.redirect()` / `.fork()` a forwarding edge. The finished
//! builder is handed to [`CommandDispatcher::register`], which attaches it
//! to the tree.
//!
//! [`CommandDispatcher::register`]: crate::dispatcher::CommandDispatcher::register

use std::sync::Arc;

use crate::args::ArgumentType;
use crate::context::CommandContext;
use crate::diagnostics::CommandError;
use crate::suggest::SuggestionProvider;
use crate::tree::{Command, NodeId, RedirectModifier, Requirement};

/// Starts a literal node matching exactly `name`.
pub fn literal<S>(name: impl Into<String>) -> LiteralBuilder<S> {
    LiteralBuilder {
        literal: name.into(),
        base: BuilderBase::new(),
    }
}

/// Starts an argument node binding `name` to a value of the given type.
pub fn argument<S>(name: impl Into<String>, ty: impl ArgumentType<S> + 'static) -> ArgumentBuilder<S> {
    ArgumentBuilder {
        name: name.into(),
        ty: Arc::new(ty),
        suggestions: None,
        base: BuilderBase::new(),
    }
}

pub(crate) struct BuilderBase<S> {
    pub(crate) children: Vec<ChildBuilder<S>>,
    pub(crate) command: Option<Command<S>>,
    pub(crate) requirement: Requirement<S>,
    pub(crate) redirect: Option<NodeId>,
    pub(crate) modifier: Option<RedirectModifier<S>>,
    pub(crate) forks: bool,
}

impl<S> BuilderBase<S> {
    pub(crate) fn new() -> Self {
        Self {
            children: Vec::new(),
            command: None,
            requirement: Arc::new(|_| true),
            redirect: None,
            modifier: None,
            forks: false,
        }
    }

    fn then(&mut self, child: ChildBuilder<S>) {
        assert!(
            self.redirect.is_none(),
            "cannot add children to a redirected node"
        );
        self.children.push(child);
    }

    fn forward(&mut self, target: NodeId, modifier: Option<RedirectModifier<S>>, forks: bool) {
        assert!(
            self.children.is_empty(),
            "cannot forward a node with children"
        );
        self.redirect = Some(target);
        self.modifier = modifier;
        self.forks = forks;
    }
}

/// A child of either builder flavour.
pub enum ChildBuilder<S> {
    Literal(LiteralBuilder<S>),
    Argument(ArgumentBuilder<S>),
}

impl<S> From<LiteralBuilder<S>> for ChildBuilder<S> {
    fn from(builder: LiteralBuilder<S>) -> Self {
        ChildBuilder::Literal(builder)
    }
}

impl<S> From<ArgumentBuilder<S>> for ChildBuilder<S> {
    fn from(builder: ArgumentBuilder<S>) -> Self {
        ChildBuilder::Argument(builder)
    }
}

macro_rules! builder_common {
    () => {
        /// Nests a child under this node.
        ///
        /// # Panics
        /// If a redirect has already been set.
        pub fn then(mut self, child: impl Into<ChildBuilder<S>>) -> Self {
            self.base.then(child.into());
            self
        }

        /// Attaches the handler invoked when this node terminates a parse.
        pub fn executes(
            mut self,
            command: impl Fn(&CommandContext<S>) -> Result<i32, CommandError>
                + Send
                + Sync
                + 'static,
        ) -> Self {
            self.base.command = Some(Arc::new(command));
            self
        }

        /// Hides this subtree from sources failing the predicate.
        pub fn requires(
            mut self,
            requirement: impl Fn(&S) -> bool + Send + Sync + 'static,
        ) -> Self {
            self.base.requirement = Arc::new(requirement);
            self
        }

        /// Reroutes parsing to `target` with the identity modifier.
        ///
        /// # Panics
        /// If children have already been added.
        pub fn redirect(mut self, target: NodeId) -> Self {
            self.base.forward(target, None, false);
            self
        }

        /// Reroutes parsing to `target`, mapping the source through
        /// `modifier` (which must produce a single source).
        pub fn redirect_with(
            mut self,
            target: NodeId,
            modifier: impl Fn(&CommandContext<S>) -> Result<S, CommandError>
                + Send
                + Sync
                + 'static,
        ) -> Self {
            self.base.forward(
                target,
                Some(Arc::new(move |context: &CommandContext<S>| {
                    Ok(vec![modifier(context)?])
                })),
                false,
            );
            self
        }

        /// Forks to `target`: the modifier may return any number of
        /// sources, each executed independently with errors suppressed.
        pub fn fork(
            mut self,
            target: NodeId,
            modifier: impl Fn(&CommandContext<S>) -> Result<Vec<S>, CommandError>
                + Send
                + Sync
                + 'static,
        ) -> Self {
            self.base.forward(target, Some(Arc::new(modifier)), true);
            self
        }

        /// Lowest-level forwarding: explicit target, optional modifier and
        /// fork flag.
        pub fn forward(
            mut self,
            target: NodeId,
            modifier: Option<RedirectModifier<S>>,
            forks: bool,
        ) -> Self {
            self.base.forward(target, modifier, forks);
            self
        }
    };
}

/// Builds a literal node.
pub struct LiteralBuilder<S> {
    pub(crate) literal: String,
    pub(crate) base: BuilderBase<S>,
}

impl<S> LiteralBuilder<S> {
    builder_common!();

    pub(crate) fn build(self) -> BuiltNode<S> {
        BuiltNode {
            kind: BuiltKind::Literal(self.literal),
            command: self.base.command,
            requirement: self.base.requirement,
            redirect: self.base.redirect,
            modifier: self.base.modifier,
            forks: self.base.forks,
            children: self.base.children.into_iter().map(ChildBuilder::build).collect(),
        }
    }
}

/// Builds a typed argument node.
pub struct ArgumentBuilder<S> {
    pub(crate) name: String,
    pub(crate) ty: Arc<dyn ArgumentType<S>>,
    pub(crate) suggestions: Option<Arc<dyn SuggestionProvider<S>>>,
    pub(crate) base: BuilderBase<S>,
}

impl<S> ArgumentBuilder<S> {
    builder_common!();

    /// Overrides the argument type's own completions.
    pub fn suggests(mut self, provider: impl SuggestionProvider<S> + 'static) -> Self {
        self.suggestions = Some(Arc::new(provider));
        self
    }

    pub(crate) fn build(self) -> BuiltNode<S> {
        BuiltNode {
            kind: BuiltKind::Argument {
                name: self.name,
                ty: self.ty,
                suggestions: self.suggestions,
            },
            command: self.base.command,
            requirement: self.base.requirement,
            redirect: self.base.redirect,
            modifier: self.base.modifier,
            forks: self.base.forks,
            children: self.base.children.into_iter().map(ChildBuilder::build).collect(),
        }
    }
}

impl<S> ChildBuilder<S> {
    fn build(self) -> BuiltNode<S> {
        match self {
            ChildBuilder::Literal(builder) => builder.build(),
            ChildBuilder::Argument(builder) => builder.build(),
        }
    }
}

/// A finished, detached subtree awaiting attachment to the arena.
pub(crate) struct BuiltNode<S> {
    pub(crate) kind: BuiltKind<S>,
    pub(crate) command: Option<Command<S>>,
    pub(crate) requirement: Requirement<S>,
    pub(crate) redirect: Option<NodeId>,
    pub(crate) modifier: Option<RedirectModifier<S>>,
    pub(crate) forks: bool,
    pub(crate) children: Vec<BuiltNode<S>>,
}

pub(crate) enum BuiltKind<S> {
    Literal(String),
    Argument {
        name: String,
        ty: Arc<dyn ArgumentType<S>>,
        suggestions: Option<Arc<dyn SuggestionProvider<S>>>,
    },
}

impl<S> BuiltNode<S> {
    pub(crate) fn name(&self) -> &str {
        match &self.kind {
            BuiltKind::Literal(literal) => literal,
            BuiltKind::Argument { name, .. } => name,
        }
    }
}
