//! Tree nodes of a lowered function body.
//!
//! A body is a tree of [`Node`]s. Every node carries a [`NodeId`] that is
//! unique within its function (assigned by the front end in creation order)
//! and a [`Span`] into the function's source file. Consumers dispatch on
//! [`NodeKind`] and recurse into children in program order.

use crate::module::Function;
use crate::span::Span;
use std::fmt;
use std::sync::Arc;

/// Identity of a node within one function body.
///
/// Ids are dense and deterministic: the front end numbers nodes in creation
/// order, so the same source always yields the same ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Create a node id.
    #[inline]
    #[must_use]
    pub const fn new(index: u32) -> Self {
        NodeId(index)
    }

    /// Get the raw index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// One arm of a [`NodeKind::Conditional`].
///
/// Arms carry their own [`NodeId`]: passes that attach per-construct data
/// (line tables, coverage regions) key arms independently of the nodes
/// inside them.
#[derive(Debug, Clone, PartialEq)]
pub struct Arm {
    /// Identity of the arm within the function body.
    pub id: NodeId,
    /// Guard condition; `None` for a fallback/else arm.
    pub condition: Option<Node>,
    /// Value of the arm when taken.
    pub body: Node,
    /// Full extent of the arm (condition through body).
    pub span: Span,
}

impl Arm {
    /// Create a conditional arm.
    #[must_use]
    pub fn new(id: NodeId, condition: Option<Node>, body: Node, span: Span) -> Self {
        Self {
            id,
            condition,
            body,
            span,
        }
    }
}

/// A node in a function body tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Identity of the node within the function body.
    pub id: NodeId,
    /// What the node is.
    pub kind: NodeKind,
    /// Source extent of the node.
    pub span: Span,
}

/// Node variants.
///
/// The set is deliberately small: it is the shape the backend walks, not the
/// surface language. Anything the front end lowers away never appears here.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A call expression.
    Call {
        /// Symbol of the callee.
        callee: Arc<str>,
        /// Argument expressions in evaluation order.
        args: Vec<Node>,
    },
    /// A multi-arm conditional expression (`if`/`else if`/`else` chains and
    /// match-style dispatch both lower to this).
    Conditional {
        /// Arms in source order; at most one fallback arm, last.
        arms: Vec<Arm>,
    },
    /// A sequence of nodes evaluated in order.
    Block(Vec<Node>),
    /// Return from the enclosing function.
    Return(Option<Box<Node>>),
    /// A literal constant.
    Literal,
    /// A reference to a named value.
    Name(Arc<str>),
    /// A nested function declaration left in place by lowering.
    ///
    /// The nested function is also declared at file level; passes that walk
    /// the enclosing body must not descend into it.
    LocalFunction(Box<Function>),
}

impl Node {
    /// Create a node.
    #[must_use]
    pub fn new(id: NodeId, kind: NodeKind, span: Span) -> Self {
        Self { id, kind, span }
    }

    /// Create a call node.
    #[must_use]
    pub fn call(id: NodeId, callee: impl Into<Arc<str>>, args: Vec<Node>, span: Span) -> Self {
        Self::new(
            id,
            NodeKind::Call {
                callee: callee.into(),
                args,
            },
            span,
        )
    }

    /// Create a conditional node.
    #[must_use]
    pub fn conditional(id: NodeId, arms: Vec<Arm>, span: Span) -> Self {
        Self::new(id, NodeKind::Conditional { arms }, span)
    }

    /// Create a block node.
    #[must_use]
    pub fn block(id: NodeId, nodes: Vec<Node>, span: Span) -> Self {
        Self::new(id, NodeKind::Block(nodes), span)
    }

    /// Create a return node.
    #[must_use]
    pub fn ret(id: NodeId, value: Option<Node>, span: Span) -> Self {
        Self::new(id, NodeKind::Return(value.map(Box::new)), span)
    }

    /// Create a literal node.
    #[must_use]
    pub fn literal(id: NodeId, span: Span) -> Self {
        Self::new(id, NodeKind::Literal, span)
    }

    /// Create a name reference node.
    #[must_use]
    pub fn name(id: NodeId, name: impl Into<Arc<str>>, span: Span) -> Self {
        Self::new(id, NodeKind::Name(name.into()), span)
    }

    /// Create a local function declaration node.
    #[must_use]
    pub fn local_function(id: NodeId, function: Function, span: Span) -> Self {
        Self::new(id, NodeKind::LocalFunction(Box::new(function)), span)
    }

    /// Short name of the node's kind, for diagnostics.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            NodeKind::Call { .. } => "call",
            NodeKind::Conditional { .. } => "conditional",
            NodeKind::Block(_) => "block",
            NodeKind::Return(_) => "return",
            NodeKind::Literal => "literal",
            NodeKind::Name(_) => "name",
            NodeKind::LocalFunction(_) => "local function",
        }
    }
}
