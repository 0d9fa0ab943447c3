//! Ancestor chains and node paths.
//!
//! The walker keeps an explicit path vector instead of parent pointers. Each
//! frame records the production of an enclosing node and the child slot the
//! walk descended into. The same edges, read from the root, form a
//! [`NodePath`]: the identity of a node in the current tree.

use std::fmt;

use super::ast::{MethodKind, PropKind, UnaryOp, VarKind};

/// Per-production tag of a node on the ancestor chain, with the attributes
/// identifier classification depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    // ── Roots and blocks ──────────────────────────────────────────────────
    Program,
    Block,
    StaticBlock,
    SwitchCase,
    CatchClause,

    // ── Declarations ──────────────────────────────────────────────────────
    VarDecl(VarKind),
    VarDeclarator,
    FnDecl,
    ClassDecl,
    Param,

    // ── Statements ────────────────────────────────────────────────────────
    ExprStmt,
    If,
    For,
    ForIn,
    ForOf,
    While,
    DoWhile,
    Switch,
    Try,
    Return,
    Throw,
    Break,
    Continue,
    Labeled,
    With,

    // ── Modules ───────────────────────────────────────────────────────────
    Import,
    ImportSpecifier,
    ExportNamed { reexport: bool },
    ExportSpecifier,
    ExportDefault,
    ExportAll,

    // ── Functions and classes ─────────────────────────────────────────────
    FnExpr,
    Arrow,
    ClassExpr,
    Method { kind: MethodKind, computed: bool },
    ClassProperty { computed: bool },

    // ── Expressions ───────────────────────────────────────────────────────
    Array,
    Object,
    Prop { kind: PropKind, computed: bool },
    Spread,
    Template,
    TaggedTemplate,
    Unary(UnaryOp),
    Update,
    Binary,
    Logical,
    Conditional,
    Assign,
    Sequence,
    Member { computed: bool },
    Call,
    New,
    Yield,
    Await,
    ImportCall,
    MetaProp,

    // ── Patterns ──────────────────────────────────────────────────────────
    ArrayPat,
    ObjectPat,
    KeyValuePatProp { computed: bool },
    AssignPatProp,
    RestElement,
    AssignPat,
}

impl NodeKind {
    /// Function declarations, function expressions and arrows.
    pub fn is_function(self) -> bool {
        matches!(self, NodeKind::FnDecl | NodeKind::FnExpr | NodeKind::Arrow)
    }

    /// Class declarations and class expressions.
    pub fn is_class(self) -> bool {
        matches!(self, NodeKind::ClassDecl | NodeKind::ClassExpr)
    }

    /// Statement-level nodes; classification never looks past one of these
    /// when searching for an enclosing expression.
    pub fn is_statement(self) -> bool {
        matches!(
            self,
            NodeKind::Block
                | NodeKind::VarDecl(_)
                | NodeKind::FnDecl
                | NodeKind::ClassDecl
                | NodeKind::ExprStmt
                | NodeKind::If
                | NodeKind::For
                | NodeKind::ForIn
                | NodeKind::ForOf
                | NodeKind::While
                | NodeKind::DoWhile
                | NodeKind::Switch
                | NodeKind::Try
                | NodeKind::Return
                | NodeKind::Throw
                | NodeKind::Break
                | NodeKind::Continue
                | NodeKind::Labeled
                | NodeKind::With
                | NodeKind::Program
        )
    }
}

/// The child slot of a node that the walk descended into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Edge {
    /// i-th entry of a statement list.
    Statement(usize),
    /// Single body: loops, labels, functions, arrows, `with`, catch.
    Body,
    /// i-th declarator of a variable declaration.
    Declarator(usize),
    Id,
    Init,
    /// i-th parameter of a function or arrow.
    Param(usize),
    /// The parameter of a catch clause.
    CatchParam,
    Pattern,
    Default,
    Key,
    Value,
    /// The identifier of a shorthand property, standing as key and value.
    Shorthand,
    /// i-th member of a class body.
    Member(usize),
    SuperClass,
    /// i-th entry of an object literal or object pattern.
    Prop(usize),
    Test,
    Consequent,
    Alternate,
    Update,
    Left,
    Right,
    Object,
    Property,
    Callee,
    /// Single operand (`return`, `throw`, unary, update, spread, rest, …).
    Argument,
    /// i-th call or `new` argument.
    Arguments(usize),
    /// i-th array element.
    Element(usize),
    /// The expression of an expression statement.
    Expression,
    /// i-th expression of a sequence or template.
    Expressions(usize),
    Case(usize),
    Discriminant,
    Block,
    Handler,
    Finalizer,
    Label,
    Specifier(usize),
    Local,
    Imported,
    Exported,
    Declaration,
    Source,
    Options,
    Meta,
    Tag,
    Quasi,
}

/// One frame of an ancestor chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ancestor {
    /// Production of the enclosing node.
    pub kind: NodeKind,
    /// Child slot of that node leading toward the current node.
    pub edge: Edge,
}

/// Edges from the root to a node; the identity of that node in the tree as
/// it currently stands.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct NodePath(pub Vec<Edge>);

impl NodePath {
    /// Number of edges from the root.
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// `true` if `self` is `other` or lies inside it.
    pub fn starts_with(&self, other: &NodePath) -> bool {
        self.0.starts_with(&other.0)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$")?;
        for edge in &self.0 {
            write!(f, ".{edge:?}")?;
        }
        Ok(())
    }
}

/// A handle on a context node: its production and its path.
///
/// Two handles are equal when they name the same node.
#[derive(Debug, Clone)]
pub struct ContextRef {
    /// Production of the context node.
    pub kind: NodeKind,
    /// Path of the context node.
    pub path: NodePath,
}

impl PartialEq for ContextRef {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for ContextRef {}

impl std::hash::Hash for ContextRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}

impl fmt::Display for ContextRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{}", self.kind, self.path)
    }
}

/// The ancestor chain of the node being visited.
///
/// Frames are stored root-first; [`Ancestors::get`] and [`Ancestors::iter`]
/// present them nearest-first, so index 0 is the parent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ancestors {
    frames: Vec<Ancestor>,
}

impl Ancestors {
    /// An empty chain (the walk is at the root).
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a chain from frames listed root-first.
    pub fn from_frames(frames: Vec<Ancestor>) -> Self {
        Self { frames }
    }

    /// Enters a node of `kind`, descending into `edge`.
    pub fn push(&mut self, kind: NodeKind, edge: Edge) {
        self.frames.push(Ancestor { kind, edge });
    }

    /// Moves the walk to another child slot of the innermost frame.
    pub fn at(&mut self, edge: Edge) -> &mut Self {
        if let Some(top) = self.frames.last_mut() {
            top.edge = edge;
        }
        self
    }

    /// Leaves the innermost frame.
    pub fn pop(&mut self) -> Option<Ancestor> {
        self.frames.pop()
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// `true` when the walk is at the root.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// The `i`-th ancestor, nearest first.
    pub fn get(&self, i: usize) -> Option<&Ancestor> {
        self.frames.len().checked_sub(i + 1).map(|idx| &self.frames[idx])
    }

    /// The immediate parent.
    pub fn parent(&self) -> Option<&Ancestor> {
        self.get(0)
    }

    /// The outermost frame.
    pub fn root(&self) -> Option<&Ancestor> {
        self.frames.first()
    }

    /// Frames nearest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Ancestor> + ExactSizeIterator {
        self.frames.iter().rev()
    }

    /// Path of the node the chain leads to.
    pub fn path(&self) -> NodePath {
        NodePath(self.frames.iter().map(|f| f.edge).collect())
    }

    /// Path of the `i`-th ancestor (nearest first).
    pub fn path_of(&self, i: usize) -> NodePath {
        let end = self.frames.len().saturating_sub(i + 1);
        NodePath(self.frames[..end].iter().map(|f| f.edge).collect())
    }

    /// Handle on the `i`-th ancestor, if there is one.
    pub fn context_ref(&self, i: usize) -> Option<ContextRef> {
        self.get(i).map(|a| ContextRef {
            kind: a.kind,
            path: self.path_of(i),
        })
    }

    /// The chain of the `i`-th ancestor itself (frames above it).
    pub fn above(&self, i: usize) -> Ancestors {
        let end = self.frames.len().saturating_sub(i + 1);
        Ancestors {
            frames: self.frames[..end].to_vec(),
        }
    }

    /// Extends this chain with the node of `kind` reached through `edge`,
    /// yielding the chain of one of its children.
    pub fn child(&self, kind: NodeKind, edge: Edge) -> Ancestors {
        let mut next = self.clone();
        next.push(kind, edge);
        next
    }
}
