//! Variable and lexical contexts.
//!
//! Function-like nodes, class static blocks and the program root are
//! *variable contexts*: they own `var` and function-declared bindings.
//! Blocks, static blocks and the program root are *lexical contexts*: they
//! own `let`, `const` and `class` bindings. The root is both, so on a
//! well-formed chain both searches always succeed.

use crate::error::{EngineError, EngineResult};
use crate::syntax::ast::{Expr, Stmt};
use crate::syntax::path::{Ancestors, ContextRef, NodeKind};
use crate::syntax::walk::{Node, function_kind};

/// `true` for nodes that own function-scoped bindings.
pub fn is_variable_context(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::FnDecl
            | NodeKind::FnExpr
            | NodeKind::Arrow
            | NodeKind::StaticBlock
            | NodeKind::Program
    )
}

/// `true` for nodes that own block-scoped bindings.
pub fn is_lexical_context(kind: NodeKind) -> bool {
    matches!(kind, NodeKind::Block | NodeKind::StaticBlock | NodeKind::Program)
}

/// `true` for either kind of context.
pub fn is_any_context(kind: NodeKind) -> bool {
    is_variable_context(kind) || is_lexical_context(kind)
}

/// The production of `node` when it can be a context.
pub fn context_kind(node: Node<'_>, ancestors: &Ancestors) -> Option<NodeKind> {
    match node {
        Node::Program(_) => Some(NodeKind::Program),
        Node::Block(_) | Node::Stmt(Stmt::Block(_)) => Some(NodeKind::Block),
        Node::Stmt(Stmt::FnDecl(_)) => Some(NodeKind::FnDecl),
        Node::Expr(Expr::Fn(_)) => Some(NodeKind::FnExpr),
        Node::Expr(Expr::Arrow(_)) => Some(NodeKind::Arrow),
        Node::Function(f) => Some(function_kind(f, ancestors)),
        _ => None,
    }
}

/// The nearest variable context of `node`: the node itself if it is one,
/// else the first matching ancestor.
pub fn nearest_variable_context(node: Node<'_>, ancestors: &Ancestors) -> EngineResult<ContextRef> {
    nearest(node, ancestors, is_variable_context, "variable")
}

/// The nearest lexical context of `node`: the node itself if it is one,
/// else the first matching ancestor.
pub fn nearest_lexical_context(node: Node<'_>, ancestors: &Ancestors) -> EngineResult<ContextRef> {
    nearest(node, ancestors, is_lexical_context, "lexical")
}

/// The first ancestor (the node itself excluded) accepted by `pred`.
pub fn nearest_ancestor_context(
    ancestors: &Ancestors,
    pred: fn(NodeKind) -> bool,
) -> Option<ContextRef> {
    let i = ancestors.iter().position(|a| pred(a.kind))?;
    ancestors.context_ref(i)
}

/// Every context enclosing `node`, nearest first, the node included.
pub fn all_contexts(node: Node<'_>, ancestors: &Ancestors) -> Vec<ContextRef> {
    let own = context_kind(node, ancestors)
        .filter(|k| is_any_context(*k))
        .map(|kind| ContextRef {
            kind,
            path: ancestors.path(),
        });
    own.into_iter()
        .chain(
            ancestors
                .iter()
                .enumerate()
                .filter(|(_, a)| is_any_context(a.kind))
                .filter_map(|(i, _)| ancestors.context_ref(i)),
        )
        .collect()
}

fn nearest(
    node: Node<'_>,
    ancestors: &Ancestors,
    pred: fn(NodeKind) -> bool,
    what: &str,
) -> EngineResult<ContextRef> {
    if let Some(kind) = context_kind(node, ancestors)
        && pred(kind)
    {
        return Ok(ContextRef {
            kind,
            path: ancestors.path(),
        });
    }
    nearest_ancestor_context(ancestors, pred).ok_or_else(|| {
        EngineError::BrokenChain(format!("no enclosing {what} context; chain does not reach the root"))
    })
}
