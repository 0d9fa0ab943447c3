//! Scope attribution.
//!
//! # Overview
//!
//! [`defining_context`] answers "which context owns the binding this
//! occurrence introduces", following the hoisting rules:
//!
//! - `var`, function declarations, parameters, imports and method keys
//!   belong to the nearest variable context (function, static block or
//!   root). A function declaration's own frame is skipped: its name lives in
//!   the context *around* it.
//! - `let`, `const` and `class` belong to the nearest lexical context
//!   (block, static block or root).
//! - The name of a function expression belongs to the expression itself.
//!
//! [`referencing_contexts`] returns the candidate resolution contexts of a
//! reference as `[variable, lexical]`; callers pick the narrowest or widest.
//!
//! Everything here is a pure function of the current chain. Results go stale
//! after any mutation and must be recomputed.

use crate::analysis::context::{nearest_ancestor_context, is_lexical_context, is_variable_context};
use crate::analysis::identifier::{IdentifierInfo, classify};
use crate::error::{EngineError, EngineResult};
use crate::syntax::ast::VarKind;
use crate::syntax::path::{Ancestors, ContextRef, NodeKind};
use crate::syntax::walk::Node;

// ─────────────────────────────────────────────────────────────────────────────
// Binding kind
// ─────────────────────────────────────────────────────────────────────────────

/// The syntactic origin of a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    /// `var` declaration: function-scoped, hoisted and initialised to
    /// `undefined`.
    Var,
    /// `let` declaration: block-scoped, TDZ-guarded.
    Let,
    /// `const` declaration: block-scoped, TDZ-guarded, non-reassignable.
    Const,
    /// `function` declaration: hoisted to the enclosing variable context.
    Function,
    /// `class` declaration or named class expression: block-scoped.
    Class,
    /// A formal parameter of a function.
    Param,
    /// The parameter of a `catch` clause.
    CatchParam,
    /// A binding introduced by an `import` declaration.
    Import,
    /// A non-computed method, getter or setter key.
    Method,
    /// The name of a named function expression, visible only inside it.
    FunctionName,
}

impl BindingKind {
    /// Derives the binding kind from a descriptor; `None` for occurrences
    /// that define nothing.
    pub fn of(info: &IdentifierInfo) -> Option<BindingKind> {
        if !info.spec.is_defined {
            return None;
        }
        Some(if info.is_variable_declaration {
            match info.var_kind {
                Some(VarKind::Let) => BindingKind::Let,
                Some(VarKind::Const) => BindingKind::Const,
                Some(VarKind::Var) | None => BindingKind::Var,
            }
        } else if info.is_function_declaration {
            BindingKind::Function
        } else if info.is_named_function_expression {
            BindingKind::FunctionName
        } else if info.is_class_declaration {
            BindingKind::Class
        } else if info.is_function_parameter {
            BindingKind::Param
        } else if info.is_clause_parameter {
            BindingKind::CatchParam
        } else if info.is_import_binding {
            BindingKind::Import
        } else {
            BindingKind::Method
        })
    }

    /// Returns `true` for bindings that are subject to the Temporal Dead Zone
    /// (`let`, `const`, `class`).
    pub fn has_tdz(self) -> bool {
        matches!(self, BindingKind::Let | BindingKind::Const | BindingKind::Class)
    }

    /// Returns `true` if the binding is hoisted to the enclosing variable
    /// context.
    pub fn is_function_scoped(self) -> bool {
        !self.has_tdz() && self != BindingKind::FunctionName
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Attribution
// ─────────────────────────────────────────────────────────────────────────────

/// The single context owning the binding introduced by `node`.
///
/// # Errors
///
/// [`EngineError::NotDefined`] when `node` is not a defining occurrence, plus
/// any classification error.
pub fn defining_context(node: Node<'_>, ancestors: &Ancestors) -> EngineResult<ContextRef> {
    let info = classify(node, ancestors)?;
    defining_context_of(node, &info, ancestors)
}

/// [`defining_context`] with a descriptor the caller already computed.
pub fn defining_context_of(
    node: Node<'_>,
    info: &IdentifierInfo,
    ancestors: &Ancestors,
) -> EngineResult<ContextRef> {
    let kind = BindingKind::of(info).ok_or_else(|| not_defined(node))?;
    let found = match kind {
        BindingKind::Function => {
            // Skip the declaration's own frame.
            let outer = ancestors.above(0);
            nearest_ancestor_context(&outer, is_variable_context)
        }
        BindingKind::FunctionName => ancestors.context_ref(0),
        BindingKind::Let | BindingKind::Const | BindingKind::Class => {
            nearest_ancestor_context(ancestors, is_lexical_context)
        }
        BindingKind::Var
        | BindingKind::Param
        | BindingKind::CatchParam
        | BindingKind::Import
        | BindingKind::Method => nearest_ancestor_context(ancestors, is_variable_context),
    };
    found.ok_or_else(|| EngineError::BrokenChain(format!("no owning context for {kind:?} binding")))
}

/// Like [`defining_context`], except that a catch parameter is owned by its
/// catch clause alone.
pub fn all_defining_contexts(node: Node<'_>, ancestors: &Ancestors) -> EngineResult<Vec<ContextRef>> {
    let info = classify(node, ancestors)?;
    all_defining_contexts_of(node, &info, ancestors)
}

/// [`all_defining_contexts`] with a descriptor the caller already computed.
pub fn all_defining_contexts_of(
    node: Node<'_>,
    info: &IdentifierInfo,
    ancestors: &Ancestors,
) -> EngineResult<Vec<ContextRef>> {
    if info.is_clause_parameter
        && let Some(i) = ancestors.iter().position(|a| a.kind == NodeKind::CatchClause)
        && let Some(clause) = ancestors.context_ref(i)
    {
        return Ok(vec![clause]);
    }
    Ok(vec![defining_context_of(node, info, ancestors)?])
}

/// Candidate resolution contexts of a reference: `[variable, lexical]`.
///
/// # Errors
///
/// [`EngineError::InvalidArgument`] when `node` is not a referencing
/// occurrence (keys, labels, accessors, meta-property parts).
pub fn referencing_contexts(node: Node<'_>, ancestors: &Ancestors) -> EngineResult<[ContextRef; 2]> {
    let info = classify(node, ancestors)?;
    referencing_contexts_of(node, &info, ancestors)
}

/// [`referencing_contexts`] with a descriptor the caller already computed.
pub fn referencing_contexts_of(
    node: Node<'_>,
    info: &IdentifierInfo,
    ancestors: &Ancestors,
) -> EngineResult<[ContextRef; 2]> {
    if !info.spec.is_referenced {
        return Err(EngineError::InvalidArgument(format!(
            "`{}` is not a referencing occurrence",
            ident_name(node)
        )));
    }
    let broken = || EngineError::BrokenChain("reference outside any context".into());
    let var = nearest_ancestor_context(ancestors, is_variable_context).ok_or_else(broken)?;
    let lex = nearest_ancestor_context(ancestors, is_lexical_context).ok_or_else(broken)?;
    Ok([var, lex])
}

fn ident_name(node: Node<'_>) -> String {
    node.as_ident().map(|i| i.name.clone()).unwrap_or_default()
}

fn not_defined(node: Node<'_>) -> EngineError {
    EngineError::NotDefined(format!("`{}` does not introduce a binding", ident_name(node)))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
