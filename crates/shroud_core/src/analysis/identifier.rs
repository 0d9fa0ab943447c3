//! Identifier classification.
//!
//! [`classify`] derives the syntactic role of one identifier occurrence from
//! its ancestor chain alone. Descriptors are cheap to compute and are never
//! cached: any mutation of the tree may change them.
//!
//! Binding positions are found by climbing out of destructuring patterns.
//! Only the *value* side of a pattern is climbed (array elements, object
//! pattern values, rest arguments, the left of a default), so a key in an
//! object pattern and any identifier inside a default-value expression never
//! reach the declarator, parameter or assignment that owns the pattern.

use crate::error::{EngineError, EngineResult};
use crate::syntax::ast::{MethodKind, PropKind, UnaryOp, VarKind};
use crate::syntax::path::{Ancestor, Ancestors, Edge, NodeKind};
use crate::syntax::walk::Node;

/// The four flags every consumer of a descriptor cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpecFlags {
    /// A declaration wrapped directly by an `export`.
    pub is_exported: bool,
    /// The occurrence introduces a binding.
    pub is_defined: bool,
    /// The occurrence writes the binding (assignment, update, `delete`).
    pub is_modified: bool,
    /// The occurrence denotes a value lookup; false only for accessors,
    /// non-computed keys, meta-property parts, labels and module export
    /// names.
    pub is_referenced: bool,
}

/// Role descriptor of one identifier occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IdentifierInfo {
    /// `object.identifier`
    pub is_accessor: bool,
    /// `{ identifier: … }`, `class { identifier = … }`, `{ identifier: pat }`
    pub is_property_key: bool,
    /// `var identifier = …`, including destructured targets.
    pub is_variable_declaration: bool,
    /// The keyword of the declaration, when `is_variable_declaration`.
    pub var_kind: Option<VarKind>,
    /// `function identifier() {}`
    pub is_function_declaration: bool,
    /// `(function identifier() {})`
    pub is_named_function_expression: bool,
    /// `function f(identifier) {}`, including destructured parameters.
    pub is_function_parameter: bool,
    /// `catch (identifier) {}`
    pub is_clause_parameter: bool,
    /// `import identifier from "…"`, `import { x as identifier } …`
    pub is_import_binding: bool,
    /// `import { identifier as x }`, `export { x as identifier }`
    pub is_module_export_name: bool,
    /// `class identifier {}` or a named class expression.
    pub is_class_declaration: bool,
    /// Non-computed method, getter or setter key.
    pub is_method_definition: bool,
    /// `new.target`, `import.meta`
    pub is_meta_property: bool,
    /// `identifier: …`, `break identifier`, `continue identifier`
    pub is_label: bool,
    /// `delete identifier`, `delete identifier.x`
    pub is_delete_target: bool,
    /// `identifier(…)`, `new identifier(…)`
    pub is_function_call: bool,
    /// `identifier = …`, `[identifier] = …`, `for (identifier of …)`
    pub is_assignment_left: bool,
    /// `x = identifier`
    pub is_assignment_value: bool,
    /// `identifier++`
    pub is_update_operand: bool,
    /// `for (var identifier …)`
    pub is_for_initializer: bool,
    /// Derived flags.
    pub spec: SpecFlags,
}

/// Checks that the chain ends at a program root.
pub fn validate_chain(ancestors: &Ancestors) -> EngineResult<()> {
    match ancestors.root() {
        Some(root) if root.kind == NodeKind::Program => Ok(()),
        Some(root) => Err(EngineError::BrokenChain(format!(
            "chain is rooted at {:?}, not the program",
            root.kind
        ))),
        None => Err(EngineError::BrokenChain("identifier has no ancestors".into())),
    }
}

/// Classifies the identifier occurrence `node`.
///
/// # Errors
///
/// [`EngineError::InvalidArgument`] when `node` is not an identifier,
/// [`EngineError::BrokenChain`] when the chain does not end at the root.
pub fn classify(node: Node<'_>, ancestors: &Ancestors) -> EngineResult<IdentifierInfo> {
    let ident = node
        .as_ident()
        .ok_or_else(|| EngineError::InvalidArgument(format!("not an identifier: {node:?}")))?;
    validate_chain(ancestors)?;

    let mut info = IdentifierInfo::default();
    let parent = ancestors.parent().copied();
    let at = |kind_edge: fn(&Ancestor) -> bool| parent.as_ref().is_some_and(kind_edge);

    // ── Positions relative to the immediate parent ────────────────────────
    info.is_accessor = at(|a| {
        matches!(a.kind, NodeKind::Member { computed: false }) && a.edge == Edge::Property
    });
    info.is_property_key = at(|a| {
        a.edge == Edge::Key
            && matches!(
                a.kind,
                NodeKind::Prop { computed: false, .. }
                    | NodeKind::Method { computed: false, .. }
                    | NodeKind::ClassProperty { computed: false }
                    | NodeKind::KeyValuePatProp { computed: false }
            )
    });
    info.is_method_definition = at(|a| {
        a.edge == Edge::Key
            && matches!(
                a.kind,
                NodeKind::Method { computed: false, .. }
                    | NodeKind::Prop {
                        kind: PropKind::Get | PropKind::Set | PropKind::Method,
                        computed: false,
                    }
            )
    });
    info.is_meta_property = at(|a| a.kind == NodeKind::MetaProp);
    info.is_label = at(|a| {
        a.edge == Edge::Label
            && matches!(a.kind, NodeKind::Labeled | NodeKind::Break | NodeKind::Continue)
    });
    info.is_import_binding = at(|a| a.kind == NodeKind::ImportSpecifier && a.edge == Edge::Local);
    info.is_module_export_name = at(|a| {
        matches!(
            (a.kind, a.edge),
            (NodeKind::ImportSpecifier, Edge::Imported)
                | (NodeKind::ExportSpecifier, Edge::Exported)
                | (NodeKind::ExportAll, Edge::Exported)
        )
    }) || is_reexported_local(ancestors);
    info.is_function_declaration = at(|a| a.kind == NodeKind::FnDecl && a.edge == Edge::Id);
    info.is_named_function_expression = at(|a| a.kind == NodeKind::FnExpr && a.edge == Edge::Id);
    info.is_class_declaration = at(|a| a.kind.is_class() && a.edge == Edge::Id);
    info.is_function_call = at(|a| matches!(a.kind, NodeKind::Call | NodeKind::New) && a.edge == Edge::Callee);
    info.is_update_operand = at(|a| a.kind == NodeKind::Update);
    info.is_delete_target = is_delete_target(ancestors);
    info.is_assignment_value = is_assignment_value(ancestors);

    // ── Binding positions, found by climbing out of patterns ──────────────
    let owner = ancestors
        .iter()
        .position(|a| !is_pattern_step(a))
        .unwrap_or(ancestors.len());
    match (ancestors.get(owner), ancestors.get(owner + 1)) {
        (Some(a), Some(decl)) if a.kind == NodeKind::VarDeclarator && a.edge == Edge::Id => {
            if let NodeKind::VarDecl(kind) = decl.kind {
                info.is_variable_declaration = true;
                info.var_kind = Some(kind);
                info.is_for_initializer = ancestors.get(owner + 2).is_some_and(|f| {
                    matches!(
                        (f.kind, f.edge),
                        (NodeKind::For, Edge::Init)
                            | (NodeKind::ForIn, Edge::Left)
                            | (NodeKind::ForOf, Edge::Left)
                    )
                });
                info.spec.is_exported = ancestors.get(owner + 2).is_some_and(is_export_wrapper);
            }
        }
        (Some(a), Some(f))
            if a.kind == NodeKind::Param
                && a.edge == Edge::Pattern
                && f.kind.is_function()
                && matches!(f.edge, Edge::Param(_)) =>
        {
            info.is_function_parameter = true;
        }
        (Some(a), _) if a.kind == NodeKind::CatchClause && a.edge == Edge::CatchParam => {
            info.is_clause_parameter = true;
        }
        (Some(a), _)
            if matches!(
                (a.kind, a.edge),
                (NodeKind::Assign, Edge::Left) | (NodeKind::ForIn, Edge::Left) | (NodeKind::ForOf, Edge::Left)
            ) =>
        {
            info.is_assignment_left = true;
        }
        _ => {}
    }

    if info.is_function_declaration || (info.is_class_declaration && at(|a| a.kind == NodeKind::ClassDecl)) {
        info.spec.is_exported = ancestors.get(1).is_some_and(is_export_wrapper);
    }

    info.spec.is_defined = info.is_variable_declaration
        || info.is_function_declaration
        || info.is_named_function_expression
        || info.is_function_parameter
        || info.is_class_declaration
        || info.is_clause_parameter
        || info.is_method_definition
        || info.is_import_binding;
    info.spec.is_modified = info.is_assignment_left || info.is_update_operand || info.is_delete_target;
    info.spec.is_referenced = !info.is_accessor
        && !info.is_property_key
        && !info.is_meta_property
        && !info.is_label
        && !info.is_module_export_name;

    tracing::trace!(name = %ident.name, spec = ?info.spec, "classified identifier");
    Ok(info)
}

/// A step from a pattern into the part of it that binds.
fn is_pattern_step(a: &Ancestor) -> bool {
    matches!(
        (a.kind, a.edge),
        (NodeKind::ArrayPat, Edge::Element(_))
            | (NodeKind::ObjectPat, Edge::Prop(_))
            | (NodeKind::KeyValuePatProp { .. }, Edge::Value)
            | (NodeKind::AssignPatProp, Edge::Shorthand)
            | (NodeKind::RestElement, Edge::Argument)
            | (NodeKind::AssignPat, Edge::Left)
    )
}

fn is_export_wrapper(a: &Ancestor) -> bool {
    matches!(a.kind, NodeKind::ExportNamed { .. } | NodeKind::ExportDefault) && a.edge == Edge::Declaration
}

/// `export { identifier } from "…"` names a binding of another module.
fn is_reexported_local(ancestors: &Ancestors) -> bool {
    matches!(
        (ancestors.get(0), ancestors.get(1)),
        (Some(spec), Some(decl))
            if spec.kind == NodeKind::ExportSpecifier
                && spec.edge == Edge::Local
                && matches!(decl.kind, NodeKind::ExportNamed { reexport: true })
    )
}

/// The operand of `delete`, or the base object of the deleted member.
fn is_delete_target(ancestors: &Ancestors) -> bool {
    ancestors
        .iter()
        .find(|a| !(matches!(a.kind, NodeKind::Member { .. }) && a.edge == Edge::Object))
        .is_some_and(|a| a.kind == NodeKind::Unary(UnaryOp::Delete))
}

/// Inside the right-hand side of the nearest assignment within the same
/// statement and function.
fn is_assignment_value(ancestors: &Ancestors) -> bool {
    for a in ancestors.iter() {
        if a.kind == NodeKind::Assign {
            return a.edge == Edge::Right;
        }
        if a.kind.is_statement() || a.kind.is_function() {
            return false;
        }
    }
    false
}

/// `true` for method, getter and setter values; the function itself cannot
/// be relocated or renamed independently of its key.
pub fn is_method_value(ancestors: &Ancestors) -> bool {
    ancestors.parent().is_some_and(|a| {
        a.edge == Edge::Value
            && matches!(
                a.kind,
                NodeKind::Method { .. }
                    | NodeKind::Prop {
                        kind: PropKind::Get | PropKind::Set | PropKind::Method,
                        ..
                    }
            )
    })
}

/// The method kind of a class method value, if the chain is at one.
pub fn method_kind(ancestors: &Ancestors) -> Option<MethodKind> {
    match ancestors.parent() {
        Some(Ancestor {
            kind: NodeKind::Method { kind, .. },
            edge: Edge::Value,
        }) => Some(*kind),
        _ => None,
    }
}
