//! Variable virtualization.
//!
//! Moves the parameters and locals of an eligible function into one
//! rest-parameter array, the *frame*, addressed by slot keys:
//!
//! ```text
//! function add(a, b) {          function add(...F) {
//!   var c = a + b;                F["length"] = 2;
//!   return c;            ==>      F[7] = F[1], F[63] = -12;
//! }                               F.q = F[0] + F[7];
//!                                 if (F[63] > 31) { return F[-88]; } else { return F.q; }
//!                               }
//! ```
//!
//! Between top-level statements the transform inserts *rotations* that move
//! slots to fresh keys and write decoy values into unused slots. Integer
//! literals are then disguised as reads of those decoys
//! (`F[decoy] - (decoyValue - n)`), and top-level returns are guarded by a
//! branch on a decoy that can never be taken.
//!
//! A function is only rewritten when every local can be relocated safely;
//! otherwise it is left exactly as it was.

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use tracing::{debug, trace};

use super::context::{HelperKind, RunContext, call_function_length};
use super::edit::{Statements, function_length, replace_expr, replace_pat, replace_stmt};
use super::naming::{NO_RENAME_PREFIX, NameGenerator, is_reserved};
use super::{Deferred, Transform, defer};
use crate::analysis::identifier::{classify, is_method_value};
use crate::analysis::scope::{BindingKind, defining_context_of, referencing_contexts_of};
use crate::config::{Options, Probability};
use crate::error::{EngineError, EngineResult};
use crate::syntax::ast::*;
use crate::syntax::build::*;
use crate::syntax::path::{Ancestors, Edge, NodeKind, NodePath};
use crate::syntax::walk::{Flow, Node, NodeMut, VisitMut, function_kind, walk_node};

const NAME: &str = "Virtualize";

/// Integer literals at or above this magnitude are never disguised.
const MAX_DISGUISED: f64 = 100_000.0;

/// Deepest nesting of decoy arithmetic in one disguised literal.
const MAX_DISGUISE_DEPTH: u32 = 4;

/// The variable virtualization transform.
#[derive(Debug, Clone, Default)]
pub struct Virtualize {
    density: Option<Probability>,
}

impl Virtualize {
    /// Density taken from `Options::virtualize`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the configured density.
    pub fn with_density(density: Probability) -> Self {
        Self {
            density: Some(density),
        }
    }
}

impl Transform for Virtualize {
    fn name(&self) -> &'static str {
        NAME
    }

    fn matches(&self, node: Node<'_>, _ancestors: &Ancestors) -> bool {
        matches!(
            node,
            Node::Stmt(Stmt::FnDecl(_))
                | Node::Expr(Expr::Fn(_))
                | Node::Expr(Expr::Arrow(_))
                | Node::Function(_)
        )
    }

    fn transform(
        &mut self,
        _node: NodeMut<'_>,
        _ancestors: &Ancestors,
        _cx: &mut RunContext,
    ) -> EngineResult<Option<Deferred>> {
        let density = self.density;
        Ok(Some(defer(move |node, ancestors, cx| {
            let density = density.unwrap_or(cx.options().virtualize);
            virtualize(node, ancestors, cx, density)
        })))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Target
// ─────────────────────────────────────────────────────────────────────────────

/// The parts of a function-like node the transform rewrites.
struct Target<'a> {
    kind: NodeKind,
    name: Option<String>,
    is_generator: bool,
    params: &'a mut Vec<Param>,
    body: &'a mut BlockStmt,
}

fn target<'a>(node: NodeMut<'a>, ancestors: &Ancestors) -> Option<Target<'a>> {
    let (kind, f) = match node {
        NodeMut::Stmt(Stmt::FnDecl(f)) => (NodeKind::FnDecl, &mut **f),
        NodeMut::Expr(Expr::Fn(f)) => (NodeKind::FnExpr, &mut **f),
        NodeMut::Function(f) => (function_kind(f, ancestors), f),
        NodeMut::Expr(Expr::Arrow(a)) => {
            let ArrowExpr { params, body, .. } = &mut **a;
            let ArrowBody::Block(body) = body else {
                return None;
            };
            return Some(Target {
                kind: NodeKind::Arrow,
                name: None,
                is_generator: false,
                params,
                body,
            });
        }
        _ => return None,
    };
    Some(Target {
        kind,
        name: f.id.as_ref().map(|i| i.name.clone()),
        is_generator: f.is_generator,
        params: &mut f.params,
        body: &mut f.body,
    })
}

/// Names of simple parameters, or `None` if any parameter is not simple.
fn simple_param_names(params: &[Param]) -> Option<Vec<String>> {
    params
        .iter()
        .map(|p| match (&p.pat, p.is_simple()) {
            (Pat::Ident(i), true) => Some(i.name.clone()),
            _ => None,
        })
        .collect()
}

fn virtualize(
    mut node: NodeMut<'_>,
    ancestors: &Ancestors,
    cx: &mut RunContext,
    density: Probability,
) -> EngineResult<()> {
    if is_method_value(ancestors) {
        return Err(EngineError::UnsupportedConstruct(
            "method, getter or setter value".into(),
        ));
    }
    let fn_path = ancestors.path();
    let Some(t) = target(node.reborrow(), ancestors) else {
        debug!(function = %fn_path, reason = "expression body", "not virtualized");
        return Ok(());
    };
    let kind = t.kind;
    let name = t.name.clone();
    let arity = function_length(t.params);
    let anonymous_default = ancestors
        .parent()
        .is_some_and(|a| a.kind == NodeKind::ExportDefault)
        && name.is_none();

    let shape = if t.is_generator {
        Err("generator")
    } else if t.body.body.first().is_some_and(Stmt::is_directive) {
        Err("directive prologue")
    } else if anonymous_default && arity > 0 {
        Err("anonymous default export with parameters")
    } else {
        simple_param_names(t.params).ok_or("non-simple parameters")
    };
    let params = match shape {
        Ok(params) => params,
        Err(reason) => {
            debug!(function = %fn_path, reason, "not virtualized");
            return Ok(());
        }
    };
    if !density.roll(cx.rng()) {
        trace!(function = %fn_path, "skipped by density");
        return Ok(());
    }

    let body_chain = ancestors.child(kind, Edge::Body);
    let mut survey = Survey::new(fn_path.clone(), &body_chain, &params, cx.options());
    walk_node(NodeMut::Block(&mut *t.body), &mut body_chain.clone(), &mut survey)?;
    let Some(names) = survey.relocatable(&params, &fn_path) else {
        return Ok(());
    };
    let slots = assign_slots(&params, names, cx);

    let frame_name = format!("{}_frame", cx.placeholder());
    let slot_count = slots.len();
    let mut frame = Frame {
        name: frame_name.clone(),
        slots,
        decoys: BTreeMap::new(),
        keys: cx.name_generator(None),
        disguised: 0,
    };
    rewrite_body(t.body, &body_chain, &fn_path, &mut frame, cx)?;

    let mut seed = expr_stmt(assign(
        Pat::Expr(Box::new(static_member(ident_expr(frame_name.clone()), "length"))),
        number(params.len() as f64),
    ));
    cx.comment(seed.meta_mut(), NAME, "frame length");
    t.body.prepend(vec![seed]);
    *t.params = vec![rest_param(frame_name)];

    debug!(
        function = name.as_deref().unwrap_or("<anonymous>"),
        path = %fn_path,
        slots = slot_count,
        arity,
        "virtualized"
    );

    if arity > 0 {
        let helper = cx.helper(HelperKind::FunctionLength);
        match (kind, name) {
            (NodeKind::FnDecl, Some(name)) => {
                cx.insert_before_current_statement(expr_stmt(call_function_length(
                    &helper,
                    ident_expr(name),
                    arity,
                )));
            }
            _ => {
                if let NodeMut::Expr(e) = node {
                    let function = std::mem::replace(e, undefined());
                    *e = call_function_length(&helper, function, arity);
                }
            }
        }
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Survey
// ─────────────────────────────────────────────────────────────────────────────

/// Finds the locals that can move into the frame, and anything that makes
/// the whole function ineligible.
struct Survey<'o> {
    fn_path: NodePath,
    body_path: NodePath,
    options: &'o Options,
    /// Depth inside nested non-arrow functions and classes.
    opaque: usize,
    /// Depth inside class bodies.
    classes: usize,
    ineligible: Option<&'static str>,
    defined: BTreeSet<String>,
    /// Defined names in order of first definition.
    order: Vec<String>,
    illegal: BTreeSet<String>,
}

impl<'o> Survey<'o> {
    fn new(fn_path: NodePath, body_chain: &Ancestors, params: &[String], options: &'o Options) -> Self {
        Self {
            fn_path,
            body_path: body_chain.path(),
            options,
            opaque: 0,
            classes: 0,
            ineligible: None,
            defined: params.iter().cloned().collect(),
            order: Vec::new(),
            illegal: BTreeSet::new(),
        }
    }

    fn refuse(&mut self, reason: &'static str) {
        self.ineligible.get_or_insert(reason);
    }

    fn disqualify(&mut self, name: &str) {
        if self.illegal.insert(name.to_string()) {
            trace!(name, "disqualified");
        }
    }

    fn identifier(&mut self, node: Node<'_>, ancestors: &Ancestors) -> EngineResult<()> {
        let Some(ident) = node.as_ident() else {
            return Ok(());
        };
        let info = classify(node, ancestors)?;
        if !info.spec.is_referenced || info.spec.is_exported {
            return Ok(());
        }
        let name = ident.name.as_str();

        let owned_here = if info.spec.is_defined {
            let binding = BindingKind::of(&info);
            let owner = defining_context_of(node, &info, ancestors)?;
            owner.path == self.fn_path
                || (owner.path == self.body_path
                    && matches!(
                        binding,
                        Some(BindingKind::Let | BindingKind::Const | BindingKind::Class)
                    ))
        } else {
            let [var, _] = referencing_contexts_of(node, &info, ancestors)?;
            var.path == self.fn_path
        };
        let class_expression_name = info.is_class_declaration
            && ancestors.parent().is_some_and(|a| a.kind == NodeKind::ClassExpr);
        let inside_class = self.classes > 0 && !info.is_class_declaration;

        if !owned_here
            || class_expression_name
            || inside_class
            || name.starts_with(NO_RENAME_PREFIX)
            || self.options.is_global(name)
            || is_reserved(name)
            || info.is_clause_parameter
            || info.is_function_parameter
            || info.is_for_initializer
            || info.is_delete_target
        {
            self.disqualify(name);
        }

        if info.spec.is_defined {
            if self.defined.insert(name.to_string()) {
                self.order.push(name.to_string());
            } else {
                self.disqualify(name);
            }
            if info.is_function_declaration {
                let first = ancestors.get(1).is_some_and(|a| a.edge == Edge::Statement(0))
                    && ancestors.path_of(1) == self.body_path;
                if !first {
                    self.disqualify(name);
                }
            }
        }
        Ok(())
    }

    /// Defined names that can move into the frame, in definition order, or
    /// `None` when the function must stay as it is.
    fn relocatable(self, params: &[String], fn_path: &NodePath) -> Option<Vec<String>> {
        if let Some(reason) = self.ineligible {
            debug!(function = %fn_path, reason, "not virtualized");
            return None;
        }
        let unique: BTreeSet<_> = params.iter().collect();
        if unique.len() != params.len() {
            debug!(function = %fn_path, reason = "duplicate parameter", "not virtualized");
            return None;
        }
        if let Some(p) = params.iter().find(|p| {
            self.illegal.contains(*p)
                || is_reserved(p)
                || p.starts_with(NO_RENAME_PREFIX)
                || self.options.is_global(p)
        }) {
            debug!(function = %fn_path, parameter = %p, reason = "parameter disqualified", "not virtualized");
            return None;
        }
        let names: Vec<String> = self
            .order
            .into_iter()
            .filter(|n| !self.illegal.contains(n))
            .collect();
        if params.is_empty() && names.is_empty() {
            debug!(function = %fn_path, reason = "nothing to relocate", "not virtualized");
            return None;
        }
        Some(names)
    }
}

/// Parameters keep their positional index; every other name gets either the
/// next dense index or a generated property name.
fn assign_slots(params: &[String], names: Vec<String>, cx: &mut RunContext) -> BTreeMap<String, SlotKey> {
    let mut slots = BTreeMap::new();
    for (i, p) in params.iter().enumerate() {
        slots.insert(p.clone(), SlotKey::Index(i as i64));
    }
    let mut keys = cx.name_generator(None);
    let mut next = params.len() as i64;
    for name in names {
        let key = if cx.rng().gen_bool(0.5) {
            next += 1;
            SlotKey::Index(next - 1)
        } else {
            SlotKey::Name(keys.generate(cx.rng()))
        };
        trace!(%name, ?key, "slot assigned");
        slots.insert(name, key);
    }
    slots
}

impl VisitMut for Survey<'_> {
    fn enter(&mut self, mut node: NodeMut<'_>, ancestors: &Ancestors) -> EngineResult<Flow> {
        let top = self.opaque == 0;
        match node.as_node() {
            Node::Stmt(Stmt::With(_)) => self.refuse("with statement"),
            Node::Expr(Expr::Call(c)) if matches!(&*c.callee, Expr::Ident(i) if i.name == "eval") => {
                self.refuse("direct eval")
            }
            Node::Expr(Expr::This(_)) if top => self.refuse("uses this"),
            Node::Expr(Expr::Super(_)) if top => self.refuse("uses super"),
            Node::Expr(Expr::MetaProp(m)) if top && m.object.name == "new" => {
                self.refuse("uses new.target")
            }
            Node::Expr(Expr::Ident(i)) if top && i.name == "arguments" => {
                self.refuse("uses arguments")
            }
            _ => {}
        }

        // Bindings whose value cannot be relocated.
        let mut unmovable = Vec::new();
        match node.reborrow() {
            NodeMut::Stmt(Stmt::VarDecl(d)) => {
                let single = d.declarators.len() == 1;
                for decl in &mut d.declarators {
                    let movable = single
                        && matches!(decl.id, Pat::Ident(_))
                        && match decl.init.as_deref_mut() {
                            Some(init) => relocatable(init)?,
                            None => true,
                        };
                    if !movable {
                        bound_names(&decl.id, &mut unmovable);
                    }
                }
            }
            NodeMut::Stmt(Stmt::FnDecl(f)) => {
                if uses_receiver(NodeMut::Block(&mut f.body))?
                    && let Some(id) = &f.id
                {
                    unmovable.push(id.name.clone());
                }
            }
            NodeMut::Expr(Expr::Assign(a)) => {
                if let Pat::Ident(i) = &a.left
                    && !relocatable(&mut a.right)?
                {
                    unmovable.push(i.name.clone());
                }
            }
            _ => {}
        }
        for name in &unmovable {
            self.disqualify(name);
        }

        self.identifier(node.as_node(), ancestors)?;
        self.nest(node.as_node(), 1);
        Ok(Flow::Continue)
    }

    fn exit(&mut self, node: NodeMut<'_>, _ancestors: &Ancestors) -> EngineResult<()> {
        self.nest(node.as_node(), -1);
        Ok(())
    }
}

impl Survey<'_> {
    fn nest(&mut self, node: Node<'_>, by: isize) {
        let class = matches!(node, Node::Stmt(Stmt::ClassDecl(_)) | Node::Expr(Expr::Class(_)));
        let function = matches!(
            node,
            Node::Stmt(Stmt::FnDecl(_)) | Node::Expr(Expr::Fn(_)) | Node::Function(_)
        );
        if class || function {
            self.opaque = self.opaque.saturating_add_signed(by);
        }
        if class {
            self.classes = self.classes.saturating_add_signed(by);
        }
    }
}

/// Names bound by a declaration pattern.
fn bound_names(pat: &Pat, out: &mut Vec<String>) {
    match pat {
        Pat::Ident(i) => out.push(i.name.clone()),
        Pat::Array(a) => a.elements.iter().flatten().for_each(|p| bound_names(p, out)),
        Pat::Object(o) => {
            for prop in &o.properties {
                match prop {
                    ObjectPatProp::KeyValue(kv) => bound_names(&kv.value, out),
                    ObjectPatProp::Assign(ap) => out.push(ap.key.name.clone()),
                    ObjectPatProp::Rest(r) => bound_names(&r.argument, out),
                }
            }
        }
        Pat::Rest(r) => bound_names(&r.argument, out),
        Pat::Assign(a) => bound_names(&a.left, out),
        Pat::Expr(_) => {}
    }
}

/// A function or class value that can be stored in a frame slot and called
/// through it: one that never looks at its receiver.
fn relocatable(value: &mut Expr) -> EngineResult<bool> {
    match value {
        Expr::Fn(_) | Expr::Arrow(_) | Expr::Class(_) => Ok(!uses_receiver(NodeMut::Expr(value))?),
        _ => Ok(true),
    }
}

struct ReceiverFinder(bool);

impl VisitMut for ReceiverFinder {
    fn enter(&mut self, node: NodeMut<'_>, _ancestors: &Ancestors) -> EngineResult<Flow> {
        if matches!(node.as_node(), Node::Expr(Expr::This(_) | Expr::Super(_))) {
            self.0 = true;
        }
        Ok(if self.0 { Flow::Skip } else { Flow::Continue })
    }
}

/// `true` if `this` or `super` appears anywhere under `node`.
fn uses_receiver(node: NodeMut<'_>) -> EngineResult<bool> {
    let mut finder = ReceiverFinder(false);
    walk_node(node, &mut Ancestors::new(), &mut finder)?;
    Ok(finder.0)
}

// ─────────────────────────────────────────────────────────────────────────────
// Frame
// ─────────────────────────────────────────────────────────────────────────────

/// A frame slot: a numeric index or a property name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SlotKey {
    Index(i64),
    Name(String),
}

/// Rewrite-time state of one function's frame.
struct Frame {
    name: String,
    /// Current slot of every relocated name.
    slots: BTreeMap<String, SlotKey>,
    /// Value last written to every decoy slot.
    decoys: BTreeMap<SlotKey, i64>,
    keys: NameGenerator,
    disguised: u32,
}

impl Frame {
    fn random_decoy(&self, cx: &mut RunContext) -> Option<(SlotKey, i64)> {
        if self.decoys.is_empty() {
            return None;
        }
        let i = cx.rng().gen_range(0..self.decoys.len());
        self.decoys.iter().nth(i).map(|(k, v)| (k.clone(), *v))
    }

    /// `n`, possibly disguised as decoy arithmetic.
    fn number(&mut self, cx: &mut RunContext, n: f64, depth: u32) -> Expr {
        if self.decoys.is_empty()
            || depth > MAX_DISGUISE_DEPTH
            || cx.chance(75.0 + f64::from(depth) * 15.0 + f64::from(self.disguised) / 25.0)
        {
            return number(n);
        }
        let Some((key, value)) = self.random_decoy(cx) else {
            return number(n);
        };
        self.disguised += 1;
        let read = member(ident_expr(self.name.clone()), self.key(cx, &key, depth + 1));
        binary(BinaryOp::Sub, read, self.number(cx, value as f64 - n, depth + 1))
    }

    fn key(&mut self, cx: &mut RunContext, key: &SlotKey, depth: u32) -> Expr {
        match key {
            SlotKey::Index(i) => self.number(cx, *i as f64, depth),
            SlotKey::Name(s) => string(s.clone()),
        }
    }

    /// `frame[key]`
    fn slot(&mut self, cx: &mut RunContext, key: &SlotKey) -> Expr {
        member(ident_expr(self.name.clone()), self.key(cx, key, 0))
    }

    /// A key that is neither a live slot nor a decoy.
    fn fresh_key(&mut self, cx: &mut RunContext) -> SlotKey {
        let taken: BTreeSet<&SlotKey> = self.slots.values().chain(self.decoys.keys()).collect();
        let mut attempt = 0;
        loop {
            let key = if cx.chance(50.0) {
                SlotKey::Name(self.keys.generate(cx.rng()))
            } else {
                let hi = 250 + self.slots.len() as i64 + attempt * 1000;
                SlotKey::Index(cx.random_int(0, hi))
            };
            if !taken.contains(&key) {
                return key;
            }
            attempt += 1;
        }
    }

    /// One to three slot moves and decoy writes.
    fn rotation(&mut self, cx: &mut RunContext) -> Stmt {
        let changes = cx.random_int(1, 3);
        let mut exprs = Vec::new();
        for _ in 0..changes {
            let fresh = self.fresh_key(cx);
            if cx.chance(50.0) {
                let i = cx.rng().gen_range(0..self.slots.len());
                let Some((name, current)) = self.slots.iter().nth(i).map(|(n, k)| (n.clone(), k.clone()))
                else {
                    continue;
                };
                let target = self.slot(cx, &fresh);
                let source = self.slot(cx, &current);
                exprs.push(assign(Pat::Expr(Box::new(target)), source));
                trace!(%name, from = ?current, to = ?fresh, "slot moved");
                self.slots.insert(name, fresh);
            } else {
                let value = cx.random_int(-150, 150);
                let key = match self.random_decoy(cx) {
                    Some((existing, _)) if cx.chance(50.0) => existing,
                    _ => fresh,
                };
                let target = self.slot(cx, &key);
                let written = self.number(cx, value as f64, 0);
                exprs.push(assign(Pat::Expr(Box::new(target)), written));
                trace!(?key, value, "decoy written");
                self.decoys.insert(key, value);
            }
        }
        let mut stmt = expr_stmt(sequence(exprs));
        cx.comment(stmt.meta_mut(), NAME, "rotation");
        stmt
    }

    /// `if (frame[d] > v + r) { return frame[k]; } else { <ret> }`; the first
    /// branch is dead because decoy `d` holds `v`.
    fn guard_return(&mut self, cx: &mut RunContext, ret: Stmt) -> Stmt {
        let Some((key, value)) = self.random_decoy(cx) else {
            return ret;
        };
        let bound = (value + cx.random_int(40, 140)) as f64;
        let read = self.slot(cx, &key);
        let test = binary(BinaryOp::Gt, read, self.number(cx, bound, 0));
        let junk = SlotKey::Index(cx.random_int(-250, 250));
        let dead = return_stmt(Some(self.slot(cx, &junk)));
        let mut guarded = if_stmt(test, vec![dead], Some(vec![ret]));
        cx.comment(guarded.meta_mut(), NAME, "return guard");
        guarded
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rewrite
// ─────────────────────────────────────────────────────────────────────────────

fn rewrite_body(
    body: &mut BlockStmt,
    body_chain: &Ancestors,
    fn_path: &NodePath,
    frame: &mut Frame,
    cx: &mut RunContext,
) -> EngineResult<()> {
    let old = std::mem::take(&mut body.body);
    let mut out = Vec::with_capacity(old.len() * 2);
    let mut chain = body_chain.clone();
    chain.push(NodeKind::Block, Edge::Statement(0));

    for (i, mut stmt) in old.into_iter().enumerate() {
        if i == 0 || cx.chance(50.0 - 10.0 * i as f64) {
            out.push(frame.rotation(cx));
        }
        chain.at(Edge::Statement(out.len()));
        let mut rewriter = Rewriter {
            frame: &mut *frame,
            cx: &mut *cx,
            fn_path,
        };
        walk_node(NodeMut::Stmt(&mut stmt), &mut chain, &mut rewriter)?;
        if matches!(stmt, Stmt::Return(_)) {
            stmt = frame.guard_return(cx, stmt);
        }
        out.push(stmt);
    }
    body.body = out;
    Ok(())
}

/// Rewrites one top-level statement against the current slot keys.
struct Rewriter<'a> {
    frame: &'a mut Frame,
    cx: &'a mut RunContext,
    fn_path: &'a NodePath,
}

impl Rewriter<'_> {
    fn slot_of(&self, name: &str) -> Option<SlotKey> {
        self.frame.slots.get(name).cloned()
    }

    fn slot(&mut self, key: &SlotKey) -> Expr {
        self.frame.slot(self.cx, key)
    }

    fn statement(&mut self, s: &mut Stmt) {
        match s {
            Stmt::VarDecl(d) => {
                let [decl] = d.declarators.as_mut_slice() else {
                    return;
                };
                let Pat::Ident(id) = &decl.id else {
                    return;
                };
                let Some(key) = self.slot_of(&id.name) else {
                    return;
                };
                let new = match decl.init.take() {
                    Some(init) => {
                        let target = self.slot(&key);
                        expr_stmt(assign(Pat::Expr(Box::new(target)), *init))
                    }
                    // The slot already reads as undefined.
                    None => Stmt::Empty(EmptyStmt {
                        meta: NodeMeta::default(),
                    }),
                };
                replace_stmt(s, new);
            }
            Stmt::FnDecl(f) => {
                let Some(key) = f.id.as_ref().and_then(|id| self.slot_of(&id.name)) else {
                    return;
                };
                let mut value = std::mem::replace(&mut **f, function(None, vec![], vec![]));
                value.id = None;
                let target = self.slot(&key);
                replace_stmt(s, expr_stmt(assign(Pat::Expr(Box::new(target)), Expr::Fn(Box::new(value)))));
            }
            Stmt::ClassDecl(c) => {
                let Some(key) = c.id.as_ref().and_then(|id| self.slot_of(&id.name)) else {
                    return;
                };
                let class = std::mem::replace(
                    &mut **c,
                    Class {
                        meta: NodeMeta::default(),
                        id: None,
                        super_class: None,
                        body: Vec::new(),
                    },
                );
                let target = self.slot(&key);
                replace_stmt(s, expr_stmt(assign(Pat::Expr(Box::new(target)), Expr::Class(Box::new(class)))));
            }
            _ => {}
        }
    }

    /// `{ a }` becomes `{ a: a }` so the value can be rewritten.
    fn expand_shorthand(&self, object: &mut ObjectExpr) {
        for prop in &mut object.properties {
            if let ObjectProp::Prop(p) = prop
                && matches!(p.value, PropValue::Shorthand)
                && let PropKey::Ident(key) = &p.key
                && self.frame.slots.contains_key(&key.name)
            {
                p.value = PropValue::Value(Box::new(ident_expr(key.name.clone())));
            }
        }
    }

    /// `{ a = d } = …` becomes `{ a: a = d } = …`.
    fn expand_pattern_shorthand(&self, pattern: &mut ObjectPat) {
        for prop in &mut pattern.properties {
            let ObjectPatProp::Assign(ap) = prop else {
                continue;
            };
            if !self.frame.slots.contains_key(&ap.key.name) {
                continue;
            }
            let key = ap.key.clone();
            let value = match ap.value.take() {
                Some(default) => Pat::Assign(Box::new(AssignPat {
                    meta: NodeMeta::default(),
                    left: Box::new(Pat::Ident(key.clone())),
                    right: default,
                })),
                None => Pat::Ident(key.clone()),
            };
            *prop = ObjectPatProp::KeyValue(KeyValuePatProp {
                meta: std::mem::take(&mut ap.meta),
                key: PropKey::Ident(key),
                is_computed: false,
                value,
            });
        }
    }

    /// Whether a literal belongs to the function itself rather than a
    /// nested function or class.
    fn owns(&self, ancestors: &Ancestors) -> bool {
        ancestors
            .iter()
            .position(|a| a.kind.is_function() || a.kind.is_class())
            .is_some_and(|i| {
                ancestors.get(i).is_some_and(|a| a.kind.is_function())
                    && ancestors.path_of(i) == *self.fn_path
            })
    }
}

impl VisitMut for Rewriter<'_> {
    fn enter(&mut self, node: NodeMut<'_>, _ancestors: &Ancestors) -> EngineResult<Flow> {
        match node {
            NodeMut::Stmt(s) => self.statement(s),
            NodeMut::Expr(e) => match e {
                Expr::Ident(i) => {
                    if let Some(key) = self.slot_of(&i.name) {
                        let read = self.slot(&key);
                        replace_expr(e, read);
                    }
                }
                Expr::Object(o) => self.expand_shorthand(o),
                _ => {}
            },
            NodeMut::Pat(p) => match p {
                Pat::Ident(i) => {
                    if let Some(key) = self.slot_of(&i.name) {
                        let target = self.slot(&key);
                        replace_pat(p, Pat::Expr(Box::new(target)));
                    }
                }
                Pat::Object(o) => self.expand_pattern_shorthand(o),
                _ => {}
            },
            _ => {}
        }
        Ok(Flow::Continue)
    }

    fn exit(&mut self, node: NodeMut<'_>, ancestors: &Ancestors) -> EngineResult<()> {
        if let NodeMut::Expr(e) = node
            && let Expr::Num(n) = e
            && n.value.fract() == 0.0
            && n.value.abs() < MAX_DISGUISED
            && self.owns(ancestors)
            && self.cx.chance(50.0)
        {
            let value = n.value;
            let disguised = self.frame.number(self.cx, value, 0);
            replace_expr(e, disguised);
        }
        Ok(())
    }
}
