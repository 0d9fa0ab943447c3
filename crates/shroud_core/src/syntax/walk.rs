//! The depth-first mutable walker.
//!
//! Every pass over the tree goes through [`walk_program`] (or [`walk_node`]
//! to resume below the root). The walker maintains the [`Ancestors`] chain,
//! calls [`VisitMut::enter`] before and [`VisitMut::exit`] after each
//! visitable node, and splices statements a visitor queued through
//! [`VisitMut::take_insertions`] in front of the statement-list element that
//! was being visited.
//!
//! Identifier occurrences in expression and pattern position are visited as
//! [`NodeMut::Expr`] / [`NodeMut::Pat`]; every other identifier slot (keys,
//! labels, declaration names, specifiers, meta-property parts) is visited as
//! [`NodeMut::Ident`].

use super::ast::*;
use super::path::{Ancestors, Edge, NodeKind};
use crate::error::EngineResult;

/// Shared handle on a visitable node.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Program(&'a Program),
    Stmt(&'a Stmt),
    Expr(&'a Expr),
    Pat(&'a Pat),
    Ident(&'a Ident),
    /// A function in method-value or `export default` position.
    Function(&'a Function),
    /// A function body, `try` block, catch body or `finally` block.
    Block(&'a BlockStmt),
}

/// Exclusive handle on a visitable node.
#[derive(Debug)]
pub enum NodeMut<'a> {
    Program(&'a mut Program),
    Stmt(&'a mut Stmt),
    Expr(&'a mut Expr),
    Pat(&'a mut Pat),
    Ident(&'a mut Ident),
    Function(&'a mut Function),
    Block(&'a mut BlockStmt),
}

impl<'a> Node<'a> {
    /// The identifier this node denotes, if it is an identifier occurrence.
    pub fn as_ident(&self) -> Option<&'a Ident> {
        match *self {
            Node::Ident(i) => Some(i),
            Node::Expr(Expr::Ident(i)) => Some(i),
            Node::Pat(Pat::Ident(i)) => Some(i),
            _ => None,
        }
    }

    /// The function this node is, in any of its positions.
    pub fn as_function(&self) -> Option<&'a Function> {
        match *self {
            Node::Function(f) => Some(f),
            Node::Stmt(Stmt::FnDecl(f)) => Some(f),
            Node::Expr(Expr::Fn(f)) => Some(f),
            _ => None,
        }
    }
}

impl NodeMut<'_> {
    /// Reborrows as a shared handle.
    pub fn as_node(&self) -> Node<'_> {
        match self {
            NodeMut::Program(p) => Node::Program(p),
            NodeMut::Stmt(s) => Node::Stmt(s),
            NodeMut::Expr(e) => Node::Expr(e),
            NodeMut::Pat(p) => Node::Pat(p),
            NodeMut::Ident(i) => Node::Ident(i),
            NodeMut::Function(f) => Node::Function(f),
            NodeMut::Block(b) => Node::Block(b),
        }
    }

    /// Reborrows for a shorter lifetime.
    pub fn reborrow(&mut self) -> NodeMut<'_> {
        match self {
            NodeMut::Program(p) => NodeMut::Program(p),
            NodeMut::Stmt(s) => NodeMut::Stmt(s),
            NodeMut::Expr(e) => NodeMut::Expr(e),
            NodeMut::Pat(p) => NodeMut::Pat(p),
            NodeMut::Ident(i) => NodeMut::Ident(i),
            NodeMut::Function(f) => NodeMut::Function(f),
            NodeMut::Block(b) => NodeMut::Block(b),
        }
    }
}

/// Whether the walker descends into a node's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Skip the children; `exit` is still called.
    Skip,
}

/// A visitor driven by the walker.
pub trait VisitMut {
    /// Called before the node's children. The node may be replaced in place;
    /// the walker then descends into the replacement.
    fn enter(&mut self, node: NodeMut<'_>, ancestors: &Ancestors) -> EngineResult<Flow> {
        let _ = (node, ancestors);
        Ok(Flow::Continue)
    }

    /// Called after the node's children, always paired with `enter`.
    fn exit(&mut self, node: NodeMut<'_>, ancestors: &Ancestors) -> EngineResult<()> {
        let _ = (node, ancestors);
        Ok(())
    }

    /// Statements to splice before the statement-list element just visited.
    fn take_insertions(&mut self) -> Vec<Stmt> {
        Vec::new()
    }
}

/// The production a function in method-value or `export default` position
/// behaves as: a named default export is a declaration, everything else an
/// expression.
pub fn function_kind(f: &Function, ancestors: &Ancestors) -> NodeKind {
    match ancestors.parent() {
        Some(a) if a.kind == NodeKind::ExportDefault && f.id.is_some() => NodeKind::FnDecl,
        _ => NodeKind::FnExpr,
    }
}

/// Walks the whole program from the root.
pub fn walk_program<V: VisitMut + ?Sized>(program: &mut Program, v: &mut V) -> EngineResult<()> {
    let mut ancestors = Ancestors::new();
    program_node(program, &mut ancestors, v)
}

/// Walks the subtree under `node`, whose own chain is `ancestors`.
pub fn walk_node<V: VisitMut + ?Sized>(
    node: NodeMut<'_>,
    ancestors: &mut Ancestors,
    v: &mut V,
) -> EngineResult<()> {
    match node {
        NodeMut::Program(p) => program_node(p, ancestors, v),
        NodeMut::Stmt(s) => stmt(s, ancestors, v),
        NodeMut::Expr(e) => expr(e, ancestors, v),
        NodeMut::Pat(p) => pat(p, ancestors, v),
        NodeMut::Ident(i) => ident(i, ancestors, v),
        NodeMut::Function(f) => function_node(f, ancestors, v),
        NodeMut::Block(b) => block(b, ancestors, v),
    }
}

/// Walks only the children of `node`, without entering it.
pub fn walk_children<V: VisitMut + ?Sized>(
    node: NodeMut<'_>,
    ancestors: &mut Ancestors,
    v: &mut V,
) -> EngineResult<()> {
    match node {
        NodeMut::Program(p) => program_children(p, ancestors, v),
        NodeMut::Stmt(s) => stmt_children(s, ancestors, v),
        NodeMut::Expr(e) => expr_children(e, ancestors, v),
        NodeMut::Pat(p) => pat_children(p, ancestors, v),
        NodeMut::Ident(_) => Ok(()),
        NodeMut::Function(f) => {
            let kind = function_kind(f, ancestors);
            function(f, kind, ancestors, v)
        }
        NodeMut::Block(b) => block_children(b, ancestors, v),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Program and statement lists
// ─────────────────────────────────────────────────────────────────────────────

fn program_node<V: VisitMut + ?Sized>(
    p: &mut Program,
    anc: &mut Ancestors,
    v: &mut V,
) -> EngineResult<()> {
    if v.enter(NodeMut::Program(p), anc)? == Flow::Continue {
        program_children(p, anc, v)?;
    }
    v.exit(NodeMut::Program(p), anc)
}

fn program_children<V: VisitMut + ?Sized>(
    p: &mut Program,
    anc: &mut Ancestors,
    v: &mut V,
) -> EngineResult<()> {
    anc.push(NodeKind::Program, Edge::Statement(0));
    let mut i = 0;
    while i < p.body.len() {
        anc.at(Edge::Statement(i));
        match &mut p.body[i] {
            ProgramItem::Stmt(s) => stmt(s, anc, v)?,
            ProgramItem::ModuleDecl(m) => module_decl(m, anc, v)?,
        }
        let inserted = v.take_insertions();
        let n = inserted.len();
        if n > 0 {
            p.body.splice(i..i, inserted.into_iter().map(ProgramItem::Stmt));
        }
        i += n + 1;
    }
    anc.pop();
    Ok(())
}

/// Walks a statement list; the owning frame is already pushed.
fn stmt_list<V: VisitMut + ?Sized>(
    list: &mut Vec<Stmt>,
    anc: &mut Ancestors,
    v: &mut V,
) -> EngineResult<()> {
    let mut i = 0;
    while i < list.len() {
        anc.at(Edge::Statement(i));
        stmt(&mut list[i], anc, v)?;
        let inserted = v.take_insertions();
        let n = inserted.len();
        if n > 0 {
            list.splice(i..i, inserted);
        }
        i += n + 1;
    }
    Ok(())
}

fn block<V: VisitMut + ?Sized>(b: &mut BlockStmt, anc: &mut Ancestors, v: &mut V) -> EngineResult<()> {
    if v.enter(NodeMut::Block(b), anc)? == Flow::Continue {
        block_children(b, anc, v)?;
    }
    v.exit(NodeMut::Block(b), anc)
}

fn block_children<V: VisitMut + ?Sized>(
    b: &mut BlockStmt,
    anc: &mut Ancestors,
    v: &mut V,
) -> EngineResult<()> {
    anc.push(NodeKind::Block, Edge::Statement(0));
    stmt_list(&mut b.body, anc, v)?;
    anc.pop();
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Statements
// ─────────────────────────────────────────────────────────────────────────────

fn stmt<V: VisitMut + ?Sized>(s: &mut Stmt, anc: &mut Ancestors, v: &mut V) -> EngineResult<()> {
    if v.enter(NodeMut::Stmt(s), anc)? == Flow::Continue {
        stmt_children(s, anc, v)?;
    }
    v.exit(NodeMut::Stmt(s), anc)
}

fn stmt_children<V: VisitMut + ?Sized>(
    s: &mut Stmt,
    anc: &mut Ancestors,
    v: &mut V,
) -> EngineResult<()> {
    match s {
        Stmt::Block(b) => block_children(b, anc, v),
        Stmt::VarDecl(d) => var_decl(d, anc, v),
        Stmt::FnDecl(f) => function(f, NodeKind::FnDecl, anc, v),
        Stmt::ClassDecl(c) => class(c, NodeKind::ClassDecl, anc, v),
        Stmt::Expr(e) => {
            anc.push(NodeKind::ExprStmt, Edge::Expression);
            expr(&mut e.expr, anc, v)?;
            anc.pop();
            Ok(())
        }
        Stmt::If(s) => {
            anc.push(NodeKind::If, Edge::Test);
            expr(&mut s.test, anc, v)?;
            stmt(&mut s.consequent, anc.at(Edge::Consequent), v)?;
            if let Some(alt) = &mut s.alternate {
                stmt(alt, anc.at(Edge::Alternate), v)?;
            }
            anc.pop();
            Ok(())
        }
        Stmt::For(s) => {
            anc.push(NodeKind::For, Edge::Init);
            match &mut s.init {
                Some(ForInit::VarDecl(d)) => var_decl(d, anc, v)?,
                Some(ForInit::Expr(e)) => expr(e, anc, v)?,
                None => {}
            }
            if let Some(test) = &mut s.test {
                expr(test, anc.at(Edge::Test), v)?;
            }
            if let Some(update) = &mut s.update {
                expr(update, anc.at(Edge::Update), v)?;
            }
            stmt(&mut s.body, anc.at(Edge::Body), v)?;
            anc.pop();
            Ok(())
        }
        Stmt::ForIn(s) => {
            anc.push(NodeKind::ForIn, Edge::Left);
            for_left(&mut s.left, anc, v)?;
            expr(&mut s.right, anc.at(Edge::Right), v)?;
            stmt(&mut s.body, anc.at(Edge::Body), v)?;
            anc.pop();
            Ok(())
        }
        Stmt::ForOf(s) => {
            anc.push(NodeKind::ForOf, Edge::Left);
            for_left(&mut s.left, anc, v)?;
            expr(&mut s.right, anc.at(Edge::Right), v)?;
            stmt(&mut s.body, anc.at(Edge::Body), v)?;
            anc.pop();
            Ok(())
        }
        Stmt::While(s) => {
            anc.push(NodeKind::While, Edge::Test);
            expr(&mut s.test, anc, v)?;
            stmt(&mut s.body, anc.at(Edge::Body), v)?;
            anc.pop();
            Ok(())
        }
        Stmt::DoWhile(s) => {
            anc.push(NodeKind::DoWhile, Edge::Body);
            stmt(&mut s.body, anc, v)?;
            expr(&mut s.test, anc.at(Edge::Test), v)?;
            anc.pop();
            Ok(())
        }
        Stmt::Switch(s) => {
            anc.push(NodeKind::Switch, Edge::Discriminant);
            expr(&mut s.discriminant, anc, v)?;
            for (i, case) in s.cases.iter_mut().enumerate() {
                anc.at(Edge::Case(i));
                anc.push(NodeKind::SwitchCase, Edge::Test);
                if let Some(test) = &mut case.test {
                    expr(test, anc, v)?;
                }
                stmt_list(&mut case.consequent, anc, v)?;
                anc.pop();
            }
            anc.pop();
            Ok(())
        }
        Stmt::Try(s) => {
            anc.push(NodeKind::Try, Edge::Block);
            block(&mut s.block, anc, v)?;
            if let Some(handler) = &mut s.handler {
                anc.at(Edge::Handler);
                anc.push(NodeKind::CatchClause, Edge::CatchParam);
                if let Some(param) = &mut handler.param {
                    pat(param, anc, v)?;
                }
                block(&mut handler.body, anc.at(Edge::Body), v)?;
                anc.pop();
            }
            if let Some(finalizer) = &mut s.finalizer {
                block(finalizer, anc.at(Edge::Finalizer), v)?;
            }
            anc.pop();
            Ok(())
        }
        Stmt::Return(s) => {
            if let Some(arg) = &mut s.argument {
                anc.push(NodeKind::Return, Edge::Argument);
                expr(arg, anc, v)?;
                anc.pop();
            }
            Ok(())
        }
        Stmt::Throw(s) => {
            anc.push(NodeKind::Throw, Edge::Argument);
            expr(&mut s.argument, anc, v)?;
            anc.pop();
            Ok(())
        }
        Stmt::Break(s) => label(&mut s.label, NodeKind::Break, anc, v),
        Stmt::Continue(s) => label(&mut s.label, NodeKind::Continue, anc, v),
        Stmt::Labeled(s) => {
            anc.push(NodeKind::Labeled, Edge::Label);
            ident(&mut s.label, anc, v)?;
            stmt(&mut s.body, anc.at(Edge::Body), v)?;
            anc.pop();
            Ok(())
        }
        Stmt::With(s) => {
            anc.push(NodeKind::With, Edge::Object);
            expr(&mut s.object, anc, v)?;
            stmt(&mut s.body, anc.at(Edge::Body), v)?;
            anc.pop();
            Ok(())
        }
        Stmt::Debugger(_) | Stmt::Empty(_) => Ok(()),
    }
}

fn label<V: VisitMut + ?Sized>(
    l: &mut Option<Ident>,
    kind: NodeKind,
    anc: &mut Ancestors,
    v: &mut V,
) -> EngineResult<()> {
    if let Some(l) = l {
        anc.push(kind, Edge::Label);
        ident(l, anc, v)?;
        anc.pop();
    }
    Ok(())
}

fn for_left<V: VisitMut + ?Sized>(
    left: &mut ForInOfLeft,
    anc: &mut Ancestors,
    v: &mut V,
) -> EngineResult<()> {
    match left {
        ForInOfLeft::VarDecl(d) => var_decl(d, anc, v),
        ForInOfLeft::Pat(p) => pat(p, anc, v),
    }
}

fn var_decl<V: VisitMut + ?Sized>(d: &mut VarDecl, anc: &mut Ancestors, v: &mut V) -> EngineResult<()> {
    anc.push(NodeKind::VarDecl(d.kind), Edge::Declarator(0));
    for (i, decl) in d.declarators.iter_mut().enumerate() {
        anc.at(Edge::Declarator(i));
        anc.push(NodeKind::VarDeclarator, Edge::Id);
        pat(&mut decl.id, anc, v)?;
        if let Some(init) = &mut decl.init {
            expr(init, anc.at(Edge::Init), v)?;
        }
        anc.pop();
    }
    anc.pop();
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Functions and classes
// ─────────────────────────────────────────────────────────────────────────────

fn function_node<V: VisitMut + ?Sized>(
    f: &mut Function,
    anc: &mut Ancestors,
    v: &mut V,
) -> EngineResult<()> {
    if v.enter(NodeMut::Function(f), anc)? == Flow::Continue {
        let kind = function_kind(f, anc);
        function(f, kind, anc, v)?;
    }
    v.exit(NodeMut::Function(f), anc)
}

fn function<V: VisitMut + ?Sized>(
    f: &mut Function,
    kind: NodeKind,
    anc: &mut Ancestors,
    v: &mut V,
) -> EngineResult<()> {
    anc.push(kind, Edge::Id);
    if let Some(id) = &mut f.id {
        ident(id, anc, v)?;
    }
    params(&mut f.params, anc, v)?;
    block(&mut f.body, anc.at(Edge::Body), v)?;
    anc.pop();
    Ok(())
}

fn arrow<V: VisitMut + ?Sized>(a: &mut ArrowExpr, anc: &mut Ancestors, v: &mut V) -> EngineResult<()> {
    anc.push(NodeKind::Arrow, Edge::Param(0));
    params(&mut a.params, anc, v)?;
    anc.at(Edge::Body);
    match &mut a.body {
        ArrowBody::Block(b) => block(b, anc, v)?,
        ArrowBody::Expr(e) => expr(e, anc, v)?,
    }
    anc.pop();
    Ok(())
}

fn params<V: VisitMut + ?Sized>(
    params: &mut [Param],
    anc: &mut Ancestors,
    v: &mut V,
) -> EngineResult<()> {
    for (i, p) in params.iter_mut().enumerate() {
        anc.at(Edge::Param(i));
        anc.push(NodeKind::Param, Edge::Pattern);
        pat(&mut p.pat, anc, v)?;
        if let Some(default) = &mut p.default {
            expr(default, anc.at(Edge::Default), v)?;
        }
        anc.pop();
    }
    Ok(())
}

fn class<V: VisitMut + ?Sized>(
    c: &mut Class,
    kind: NodeKind,
    anc: &mut Ancestors,
    v: &mut V,
) -> EngineResult<()> {
    anc.push(kind, Edge::Id);
    if let Some(id) = &mut c.id {
        ident(id, anc, v)?;
    }
    if let Some(sup) = &mut c.super_class {
        expr(sup, anc.at(Edge::SuperClass), v)?;
    }
    for (i, member) in c.body.iter_mut().enumerate() {
        anc.at(Edge::Member(i));
        match member {
            ClassMember::Method(m) => {
                anc.push(
                    NodeKind::Method {
                        kind: m.kind,
                        computed: m.is_computed,
                    },
                    Edge::Key,
                );
                prop_key(&mut m.key, anc, v)?;
                function_node(&mut m.value, anc.at(Edge::Value), v)?;
                anc.pop();
            }
            ClassMember::Property(p) => {
                anc.push(
                    NodeKind::ClassProperty {
                        computed: p.is_computed,
                    },
                    Edge::Key,
                );
                prop_key(&mut p.key, anc, v)?;
                if let Some(value) = &mut p.value {
                    expr(value, anc.at(Edge::Value), v)?;
                }
                anc.pop();
            }
            ClassMember::StaticBlock(b) => {
                anc.push(NodeKind::StaticBlock, Edge::Statement(0));
                stmt_list(&mut b.body, anc, v)?;
                anc.pop();
            }
        }
    }
    anc.pop();
    Ok(())
}

fn prop_key<V: VisitMut + ?Sized>(key: &mut PropKey, anc: &mut Ancestors, v: &mut V) -> EngineResult<()> {
    match key {
        PropKey::Ident(i) => ident(i, anc, v),
        PropKey::Computed(e) => expr(e, anc, v),
        PropKey::Private(_) | PropKey::Str(_) | PropKey::Num(_) => Ok(()),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Modules
// ─────────────────────────────────────────────────────────────────────────────

fn module_decl<V: VisitMut + ?Sized>(
    m: &mut ModuleDecl,
    anc: &mut Ancestors,
    v: &mut V,
) -> EngineResult<()> {
    match m {
        ModuleDecl::Import(d) => {
            anc.push(NodeKind::Import, Edge::Specifier(0));
            for (i, spec) in d.specifiers.iter_mut().enumerate() {
                anc.at(Edge::Specifier(i));
                anc.push(NodeKind::ImportSpecifier, Edge::Imported);
                if let ImportKind::Named(ModuleExportName::Ident(imported)) = &mut spec.kind {
                    ident(imported, anc, v)?;
                }
                ident(&mut spec.local, anc.at(Edge::Local), v)?;
                anc.pop();
            }
            anc.pop();
        }
        ModuleDecl::ExportNamed(d) => {
            anc.push(
                NodeKind::ExportNamed {
                    reexport: d.source.is_some(),
                },
                Edge::Specifier(0),
            );
            for (i, spec) in d.specifiers.iter_mut().enumerate() {
                anc.at(Edge::Specifier(i));
                anc.push(NodeKind::ExportSpecifier, Edge::Local);
                if let ModuleExportName::Ident(local) = &mut spec.local {
                    ident(local, anc, v)?;
                }
                if let ModuleExportName::Ident(exported) = &mut spec.exported {
                    ident(exported, anc.at(Edge::Exported), v)?;
                }
                anc.pop();
            }
            if let Some(decl) = &mut d.declaration {
                stmt(decl, anc.at(Edge::Declaration), v)?;
            }
            anc.pop();
        }
        ModuleDecl::ExportDefault(d) => {
            anc.push(NodeKind::ExportDefault, Edge::Declaration);
            match &mut d.declaration {
                ExportDefaultExpr::Fn(f) => function_node(f, anc, v)?,
                ExportDefaultExpr::Class(c) => {
                    let kind = if c.id.is_some() {
                        NodeKind::ClassDecl
                    } else {
                        NodeKind::ClassExpr
                    };
                    class(c, kind, anc, v)?;
                }
                ExportDefaultExpr::Expr(e) => expr(e, anc, v)?,
            }
            anc.pop();
        }
        ModuleDecl::ExportAll(d) => {
            if let Some(ModuleExportName::Ident(exported)) = &mut d.exported {
                anc.push(NodeKind::ExportAll, Edge::Exported);
                ident(exported, anc, v)?;
                anc.pop();
            }
        }
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Expressions
// ─────────────────────────────────────────────────────────────────────────────

fn ident<V: VisitMut + ?Sized>(i: &mut Ident, anc: &mut Ancestors, v: &mut V) -> EngineResult<()> {
    v.enter(NodeMut::Ident(i), anc)?;
    v.exit(NodeMut::Ident(i), anc)
}

fn expr<V: VisitMut + ?Sized>(e: &mut Expr, anc: &mut Ancestors, v: &mut V) -> EngineResult<()> {
    if v.enter(NodeMut::Expr(e), anc)? == Flow::Continue {
        expr_children(e, anc, v)?;
    }
    v.exit(NodeMut::Expr(e), anc)
}

fn expr_children<V: VisitMut + ?Sized>(
    e: &mut Expr,
    anc: &mut Ancestors,
    v: &mut V,
) -> EngineResult<()> {
    match e {
        Expr::Null(_)
        | Expr::Bool(_)
        | Expr::Num(_)
        | Expr::Str(_)
        | Expr::BigInt(_)
        | Expr::Regexp(_)
        | Expr::Ident(_)
        | Expr::This(_)
        | Expr::Super(_) => Ok(()),
        Expr::Template(t) => template(t, anc, v),
        Expr::Array(a) => {
            anc.push(NodeKind::Array, Edge::Element(0));
            for (i, el) in a.elements.iter_mut().enumerate() {
                if let Some(el) = el {
                    expr(el, anc.at(Edge::Element(i)), v)?;
                }
            }
            anc.pop();
            Ok(())
        }
        Expr::Object(o) => {
            anc.push(NodeKind::Object, Edge::Prop(0));
            for (i, prop) in o.properties.iter_mut().enumerate() {
                anc.at(Edge::Prop(i));
                match prop {
                    ObjectProp::Prop(p) => object_prop(p, anc, v)?,
                    ObjectProp::Spread(s) => {
                        anc.push(NodeKind::Spread, Edge::Argument);
                        expr(&mut s.argument, anc, v)?;
                        anc.pop();
                    }
                }
            }
            anc.pop();
            Ok(())
        }
        Expr::Fn(f) => function(f, NodeKind::FnExpr, anc, v),
        Expr::Arrow(a) => arrow(a, anc, v),
        Expr::Class(c) => class(c, NodeKind::ClassExpr, anc, v),
        Expr::Unary(u) => one(&mut u.argument, NodeKind::Unary(u.op), Edge::Argument, anc, v),
        Expr::Update(u) => one(&mut u.argument, NodeKind::Update, Edge::Argument, anc, v),
        Expr::Binary(b) => {
            anc.push(NodeKind::Binary, Edge::Left);
            expr(&mut b.left, anc, v)?;
            expr(&mut b.right, anc.at(Edge::Right), v)?;
            anc.pop();
            Ok(())
        }
        Expr::Logical(b) => {
            anc.push(NodeKind::Logical, Edge::Left);
            expr(&mut b.left, anc, v)?;
            expr(&mut b.right, anc.at(Edge::Right), v)?;
            anc.pop();
            Ok(())
        }
        Expr::Conditional(c) => {
            anc.push(NodeKind::Conditional, Edge::Test);
            expr(&mut c.test, anc, v)?;
            expr(&mut c.consequent, anc.at(Edge::Consequent), v)?;
            expr(&mut c.alternate, anc.at(Edge::Alternate), v)?;
            anc.pop();
            Ok(())
        }
        Expr::Assign(a) => {
            anc.push(NodeKind::Assign, Edge::Left);
            pat(&mut a.left, anc, v)?;
            expr(&mut a.right, anc.at(Edge::Right), v)?;
            anc.pop();
            Ok(())
        }
        Expr::Sequence(s) => {
            anc.push(NodeKind::Sequence, Edge::Expressions(0));
            for (i, e) in s.expressions.iter_mut().enumerate() {
                expr(e, anc.at(Edge::Expressions(i)), v)?;
            }
            anc.pop();
            Ok(())
        }
        Expr::Member(m) => {
            anc.push(
                NodeKind::Member {
                    computed: m.is_computed(),
                },
                Edge::Object,
            );
            expr(&mut m.object, anc, v)?;
            anc.at(Edge::Property);
            match &mut m.property {
                MemberProp::Ident(i) => ident(i, anc, v)?,
                MemberProp::Computed(e) => expr(e, anc, v)?,
                MemberProp::Private(_) => {}
            }
            anc.pop();
            Ok(())
        }
        Expr::Call(c) => call_like(&mut c.callee, &mut c.arguments, NodeKind::Call, anc, v),
        Expr::New(c) => call_like(&mut c.callee, &mut c.arguments, NodeKind::New, anc, v),
        Expr::TaggedTemplate(t) => {
            anc.push(NodeKind::TaggedTemplate, Edge::Tag);
            expr(&mut t.tag, anc, v)?;
            template(&mut t.quasi, anc.at(Edge::Quasi), v)?;
            anc.pop();
            Ok(())
        }
        Expr::Spread(s) => one(&mut s.argument, NodeKind::Spread, Edge::Argument, anc, v),
        Expr::Yield(y) => match &mut y.argument {
            Some(arg) => one(arg, NodeKind::Yield, Edge::Argument, anc, v),
            None => Ok(()),
        },
        Expr::Await(a) => one(&mut a.argument, NodeKind::Await, Edge::Argument, anc, v),
        Expr::Import(i) => {
            anc.push(NodeKind::ImportCall, Edge::Source);
            expr(&mut i.source, anc, v)?;
            if let Some(options) = &mut i.options {
                expr(options, anc.at(Edge::Options), v)?;
            }
            anc.pop();
            Ok(())
        }
        Expr::MetaProp(m) => {
            anc.push(NodeKind::MetaProp, Edge::Meta);
            ident(&mut m.object, anc, v)?;
            ident(&mut m.property, anc.at(Edge::Property), v)?;
            anc.pop();
            Ok(())
        }
    }
}

fn one<V: VisitMut + ?Sized>(
    e: &mut Expr,
    kind: NodeKind,
    edge: Edge,
    anc: &mut Ancestors,
    v: &mut V,
) -> EngineResult<()> {
    anc.push(kind, edge);
    expr(e, anc, v)?;
    anc.pop();
    Ok(())
}

fn call_like<V: VisitMut + ?Sized>(
    callee: &mut Expr,
    arguments: &mut [Expr],
    kind: NodeKind,
    anc: &mut Ancestors,
    v: &mut V,
) -> EngineResult<()> {
    anc.push(kind, Edge::Callee);
    expr(callee, anc, v)?;
    for (i, arg) in arguments.iter_mut().enumerate() {
        expr(arg, anc.at(Edge::Arguments(i)), v)?;
    }
    anc.pop();
    Ok(())
}

fn template<V: VisitMut + ?Sized>(
    t: &mut TemplateLit,
    anc: &mut Ancestors,
    v: &mut V,
) -> EngineResult<()> {
    anc.push(NodeKind::Template, Edge::Expressions(0));
    for (i, e) in t.expressions.iter_mut().enumerate() {
        expr(e, anc.at(Edge::Expressions(i)), v)?;
    }
    anc.pop();
    Ok(())
}

fn object_prop<V: VisitMut + ?Sized>(p: &mut Prop, anc: &mut Ancestors, v: &mut V) -> EngineResult<()> {
    anc.push(
        NodeKind::Prop {
            kind: p.value.kind(),
            computed: p.is_computed,
        },
        Edge::Key,
    );
    if matches!(p.value, PropValue::Shorthand) {
        if let PropKey::Ident(i) = &mut p.key {
            ident(i, anc.at(Edge::Shorthand), v)?;
        }
    } else {
        prop_key(&mut p.key, anc, v)?;
        anc.at(Edge::Value);
        match &mut p.value {
            PropValue::Value(e) => expr(e, anc, v)?,
            PropValue::Get(f) | PropValue::Set(f) | PropValue::Method(f) => function_node(f, anc, v)?,
            PropValue::Shorthand => {}
        }
    }
    anc.pop();
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Patterns
// ─────────────────────────────────────────────────────────────────────────────

fn pat<V: VisitMut + ?Sized>(p: &mut Pat, anc: &mut Ancestors, v: &mut V) -> EngineResult<()> {
    // Member targets are visited as the expression they wrap.
    if let Pat::Expr(e) = p {
        return expr(e, anc, v);
    }
    if v.enter(NodeMut::Pat(p), anc)? == Flow::Continue {
        pat_children(p, anc, v)?;
    }
    v.exit(NodeMut::Pat(p), anc)
}

fn pat_children<V: VisitMut + ?Sized>(p: &mut Pat, anc: &mut Ancestors, v: &mut V) -> EngineResult<()> {
    match p {
        Pat::Ident(_) => Ok(()),
        Pat::Array(a) => {
            anc.push(NodeKind::ArrayPat, Edge::Element(0));
            for (i, el) in a.elements.iter_mut().enumerate() {
                if let Some(el) = el {
                    pat(el, anc.at(Edge::Element(i)), v)?;
                }
            }
            anc.pop();
            Ok(())
        }
        Pat::Object(o) => {
            anc.push(NodeKind::ObjectPat, Edge::Prop(0));
            for (i, prop) in o.properties.iter_mut().enumerate() {
                anc.at(Edge::Prop(i));
                match prop {
                    ObjectPatProp::KeyValue(kv) => {
                        anc.push(
                            NodeKind::KeyValuePatProp {
                                computed: kv.is_computed,
                            },
                            Edge::Key,
                        );
                        prop_key(&mut kv.key, anc, v)?;
                        pat(&mut kv.value, anc.at(Edge::Value), v)?;
                        anc.pop();
                    }
                    ObjectPatProp::Assign(ap) => {
                        anc.push(NodeKind::AssignPatProp, Edge::Shorthand);
                        ident(&mut ap.key, anc, v)?;
                        if let Some(default) = &mut ap.value {
                            expr(default, anc.at(Edge::Value), v)?;
                        }
                        anc.pop();
                    }
                    ObjectPatProp::Rest(r) => {
                        anc.push(NodeKind::RestElement, Edge::Argument);
                        pat(&mut r.argument, anc, v)?;
                        anc.pop();
                    }
                }
            }
            anc.pop();
            Ok(())
        }
        Pat::Rest(r) => {
            anc.push(NodeKind::RestElement, Edge::Argument);
            pat(&mut r.argument, anc, v)?;
            anc.pop();
            Ok(())
        }
        Pat::Assign(a) => {
            anc.push(NodeKind::AssignPat, Edge::Left);
            pat(&mut a.left, anc, v)?;
            expr(&mut a.right, anc.at(Edge::Right), v)?;
            anc.pop();
            Ok(())
        }
        Pat::Expr(e) => expr(e, anc, v),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
