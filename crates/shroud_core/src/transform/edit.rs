//! Mutation primitives.
//!
//! Replacement swaps the owning slot in the single parent and keeps the old
//! node's comments in front of the new node's.

use crate::syntax::ast::{
    BlockStmt, Comment, CommentKind, Expr, ModuleDecl, NodeMeta, Param, Pat, Program,
    ProgramItem, Stmt,
};

fn merge_comments(old: &mut NodeMeta, new: &mut NodeMeta) {
    if old.comments.is_empty() {
        return;
    }
    let mut merged = std::mem::take(&mut old.comments);
    merged.append(&mut new.comments);
    new.comments = merged;
}

/// Replaces the statement in `slot`, returning the old one.
pub fn replace_stmt(slot: &mut Stmt, mut new: Stmt) -> Stmt {
    merge_comments(slot.meta_mut(), new.meta_mut());
    std::mem::replace(slot, new)
}

/// Replaces the expression in `slot`, returning the old one.
pub fn replace_expr(slot: &mut Expr, mut new: Expr) -> Expr {
    merge_comments(slot.meta_mut(), new.meta_mut());
    std::mem::replace(slot, new)
}

/// Replaces the pattern in `slot`, returning the old one.
pub fn replace_pat(slot: &mut Pat, mut new: Pat) -> Pat {
    merge_comments(slot.meta_mut(), new.meta_mut());
    std::mem::replace(slot, new)
}

/// Appends a `[transform] text` block comment.
pub fn debug_comment(meta: &mut NodeMeta, transform: &str, text: &str) {
    meta.comments.push(Comment {
        kind: CommentKind::Block,
        text: format!("[{transform}] {text}"),
    });
}

/// Number of parameters counted by the function's `length`: the leading
/// run of identifier, object and array patterns without defaults.
pub fn function_length(params: &[Param]) -> usize {
    params
        .iter()
        .take_while(|p| {
            p.default.is_none() && matches!(p.pat, Pat::Ident(_) | Pat::Object(_) | Pat::Array(_))
        })
        .count()
}

/// Something that owns a statement list.
pub trait Statements {
    /// Inserts `stmts` at the top, after the directive prologue (and, for a
    /// program, after leading imports).
    fn prepend(&mut self, stmts: Vec<Stmt>);

    /// Inserts `stmts` at the end.
    fn append(&mut self, stmts: Vec<Stmt>);
}

impl Statements for Program {
    fn prepend(&mut self, stmts: Vec<Stmt>) {
        let at = self
            .body
            .iter()
            .take_while(|item| match item {
                ProgramItem::Stmt(s) => s.is_directive(),
                ProgramItem::ModuleDecl(ModuleDecl::Import(_)) => true,
                ProgramItem::ModuleDecl(_) => false,
            })
            .count();
        self.body
            .splice(at..at, stmts.into_iter().map(ProgramItem::Stmt));
    }

    fn append(&mut self, stmts: Vec<Stmt>) {
        self.body.extend(stmts.into_iter().map(ProgramItem::Stmt));
    }
}

impl Statements for BlockStmt {
    fn prepend(&mut self, stmts: Vec<Stmt>) {
        let at = self.body.iter().take_while(|s| s.is_directive()).count();
        self.body.splice(at..at, stmts);
    }

    fn append(&mut self, stmts: Vec<Stmt>) {
        self.body.extend(stmts);
    }
}
