//! Per-run state shared by every transform of a pipeline.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

use super::analysis::ScopeReport;
use super::edit::debug_comment;
use super::naming::{NameAllocator, NameGenerator};
use crate::config::{IdentifierGenerator, NameMode, Options};
use crate::syntax::ast::{Expr, NodeMeta, Stmt};
use crate::syntax::build::*;

/// Run-wide helper functions, created on first use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HelperKind {
    /// `function NAME(fn, n)` redefining `fn.length` as `n` and returning `fn`.
    FunctionLength,
}

/// Everything a run owns besides the tree: options, randomness, names,
/// queued statements and published analysis results.
#[derive(Debug)]
pub struct RunContext {
    options: Options,
    rng: StdRng,
    names: NameAllocator,
    pending: Vec<Stmt>,
    prelude: Vec<Stmt>,
    helpers: BTreeMap<HelperKind, String>,
    scope_report: Option<ScopeReport>,
}

impl RunContext {
    /// A fresh run over `options`; the generator is seeded from
    /// `options.seed` when present.
    pub fn new(options: Options) -> Self {
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            options,
            rng,
            names: NameAllocator::new(),
            pending: Vec::new(),
            prelude: Vec::new(),
            helpers: BTreeMap::new(),
            scope_report: None,
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// `true` with `percent` chance.
    pub fn chance(&mut self, percent: f64) -> bool {
        self.rng.r#gen::<f64>() * 100.0 < percent
    }

    /// Uniform integer in `lo..=hi`.
    pub fn random_int(&mut self, lo: i64, hi: i64) -> i64 {
        if hi <= lo {
            return lo;
        }
        self.rng.gen_range(lo..=hi)
    }

    /// A fresh placeholder name.
    pub fn placeholder(&mut self) -> String {
        self.names.placeholder(&mut self.rng)
    }

    /// A fresh final-form name under the configured `identifierGenerator`.
    pub fn identifier_name(&mut self) -> String {
        self.names
            .identifier(&mut self.rng, &self.options.identifier_generator)
    }

    /// A fresh final-form name under `mode`.
    pub fn identifier_name_with(&mut self, mode: NameMode) -> String {
        self.names
            .identifier(&mut self.rng, &IdentifierGenerator::Mode(mode))
    }

    /// An independent generator, optionally overriding the configured mode.
    pub fn name_generator(&self, mode: Option<NameMode>) -> NameGenerator {
        let generator = match mode {
            Some(mode) => IdentifierGenerator::Mode(mode),
            None => self.options.identifier_generator.clone(),
        };
        NameGenerator::new(generator)
    }

    pub fn names(&self) -> &NameAllocator {
        &self.names
    }

    /// Queues `stmt` in front of the statement currently being visited.
    pub fn insert_before_current_statement(&mut self, stmt: Stmt) {
        self.pending.push(stmt);
    }

    pub(crate) fn take_pending(&mut self) -> Vec<Stmt> {
        std::mem::take(&mut self.pending)
    }

    /// Queues a program-level statement, placed at the top of the program
    /// when the current stage finishes.
    pub fn push_prelude(&mut self, stmt: Stmt) {
        self.prelude.push(stmt);
    }

    pub(crate) fn take_prelude(&mut self) -> Vec<Stmt> {
        std::mem::take(&mut self.prelude)
    }

    /// The placeholder name of a run-wide helper, emitting it on first use.
    pub fn helper(&mut self, kind: HelperKind) -> String {
        if let Some(name) = self.helpers.get(&kind) {
            return name.clone();
        }
        let name = self.placeholder();
        let decl = match kind {
            HelperKind::FunctionLength => function_length_helper(&name),
        };
        trace!(?kind, %name, "emitting helper");
        self.push_prelude(decl);
        self.helpers.insert(kind, name.clone());
        name
    }

    /// Attaches a `[transform] text` comment when debug comments are on.
    pub fn comment(&self, meta: &mut NodeMeta, transform: &str, text: &str) {
        if self.options.debug_comments {
            debug_comment(meta, transform, text);
        }
    }

    /// The latest published scope report, if still valid.
    pub fn scope_report(&self) -> Option<&ScopeReport> {
        self.scope_report.as_ref()
    }

    pub fn set_scope_report(&mut self, report: ScopeReport) {
        self.scope_report = Some(report);
    }

    /// Drops the scope report after a structural mutation.
    pub fn invalidate_scope_report(&mut self) {
        self.scope_report = None;
    }
}

/// `function NAME(fn, n) { Object["defineProperty"](fn, "length", {...}); return fn; }`
fn function_length_helper(name: &str) -> Stmt {
    let define = call(
        member(ident_expr("Object"), string("defineProperty")),
        vec![
            ident_expr("functionObject"),
            string("length"),
            object(vec![
                ("value".into(), ident_expr("functionLength")),
                ("configurable".into(), boolean(true)),
            ]),
        ],
    );
    function_decl(
        name,
        vec![param("functionObject"), param("functionLength")],
        vec![
            expr_stmt(define),
            return_stmt(Some(ident_expr("functionObject"))),
        ],
    )
}

/// `helper(target, n)`.
pub fn call_function_length(helper: &str, target: Expr, n: usize) -> Expr {
    call(ident_expr(helper), vec![target, number(n as f64)])
}
