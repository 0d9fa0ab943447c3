//! The transform pipeline engine.
//!
//! A [`Transform`] is a predicate plus an action. A [`Stage`] walks the whole
//! tree once for its transform: wherever [`Transform::matches`] accepts a
//! node, [`Transform::transform`] runs on entry and may hand back a
//! [`Deferred`] action, which the stage runs when the walk exits that same
//! node. Each stage first runs its `before` stages to completion over the
//! whole tree and its `after` stages last, so prerequisite analysis is a
//! declared dependency rather than a global ordering.
//!
//! # Failure contract
//!
//! [`EngineError::UnsupportedConstruct`] from a transform or deferred action
//! is local: the node stays as it is and the walk goes on. Every other error
//! aborts the run; the caller must discard the partially mutated tree.

use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::config::Options;
use crate::error::{EngineError, EngineResult};
use crate::syntax::ast::{Program, Stmt};
use crate::syntax::path::Ancestors;
use crate::syntax::walk::{Flow, Node, NodeMut, VisitMut, walk_program};

use self::edit::Statements;

/// Variable analysis.
pub mod analysis;
/// Per-run state.
pub mod context;
/// Mutation primitives.
pub mod edit;
/// Name allocation.
pub mod naming;
/// Variable virtualization.
pub mod virtualize;

pub use analysis::{ScopeReport, VariableAnalysis};
pub use context::{HelperKind, RunContext};
pub use virtualize::Virtualize;

/// Post-order action returned by [`Transform::transform`]; runs when the
/// walk exits the node it was created for.
pub type Deferred =
    Box<dyn for<'n> FnOnce(NodeMut<'n>, &Ancestors, &mut RunContext) -> EngineResult<()>>;

/// Boxes a post-order action.
pub fn defer<F>(action: F) -> Deferred
where
    F: for<'n> FnOnce(NodeMut<'n>, &Ancestors, &mut RunContext) -> EngineResult<()> + 'static,
{
    Box::new(action)
}

/// One transformation.
pub trait Transform {
    /// Name used in logs, reports and debug comments.
    fn name(&self) -> &'static str;

    /// Selects the nodes [`Transform::transform`] is called on.
    fn matches(&self, node: Node<'_>, ancestors: &Ancestors) -> bool;

    /// Runs on entry to a matched node.
    fn transform(
        &mut self,
        node: NodeMut<'_>,
        ancestors: &Ancestors,
        cx: &mut RunContext,
    ) -> EngineResult<Option<Deferred>>;

    /// Transforms that must run over the whole tree first.
    fn before(&self) -> Vec<Box<dyn Transform>> {
        Vec::new()
    }

    /// Transforms that run over the whole tree afterwards.
    fn after(&self) -> Vec<Box<dyn Transform>> {
        Vec::new()
    }

    /// Called before this transform's walk.
    fn on_start(&mut self, program: &mut Program, cx: &mut RunContext) -> EngineResult<()> {
        let _ = (program, cx);
        Ok(())
    }

    /// Called after this transform's walk and prelude insertion.
    fn on_finish(&mut self, program: &mut Program, cx: &mut RunContext) -> EngineResult<()> {
        let _ = (program, cx);
        Ok(())
    }
}

/// Counters for one stage's walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageReport {
    pub name: &'static str,
    /// Nodes entered.
    pub visited: usize,
    /// Nodes accepted by `matches`.
    pub matched: usize,
    /// Deferred actions run.
    pub deferred: usize,
    /// Nodes left alone after an `UnsupportedConstruct`.
    pub declined: usize,
    pub elapsed: Duration,
}

/// Stage reports in execution order.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub stages: Vec<StageReport>,
}

impl RunReport {
    /// The first report of the stage called `name`.
    pub fn stage(&self, name: &str) -> Option<&StageReport> {
        self.stages.iter().find(|s| s.name == name)
    }
}

/// A transform with its nested `before` and `after` stages.
pub struct Stage {
    transform: Box<dyn Transform>,
    before: Vec<Stage>,
    after: Vec<Stage>,
}

impl Stage {
    /// Builds the stage tree declared by `transform`.
    pub fn new(transform: Box<dyn Transform>) -> Self {
        let before = transform.before().into_iter().map(Stage::new).collect();
        let after = transform.after().into_iter().map(Stage::new).collect();
        Self {
            transform,
            before,
            after,
        }
    }

    pub fn name(&self) -> &'static str {
        self.transform.name()
    }

    /// Runs `before`, this transform, then `after`.
    pub fn apply(
        &mut self,
        program: &mut Program,
        cx: &mut RunContext,
        report: &mut RunReport,
    ) -> EngineResult<()> {
        for stage in &mut self.before {
            stage.apply(program, cx, report)?;
        }

        let name = self.transform.name();
        debug!(transform = name, "stage started");
        let started = Instant::now();
        self.transform.on_start(program, cx)?;

        let mut driver = Driver {
            transform: self.transform.as_mut(),
            cx: &mut *cx,
            stack: Vec::new(),
            stats: StageReport {
                name,
                ..StageReport::default()
            },
        };
        walk_program(program, &mut driver)?;
        if !driver.stack.is_empty() {
            return Err(EngineError::EngineInvariant(format!(
                "{name}: {} deferred actions left after the walk",
                driver.stack.len()
            )));
        }
        let mut stats = driver.stats;

        let prelude = cx.take_prelude();
        if !prelude.is_empty() {
            program.prepend(prelude);
        }
        self.transform.on_finish(program, cx)?;

        stats.elapsed = started.elapsed();
        debug!(
            transform = name,
            visited = stats.visited,
            matched = stats.matched,
            deferred = stats.deferred,
            declined = stats.declined,
            elapsed_us = stats.elapsed.as_micros() as u64,
            "stage finished"
        );
        report.stages.push(stats);

        for stage in &mut self.after {
            stage.apply(program, cx, report)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage")
            .field("name", &self.name())
            .field("before", &self.before)
            .field("after", &self.after)
            .finish()
    }
}

/// Ordered top-level stages.
#[derive(Debug, Default)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a top-level transform.
    pub fn with(mut self, transform: impl Transform + 'static) -> Self {
        self.push(Box::new(transform));
        self
    }

    pub fn push(&mut self, transform: Box<dyn Transform>) {
        self.stages.push(Stage::new(transform));
    }

    /// Runs every stage over `program` in a fresh run context.
    pub fn run(&mut self, program: &mut Program, options: Options) -> EngineResult<RunReport> {
        options.validate()?;
        let mut cx = RunContext::new(options);
        self.run_in(program, &mut cx)
    }

    /// Runs every stage over `program` in `cx`.
    pub fn run_in(&mut self, program: &mut Program, cx: &mut RunContext) -> EngineResult<RunReport> {
        let mut report = RunReport::default();
        for stage in &mut self.stages {
            stage.apply(program, cx, &mut report)?;
        }
        Ok(report)
    }
}

/// Adapts a transform to the walker.
struct Driver<'t, 'c> {
    transform: &'t mut dyn Transform,
    cx: &'c mut RunContext,
    /// One entry per entered node, popped on exit.
    stack: Vec<Option<Deferred>>,
    stats: StageReport,
}

impl Driver<'_, '_> {
    /// Keeps local declines local.
    fn absorb(&mut self, result: EngineResult<()>, ancestors: &Ancestors) -> EngineResult<()> {
        match result {
            Err(EngineError::UnsupportedConstruct(reason)) => {
                self.stats.declined += 1;
                debug!(
                    transform = self.stats.name,
                    path = %ancestors.path(),
                    %reason,
                    "declined"
                );
                Ok(())
            }
            other => other,
        }
    }
}

impl VisitMut for Driver<'_, '_> {
    fn enter(&mut self, node: NodeMut<'_>, ancestors: &Ancestors) -> EngineResult<Flow> {
        self.stats.visited += 1;
        let mut action = None;
        if self.transform.matches(node.as_node(), ancestors) {
            self.stats.matched += 1;
            match self.transform.transform(node, ancestors, self.cx) {
                Ok(deferred) => action = deferred,
                Err(e) => self.absorb(Err(e), ancestors)?,
            }
        }
        self.stack.push(action);
        Ok(Flow::Continue)
    }

    fn exit(&mut self, node: NodeMut<'_>, ancestors: &Ancestors) -> EngineResult<()> {
        let Some(slot) = self.stack.pop() else {
            return Err(EngineError::EngineInvariant(format!(
                "{}: exit without a matching enter at {}",
                self.stats.name,
                ancestors.path()
            )));
        };
        if let Some(action) = slot {
            self.stats.deferred += 1;
            trace!(transform = self.stats.name, path = %ancestors.path(), "running deferred action");
            let result = action(node, ancestors, self.cx);
            self.absorb(result, ancestors)?;
        }
        Ok(())
    }

    fn take_insertions(&mut self) -> Vec<Stmt> {
        self.cx.take_pending()
    }
}
