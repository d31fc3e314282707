//! Boolean operations on paths.
//!
//! Purpose
//! - Accumulate `(path, op)` pairs in call order and resolve them into one
//!   result path through the `flo_curves` path arithmetic.
//! - Report failure instead of printing garbage: non-finite coordinates, conic
//!   input, or an engine fault yield `PathOpsError`.
//!
//! Semantics
//! - Each operand is first reduced to the region its fill type covers
//!   (nonzero winding unless set to even-odd), so overlapping or nested
//!   contours inside one operand resolve to one clean outline.
//! - Resolution folds left from the empty path: `((∅ op₀ p₀) op₁ p₁) …`.
//!   A first `Difference` or `Intersect` therefore produces nothing.
//! - When every operator is `Union` the operand regions are merged in a
//!   single engine pass, in insertion order.
//! - Open contours are closed implicitly (fill semantics) unless
//!   `OpsCfg::allow_open_paths` is off; contours with no segments are
//!   dropped.
//! - Optional clean-up on the result: `fix_winding` orients outer contours
//!   and holes, `keep_starting_points` restarts contours at input starts.
//!
//! References
//! - Code cross-refs: `engine::{to_loops, from_loops, combine, union_all}`,
//!   `crate::path::Path`

mod engine;

use std::fmt;

use tracing::{debug, warn};

use crate::path::{Path, Point, Verb};

/// Set operator applied by `OpBuilder::add` and `op`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PathOp {
    /// `one − two`
    Difference,
    Intersect,
    Union,
    /// Symmetric difference.
    Xor,
    /// `two − one`
    ReverseDifference,
}

impl PathOp {
    pub const ALL: [PathOp; 5] = [
        PathOp::Difference,
        PathOp::Intersect,
        PathOp::Union,
        PathOp::Xor,
        PathOp::ReverseDifference,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PathOp::Difference => "difference",
            PathOp::Intersect => "intersect",
            PathOp::Union => "union",
            PathOp::Xor => "xor",
            PathOp::ReverseDifference => "reverse-difference",
        }
    }
}

/// Tolerances for engine calls and verb recovery, plus result clean-up.
#[derive(Clone, Copy, Debug)]
pub struct OpsCfg {
    /// Distance below which the engine treats points as coincident.
    pub accuracy: f64,
    /// Maximum control-point distance from the chord for a cubic to be
    /// reported as a line.
    pub line_eps: f64,
    /// Orient result contours by nesting depth.
    pub fix_winding: bool,
    /// With `fix_winding`, make outer contours clockwise instead of
    /// counter-clockwise (y-up).
    pub clockwise: bool,
    /// Restart result contours at the first matching input contour start.
    pub keep_starting_points: bool,
    /// Accept operands with open contours; otherwise they fail with
    /// `PathOpsError::OpenPath`.
    pub allow_open_paths: bool,
}

impl Default for OpsCfg {
    fn default() -> Self {
        Self {
            accuracy: 0.01,
            line_eps: 1e-3,
            fix_winding: false,
            clockwise: false,
            keep_starting_points: false,
            allow_open_paths: true,
        }
    }
}

impl OpsCfg {
    /// Defaults with winding fix-up and start-point restore switched on, as
    /// outline editors expect.
    pub fn outline() -> Self {
        Self {
            fix_winding: true,
            keep_starting_points: true,
            ..Self::default()
        }
    }
}

/// Reasons a boolean operation does not resolve.
#[derive(Clone, Debug, PartialEq)]
pub enum PathOpsError {
    /// The engine has no representation for this verb.
    UnsupportedVerb { verb: Verb },
    /// Operand `operand` (0-based, in `add` order) has a NaN or infinite point.
    NonFiniteInput { operand: usize },
    /// Operand `operand` has an open contour and open paths are not allowed.
    OpenPath { operand: usize },
    /// The engine produced a NaN or infinite point.
    NonFiniteOutput,
    /// The engine aborted.
    Engine { reason: String },
}

impl fmt::Display for PathOpsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedVerb { verb } => {
                write!(f, "unsupported verb for boolean operations: {}", verb.name())
            }
            Self::NonFiniteInput { operand } => {
                write!(f, "operand {operand} has non-finite coordinates")
            }
            Self::OpenPath { operand } => write!(f, "operand {operand} has an open contour"),
            Self::NonFiniteOutput => write!(f, "result has non-finite coordinates"),
            Self::Engine { reason } => write!(f, "path engine failed: {reason}"),
        }
    }
}

impl std::error::Error for PathOpsError {}

/// Accumulates `(path, op)` pairs for a single resolution.
#[derive(Clone, Debug, Default)]
pub struct OpBuilder {
    ops: Vec<(Path, PathOp)>,
    cfg: OpsCfg,
}

impl OpBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cfg(cfg: OpsCfg) -> Self {
        Self {
            ops: Vec::new(),
            cfg,
        }
    }

    /// Queue `path` combined with the running result by `op`.
    pub fn add(&mut self, path: &Path, op: PathOp) -> &mut Self {
        self.ops.push((path.clone(), op));
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ops.len()
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Resolve every queued operation into one path.
    pub fn resolve(&self) -> Result<Path, PathOpsError> {
        if self.ops.is_empty() {
            return Ok(Path::new());
        }
        let mut operands = Vec::with_capacity(self.ops.len());
        for (idx, (path, _)) in self.ops.iter().enumerate() {
            if !self.cfg.allow_open_paths && path.has_open_contours() {
                return Err(PathOpsError::OpenPath { operand: idx });
            }
            operands.push((engine::to_loops(path, idx)?, path.fill_type()));
        }

        let all_union = self.ops.iter().all(|(_, op)| *op == PathOp::Union);
        let accuracy = self.cfg.accuracy;
        debug!(operands = operands.len(), all_union, accuracy, "resolving");

        let outcome = engine::guarded(|| {
            let regions: Vec<engine::Loops> = operands
                .iter()
                .map(|(contours, fill)| engine::fill_region(contours, *fill, accuracy))
                .collect();
            if all_union {
                engine::union_all(&regions, accuracy)
            } else {
                regions
                    .iter()
                    .zip(self.ops.iter().map(|(_, op)| *op))
                    .fold(engine::Loops::new(), |acc, (region, op)| {
                        engine::combine(&acc, region, op, accuracy)
                    })
            }
        });
        let mut result = outcome.and_then(|loops| engine::from_loops(&loops, &self.cfg));
        match &mut result {
            Ok(path) => {
                self.tidy(path);
                debug!(
                    contours = path.contour_count(),
                    verbs = path.count_verbs(),
                    "resolved"
                );
            }
            Err(err) => {
                warn!(%err, "resolve failed");
            }
        }
        result
    }

    fn tidy(&self, path: &mut Path) {
        if self.cfg.fix_winding {
            path.fix_winding(self.cfg.clockwise);
        }
        if self.cfg.keep_starting_points {
            let starts: Vec<Point> = self
                .ops
                .iter()
                .flat_map(|(operand, _)| operand.contour_starts())
                .collect();
            path.restore_starting_points(&starts, self.cfg.accuracy as f32);
        }
    }

    /// Resolve into `out`. On failure `out` is left untouched and `false`
    /// is returned.
    pub fn resolve_into(&self, out: &mut Path) -> bool {
        match self.resolve() {
            Ok(path) => {
                *out = path;
                true
            }
            Err(_) => false,
        }
    }
}

impl Path {
    /// This path's filled region as non-overlapping contours.
    pub fn simplify(&self, cfg: OpsCfg) -> Result<Path, PathOpsError> {
        let mut builder = OpBuilder::with_cfg(cfg);
        builder.add(self, PathOp::Union);
        builder.resolve()
    }
}

/// `one op two` in a single call.
pub fn op(one: &Path, two: &Path, op: PathOp) -> Result<Path, PathOpsError> {
    let mut builder = OpBuilder::new();
    builder.add(one, PathOp::Union).add(two, op);
    builder.resolve()
}

#[cfg(test)]
mod tests;
