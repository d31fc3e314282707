//! Path boolean operations over the `flo_curves` engine.
//!
//! Layout
//! - `path`: verb/point storage, verb iteration, bounds and signed area.
//! - `ops`: `OpBuilder` and `op` (union, intersect, difference, xor,
//!   reverse difference) with failure reporting.
//! - `format`: `%g`-style verb stream output used by the driver.
//! - `alloc`: overflow-checked, fatal-on-failure byte allocation.
//! - `fixture`: captured regression input for the union driver.
//!
//! API Policy
//! - `api` is the flat surface for callers; `prelude` covers the common
//!   imports. Module paths may move.

pub mod alloc;
pub mod api;
pub mod fixture;
pub mod format;
pub mod ops;
pub mod path;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use ops::{op, OpBuilder, OpsCfg, PathOp, PathOpsError};
pub use path::{FillType, Path, Point, Segment, Verb, VerbIter};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::format::{format_g, verb_lines, write_verbs};
    pub use crate::ops::{op, OpBuilder, OpsCfg, PathOp, PathOpsError};
    pub use crate::path::{Bounds, FillType, Path, Point, Segment, Verb, VerbIter};
}
