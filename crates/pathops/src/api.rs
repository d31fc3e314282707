//! Flat surface matching the external path-ops contract.
//!
//! - construct path: `Path::new`, `move_to`, `line_to`, `cubic_to`, `close`
//! - union builder: `OpBuilder::new`, `add`, `resolve` / `resolve_into`
//! - path edits: `reverse`, `transform`, `simplify`, `fix_winding`
//! - verb iterator: `Path::iter`, `VerbIter::next_verb`, `conic_weight`
//! - allocation shim: `malloc_throw`

pub use crate::alloc::{checked_size, malloc_throw, AllocError, RawBlock};
pub use crate::fixture::union_fixture;
pub use crate::format::{format_g, verb_lines, write_verbs};
pub use crate::ops::{op, OpBuilder, OpsCfg, PathOp, PathOpsError};
pub use crate::path::{Bounds, FillType, Path, Point, Segment, Verb, VerbIter};
