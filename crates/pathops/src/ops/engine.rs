//! Bridge between `Path` and the `flo_curves` path arithmetic.
//!
//! Contours go in as closed cubic loops (`SimpleBezierPath`) and come back the
//! same way. Lines travel as cubics with control points at the thirds and
//! are recovered on the way out by a chord test.
//!
//! The engine's set operations read each operand with an odd-crossing rule
//! and never intersect an operand's contours with each other, so every
//! operand is first reduced to the region its fill type covers
//! (`fill_region`): each contour is cut down to its outer perimeter, then
//! contours are merged by winding level.

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};

use flo_curves::bezier::path::{
    path_add, path_add_chain, path_intersect, path_remove_interior_points, path_sub, BezierPath,
    BezierPathFactory, SimpleBezierPath,
};
use flo_curves::geo::Coord2;
use nalgebra::Vector2;

use super::{OpsCfg, PathOp, PathOpsError};
use crate::path::{cubic_area, FillType, Path, Point, Verb};

/// Engine-side shape: one closed loop per contour.
pub(crate) type Loops = Vec<SimpleBezierPath>;

#[inline]
fn coord(p: Point) -> Coord2 {
    Coord2(p.x as f64, p.y as f64)
}

#[inline]
fn vec2(c: &Coord2) -> Vector2<f64> {
    Vector2::new(c.0, c.1)
}

#[inline]
fn narrow(c: &Coord2) -> Point {
    Point::new(c.0 as f32, c.1 as f32)
}

#[inline]
fn lerp(a: Coord2, b: Coord2, t: f64) -> Coord2 {
    Coord2(a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t)
}

fn finite(points: &[Point]) -> bool {
    points.iter().all(|p| p.x.is_finite() && p.y.is_finite())
}

/// Convert operand `operand` into closed loops. Open contours are closed and
/// empty contours dropped.
pub(crate) fn to_loops(path: &Path, operand: usize) -> Result<Loops, PathOpsError> {
    if !finite(path.points()) {
        return Err(PathOpsError::NonFiniteInput { operand });
    }
    let mut loops = Loops::new();
    let mut start = Coord2(0.0, 0.0);
    let mut curves: Vec<(Coord2, Coord2, Coord2)> = Vec::new();
    let mut iter = path.iter(true);
    let mut pts = [Point::zeros(); 4];
    loop {
        match iter.next_verb(&mut pts, true) {
            Verb::Move => {
                start = coord(pts[0]);
                curves.clear();
            }
            Verb::Line => {
                let (a, b) = (coord(pts[0]), coord(pts[1]));
                curves.push((lerp(a, b, 1.0 / 3.0), lerp(a, b, 2.0 / 3.0), b));
            }
            Verb::Quad => {
                let (a, q, d) = (coord(pts[0]), coord(pts[1]), coord(pts[2]));
                curves.push((lerp(a, q, 2.0 / 3.0), lerp(d, q, 2.0 / 3.0), d));
            }
            Verb::Cubic => {
                curves.push((coord(pts[1]), coord(pts[2]), coord(pts[3])));
            }
            Verb::Conic => return Err(PathOpsError::UnsupportedVerb { verb: Verb::Conic }),
            Verb::Close => {
                if !curves.is_empty() {
                    let segments = std::mem::take(&mut curves);
                    loops.push(<SimpleBezierPath as BezierPathFactory>::from_points(
                        start, segments,
                    ));
                }
            }
            Verb::Done => break,
        }
    }
    Ok(loops)
}

/// Whether the cubic `a, c1, c2, b` is a straight segment from `a` to `b`.
fn is_straight(a: &Coord2, c1: &Coord2, c2: &Coord2, b: &Coord2, cfg: &OpsCfg) -> bool {
    let (a, b) = (vec2(a), vec2(b));
    let chord = b - a;
    let len = chord.norm();
    let eps = cfg.line_eps.max(len * 1e-9);
    [vec2(c1), vec2(c2)].iter().all(|c| {
        let rel = c - a;
        if len <= eps {
            return rel.norm() <= eps;
        }
        let off = (chord.x * rel.y - chord.y * rel.x).abs() / len;
        let t = chord.dot(&rel) / (len * len);
        off <= eps && (-1e-9..=1.0 + 1e-9).contains(&t)
    })
}

/// Convert engine loops back into a path of moves, lines, cubics and closes.
pub(crate) fn from_loops(loops: &Loops, cfg: &OpsCfg) -> Result<Path, PathOpsError> {
    let mut out = Path::new();
    for lp in loops {
        let start = lp.start_point();
        let curves: Vec<(Coord2, Coord2, Coord2)> = lp.points().collect();
        if curves.is_empty() {
            continue;
        }
        let all_finite = std::iter::once(&start)
            .chain(curves.iter().flat_map(|(c1, c2, e)| [c1, c2, e]))
            .all(|c| c.0.is_finite() && c.1.is_finite());
        if !all_finite {
            return Err(PathOpsError::NonFiniteOutput);
        }

        let s = narrow(&start);
        out.move_to(s.x, s.y);
        let mut prev = start;
        let last = curves.len() - 1;
        for (idx, (c1, c2, end)) in curves.iter().enumerate() {
            let straight = is_straight(&prev, c1, c2, end, cfg);
            let e = narrow(end);
            // The closing line is implied by `close`.
            if !(idx == last && straight && e == s) {
                if straight {
                    out.line_to(e.x, e.y);
                } else {
                    let (p1, p2) = (narrow(c1), narrow(c2));
                    out.cubic_to(p1.x, p1.y, p2.x, p2.y, e.x, e.y);
                }
            }
            prev = *end;
        }
        out.close();
    }
    Ok(out)
}

/// Signed area of a closed engine loop.
fn loop_area(lp: &SimpleBezierPath) -> f64 {
    let mut from = vec2(&lp.start_point());
    let mut area = 0.0;
    for (c1, c2, end) in lp.points() {
        let end = vec2(&end);
        area += cubic_area(from, vec2(&c1), vec2(&c2), end);
        from = end;
    }
    area
}

/// Region covered by one operand's contours under `fill`, as loops without
/// overlaps.
pub(crate) fn fill_region(contours: &Loops, fill: FillType, accuracy: f64) -> Loops {
    let mut regions: Vec<(Loops, i32)> = contours
        .iter()
        .filter_map(|contour| {
            let sign = if loop_area(contour) < 0.0 { -1 } else { 1 };
            let region: Loops = path_remove_interior_points(&vec![contour.clone()], accuracy);
            (!region.is_empty()).then_some((region, sign))
        })
        .collect();

    match fill {
        FillType::EvenOdd => regions.iter().fold(Loops::new(), |acc, (region, _)| {
            combine(&acc, region, PathOp::Xor, accuracy)
        }),
        FillType::Winding if regions.len() <= 1 => {
            regions.pop().map(|(region, _)| region).unwrap_or_default()
        }
        FillType::Winding if regions.iter().all(|(_, s)| *s == regions[0].1) => {
            let parts: Vec<Loops> = regions.into_iter().map(|(region, _)| region).collect();
            path_add_chain(&parts, accuracy)
        }
        FillType::Winding => winding_levels(regions, accuracy),
    }
}

/// Nonzero fill of contours with mixed orientation. Tracks the area at
/// each winding number `k != 0` while contours are added one at a time.
fn winding_levels(regions: Vec<(Loops, i32)>, accuracy: f64) -> Loops {
    let mut levels: BTreeMap<i32, Loops> = BTreeMap::new();
    for (region, sign) in regions {
        let covered = union_levels(&levels, accuracy);
        let mut next: BTreeMap<i32, Loops> = BTreeMap::new();
        for (&k, area) in &levels {
            let outside = combine(area, &region, PathOp::Difference, accuracy);
            deposit(&mut next, k, outside, accuracy);
            let inside = combine(area, &region, PathOp::Intersect, accuracy);
            deposit(&mut next, k + sign, inside, accuracy);
        }
        let fresh = combine(&region, &covered, PathOp::Difference, accuracy);
        deposit(&mut next, sign, fresh, accuracy);
        levels = next;
    }
    union_levels(&levels, accuracy)
}

fn union_levels(levels: &BTreeMap<i32, Loops>, accuracy: f64) -> Loops {
    let parts: Vec<Loops> = levels.values().cloned().collect();
    match parts.len() {
        0 => Loops::new(),
        1 => parts.into_iter().next().unwrap_or_default(),
        _ => path_add_chain(&parts, accuracy),
    }
}

fn deposit(levels: &mut BTreeMap<i32, Loops>, k: i32, piece: Loops, accuracy: f64) {
    if k == 0 || piece.is_empty() {
        return;
    }
    let slot = levels.entry(k).or_default();
    *slot = combine(slot, &piece, PathOp::Union, accuracy);
}

/// `a op b` on engine loops. Empty operands never reach the engine.
pub(crate) fn combine(a: &Loops, b: &Loops, op: PathOp, accuracy: f64) -> Loops {
    if a.is_empty() || b.is_empty() {
        return match (op, a.is_empty()) {
            (PathOp::Union | PathOp::Xor | PathOp::ReverseDifference, true) => b.clone(),
            (PathOp::Union | PathOp::Xor | PathOp::Difference, false) => a.clone(),
            _ => Loops::new(),
        };
    }
    match op {
        PathOp::Union => path_add(a, b, accuracy),
        PathOp::Intersect => path_intersect(a, b, accuracy),
        PathOp::Difference => path_sub(a, b, accuracy),
        PathOp::ReverseDifference => path_sub(b, a, accuracy),
        PathOp::Xor => {
            let a_only: Loops = path_sub(a, b, accuracy);
            let b_only: Loops = path_sub(b, a, accuracy);
            path_add(&a_only, &b_only, accuracy)
        }
    }
}

/// Union of every operand in insertion order, in one engine pass.
pub(crate) fn union_all(operands: &Vec<Loops>, accuracy: f64) -> Loops {
    path_add_chain(operands, accuracy)
}

/// Run an engine call, turning a panic inside the engine into an error.
pub(crate) fn guarded<F>(call: F) -> Result<Loops, PathOpsError>
where
    F: FnOnce() -> Loops,
{
    panic::catch_unwind(AssertUnwindSafe(call)).map_err(|payload| {
        let reason = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "engine panicked".to_string());
        PathOpsError::Engine { reason }
    })
}
