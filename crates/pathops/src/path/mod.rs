//! 2D paths as verb streams.
//!
//! Purpose
//! - Store a path the way the boolean engine's callers build it: an ordered
//!   list of verbs, a flat point buffer, and one weight per conic.
//! - Provide the geometric queries the driver and tests need (bounds, signed
//!   area, contour split) without pulling in a geometry kernel.
//!
//! Conventions
//! - Scalars are `f32`; points are `nalgebra::Vector2<f32>`.
//! - A non-empty path always starts with `Verb::Move`. Drawing into an empty
//!   path, or after a `close`, injects a move to the last contour start
//!   (the origin for an empty path).
//! - `close` adds no points. Repeated closes collapse to one.
//! - A `move_to` right after another move replaces that move's point.
//! - The fill type (nonzero winding by default) decides which regions a path
//!   covers when it enters a boolean operation.
//! - Signed area is positive for counter-clockwise contours in a y-up frame.
//!
//! References
//! - Code cross-refs: `iter::VerbIter`, `contour` (reverse, winding,
//!   start-point restore), `crate::ops::OpBuilder`,
//!   `crate::format::write_verbs`

mod contour;
mod iter;

pub use iter::{Segment, VerbIter};

use nalgebra::{Affine2, Point2, Vector2};

/// Path point (single precision).
pub type Point = Vector2<f32>;

/// Number of samples per conic when integrating its area.
const CONIC_AREA_SAMPLES: usize = 64;

/// A tagged drawing instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Verb {
    Move,
    Line,
    Quad,
    Conic,
    Cubic,
    Close,
    /// Iterator sentinel; never stored in a path.
    Done,
}

impl Verb {
    /// Number of points this verb appends to the point buffer.
    #[inline]
    pub fn point_count(self) -> usize {
        match self {
            Verb::Move | Verb::Line => 1,
            Verb::Quad | Verb::Conic => 2,
            Verb::Cubic => 3,
            Verb::Close | Verb::Done => 0,
        }
    }

    /// Name used in the printed verb stream.
    pub fn name(self) -> &'static str {
        match self {
            Verb::Move => "moveTo",
            Verb::Line => "lineTo",
            Verb::Quad => "quadTo",
            Verb::Conic => "conicTo",
            Verb::Cubic => "cubicTo",
            Verb::Close => "close",
            Verb::Done => "done",
        }
    }
}

/// Rule deciding which regions a path covers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FillType {
    /// Nonzero winding number.
    #[default]
    Winding,
    /// Odd winding number.
    EvenOdd,
}

/// Axis-aligned bounds of a path's control points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }
    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }
}

/// Ordered verbs with their points and conic weights.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    verbs: Vec<Verb>,
    points: Vec<Point>,
    weights: Vec<f32>,
    /// Index into `points` of the most recent move.
    last_move: usize,
    fill_type: FillType,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new contour at `(x, y)`. A move directly after a move only
    /// updates its point.
    pub fn move_to(&mut self, x: f32, y: f32) -> &mut Self {
        let p = Point::new(x, y);
        if self.verbs.last() == Some(&Verb::Move) {
            if let Some(last) = self.points.last_mut() {
                *last = p;
            }
            return self;
        }
        self.last_move = self.points.len();
        self.verbs.push(Verb::Move);
        self.points.push(p);
        self
    }

    pub fn line_to(&mut self, x: f32, y: f32) -> &mut Self {
        self.inject_move_if_needed();
        self.verbs.push(Verb::Line);
        self.points.push(Point::new(x, y));
        self
    }

    pub fn quad_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> &mut Self {
        self.inject_move_if_needed();
        self.verbs.push(Verb::Quad);
        self.points.extend([Point::new(x1, y1), Point::new(x2, y2)]);
        self
    }

    /// Rational quadratic segment with weight `w`.
    pub fn conic_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, w: f32) -> &mut Self {
        self.inject_move_if_needed();
        self.verbs.push(Verb::Conic);
        self.points.extend([Point::new(x1, y1), Point::new(x2, y2)]);
        self.weights.push(w);
        self
    }

    pub fn cubic_to(
        &mut self,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        x3: f32,
        y3: f32,
    ) -> &mut Self {
        self.inject_move_if_needed();
        self.verbs.push(Verb::Cubic);
        self.points
            .extend([Point::new(x1, y1), Point::new(x2, y2), Point::new(x3, y3)]);
        self
    }

    /// Close the current contour. No-op on an empty path or right after a close.
    pub fn close(&mut self) -> &mut Self {
        match self.verbs.last() {
            None | Some(Verb::Close) => {}
            Some(_) => self.verbs.push(Verb::Close),
        }
        self
    }

    fn inject_move_if_needed(&mut self) {
        match self.verbs.last() {
            None => {
                self.move_to(0.0, 0.0);
            }
            Some(Verb::Close) => {
                let start = self.points[self.last_move];
                self.move_to(start.x, start.y);
            }
            Some(_) => {}
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.verbs.is_empty()
    }
    #[inline]
    pub fn count_verbs(&self) -> usize {
        self.verbs.len()
    }
    #[inline]
    pub fn count_points(&self) -> usize {
        self.points.len()
    }
    #[inline]
    pub fn verbs(&self) -> &[Verb] {
        &self.verbs
    }
    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }
    #[inline]
    pub(crate) fn weights(&self) -> &[f32] {
        &self.weights
    }
    #[inline]
    pub fn fill_type(&self) -> FillType {
        self.fill_type
    }
    pub fn set_fill_type(&mut self, fill_type: FillType) -> &mut Self {
        self.fill_type = fill_type;
        self
    }
    #[inline]
    pub fn last_point(&self) -> Option<Point> {
        self.points.last().copied()
    }

    /// Number of contours (moves) in the path.
    pub fn contour_count(&self) -> usize {
        self.verbs.iter().filter(|v| **v == Verb::Move).count()
    }

    /// Iterate verbs; `force_close` closes open contours.
    pub fn iter(&self, force_close: bool) -> VerbIter<'_> {
        VerbIter::new(self, force_close)
    }

    /// Bounds of all stored points, `None` for an empty path.
    pub fn bounds(&self) -> Option<Bounds> {
        let first = *self.points.first()?;
        let (min, max) = self
            .points
            .iter()
            .fold((first, first), |(lo, hi), p| (lo.inf(p), hi.sup(p)));
        Some(Bounds { min, max })
    }

    /// Signed area of each contour, treating open contours as closed.
    pub fn contour_areas(&self) -> Vec<f64> {
        let mut areas = Vec::with_capacity(self.contour_count());
        let mut current: Option<f64> = None;
        for segment in self.iter(true) {
            match segment {
                Segment::Move(_) => {
                    if let Some(area) = current.take() {
                        areas.push(area);
                    }
                    current = Some(0.0);
                }
                Segment::Close => {
                    if let Some(area) = current.take() {
                        areas.push(area);
                    }
                }
                other => {
                    *current.get_or_insert(0.0) += segment_area(&other);
                }
            }
        }
        if let Some(area) = current {
            areas.push(area);
        }
        areas
    }

    /// Total signed area enclosed by the path.
    pub fn signed_area(&self) -> f64 {
        self.contour_areas().iter().sum()
    }

    /// Whether the path's total signed area is negative (clockwise in a
    /// y-up frame).
    pub fn is_clockwise(&self) -> bool {
        self.signed_area() < 0.0
    }

    /// Copy of the path with every point mapped through `m`. Verbs, conic
    /// weights and fill type are kept.
    pub fn transform(&self, m: &Affine2<f32>) -> Path {
        let mut out = self.clone();
        for p in &mut out.points {
            *p = m.transform_point(&Point2::from(*p)).coords;
        }
        out
    }
}

#[inline]
fn widen(p: Point) -> Vector2<f64> {
    Vector2::new(p.x as f64, p.y as f64)
}

/// Green's theorem contribution `∫ (x dy − y dx) / 2` of one segment.
fn segment_area(segment: &Segment) -> f64 {
    match *segment {
        Segment::Line(p0, p1) => {
            let (a, b) = (widen(p0), widen(p1));
            0.5 * (a.x * b.y - b.x * a.y)
        }
        Segment::Quad(p0, p1, p2) => {
            let (a, q, d) = (widen(p0), widen(p1), widen(p2));
            let b = a + (q - a) * (2.0 / 3.0);
            let c = d + (q - d) * (2.0 / 3.0);
            cubic_area(a, b, c, d)
        }
        Segment::Cubic(p0, p1, p2, p3) => cubic_area(widen(p0), widen(p1), widen(p2), widen(p3)),
        Segment::Conic(p0, p1, p2, w) => conic_area(widen(p0), widen(p1), widen(p2), w as f64),
        Segment::Move(_) | Segment::Close => 0.0,
    }
}

pub(crate) fn cubic_area(p0: Vector2<f64>, p1: Vector2<f64>, p2: Vector2<f64>, p3: Vector2<f64>) -> f64 {
    (p0.x * (6.0 * p1.y + 3.0 * p2.y + p3.y)
        + 3.0 * (p1.x * (-2.0 * p0.y + p2.y + p3.y) - p2.x * (p0.y + p1.y - 2.0 * p3.y))
        - p3.x * (p0.y + 3.0 * p1.y + 6.0 * p2.y))
        / 20.0
}

fn conic_area(p0: Vector2<f64>, p1: Vector2<f64>, p2: Vector2<f64>, w: f64) -> f64 {
    let eval = |t: f64| {
        let u = 1.0 - t;
        let (b0, b1, b2) = (u * u, 2.0 * w * u * t, t * t);
        (p0 * b0 + p1 * b1 + p2 * b2) / (b0 + b1 + b2)
    };
    let mut prev = p0;
    let mut area = 0.0;
    for k in 1..=CONIC_AREA_SAMPLES {
        let next = eval(k as f64 / CONIC_AREA_SAMPLES as f64);
        area += 0.5 * (prev.x * next.y - next.x * prev.y);
        prev = next;
    }
    area
}
