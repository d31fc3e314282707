//! Per-contour view of a path: reversal, restart and winding queries.

use nalgebra::Vector2;

use super::{segment_area, widen, FillType, Path, Point, Segment, Verb};

/// Samples per curve when flattening for winding queries.
const FLATTEN_STEPS: usize = 16;

/// One drawing verb with the points it adds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Piece {
    Line(Point),
    Quad(Point, Point),
    Conic(Point, Point, f32),
    Cubic(Point, Point, Point),
}

impl Piece {
    pub(crate) fn end(&self) -> Point {
        match *self {
            Piece::Line(p) | Piece::Quad(_, p) | Piece::Conic(_, p, _) | Piece::Cubic(_, _, p) => p,
        }
    }

    /// The same curve traversed from its end back to `start`.
    fn reversed(&self, start: Point) -> Piece {
        match *self {
            Piece::Line(_) => Piece::Line(start),
            Piece::Quad(c, _) => Piece::Quad(c, start),
            Piece::Conic(c, _, w) => Piece::Conic(c, start, w),
            Piece::Cubic(c1, c2, _) => Piece::Cubic(c2, c1, start),
        }
    }

    fn segment(&self, start: Point) -> Segment {
        match *self {
            Piece::Line(p) => Segment::Line(start, p),
            Piece::Quad(c, p) => Segment::Quad(start, c, p),
            Piece::Conic(c, p, w) => Segment::Conic(start, c, p, w),
            Piece::Cubic(c1, c2, p) => Segment::Cubic(start, c1, c2, p),
        }
    }

    fn point_at(&self, start: Point, t: f64) -> Vector2<f64> {
        let a = widen(start);
        let u = 1.0 - t;
        match *self {
            Piece::Line(p) => a * u + widen(p) * t,
            Piece::Quad(c, p) => a * (u * u) + widen(c) * (2.0 * u * t) + widen(p) * (t * t),
            Piece::Conic(c, p, w) => {
                let w = w as f64;
                let (b0, b1, b2) = (u * u, 2.0 * w * u * t, t * t);
                (a * b0 + widen(c) * b1 + widen(p) * b2) / (b0 + b1 + b2)
            }
            Piece::Cubic(c1, c2, p) => {
                a * (u * u * u)
                    + widen(c1) * (3.0 * u * u * t)
                    + widen(c2) * (3.0 * u * t * t)
                    + widen(p) * (t * t * t)
            }
        }
    }
}

/// A move followed by its pieces, and whether a close ends it.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Contour {
    pub(crate) start: Point,
    pub(crate) pieces: Vec<Piece>,
    pub(crate) closed: bool,
}

impl Contour {
    fn new(start: Point) -> Self {
        Self {
            start,
            pieces: Vec::new(),
            closed: false,
        }
    }

    fn last_point(&self) -> Point {
        self.pieces.last().map_or(self.start, Piece::end)
    }

    /// Same contour traversed backwards, starting at the old last point.
    pub(crate) fn reversed(&self) -> Contour {
        let mut from = self.start;
        let mut starts = Vec::with_capacity(self.pieces.len());
        for piece in &self.pieces {
            starts.push(from);
            from = piece.end();
        }
        let pieces = self
            .pieces
            .iter()
            .zip(starts)
            .rev()
            .map(|(piece, start)| piece.reversed(start))
            .collect();
        Contour {
            start: from,
            pieces,
            closed: self.closed,
        }
    }

    /// Pieces of the closed loop with the closing line made explicit.
    fn cycle(&self) -> Vec<Piece> {
        let mut cycle = self.pieces.clone();
        if self.last_point() != self.start {
            cycle.push(Piece::Line(self.start));
        }
        cycle
    }

    /// Index of the first on-curve point within `tolerance` of `p`.
    fn vertex_near(&self, p: Point, tolerance: f32) -> Option<usize> {
        let cycle = self.cycle();
        std::iter::once(self.start)
            .chain(cycle.iter().map(Piece::end))
            .take(cycle.len().max(1))
            .position(|v| (v - p).norm() <= tolerance)
    }

    /// Closed contour restarted at on-curve point `vertex`. A trailing line
    /// back to the new start is left to `close`.
    fn restarted_at(&self, vertex: usize) -> Contour {
        if vertex == 0 || !self.closed {
            return self.clone();
        }
        let cycle = self.cycle();
        let start = cycle[vertex - 1].end();
        let mut pieces: Vec<Piece> = cycle[vertex..]
            .iter()
            .chain(cycle[..vertex].iter())
            .copied()
            .collect();
        if matches!(pieces.last(), Some(Piece::Line(p)) if *p == start) {
            pieces.pop();
        }
        Contour {
            start,
            pieces,
            closed: true,
        }
    }

    /// Signed area, taking the contour as closed.
    pub(crate) fn area(&self) -> f64 {
        let mut from = self.start;
        let mut total = 0.0;
        for piece in &self.pieces {
            total += segment_area(&piece.segment(from));
            from = piece.end();
        }
        total + segment_area(&Segment::Line(from, self.start))
    }

    fn polyline(&self) -> Vec<Vector2<f64>> {
        let mut out = vec![widen(self.start)];
        let mut from = self.start;
        for piece in &self.pieces {
            match piece {
                Piece::Line(p) => out.push(widen(*p)),
                _ => out.extend(
                    (1..=FLATTEN_STEPS).map(|k| piece.point_at(from, k as f64 / FLATTEN_STEPS as f64)),
                ),
            }
            from = piece.end();
        }
        out
    }

    /// Winding number of `p` around the contour taken as closed (curves
    /// flattened).
    pub(crate) fn winding_at(&self, p: Vector2<f64>) -> i32 {
        let poly = self.polyline();
        let mut winding = 0;
        for (i, a) in poly.iter().enumerate() {
            let b = poly[(i + 1) % poly.len()];
            let cross = (b.x - a.x) * (p.y - a.y) - (p.x - a.x) * (b.y - a.y);
            if a.y <= p.y {
                if b.y > p.y && cross > 0.0 {
                    winding += 1;
                }
            } else if b.y <= p.y && cross < 0.0 {
                winding -= 1;
            }
        }
        winding
    }

    /// Midpoint of the first piece.
    fn boundary_sample(&self) -> Vector2<f64> {
        self.pieces
            .first()
            .map_or(widen(self.start), |piece| piece.point_at(self.start, 0.5))
    }
}

impl Path {
    /// Split into contours, keeping stored verbs as they are.
    pub(crate) fn contours(&self) -> Vec<Contour> {
        let mut out = Vec::new();
        let mut current: Option<Contour> = None;
        let (mut idx, mut widx) = (0, 0);
        for &verb in &self.verbs {
            let n = verb.point_count();
            let p = &self.points[idx..idx + n];
            idx += n;
            let piece = match verb {
                Verb::Move => {
                    out.extend(current.take());
                    current = Some(Contour::new(p[0]));
                    continue;
                }
                Verb::Close => {
                    if let Some(mut contour) = current.take() {
                        contour.closed = true;
                        out.push(contour);
                    }
                    continue;
                }
                Verb::Done => continue,
                Verb::Line => Piece::Line(p[0]),
                Verb::Quad => Piece::Quad(p[0], p[1]),
                Verb::Conic => {
                    let w = self.weights[widx];
                    widx += 1;
                    Piece::Conic(p[0], p[1], w)
                }
                Verb::Cubic => Piece::Cubic(p[0], p[1], p[2]),
            };
            if let Some(contour) = current.as_mut() {
                contour.pieces.push(piece);
            }
        }
        out.extend(current);
        out
    }

    fn push_contour(&mut self, contour: &Contour) {
        self.move_to(contour.start.x, contour.start.y);
        for piece in &contour.pieces {
            match *piece {
                Piece::Line(p) => self.line_to(p.x, p.y),
                Piece::Quad(c, p) => self.quad_to(c.x, c.y, p.x, p.y),
                Piece::Conic(c, p, w) => self.conic_to(c.x, c.y, p.x, p.y, w),
                Piece::Cubic(c1, c2, p) => self.cubic_to(c1.x, c1.y, c2.x, c2.y, p.x, p.y),
            };
        }
        if contour.closed {
            self.close();
        }
    }

    /// Replace the geometry, keeping the fill type.
    fn rebuild(&mut self, contours: &[Contour]) {
        let mut out = Path::new();
        out.fill_type = self.fill_type;
        for contour in contours {
            out.push_contour(contour);
        }
        *self = out;
    }

    /// Reverse every contour in place. Each contour starts at its former last
    /// point; closed and open state are kept.
    pub fn reverse(&mut self) {
        let reversed: Vec<Contour> = self.contours().iter().map(Contour::reversed).collect();
        self.rebuild(&reversed);
    }

    /// Start point of every contour, in order.
    pub fn contour_starts(&self) -> Vec<Point> {
        self.contours().iter().map(|c| c.start).collect()
    }

    /// Whether some contour with segments lacks a `close`.
    pub fn has_open_contours(&self) -> bool {
        self.contours()
            .iter()
            .any(|c| !c.closed && !c.pieces.is_empty())
    }

    /// Sum of contour winding numbers around `p`. Curves are flattened, so
    /// points within a hair of a curved edge may be misclassified.
    pub fn winding_number(&self, p: Point) -> i32 {
        let q = widen(p);
        self.contours().iter().map(|c| c.winding_at(q)).sum()
    }

    /// Whether `p` is filled under the path's fill type.
    pub fn contains(&self, p: Point) -> bool {
        let winding = self.winding_number(p);
        match self.fill_type {
            FillType::Winding => winding != 0,
            FillType::EvenOdd => winding % 2 != 0,
        }
    }

    /// Orient closed contours by nesting depth: outer contours
    /// counter-clockwise (clockwise when `clockwise`), holes the other way.
    pub fn fix_winding(&mut self, clockwise: bool) {
        let contours = self.contours();
        let fixed: Vec<Contour> = contours
            .iter()
            .enumerate()
            .map(|(i, contour)| {
                let area = contour.area();
                if !contour.closed || area == 0.0 {
                    return contour.clone();
                }
                let sample = contour.boundary_sample();
                let depth = contours
                    .iter()
                    .enumerate()
                    .filter(|(j, other)| *j != i && other.closed && other.winding_at(sample) != 0)
                    .count();
                let want_positive = (depth % 2 == 0) != clockwise;
                if (area > 0.0) == want_positive {
                    contour.clone()
                } else {
                    contour.reversed()
                }
            })
            .collect();
        self.rebuild(&fixed);
    }

    /// Restart each closed contour at the first of `starts` that matches one
    /// of its on-curve points within `tolerance`.
    pub fn restore_starting_points(&mut self, starts: &[Point], tolerance: f32) {
        let restarted: Vec<Contour> = self
            .contours()
            .iter()
            .map(|contour| {
                starts
                    .iter()
                    .find_map(|s| contour.vertex_near(*s, tolerance))
                    .map_or_else(|| contour.clone(), |v| contour.restarted_at(v))
            })
            .collect();
        self.rebuild(&restarted);
    }
}
