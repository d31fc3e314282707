//! Verb iteration with current-point context.
//!
//! `next_verb` fills a 4-point buffer: slot 0 holds the current point, the
//! following slots hold the points the verb adds. A close whose contour does
//! not end at its start first yields the closing `Line`, then `Close`.

use super::{Path, Point, Verb};

/// One iterated segment, carrying its start point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Segment {
    Move(Point),
    Line(Point, Point),
    Quad(Point, Point, Point),
    Conic(Point, Point, Point, f32),
    Cubic(Point, Point, Point, Point),
    Close,
}

impl Segment {
    pub fn verb(&self) -> Verb {
        match self {
            Segment::Move(_) => Verb::Move,
            Segment::Line(..) => Verb::Line,
            Segment::Quad(..) => Verb::Quad,
            Segment::Conic(..) => Verb::Conic,
            Segment::Cubic(..) => Verb::Cubic,
            Segment::Close => Verb::Close,
        }
    }

    /// Points added by this segment (the start point is excluded).
    pub fn end_points(&self) -> Vec<Point> {
        match *self {
            Segment::Move(p) => vec![p],
            Segment::Line(_, p) => vec![p],
            Segment::Quad(_, p1, p2) | Segment::Conic(_, p1, p2, _) => vec![p1, p2],
            Segment::Cubic(_, p1, p2, p3) => vec![p1, p2, p3],
            Segment::Close => Vec::new(),
        }
    }
}

/// Cursor over a path's verbs.
pub struct VerbIter<'a> {
    path: &'a Path,
    verb_idx: usize,
    point_idx: usize,
    weight_idx: usize,
    force_close: bool,
    move_to: Point,
    last_pt: Point,
    conic_weight: f32,
    /// Segments emitted since the last move.
    segments: usize,
    /// Contour has segments and no close yet (force-close mode only).
    need_close: bool,
    /// Closing line was emitted; `Close` comes next.
    pending_close: bool,
}

impl<'a> VerbIter<'a> {
    pub fn new(path: &'a Path, force_close: bool) -> Self {
        Self {
            path,
            verb_idx: 0,
            point_idx: 0,
            weight_idx: 0,
            force_close,
            move_to: Point::zeros(),
            last_pt: Point::zeros(),
            conic_weight: 1.0,
            segments: 0,
            need_close: false,
            pending_close: false,
        }
    }

    /// Weight of the conic most recently returned by `next_verb`.
    #[inline]
    pub fn conic_weight(&self) -> f32 {
        self.conic_weight
    }

    /// Advance to the next verb, writing its points into `pts`.
    ///
    /// With `consume_degenerates`, zero-length lines, moves that start no
    /// segment, and closes of empty contours are skipped. Returns
    /// `Verb::Done` once the path is exhausted, on every later call too.
    pub fn next_verb(&mut self, pts: &mut [Point; 4], consume_degenerates: bool) -> Verb {
        if self.pending_close {
            self.pending_close = false;
            pts[0] = self.move_to;
            self.finish_contour();
            return Verb::Close;
        }
        let path = self.path;
        let (verbs, points) = (path.verbs(), path.points());
        loop {
            let Some(&verb) = verbs.get(self.verb_idx) else {
                if self.need_close {
                    return self.auto_close(pts);
                }
                return Verb::Done;
            };
            match verb {
                Verb::Move => {
                    if self.need_close {
                        return self.auto_close(pts);
                    }
                    self.verb_idx += 1;
                    let p = points[self.point_idx];
                    self.point_idx += 1;
                    self.move_to = p;
                    self.last_pt = p;
                    self.segments = 0;
                    if consume_degenerates && !self.starts_segment() {
                        continue;
                    }
                    pts[0] = p;
                    return Verb::Move;
                }
                Verb::Line => {
                    self.verb_idx += 1;
                    let p = points[self.point_idx];
                    self.point_idx += 1;
                    if consume_degenerates && p == self.last_pt {
                        continue;
                    }
                    pts[0] = self.last_pt;
                    pts[1] = p;
                    return self.emit(Verb::Line, p);
                }
                Verb::Quad | Verb::Conic => {
                    self.verb_idx += 1;
                    let (p1, p2) = (points[self.point_idx], points[self.point_idx + 1]);
                    self.point_idx += 2;
                    if verb == Verb::Conic {
                        self.conic_weight = path.weights()[self.weight_idx];
                        self.weight_idx += 1;
                    }
                    pts[0] = self.last_pt;
                    pts[1] = p1;
                    pts[2] = p2;
                    return self.emit(verb, p2);
                }
                Verb::Cubic => {
                    self.verb_idx += 1;
                    let (p1, p2, p3) = (
                        points[self.point_idx],
                        points[self.point_idx + 1],
                        points[self.point_idx + 2],
                    );
                    self.point_idx += 3;
                    pts[0] = self.last_pt;
                    pts[1] = p1;
                    pts[2] = p2;
                    pts[3] = p3;
                    return self.emit(Verb::Cubic, p3);
                }
                Verb::Close => {
                    self.verb_idx += 1;
                    if consume_degenerates && self.segments == 0 {
                        self.finish_contour();
                        continue;
                    }
                    return self.auto_close(pts);
                }
                // Never stored; treat as end of data.
                Verb::Done => {
                    self.verb_idx = verbs.len();
                }
            }
        }
    }

    fn emit(&mut self, verb: Verb, end: Point) -> Verb {
        self.last_pt = end;
        self.segments += 1;
        self.need_close = self.force_close;
        verb
    }

    /// Whether the verb after the current move draws something.
    fn starts_segment(&self) -> bool {
        matches!(
            self.path.verbs().get(self.verb_idx),
            Some(Verb::Line | Verb::Quad | Verb::Conic | Verb::Cubic)
        )
    }

    fn auto_close(&mut self, pts: &mut [Point; 4]) -> Verb {
        if self.last_pt != self.move_to {
            pts[0] = self.last_pt;
            pts[1] = self.move_to;
            self.last_pt = self.move_to;
            self.pending_close = true;
            Verb::Line
        } else {
            pts[0] = self.move_to;
            self.finish_contour();
            Verb::Close
        }
    }

    fn finish_contour(&mut self) {
        self.need_close = false;
        self.segments = 0;
        self.last_pt = self.move_to;
    }
}

impl Iterator for VerbIter<'_> {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        let mut pts = [Point::zeros(); 4];
        let segment = match self.next_verb(&mut pts, false) {
            Verb::Move => Segment::Move(pts[0]),
            Verb::Line => Segment::Line(pts[0], pts[1]),
            Verb::Quad => Segment::Quad(pts[0], pts[1], pts[2]),
            Verb::Conic => Segment::Conic(pts[0], pts[1], pts[2], self.conic_weight),
            Verb::Cubic => Segment::Cubic(pts[0], pts[1], pts[2], pts[3]),
            Verb::Close => Segment::Close,
            Verb::Done => return None,
        };
        Some(segment)
    }
}
