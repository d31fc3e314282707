use super::*;
use crate::fixture::union_fixture;
use crate::format::verb_lines;
use crate::path::{FillType, Point, Verb};
use proptest::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Counter-clockwise rectangle `[x0, x1] × [y0, y1]`.
fn rect(x0: f32, y0: f32, x1: f32, y1: f32) -> Path {
    let mut p = Path::new();
    p.move_to(x0, y0)
        .line_to(x1, y0)
        .line_to(x1, y1)
        .line_to(x0, y1)
        .close();
    p
}

/// Area of results without holes, independent of contour orientation.
fn unsigned_area(p: &Path) -> f64 {
    p.contour_areas().iter().map(|a| a.abs()).sum()
}

fn assert_area(p: &Path, expected: f64) {
    let got = unsigned_area(p);
    assert!(
        (got - expected).abs() <= 1e-3 * expected.max(1.0),
        "area {got}, expected {expected}"
    );
}

/// Clockwise rectangle `[x0, x1] × [y0, y1]`.
fn rect_cw(x0: f32, y0: f32, x1: f32, y1: f32) -> Path {
    let mut p = Path::new();
    p.move_to(x0, y0)
        .line_to(x0, y1)
        .line_to(x1, y1)
        .line_to(x1, y0)
        .close();
    p
}

/// Rectangles `(x0, y0, x1, y1, ccw)` as contours of one path.
fn rects(specs: &[(f32, f32, f32, f32, bool)]) -> Path {
    let mut p = Path::new();
    for &(x0, y0, x1, y1, ccw) in specs {
        p.move_to(x0, y0);
        if ccw {
            p.line_to(x1, y0).line_to(x1, y1).line_to(x0, y1);
        } else {
            p.line_to(x0, y1).line_to(x1, y1).line_to(x1, y0);
        }
        p.close();
    }
    p
}

/// Whether some straight edge turns straight back along the previous one.
fn has_backtrack(p: &Path) -> bool {
    let mut pts = [Point::zeros(); 4];
    let mut iter = p.iter(true);
    let mut ring: Vec<Point> = Vec::new();
    let mut rings = Vec::new();
    loop {
        match iter.next_verb(&mut pts, false) {
            Verb::Move => ring = vec![pts[0]],
            Verb::Line => ring.push(pts[1]),
            Verb::Quad | Verb::Conic => ring.push(pts[2]),
            Verb::Cubic => ring.push(pts[3]),
            Verb::Close => {
                if ring.len() > 1 && ring.first() == ring.last() {
                    ring.pop();
                }
                rings.push(std::mem::take(&mut ring));
            }
            Verb::Done => break,
        }
    }
    rings.iter().any(|ring| {
        let n = ring.len();
        (0..n).any(|i| {
            let (a, b, c) = (ring[i], ring[(i + 1) % n], ring[(i + 2) % n]);
            let (u, v) = (b - a, c - b);
            let cross = u.x * v.y - u.y * v.x;
            u.norm() > 0.0
                && v.norm() > 0.0
                && cross.abs() <= 1e-6 * u.norm() * v.norm()
                && u.dot(&v) < 0.0
        })
    })
}

fn only_straight(p: &Path) -> bool {
    p.verbs()
        .iter()
        .all(|v| matches!(v, Verb::Move | Verb::Line | Verb::Close))
}

#[test]
fn empty_builder_resolves_to_empty_path() {
    let builder = OpBuilder::new();
    assert!(builder.is_empty());
    assert_eq!(builder.resolve(), Ok(Path::new()));
}

#[test]
fn union_of_overlapping_squares() {
    let mut builder = OpBuilder::new();
    builder
        .add(&rect(0.0, 0.0, 2.0, 2.0), PathOp::Union)
        .add(&rect(1.0, 1.0, 3.0, 3.0), PathOp::Union);
    assert_eq!(builder.len(), 2);
    let out = builder.resolve().unwrap();
    assert_eq!(out.contour_count(), 1);
    assert!(only_straight(&out));
    assert_area(&out, 7.0);
    let b = out.bounds().unwrap();
    assert_eq!((b.min.x, b.min.y, b.max.x, b.max.y), (0.0, 0.0, 3.0, 3.0));
}

#[test]
fn each_operator_on_overlapping_squares() {
    let a = rect(0.0, 0.0, 2.0, 2.0);
    let b = rect(1.0, 1.0, 3.0, 3.0);
    assert_area(&op(&a, &b, PathOp::Union).unwrap(), 7.0);
    assert_area(&op(&a, &b, PathOp::Intersect).unwrap(), 1.0);
    assert_area(&op(&a, &b, PathOp::Difference).unwrap(), 3.0);
    assert_area(&op(&a, &b, PathOp::ReverseDifference).unwrap(), 3.0);

    let inter = op(&a, &b, PathOp::Intersect).unwrap();
    let bounds = inter.bounds().unwrap();
    assert_eq!((bounds.min.x, bounds.max.x), (1.0, 2.0));
}

#[test]
fn xor_of_disjoint_squares_keeps_both() {
    let a = rect(0.0, 0.0, 2.0, 2.0);
    let b = rect(5.0, 5.0, 7.0, 7.0);
    let out = op(&a, &b, PathOp::Xor).unwrap();
    assert_eq!(out.contour_count(), 2);
    assert_area(&out, 8.0);
}

#[test]
fn first_operator_applies_against_empty_path() {
    let sq = rect(0.0, 0.0, 2.0, 2.0);
    for (first, keeps) in [
        (PathOp::Difference, false),
        (PathOp::Intersect, false),
        (PathOp::Union, true),
        (PathOp::Xor, true),
        (PathOp::ReverseDifference, true),
    ] {
        let mut builder = OpBuilder::new();
        builder.add(&sq, first);
        let out = builder.resolve().unwrap();
        assert_eq!(!out.is_empty(), keeps, "{}", first.name());
        if keeps {
            assert_area(&out, 4.0);
        }
    }
}

#[test]
fn mixed_ops_fold_in_call_order() {
    // (A ∪ B) − C
    let mut builder = OpBuilder::new();
    builder
        .add(&rect(0.0, 0.0, 4.0, 2.0), PathOp::Union)
        .add(&rect(0.0, 2.5, 4.0, 4.0), PathOp::Union)
        .add(&rect(-1.0, -1.0, 5.0, 1.0), PathOp::Difference);
    let out = builder.resolve().unwrap();
    assert_area(&out, 4.0 + 6.0);
    assert_eq!(out.contour_count(), 2);
}

#[test]
fn conic_input_is_rejected() {
    let mut p = Path::new();
    p.move_to(0.0, 0.0).conic_to(1.0, 0.0, 1.0, 1.0, 0.7).close();
    let err = op(&rect(0.0, 0.0, 1.0, 1.0), &p, PathOp::Union).unwrap_err();
    assert_eq!(err, PathOpsError::UnsupportedVerb { verb: Verb::Conic });
    assert!(err.to_string().contains("conicTo"));
}

#[test]
fn non_finite_input_names_operand() {
    let mut bad = Path::new();
    bad.move_to(0.0, 0.0).line_to(f32::NAN, 1.0).line_to(1.0, 1.0).close();
    let err = op(&rect(0.0, 0.0, 1.0, 1.0), &bad, PathOp::Union).unwrap_err();
    assert_eq!(err, PathOpsError::NonFiniteInput { operand: 1 });
}

#[test]
fn resolve_into_only_writes_on_success() {
    let sentinel = rect(10.0, 10.0, 11.0, 11.0);

    let mut bad = Path::new();
    bad.move_to(0.0, 0.0).line_to(f32::INFINITY, 0.0).line_to(0.0, 1.0).close();
    let mut failing = OpBuilder::new();
    failing.add(&bad, PathOp::Union);
    let mut out = sentinel.clone();
    assert!(!failing.resolve_into(&mut out));
    assert_eq!(out, sentinel);

    let mut ok = OpBuilder::new();
    ok.add(&rect(0.0, 0.0, 1.0, 1.0), PathOp::Union);
    assert!(ok.resolve_into(&mut out));
    assert_ne!(out, sentinel);
}

#[test]
fn open_contours_are_filled_as_closed() {
    let mut open = Path::new();
    open.move_to(0.0, 0.0).line_to(2.0, 0.0).line_to(0.0, 2.0);
    let out = op(&open, &rect(10.0, 10.0, 11.0, 11.0), PathOp::Union).unwrap();
    assert_eq!(out.contour_count(), 2);
    assert_area(&out, 3.0);
}

#[test]
fn curves_survive_as_cubics() {
    let k = 0.552_284_8_f32;
    let mut circle = Path::new();
    circle
        .move_to(1.0, 0.0)
        .cubic_to(1.0, k, k, 1.0, 0.0, 1.0)
        .cubic_to(-k, 1.0, -1.0, k, -1.0, 0.0)
        .cubic_to(-1.0, -k, -k, -1.0, 0.0, -1.0)
        .cubic_to(k, -1.0, 1.0, -k, 1.0, 0.0)
        .close();
    let out = op(&circle, &rect(0.0, -0.5, 3.0, 0.5), PathOp::Union).unwrap();
    assert!(out.verbs().contains(&Verb::Cubic));
    assert!(out.verbs().contains(&Verb::Line));
    let area = unsigned_area(&out);
    assert!(area > std::f64::consts::PI && area < std::f64::consts::PI + 3.0);
}

#[test]
fn fixture_union_resolves_to_closed_stream() {
    let (path1, path2) = union_fixture();
    let mut builder = OpBuilder::new();
    builder.add(&path1, PathOp::Union).add(&path2, PathOp::Union);
    let out = builder.resolve().expect("fixture resolves");
    assert!(!out.is_empty());

    let lines = verb_lines(&out);
    assert!(lines.first().unwrap().starts_with("moveTo ("));
    assert_eq!(lines.last().unwrap(), "close");
    for line in &lines {
        let name = line.split(' ').next().unwrap();
        let pairs = line.matches(", ").count();
        let expected = match name {
            "moveTo" | "lineTo" => 1,
            "quadTo" | "conicTo" => 2,
            "cubicTo" => 3,
            "close" => 0,
            other => panic!("unexpected verb {other}"),
        };
        assert_eq!(pairs, expected, "{line}");
    }
}

#[test]
fn fixture_union_is_deterministic() {
    let (path1, path2) = union_fixture();
    let run = || {
        let mut builder = OpBuilder::new();
        builder.add(&path1, PathOp::Union).add(&path2, PathOp::Union);
        builder.resolve().unwrap()
    };
    let first = run();
    let second = run();
    assert_eq!(first, second);
    assert_eq!(verb_lines(&first), verb_lines(&second));
}

#[test]
fn swapped_fixture_order_keeps_outcome() {
    let (path1, path2) = union_fixture();
    let mut forward = OpBuilder::new();
    forward.add(&path1, PathOp::Union).add(&path2, PathOp::Union);
    let mut backward = OpBuilder::new();
    backward.add(&path2, PathOp::Union).add(&path1, PathOp::Union);

    let a = forward.resolve().unwrap();
    let b = backward.resolve().unwrap();
    let (area_a, area_b) = (a.signed_area().abs(), b.signed_area().abs());
    assert!(
        (area_a - area_b).abs() <= 1e-3 * area_a.max(area_b),
        "{area_a} vs {area_b}"
    );
    assert_eq!(a.verbs().last(), Some(&Verb::Close));
    assert_eq!(b.verbs().last(), Some(&Verb::Close));
}

#[test]
fn seeded_random_rectangles_union() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut builder = OpBuilder::new();
    let mut areas = Vec::new();
    for _ in 0..8 {
        let x0: f32 = rng.gen_range(0.0..200.0);
        let y0: f32 = rng.gen_range(0.0..200.0);
        let w: f32 = rng.gen_range(5.0..80.0);
        let h: f32 = rng.gen_range(5.0..80.0);
        builder.add(&rect(x0, y0, x0 + w, y0 + h), PathOp::Union);
        areas.push((w * h) as f64);
    }
    let out = builder.resolve().unwrap();
    let largest = areas.iter().cloned().fold(0.0, f64::max);
    let total: f64 = areas.iter().sum();
    let area = out.signed_area().abs();
    assert!(area >= largest * 0.99, "{area} < {largest}");
    assert!(area <= total * 1.01, "{area} > {total}");
}

#[test]
fn overlapping_contours_in_one_operand_merge() {
    let two = rects(&[(0.0, 0.0, 2.0, 2.0, true), (1.0, 1.0, 3.0, 3.0, true)]);
    let far = rect(10.0, 10.0, 11.0, 11.0);
    let out = op(&two, &far, PathOp::Union).unwrap();
    assert_eq!(out.contour_count(), 2);
    assert_area(&out, 8.0);

    let mut alone = OpBuilder::new();
    alone.add(&two, PathOp::Union);
    let out = alone.resolve().unwrap();
    assert_eq!(out.contour_count(), 1);
    assert_area(&out, 7.0);
}

#[test]
fn nested_same_direction_contour_is_filled() {
    let nested = rects(&[(0.0, 0.0, 10.0, 10.0, true), (2.0, 2.0, 8.0, 8.0, true)]);
    let out = op(&nested, &rect(20.0, 0.0, 21.0, 1.0), PathOp::Union).unwrap();
    assert_eq!(out.contour_count(), 2);
    assert_area(&out, 101.0);
    assert!(out.contains(Point::new(5.0, 5.0)));
}

#[test]
fn opposite_direction_contour_stays_a_hole() {
    let donut = rects(&[(0.0, 0.0, 10.0, 10.0, true), (2.0, 2.0, 8.0, 8.0, false)]);
    let out = op(&donut, &rect(20.0, 0.0, 21.0, 1.0), PathOp::Union).unwrap();
    assert_eq!(out.contour_count(), 3);
    assert!((out.contour_areas().iter().map(|a| a.abs()).sum::<f64>() - 137.0).abs() < 0.1);
    assert!(!out.contains(Point::new(5.0, 5.0)));
    assert!(out.contains(Point::new(1.0, 5.0)));
}

#[test]
fn even_odd_operand_keeps_nested_contour_as_hole() {
    let mut nested = rects(&[(0.0, 0.0, 10.0, 10.0, true), (2.0, 2.0, 8.0, 8.0, true)]);
    nested.set_fill_type(FillType::EvenOdd);
    let out = nested.simplify(OpsCfg::default()).unwrap();
    assert_eq!(out.contour_count(), 2);
    assert!(!out.contains(Point::new(5.0, 5.0)));
    assert!(out.contains(Point::new(1.0, 5.0)));
}

#[test]
fn crossing_contours_of_opposite_direction_cancel() {
    // Winding is +1, -1 outside the overlap and 0 inside it.
    let mixed = rects(&[(0.0, 0.0, 4.0, 4.0, true), (2.0, 2.0, 6.0, 6.0, false)]);
    let out = mixed.simplify(OpsCfg::default()).unwrap();
    assert_area(&out, 24.0);
    assert!(!out.contains(Point::new(3.0, 3.0)));
    assert!(out.contains(Point::new(1.0, 1.0)));
    assert!(out.contains(Point::new(5.0, 5.0)));
}

fn overlapping_pair() -> Path {
    rects(&[(0.0, 0.0, 10.0, 10.0, true), (5.0, 5.0, 15.0, 15.0, true)])
}

fn assert_vertices(p: &Path, expected: &[(f32, f32)]) {
    assert_eq!(p.count_points(), expected.len(), "{:?}", verb_lines(p));
    for &(x, y) in expected {
        assert!(
            p.points().iter().any(|q| (q.x - x).abs() < 1e-3 && (q.y - y).abs() < 1e-3),
            "missing ({x}, {y}) in {:?}",
            verb_lines(p)
        );
    }
}

const MERGED_OUTLINE: [(f32, f32); 8] = [
    (0.0, 0.0),
    (10.0, 0.0),
    (10.0, 5.0),
    (15.0, 5.0),
    (15.0, 15.0),
    (5.0, 15.0),
    (5.0, 10.0),
    (0.0, 10.0),
];

#[test]
fn simplify_merges_overlap_into_one_outline() {
    let result = overlapping_pair().simplify(OpsCfg::outline()).unwrap();
    assert_ne!(result, overlapping_pair());
    assert_eq!(result.contour_count(), 1);
    assert!(only_straight(&result));
    assert_vertices(&result, &MERGED_OUTLINE);
    assert_eq!(result.points()[0], Point::new(0.0, 0.0));
    assert!((result.signed_area() - 175.0).abs() < 1e-2);
}

#[test]
fn simplify_clockwise_reverses_the_outline() {
    let cfg = OpsCfg {
        clockwise: true,
        ..OpsCfg::outline()
    };
    let result = overlapping_pair().simplify(cfg).unwrap();
    assert_vertices(&result, &MERGED_OUTLINE);
    assert_eq!(result.points()[0], Point::new(0.0, 0.0));
    assert!((result.signed_area() + 175.0).abs() < 1e-2);
    assert!(result.is_clockwise());
}

#[test]
fn fix_winding_orients_result_holes() {
    let cfg = OpsCfg::outline();
    let mut builder = OpBuilder::with_cfg(cfg);
    builder
        .add(&rect_cw(0.0, 0.0, 10.0, 10.0), PathOp::Union)
        .add(&rect(3.0, 3.0, 7.0, 7.0), PathOp::Difference);
    let out = builder.resolve().unwrap();
    let mut areas = out.contour_areas();
    areas.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(areas.len(), 2);
    assert!((areas[0] + 16.0).abs() < 1e-2, "{areas:?}");
    assert!((areas[1] - 100.0).abs() < 1e-2, "{areas:?}");
}

#[test]
fn open_operands_can_be_refused() {
    let mut open = Path::new();
    open.move_to(0.0, 0.0).line_to(2.0, 0.0).line_to(0.0, 2.0);
    let cfg = OpsCfg {
        allow_open_paths: false,
        ..OpsCfg::default()
    };
    let mut builder = OpBuilder::with_cfg(cfg);
    builder
        .add(&rect(5.0, 5.0, 6.0, 6.0), PathOp::Union)
        .add(&open, PathOp::Union);
    let err = builder.resolve().unwrap_err();
    assert_eq!(err, PathOpsError::OpenPath { operand: 1 });
    assert!(err.to_string().contains("open contour"));

    let mut closed = open.clone();
    closed.close();
    let mut builder = OpBuilder::with_cfg(cfg);
    builder.add(&closed, PathOp::Union);
    assert_area(&builder.resolve().unwrap(), 2.0);
}

#[test]
fn fixture_union_has_no_doubled_back_edges() {
    let (path1, path2) = union_fixture();
    assert!(has_backtrack(&path1));
    let out = op(&path1, &path2, PathOp::Union).unwrap();
    assert!(!has_backtrack(&out), "{:?}", verb_lines(&out));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn union_area_of_two_rectangles(
        ax in 0i32..60, ay in 0i32..60, aw in 1i32..40, ah in 1i32..40,
        bx in 0i32..60, by in 0i32..60, bw in 1i32..40, bh in 1i32..40,
    ) {
        let (ax1, ay1, bx1, by1) = (ax + aw, ay + ah, bx + bw, by + bh);
        // Coincident edges are a separate concern.
        let xs = [ax, ax1, bx, bx1];
        let ys = [ay, ay1, by, by1];
        for i in 0..4 {
            for j in (i + 1)..4 {
                prop_assume!(xs[i] != xs[j] && ys[i] != ys[j]);
            }
        }
        let a = rect(ax as f32, ay as f32, ax1 as f32, ay1 as f32);
        let b = rect(bx as f32, by as f32, bx1 as f32, by1 as f32);
        let ox = (ax1.min(bx1) - ax.max(bx)).max(0);
        let oy = (ay1.min(by1) - ay.max(by)).max(0);
        let expected = (aw * ah + bw * bh - ox * oy) as f64;

        let forward = op(&a, &b, PathOp::Union).unwrap();
        let backward = op(&b, &a, PathOp::Union).unwrap();
        prop_assert!((unsigned_area(&forward) - expected).abs() <= 1e-3 * expected);
        prop_assert!((unsigned_area(&backward) - expected).abs() <= 1e-3 * expected);
        prop_assert!(only_straight(&forward));
    }
}
