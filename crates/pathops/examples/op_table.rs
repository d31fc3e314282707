//! Every boolean operator applied to two overlapping squares.
//!
//! Run: `cargo run -p pathops --example op_table`

use pathops::prelude::*;

fn square(x: f32, y: f32, side: f32) -> Path {
    let mut p = Path::new();
    p.move_to(x, y)
        .line_to(x + side, y)
        .line_to(x + side, y + side)
        .line_to(x, y + side)
        .close();
    p
}

fn main() {
    let one = square(0.0, 0.0, 2.0);
    let two = square(1.0, 1.0, 2.0);
    for kind in PathOp::ALL {
        match op(&one, &two, kind) {
            Ok(result) => {
                let area: f64 = result.contour_areas().iter().map(|a| a.abs()).sum();
                println!(
                    "{:<18} contours={} area={}",
                    kind.name(),
                    result.contour_count(),
                    format_g(area)
                );
                for line in verb_lines(&result) {
                    println!("  {line}");
                }
            }
            Err(err) => println!("{:<18} failed: {err}", kind.name()),
        }
    }
}
