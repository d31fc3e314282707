//! Text rendering of verb streams.
//!
//! One line per verb: the verb name, then each new point as `(x, y)`; conics
//! append `(w)`. Numbers use C's `%g` rendering (6 significant digits).
//!
//! ```text
//! moveTo (5, -225)
//! lineTo (-225, 7425)
//! cubicTo (5182.23, 4948.33) (5160, 4992.79) (5160, 5040)
//! close
//! ```

use std::io::{self, Write};

use crate::path::{Path, Point, Verb};

/// Significant digits of `%g`.
const PRECISION: i32 = 6;

/// Render `v` the way C's `printf("%g", v)` does.
pub fn format_g(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v < 0.0 { "-inf" } else { "inf" }.to_string();
    }
    if v == 0.0 {
        return if v.is_sign_negative() { "-0" } else { "0" }.to_string();
    }
    // Exponent after rounding to PRECISION significant digits.
    let sci = format!("{:.*e}", (PRECISION - 1) as usize, v);
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    if exp < -4 || exp >= PRECISION {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exp.abs())
    } else {
        let decimals = (PRECISION - 1 - exp) as usize;
        trim_fraction(&format!("{:.*}", decimals, v)).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

fn pair(p: Point) -> String {
    format!("({}, {})", format_g(p.x as f64), format_g(p.y as f64))
}

/// Lines of the verb stream, without trailing newlines. `Done` ends the
/// stream and is not rendered.
pub fn verb_lines(path: &Path) -> Vec<String> {
    let mut iter = path.iter(false);
    let mut pts = [Point::zeros(); 4];
    let mut lines = Vec::with_capacity(path.count_verbs());
    loop {
        let verb = iter.next_verb(&mut pts, false);
        let line = match verb {
            Verb::Done => break,
            Verb::Move => format!("moveTo {}", pair(pts[0])),
            Verb::Line => format!("lineTo {}", pair(pts[1])),
            Verb::Quad => format!("quadTo {} {}", pair(pts[1]), pair(pts[2])),
            Verb::Conic => format!(
                "conicTo {} {} ({})",
                pair(pts[1]),
                pair(pts[2]),
                format_g(iter.conic_weight() as f64)
            ),
            Verb::Cubic => format!(
                "cubicTo {} {} {}",
                pair(pts[1]),
                pair(pts[2]),
                pair(pts[3])
            ),
            Verb::Close => "close".to_string(),
        };
        lines.push(line);
    }
    lines
}

/// Write the verb stream of `path` to `out`, returning the number of lines.
pub fn write_verbs<W: Write>(path: &Path, out: &mut W) -> io::Result<usize> {
    let lines = verb_lines(path);
    for line in &lines {
        writeln!(out, "{line}")?;
    }
    Ok(lines.len())
}
