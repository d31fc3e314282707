//! Regression inputs for the union driver.
//!
//! The coordinates are kept verbatim, including the far-out `773669888`
//! vertex of the second contour. Treat them as an opaque reproduction case,
//! not as representative geometry.

use crate::path::Path;

/// The two closed paths submitted to the union driver, in submission order.
pub fn union_fixture() -> (Path, Path) {
    let mut path1 = Path::new();
    path1
        .move_to(5.0, -225.0)
        .line_to(-225.0, 7425.0)
        .line_to(7425.0, 7425.0)
        .line_to(7425.0, -225.0)
        .line_to(-225.0, -225.0)
        .line_to(5.0, -225.0)
        .close();

    let mut path2 = Path::new();
    path2
        .move_to(5940.0, 2790.0)
        .line_to(5940.0, 2160.0)
        .line_to(5970.0, 1980.0)
        .line_to(5688.0, 773_669_888.0)
        .line_to(5688.0, 2160.0)
        .line_to(5688.0, 2430.0)
        .line_to(5400.0, 4590.0)
        .line_to(5220.0, 4590.0)
        .line_to(5220.0, 4920.0)
        .cubic_to(
            5182.229,
            4948.328,
            5160.0,
            4992.7866,
            5160.0,
            5040.0005,
        )
        .line_to(5940.0, 2790.0)
        .close();

    (path1, path2)
}
