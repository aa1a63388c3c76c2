//! Turning pixel grids into outlines.

use kurbo::{BezPath, Point};
use serde::Deserialize;

use crate::glyph::Bitmap;

/// The relation between the pixel grid and font units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Metrics {
    pub units_per_em: u16,
    /// Pixels along each side of the em box.
    pub pixels_per_em: u16,
    /// The pixel row that lands on the baseline once rows are flipped.
    ///
    /// Grid rows grow downwards and font units grow upwards.
    pub flip_axis: i32,
}

impl Default for Metrics {
    fn default() -> Self {
        Metrics {
            units_per_em: 1024,
            pixels_per_em: 8,
            flip_axis: 6,
        }
    }
}

impl Metrics {
    /// Font units per pixel.
    pub fn scale(&self) -> f64 {
        self.units_per_em as f64 / self.pixels_per_em.max(1) as f64
    }

    /// The bottom left corner, in pixel units, of grid cell (x, y) in outline space.
    pub fn cell_origin(&self, x: i32, y: i32) -> (i32, i32) {
        (x, self.flip_axis - y)
    }
}

/// Draw one closed square contour per set pixel of `bitmap`.
///
/// Contours are clockwise and never merged; adjacent pixels share edges.
pub fn rasterize(bitmap: &Bitmap, metrics: &Metrics) -> BezPath {
    let scale = metrics.scale();
    let mut path = BezPath::new();
    for (x, y) in bitmap.filled() {
        let (left, bottom) =
            metrics.cell_origin(x as i32 + bitmap.offset_x(), y as i32 + bitmap.offset_y());
        let x0 = left as f64 * scale;
        let y0 = bottom as f64 * scale;
        let x1 = x0 + scale;
        let y1 = y0 + scale;
        path.move_to(Point::new(x0, y0));
        path.line_to(Point::new(x0, y1));
        path.line_to(Point::new(x1, y1));
        path.line_to(Point::new(x1, y0));
        path.close_path();
    }
    path
}
