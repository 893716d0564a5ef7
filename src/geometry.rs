use std::f64::consts::FRAC_PI_4;

use crate::rucoolbox_structs::{MarkerBox, Side, Style};

/// Rotation, in degrees, of markers drawn on triangular/window tracks.
pub const ROTATED_ANGLE: f64 = 45.0;

/// Marker placement for a loop between `[x1, x2)` and `[y1, y2)`.
///
/// Triangular and window styles return the anchor and size of a box that is to
/// be rotated by [`ROTATED_ANGLE`]: `x` is the genomic midpoint of the two
/// anchors and `y` half their distance. Matrix style returns an axis-aligned
/// box centred on the pixel block, above the diagonal for [`Side::Upper`] and
/// mirrored below it for [`Side::Lower`]; [`Side::Both`] yields the upper box.
pub fn interval_box(x1: i64, x2: i64, y1: i64, y2: i64, style: Style, side: Side) -> MarkerBox {
    let (x1, x2, y1, y2) = (x1 as f64, x2 as f64, y1 as f64, y2 as f64);
    match style {
        Style::Triangular | Style::Window => {
            let m1 = (x1 + x2) / 2.0;
            let m2 = (y1 + y2) / 2.0;
            let x = (m1 + m2) / 2.0;
            MarkerBox {
                x,
                y: x - m1,
                width: ((y2 - y1) / 2.0) / FRAC_PI_4.cos(),
                height: ((x2 - x1) / 2.0) / FRAC_PI_4.cos(),
            }
        }
        Style::Matrix => match side {
            Side::Upper | Side::Both => MarkerBox {
                x: (y1 + y2) / 2.0,
                y: (x1 + x2) / 2.0,
                width: y2 - y1,
                height: x2 - x1,
            },
            Side::Lower => MarkerBox {
                x: (x1 + x2) / 2.0,
                y: (y1 + y2) / 2.0,
                width: x2 - x1,
                height: y2 - y1,
            },
        },
    }
}
