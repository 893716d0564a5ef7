//! Turns the loops of an [`IntervalIndex`] into the list of shapes a contact-map
//! track has to draw for one region.

use std::str::FromStr;

use crate::error::CoolboxError;
use crate::geometry::{interval_box, ROTATED_ANGLE};
use crate::loops::IntervalIndex;
use crate::rucoolbox_structs::{DepthRatio, LoopInterval, MarkerBox, Side, Style};

/// `bed_rgb` (or `rgb`) takes the colour stored with each loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorSpec {
    BedRgb,
    Fixed(String),
}

impl ColorSpec {
    fn resolve(&self, lp: &LoopInterval) -> String {
        match self {
            ColorSpec::BedRgb => lp.color.clone(),
            ColorSpec::Fixed(c) => c.clone(),
        }
    }
}

impl FromStr for ColorSpec {
    type Err = CoolboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Err(CoolboxError::config("color", "empty color")),
            "bed_rgb" | "rgb" => Ok(ColorSpec::BedRgb),
            other => Ok(ColorSpec::Fixed(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PeakStyle {
    pub color: ColorSpec,
    pub fill_color: ColorSpec,
    pub fill: bool,
    pub alpha: f64,
    pub line_width: f64,
    pub line_style: String,
    pub side: Side,
}

impl Default for PeakStyle {
    fn default() -> Self {
        PeakStyle {
            color: ColorSpec::BedRgb,
            fill_color: ColorSpec::BedRgb,
            fill: false,
            alpha: 0.6,
            line_width: 5.0,
            line_style: "solid".to_string(),
            side: Side::Both,
        }
    }
}

/// Properties of the contact-map track the loops are drawn on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackView {
    pub style: Style,
    pub depth_ratio: DepthRatio,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub chrom: String,
    pub start: i64,
    pub end: i64,
}

impl FromStr for Region {
    type Err = CoolboxError;

    /// `chr1:1000-2000`, commas allowed in the numbers.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || CoolboxError::config("region", format!("expected chrom:start-end, got {:?}", s));
        let (chrom, range) = s.rsplit_once(':').ok_or_else(bad)?;
        let (start, end) = range.split_once('-').ok_or_else(bad)?;
        let start: i64 = start.replace(',', "").parse().map_err(|_| bad())?;
        let end: i64 = end.replace(',', "").parse().map_err(|_| bad())?;
        if chrom.is_empty() || end <= start {
            return Err(bad());
        }
        Ok(Region {
            chrom: chrom.to_string(),
            start,
            end,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker<'a> {
    pub interval: &'a LoopInterval,
    pub bbox: MarkerBox,
    /// Degrees.
    pub angle: f64,
    pub edge_color: String,
    pub face_color: String,
    pub fill: bool,
    pub alpha: f64,
    pub line_width: f64,
    pub line_style: String,
}

fn marker<'a>(bbox: MarkerBox, angle: f64, lp: &'a LoopInterval, style: &PeakStyle) -> Marker<'a> {
    Marker {
        interval: lp,
        bbox,
        angle,
        edge_color: style.color.resolve(lp),
        face_color: style.fill_color.resolve(lp),
        fill: style.fill,
        alpha: style.alpha,
        line_width: style.line_width,
        line_style: style.line_style.clone(),
    }
}

/// Markers for every loop overlapping `fetch` (or `region` when no fetch range
/// is given), in loop start order.
///
/// Rotated styles drop loops sitting above the visible depth of the triangle;
/// matrix style emits one box per requested side.
pub fn plan_markers<'a>(
    index: &'a IntervalIndex,
    style: &PeakStyle,
    track: TrackView,
    region: &Region,
    fetch: Option<(i64, i64)>,
) -> Vec<Marker<'a>> {
    let (start_fetch, end_fetch) = fetch.unwrap_or((region.start, region.end));
    let mut markers = Vec::new();

    for lp in index.query(&region.chrom, start_fetch, end_fetch) {
        if track.style.is_rotated() {
            let depth_limit = (region.end - region.start) as f64 * 0.5 * track.depth_ratio.as_f64();
            let bbox = interval_box(lp.start1, lp.end1, lp.start2, lp.end2, track.style, style.side);
            if bbox.y >= depth_limit {
                continue;
            }
            markers.push(marker(bbox, ROTATED_ANGLE, lp, style));
        } else {
            if style.side.includes_upper() {
                let bbox = interval_box(lp.start1, lp.end1, lp.start2, lp.end2, Style::Matrix, Side::Upper);
                markers.push(marker(bbox, 0.0, lp, style));
            }
            if style.side.includes_lower() {
                let bbox = interval_box(lp.start1, lp.end1, lp.start2, lp.end2, Style::Matrix, Side::Lower);
                markers.push(marker(bbox, 0.0, lp, style));
            }
        }
    }

    markers
}
