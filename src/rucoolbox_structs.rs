use std::fmt;
use std::str::FromStr;

use ndarray::Array2;

use crate::error::CoolboxError;

/// Dense Hi-C contact matrix, rows/columns are genomic bins.
pub type ContactMatrix = Array2<f64>;

/// One intra-chromosomal loop from a peak/loop annotation file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoopInterval {
    pub chrom1: String,
    pub start1: i64,
    pub end1: i64,
    pub chrom2: String,
    pub start2: i64,
    pub end2: i64,
    pub color: String,
}

impl LoopInterval {
    /// The `[start1, end2)` span the loop is indexed under.
    pub fn span(&self) -> (i64, i64) {
        (self.start1, self.end2)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Style {
    Triangular,
    Matrix,
    Window,
}

impl Style {
    #[inline]
    pub fn is_rotated(&self) -> bool {
        match self {
            Style::Triangular | Style::Window => true,
            Style::Matrix => false,
        }
    }
}

impl FromStr for Style {
    type Err = CoolboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "triangular" => Ok(Style::Triangular),
            "matrix" => Ok(Style::Matrix),
            "window" => Ok(Style::Window),
            other => Err(CoolboxError::config(
                "style",
                format!("expected one of triangular, matrix, window; got {:?}", other),
            )),
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Style::Triangular => "triangular",
            Style::Matrix => "matrix",
            Style::Window => "window",
        };
        f.write_str(s)
    }
}

/// Which side of the matrix diagonal a marker is drawn on (matrix style only).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Side {
    Upper,
    Lower,
    Both,
}

impl Side {
    #[inline]
    pub fn includes_upper(&self) -> bool {
        matches!(self, Side::Upper | Side::Both)
    }

    #[inline]
    pub fn includes_lower(&self) -> bool {
        matches!(self, Side::Lower | Side::Both)
    }
}

impl FromStr for Side {
    type Err = CoolboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upper" => Ok(Side::Upper),
            "lower" => Ok(Side::Lower),
            "both" => Ok(Side::Both),
            other => Err(CoolboxError::config(
                "side",
                format!("expected one of upper, lower, both; got {:?}", other),
            )),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Side::Upper => "upper",
            Side::Lower => "lower",
            Side::Both => "both",
        };
        f.write_str(s)
    }
}

/// Placement of a loop marker, `(x, y)` is the anchor corner.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MarkerBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// How much of the triangle height is shown by a triangular/window track.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DepthRatio {
    Full,
    Ratio(f64),
}

impl DepthRatio {
    pub fn as_f64(&self) -> f64 {
        match self {
            DepthRatio::Full => 1.0,
            DepthRatio::Ratio(r) => *r,
        }
    }
}

impl FromStr for DepthRatio {
    type Err = CoolboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "full" {
            return Ok(DepthRatio::Full);
        }
        match s.parse::<f64>() {
            Ok(r) if r.is_finite() && r > 0.0 => Ok(DepthRatio::Ratio(r)),
            _ => Err(CoolboxError::config(
                "depth_ratio",
                format!("expected `full` or a positive number, got {:?}", s),
            )),
        }
    }
}

/// Where the zeros and NaNs of a matrix were before epsilon substitution.
#[derive(Debug, Clone)]
pub struct ZeroNanMask {
    pub zeros: Array2<bool>,
    pub nans: Array2<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_and_side_display_parses_back() {
        for style in [Style::Triangular, Style::Matrix, Style::Window] {
            assert_eq!(style.to_string().parse::<Style>().unwrap(), style);
        }
        for side in [Side::Upper, Side::Lower, Side::Both] {
            assert_eq!(side.to_string().parse::<Side>().unwrap(), side);
        }
        assert_eq!(Style::Window.to_string(), "window");
        assert!(!Style::Matrix.is_rotated());
    }
}
