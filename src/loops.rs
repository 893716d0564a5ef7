//! Loop (peak) annotation files and the per-chromosome overlap index built from them.
//!
//! Format: whitespace separated `chr1 x1 x2 chr2 y1 y2 [R,G,B] [...]`, one loop per
//! line. The first line is a header when any of `x1, x2, y1, y2` is not a plain
//! non-negative integer. Plain text or gzip.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use rustc_hash::FxHashMap;
use tracing::{debug, info};

use crate::chrom_names::{canonical_chrom, change_chrom_names};
use crate::error::{CoolboxError, Result};
use crate::interval_tree::{Interval, IntervalTree, Overlaps};
use crate::rucoolbox_structs::LoopInterval;

pub const DEFAULT_COLOR: &str = "#2255ff";

const COORD_FIELDS: [usize; 4] = [1, 2, 4, 5];

pub fn rgb2hex(r: u8, g: u8, b: u8) -> String {
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

fn is_header(fields: &[&str]) -> bool {
    COORD_FIELDS.iter().any(|&i| match fields.get(i) {
        Some(f) => f.is_empty() || !f.bytes().all(|c| c.is_ascii_digit()),
        None => false,
    })
}

fn parse_coord(field: &str, name: &str, line: usize) -> Result<i64> {
    field.parse::<i64>().map_err(|_| {
        CoolboxError::parse(line, format!("{} is not an integer: {:?}", name, field))
    })
}

fn parse_rgb(field: &str, line: usize) -> Result<String> {
    let parts: Vec<&str> = field.split(',').collect();
    if parts.len() != 3 {
        return Err(CoolboxError::parse(
            line,
            format!("expected an R,G,B color, got {:?}", field),
        ));
    }
    let mut rgb = [0u8; 3];
    for (slot, part) in rgb.iter_mut().zip(parts) {
        *slot = part.trim().parse::<u8>().map_err(|_| {
            CoolboxError::parse(line, format!("bad color component {:?} in {:?}", part, field))
        })?;
    }
    Ok(rgb2hex(rgb[0], rgb[1], rgb[2]))
}

/// Parse one data line. `Ok(None)` for inter-chromosomal records.
fn parse_loop_line(fields: &[&str], line: usize) -> Result<Option<LoopInterval>> {
    if fields.len() < 6 {
        return Err(CoolboxError::parse(
            line,
            format!("expected at least 6 fields, got {}", fields.len()),
        ));
    }
    let start1 = parse_coord(fields[1], "x1", line)?;
    let end1 = parse_coord(fields[2], "x2", line)?;
    let start2 = parse_coord(fields[4], "y1", line)?;
    let end2 = parse_coord(fields[5], "y2", line)?;

    if fields[0] != fields[3] {
        return Ok(None);
    }
    if end2 <= start1 {
        return Err(CoolboxError::parse(
            line,
            format!("empty loop span [{}, {})", start1, end2),
        ));
    }

    let color = match fields.get(6) {
        Some(field) => parse_rgb(field, line)?,
        None => DEFAULT_COLOR.to_string(),
    };

    Ok(Some(LoopInterval {
        chrom1: fields[0].to_string(),
        start1,
        end1,
        chrom2: fields[3].to_string(),
        start2,
        end2,
        color,
    }))
}

fn open_maybe_gzip(path: &Path) -> Result<Box<dyn BufRead>> {
    let mut reader = BufReader::new(File::open(path)?);
    let is_gzip = reader.fill_buf()?.starts_with(&[0x1f, 0x8b]);
    if is_gzip {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(reader))))
    } else {
        Ok(Box::new(reader))
    }
}

/// Chromosome -> interval tree of loops keyed by `[start1, end2)`.
#[derive(Debug, Clone, Default)]
pub struct IntervalIndex {
    trees: FxHashMap<String, IntervalTree<i64, LoopInterval>>,
    inter_chrom: usize,
}

impl IntervalIndex {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let index = Self::from_reader(open_maybe_gzip(path)?)?;
        info!(
            path = %path.display(),
            loops = index.len(),
            inter_chromosomal_dropped = index.inter_chrom,
            chromosomes = index.trees.len(),
            "loaded loop file"
        );
        Ok(index)
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut grouped: FxHashMap<String, Vec<Interval<i64, LoopInterval>>> =
            FxHashMap::default();
        let mut inter_chrom = 0usize;

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.is_empty() {
                continue;
            }
            if idx == 0 && is_header(&fields) {
                debug!(header = %line, "skipping header line");
                continue;
            }

            let Some(lp) = parse_loop_line(&fields, idx + 1)? else {
                inter_chrom += 1;
                continue;
            };
            let (start, end) = lp.span();
            grouped
                .entry(canonical_chrom(&lp.chrom1))
                .or_default()
                .push(Interval {
                    start,
                    end,
                    data: lp,
                });
        }

        if inter_chrom > 0 {
            debug!(skipped = inter_chrom, "dropped inter-chromosomal loops");
        }

        let trees = grouped
            .into_iter()
            .map(|(chrom, intervals)| (chrom, IntervalTree::new(intervals)))
            .collect();
        Ok(IntervalIndex { trees, inter_chrom })
    }

    fn tree_for(&self, chrom: &str) -> Option<&IntervalTree<i64, LoopInterval>> {
        self.trees
            .get(chrom)
            .or_else(|| self.trees.get(&change_chrom_names(chrom)))
    }

    /// Loops whose `[start1, end2)` span overlaps `[start, end)`, ordered by start.
    ///
    /// `chrom` is tried verbatim first, then in its other naming convention.
    pub fn query(&self, chrom: &str, start: i64, end: i64) -> LoopQuery<'_> {
        LoopQuery {
            inner: self.tree_for(chrom).map(|t| t.query(start, end)),
        }
    }

    /// Number of inter-chromosomal records left out of the index.
    pub fn inter_chrom_dropped(&self) -> usize {
        self.inter_chrom
    }

    pub fn contains_chrom(&self, chrom: &str) -> bool {
        self.tree_for(chrom).is_some()
    }

    pub fn chromosomes(&self) -> Vec<&str> {
        let mut chroms: Vec<&str> = self.trees.keys().map(String::as_str).collect();
        chroms.sort_unstable();
        chroms
    }

    pub fn len(&self) -> usize {
        self.trees.values().map(IntervalTree::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone)]
pub struct LoopQuery<'a> {
    inner: Option<Overlaps<'a, i64, LoopInterval>>,
}

impl<'a> Iterator for LoopQuery<'a> {
    type Item = &'a LoopInterval;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.as_mut()?.next().map(|iv| &iv.data)
    }
}
