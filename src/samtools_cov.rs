//! Reads the ASCII histogram printed by `samtools coverage -r REGION -w BINS`.
//!
//! ```text
//! chr1 (249.25Mbp)
//! >  84.00% │   ▄▄                 │ Number of reads: 1000
//!    42.00% │ ▆████▃               │ Covered bases: 12.3Kbp
//!     0.00% │███████▂▁▁▁▁▁▁▁▁▁▁▁▁▁▁│ Mean coverage: 3.2x
//!           └──────────────────────┘
//! ```
//!
//! Each column is one bin; its coverage is the highest row percentage at which the
//! column is filled.

use crate::error::{CoolboxError, Result};

const BAR: char = '│';

/// One coverage percentage per histogram column. The first and last line of
/// `lines` (title and axis) are ignored.
pub fn parse_samtools_cov<S: AsRef<str>>(lines: &[S]) -> Result<Vec<f64>> {
    let mut covs: Vec<f64> = Vec::new();
    if lines.len() < 2 {
        return Ok(covs);
    }

    for (offset, line) in lines[1..lines.len() - 1].iter().enumerate() {
        let line_no = offset + 2;
        let line = line.as_ref();
        let cells: Vec<&str> = line.split(BAR).collect();
        if cells.len() != 3 {
            return Err(CoolboxError::parse(
                line_no,
                format!("expected 3 cells separated by {:?}, got {}", BAR, cells.len()),
            ));
        }

        let label = cells[0].trim_matches(|c| c == '>' || c == ' ' || c == '%');
        let percent: f64 = label.parse().map_err(|_| {
            CoolboxError::parse(line_no, format!("bad percentage {:?}", cells[0]))
        })?;

        for (i, c) in cells[1].chars().enumerate() {
            if covs.len() <= i {
                covs.resize(i + 1, 0.0);
            }
            if c != ' ' && covs[i] == 0.0 {
                covs[i] = percent;
            }
        }
    }

    Ok(covs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_histogram_columns() {
        let lines = [
            "chr1 (249.25Mbp)",
            ">  84.00% │  ▄ │ Number of reads: 10",
            "   42.00% │ ██ │ Covered bases: 1Kbp",
            "    0.00% │████│ Mean coverage: 3x",
            "          └────┘",
        ];
        let covs = parse_samtools_cov(&lines).unwrap();
        assert_eq!(covs, vec![0.0, 42.0, 84.0, 0.0]);
    }

    #[test]
    fn short_input_is_empty() {
        assert!(parse_samtools_cov(&["title"]).unwrap().is_empty());
        assert!(parse_samtools_cov::<&str>(&[]).unwrap().is_empty());
    }

    #[test]
    fn malformed_row() {
        let lines = ["title", "  10.00% no bars here", "axis"];
        assert!(matches!(
            parse_samtools_cov(&lines),
            Err(CoolboxError::Parse { line: 2, .. })
        ));
        let lines = ["title", " abc │ █ │", "axis"];
        assert!(parse_samtools_cov(&lines).is_err());
    }
}
