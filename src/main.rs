use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use polars::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use rucoolbox::diagonal::fill_zero_nan;
use rucoolbox::loops::IntervalIndex;
use rucoolbox::normalize::{normalize_matrix, NormalizeConfig, NormalizeMethod, Transform};
use rucoolbox::overlay::{plan_markers, ColorSpec, PeakStyle, Region, TrackView};
use rucoolbox::rucoolbox_structs::{ContactMatrix, DepthRatio, Side, Style};

/// Hi-C contact matrix normalisation and loop overlay lookup.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Normalise a dense, headerless, tab-separated contact matrix and print it as TSV
    Normalize {
        matrix: PathBuf,

        /// Replace zeros and NaNs with 1e-12 before any other stage
        #[arg(long)]
        fill_zero_nan: bool,

        /// no, log, log2 or log10
        #[arg(long, default_value = "no")]
        transform: Transform,

        /// no, total, expect, zscore or hiccups:P:W
        #[arg(long, default_value = "no")]
        normalize: NormalizeMethod,

        #[arg(long)]
        gaussian_sigma: Option<f64>,
    },

    /// Print the markers of the loops overlapping a region, one TSV line each
    Loops {
        /// Loop file: chr1 x1 x2 chr2 y1 y2 [R,G,B], plain or gzipped
        loops: PathBuf,

        /// chrom:start-end
        region: Region,

        #[arg(long, default_value = "triangular")]
        style: Style,

        #[arg(long, default_value = "both")]
        side: Side,

        /// `full` or a fraction of the triangle height
        #[arg(long, default_value = "full")]
        depth_ratio: DepthRatio,

        /// `bed_rgb` or a fixed color
        #[arg(long, default_value = "bed_rgb")]
        color: ColorSpec,
    },
}

fn read_matrix(path: PathBuf) -> PolarsResult<ContactMatrix> {
    let parse_options: CsvParseOptions = CsvParseOptions::default().with_separator(b'\t');
    let df = CsvReadOptions::default()
        .with_has_header(false)
        .with_rechunk(true)
        .with_parse_options(parse_options)
        .try_into_reader_with_file_path(Some(path))?
        .finish()?;

    let (rows, cols) = df.shape();
    let mut matrix = ContactMatrix::zeros((rows, cols));
    for (j, column) in df.get_columns().iter().enumerate() {
        let values = column.cast(&DataType::Float64)?;
        for (i, v) in values.f64()?.into_iter().enumerate() {
            matrix[[i, j]] = v.unwrap_or(f64::NAN);
        }
    }
    Ok(matrix)
}

fn write_matrix(matrix: &ContactMatrix) -> PolarsResult<()> {
    let columns: Vec<Column> = matrix
        .columns()
        .into_iter()
        .enumerate()
        .map(|(j, col)| Column::new(format!("column_{}", j + 1).into(), col.to_vec()))
        .collect();
    let mut df = DataFrame::new(columns)?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    CsvWriter::new(&mut handle)
        .include_header(false)
        .with_separator(b'\t')
        .finish(&mut df)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    match args.command {
        Command::Normalize {
            matrix,
            fill_zero_nan: fill,
            transform,
            normalize,
            gaussian_sigma,
        } => {
            let mut arr = read_matrix(matrix)?;
            info!(rows = arr.nrows(), cols = arr.ncols(), "read matrix");
            if fill {
                arr = fill_zero_nan(&arr).0;
            }
            let config = NormalizeConfig {
                transform,
                normalize,
                gaussian_sigma,
                process_func: None,
            };
            let out = normalize_matrix(&arr, &config)?;
            write_matrix(&out)?;
        }
        Command::Loops {
            loops,
            region,
            style,
            side,
            depth_ratio,
            color,
        } => {
            let index = IntervalIndex::load(&loops)?;
            if !index.contains_chrom(&region.chrom) {
                warn!(chrom = %region.chrom, "no loops indexed for this chromosome");
            }
            let peak_style = PeakStyle {
                color: color.clone(),
                fill_color: color,
                side,
                ..PeakStyle::default()
            };
            let track = TrackView { style, depth_ratio };
            let markers = plan_markers(&index, &peak_style, track, &region, None);
            info!(
                markers = markers.len(),
                style = %style,
                side = %side,
                "planned markers"
            );

            let stdout = io::stdout();
            let mut out = stdout.lock();
            for m in markers {
                let lp = m.interval;
                writeln!(
                    out,
                    "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                    lp.chrom1,
                    lp.start1,
                    lp.end1,
                    lp.chrom2,
                    lp.start2,
                    lp.end2,
                    m.edge_color,
                    m.bbox.x,
                    m.bbox.y,
                    m.bbox.width,
                    m.bbox.height,
                    m.angle,
                )?;
            }
        }
    }

    Ok(())
}
