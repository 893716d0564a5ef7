pub mod chrom_names;
pub mod diagonal;
pub mod donut;
pub mod error;
pub mod gaussian;
pub mod geometry;
pub mod interval_tree;
pub mod loops;
pub mod normalize;
pub mod numpy_bindings;
pub mod overlay;
pub mod rucoolbox_structs;
pub mod samtools_cov;

pub use error::{CoolboxError, Result};
pub use loops::IntervalIndex;
pub use normalize::{normalize_matrix, NormalizeConfig, NormalizeMethod, Transform};
pub use rucoolbox_structs::{ContactMatrix, LoopInterval};
