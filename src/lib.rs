pub mod align;
pub mod bbox;
pub mod blocks;
pub mod cli;
pub mod codes;
pub mod config;
pub mod error;
pub mod inputs;
pub mod logging;
pub mod mask;
pub mod raster;
pub mod report;
pub mod run;
pub mod stats;
pub mod workspace;

pub use config::RunConfig;
pub use error::{Result, ZonalStatsError};
pub use run::{RowWritten, RunSummary, ZonalStatsRunner, apply_cache_limit};
