use std::path::Path;

use clap::Parser;
use log::info;

use zonal_stats::cli::Args;
use zonal_stats::{RunConfig, ZonalStatsRunner, apply_cache_limit};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    zonal_stats::logging::init(args.verbose);

    let config = match &args.config {
        Some(path) => RunConfig::from_file(path)?,
        None => RunConfig::default(),
    };
    apply_cache_limit(&config)?;

    let runner = ZonalStatsRunner::new(
        Path::new(&args.landcover_raster_path),
        args.raster_pattern_list.as_slice(),
        config,
    )?;
    let summary = runner.process()?;

    info!(
        "done: {} rows in {}",
        summary.rows,
        summary.table_path.display()
    );

    Ok(())
}
