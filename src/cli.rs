use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "landcover-zonal-stats")]
#[command(about = "Calculate stats per landcover code type")]
#[command(version)]
pub struct Args {
    /// Path to landcover raster
    #[arg(value_name = "LANDCOVER_RASTER")]
    pub landcover_raster_path: String,

    /// One or more paths or wildcard patterns to calculate stats over
    #[arg(value_name = "SAMPLE_RASTER", required = true, num_args = 1..)]
    pub raster_pattern_list: Vec<String>,

    /// Optional JSON run configuration
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positional_arguments() {
        let args = Args::try_parse_from(["prog", "lulc.tif", "a.tif", "b_*.tif"]).unwrap();

        assert_eq!(args.landcover_raster_path, "lulc.tif");
        assert_eq!(args.raster_pattern_list, vec!["a.tif", "b_*.tif"]);
        assert!(args.config.is_none());
        assert!(!args.verbose);
    }

    #[test]
    fn test_sample_pattern_is_required() {
        assert!(Args::try_parse_from(["prog", "lulc.tif"]).is_err());
    }

    #[test]
    fn test_options() {
        let args =
            Args::try_parse_from(["prog", "-v", "--config", "run.json", "lulc.tif", "s.tif"])
                .unwrap();

        assert!(args.verbose);
        assert_eq!(args.config.as_deref(), Some("run.json"));
    }
}
