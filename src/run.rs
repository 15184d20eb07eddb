use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::align::align_pair;
use crate::codes::{CodeSet, scan_unique_codes};
use crate::config::RunConfig;
use crate::error::Result;
use crate::inputs::{expand_sample_patterns, validate_landcover_path};
use crate::mask::write_masked_raster;
use crate::raster::RasterInfo;
use crate::report::{StatsRow, StatsTable};
use crate::stats::{ZoneStats, band_statistics};
use crate::workspace::Workspace;

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub table_path: PathBuf,
    pub samples: usize,
    pub codes: usize,
    pub rows: usize,
    pub workspace_removed: bool,
}

/// Handed to the row callback of [`ZonalStatsRunner::process_with`] after each row is written.
#[derive(Debug)]
pub struct RowWritten<'a> {
    pub row: &'a StatsRow,
    pub rows_written: usize,
    pub workspace: &'a Path,
}

/// Sets the process-wide GDAL block cache limit. Call once, before any raster is opened.
pub fn apply_cache_limit(config: &RunConfig) -> Result<()> {
    // GDAL reads values of 100000 and above as bytes; the config enforces that
    let bytes = config.cache_max_bytes().to_string();
    gdal::config::set_config_option("GDAL_CACHEMAX", &bytes)?;
    debug!("GDAL cache max set to {} bytes", bytes);
    Ok(())
}

#[derive(Debug)]
pub struct ZonalStatsRunner {
    landcover: PathBuf,
    samples: Vec<PathBuf>,
    config: RunConfig,
}

impl ZonalStatsRunner {
    /// Validates the inputs. Nothing is created on disk when this fails.
    pub fn new<S: AsRef<str>>(landcover: &Path, patterns: &[S], config: RunConfig) -> Result<Self> {
        validate_landcover_path(landcover)?;
        let samples = expand_sample_patterns(patterns)?;
        info!("{} sample rasters to process", samples.len());

        Ok(Self {
            landcover: landcover.to_path_buf(),
            samples,
            config,
        })
    }

    pub fn samples(&self) -> &[PathBuf] {
        &self.samples
    }

    pub fn process(&self) -> Result<RunSummary> {
        self.process_with(|_| {})
    }

    /// Same as [`process`](Self::process), calling `on_row` after every row.
    pub fn process_with<F>(&self, mut on_row: F) -> Result<RunSummary>
    where
        F: FnMut(&RowWritten<'_>),
    {
        info!("calculating unique landcode values");
        let codes = scan_unique_codes(&self.landcover, self.config.block_size())?;
        debug!("unique landcode values: {}", codes);
        if codes.is_empty() {
            warn!(
                "{} holds no landcover codes, the table will only have a header",
                self.landcover.display()
            );
        }

        let landcover_info = RasterInfo::read(&self.landcover)?;

        // Dropped on every early return below, which removes the directory.
        let workspace = Workspace::create(
            self.config.workspace_parent(),
            self.config.workspace_prefix(),
        )?;
        let mut table = StatsTable::create_in(
            self.config.output_dir(),
            self.config.float_precision(),
        )?;
        info!("writing stats to {}", table.path().display());

        for (sample_idx, sample_path) in self.samples.iter().enumerate() {
            info!("processing {}", sample_path.display());
            self.process_sample(
                sample_idx,
                sample_path,
                &landcover_info,
                &codes,
                &workspace,
                &mut table,
                &mut on_row,
            )?;
        }

        let rows = table.rows();
        let table_path = table.close()?;
        let workspace_removed = workspace.release();

        info!(
            "wrote {} rows ({} samples x {} codes) to {}",
            rows,
            self.samples.len(),
            codes.len(),
            table_path.display()
        );

        Ok(RunSummary {
            table_path,
            samples: self.samples.len(),
            codes: codes.len(),
            rows,
            workspace_removed,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn process_sample<F>(
        &self,
        sample_idx: usize,
        sample_path: &Path,
        landcover_info: &RasterInfo,
        codes: &CodeSet,
        workspace: &Workspace,
        table: &mut StatsTable,
        on_row: &mut F,
    ) -> Result<()>
    where
        F: FnMut(&RowWritten<'_>),
    {
        let sample_info = RasterInfo::read(sample_path)?;
        let sample_name = sample_info.file_name();
        let tag = format!("{:04}", sample_idx);

        let aligned = align_pair(landcover_info, &sample_info, workspace.path(), &tag)?;

        for (index, code) in codes.iter().enumerate() {
            info!(
                "processing {} of {} (lucode {}) for {}",
                index + 1,
                codes.len(),
                code,
                sample_name
            );

            let mask_path = workspace.join(format!("{}_{}.tif", tag, code));
            let valid = write_masked_raster(
                &aligned.landcover,
                &aligned.sample,
                *code,
                sample_info.nodata,
                &mask_path,
                self.config.block_size(),
            )?;

            let stats = if valid == 0 {
                warn!(
                    "lucode {} has no valid pixels in {}, writing NaN statistics",
                    code, sample_name
                );
                ZoneStats::undefined()
            } else {
                let stats = band_statistics(&mask_path)?;
                if !stats.is_defined() {
                    warn!(
                        "GDAL returned no statistics for lucode {} in {}",
                        code, sample_name
                    );
                }
                stats
            };
            debug!("lucode {} in {}: {}", code, sample_name, stats);

            let row = StatsRow {
                raster_filename: sample_name.clone(),
                code: *code,
                stats,
            };
            table.write_row(&row)?;
            on_row(&RowWritten {
                row: &row,
                rows_written: table.rows(),
                workspace: workspace.path(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_limit_is_set_in_bytes() {
        apply_cache_limit(&RunConfig::default()).unwrap();

        let value = gdal::config::get_config_option("GDAL_CACHEMAX", "").unwrap();
        assert_eq!(value, "1073741824");
    }
}
