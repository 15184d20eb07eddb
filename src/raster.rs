use std::path::{Path, PathBuf};

use gdal::Dataset;
use gdal::raster::RasterBand;
use log::debug;

use crate::bbox::BoundingBox;
use crate::blocks::{BlockGrid, BlockWindow};
use crate::error::{Result, ZonalStatsError};

/// Metadata of band 1 of a raster, read without touching pixel data.
#[derive(Debug, Clone)]
pub struct RasterInfo {
    pub path: PathBuf,
    pub width: usize,
    pub height: usize,
    pub geo_transform: [f64; 6],
    pub projection: String,
    pub nodata: Option<f64>,
    pub block_size: (usize, usize),
}

impl RasterInfo {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let dataset = Dataset::open(path.as_ref())?;
        Self::from_dataset(path.as_ref(), &dataset)
    }

    pub fn from_dataset(path: &Path, dataset: &Dataset) -> Result<Self> {
        let band = dataset.rasterband(1)?;
        let (width, height) = dataset.raster_size();
        let geo_transform = dataset.geo_transform()?;

        let info = RasterInfo {
            path: path.to_path_buf(),
            width,
            height,
            geo_transform,
            projection: dataset.projection(),
            nodata: band.no_data_value(),
            block_size: band.block_size(),
        };

        debug!(
            "{}: {}x{}, pixel {:?}, nodata {:?}",
            path.display(),
            info.width,
            info.height,
            info.pixel_size(),
            info.nodata
        );

        Ok(info)
    }

    /// (x, y) pixel size; y is negative for north-up rasters.
    pub fn pixel_size(&self) -> (f64, f64) {
        (self.geo_transform[1], self.geo_transform[5])
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_geo_transform(&self.geo_transform, self.width, self.height)
    }

    pub fn has_projection(&self) -> bool {
        !self.projection.trim().is_empty()
    }

    pub fn validate_pixel_size(&self) -> Result<()> {
        let (px, py) = self.pixel_size();
        for p in [px, py] {
            if p == 0.0 || !p.is_finite() {
                return Err(ZonalStatsError::InvalidPixelSize(p));
            }
        }
        Ok(())
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.to_string_lossy().to_string())
    }
}

/// Block grid for `band`, using its native blocks unless `block_size` overrides them.
pub fn block_grid(band: &RasterBand, block_size: Option<usize>) -> BlockGrid {
    let native = band.block_size();
    let size = block_size.map(|b| (b, b)).unwrap_or(native);
    BlockGrid::new(band.size(), size)
}

pub fn read_window(band: &RasterBand, window: &BlockWindow) -> Result<Vec<f64>> {
    let buffer = band.read_as::<f64>(window.offset(), window.size(), window.size(), None)?;
    Ok(buffer.data().to_vec())
}
