use std::ffi::{CStr, CString};
use std::os::raw::c_int;
use std::path::{Path, PathBuf};

use gdal::Dataset;
use gdal::cpl::CslStringList;
use gdal::spatial_ref::{AxisMappingStrategy, CoordTransform, SpatialRef};
use log::{debug, info};

use crate::bbox::BoundingBox;
use crate::error::{Result, ZonalStatsError};
use crate::raster::RasterInfo;

/// Resampling used when warping a raster onto the common grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resampling {
    /// Majority value; keeps class codes intact.
    Mode,
    Nearest,
}

impl Resampling {
    pub fn as_gdal_arg(&self) -> &'static str {
        match self {
            Resampling::Mode => "mode",
            Resampling::Nearest => "near",
        }
    }
}

/// Target grid shared by both aligned outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetGrid {
    pub bbox: BoundingBox,
    pub pixel_size: (f64, f64),
    pub projection: String,
}

impl TargetGrid {
    pub fn size(&self) -> (usize, usize) {
        let cols = (self.bbox.width() / self.pixel_size.0.abs()).round() as usize;
        let rows = (self.bbox.height() / self.pixel_size.1.abs()).round() as usize;
        (cols, rows)
    }

    fn warp_args(&self, resampling: Resampling) -> Vec<String> {
        let mut args = vec![
            "-of".to_string(),
            "GTiff".to_string(),
            "-overwrite".to_string(),
            "-r".to_string(),
            resampling.as_gdal_arg().to_string(),
            "-te".to_string(),
        ];
        args.extend(self.bbox.as_array().iter().map(|v| format!("{:.17}", v)));
        args.push("-tr".to_string());
        args.push(format!("{:.17}", self.pixel_size.0.abs()));
        args.push(format!("{:.17}", self.pixel_size.1.abs()));
        if !self.projection.trim().is_empty() {
            args.push("-t_srs".to_string());
            args.push(self.projection.clone());
        }
        args
    }
}

#[derive(Debug, Clone)]
pub struct AlignedPair {
    pub landcover: PathBuf,
    pub sample: PathBuf,
}

/// `bbox` of `info` expressed in the `target_wkt` projection.
fn bbox_in_projection(info: &RasterInfo, target_wkt: &str) -> Result<BoundingBox> {
    let bbox = info.bounding_box();
    if !info.has_projection() || target_wkt.trim().is_empty() {
        return Ok(bbox);
    }

    let mut source = SpatialRef::from_wkt(&info.projection)?;
    let mut target = SpatialRef::from_wkt(target_wkt)?;
    if source == target {
        return Ok(bbox);
    }

    source.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);
    target.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);

    let transform = CoordTransform::new(&source, &target)?;
    let [xmin, ymin, xmax, ymax] = transform.transform_bounds(&bbox.as_array(), 21)?;

    Ok(BoundingBox {
        xmin,
        ymin,
        xmax,
        ymax,
    })
}

/// Intersection of both extents in the sample projection, snapped to the sample pixel size.
pub fn target_grid(landcover: &RasterInfo, sample: &RasterInfo) -> Result<TargetGrid> {
    sample.validate_pixel_size()?;

    let projection = sample.projection.clone();
    let landcover_bbox = bbox_in_projection(landcover, &projection)?;
    let sample_bbox = sample.bounding_box();

    let intersection =
        landcover_bbox
            .intersection(&sample_bbox)
            .ok_or_else(|| ZonalStatsError::NoOverlap {
                landcover: landcover.path.clone(),
                sample: sample.path.clone(),
            })?;

    let (px, py) = sample.pixel_size();
    let bbox = intersection.snap_to_pixel_size(px, py);

    debug!(
        "target grid: {:?} at {}x{} pixels",
        bbox.as_array(),
        px.abs(),
        py.abs()
    );

    Ok(TargetGrid {
        bbox,
        pixel_size: (px, py),
        projection,
    })
}

fn last_gdal_error() -> String {
    // SAFETY: CPLGetLastErrorMsg never returns null; the string is owned by GDAL.
    unsafe {
        CStr::from_ptr(gdal_sys::CPLGetLastErrorMsg())
            .to_string_lossy()
            .into_owned()
    }
}

struct WarpAppOptions {
    options: *mut gdal_sys::GDALWarpAppOptions,
}

impl WarpAppOptions {
    fn new(args: &[String]) -> Result<Self> {
        let mut c_args = CslStringList::new();
        for arg in args {
            c_args.add_string(arg)?;
        }

        let options =
            unsafe { gdal_sys::GDALWarpAppOptionsNew(c_args.as_ptr(), std::ptr::null_mut()) };
        if options.is_null() {
            return Err(ZonalStatsError::Warp {
                path: PathBuf::new(),
                message: format!("invalid warp options {:?}: {}", args, last_gdal_error()),
            });
        }

        Ok(WarpAppOptions { options })
    }
}

impl Drop for WarpAppOptions {
    fn drop(&mut self) {
        unsafe {
            gdal_sys::GDALWarpAppOptionsFree(self.options);
        }
    }
}

/// Warps `source` onto `grid`, writing a GeoTIFF at `destination`.
pub fn warp_to_grid(
    source: &Path,
    destination: &Path,
    grid: &TargetGrid,
    resampling: Resampling,
) -> Result<()> {
    let src_ds = Dataset::open(source)?;
    let options = WarpAppOptions::new(&grid.warp_args(resampling))?;
    let dest = CString::new(destination.to_string_lossy().as_ref())?;

    let handle = unsafe {
        let mut user_error: c_int = 0;
        let mut sources = [src_ds.c_dataset()];
        let handle = gdal_sys::GDALWarp(
            dest.as_ptr(),
            std::ptr::null_mut(),
            1,
            sources.as_mut_ptr(),
            options.options,
            &mut user_error,
        );
        if user_error != 0 || handle.is_null() {
            None
        } else {
            Some(handle)
        }
    };

    match handle {
        // Dropping the wrapped handle closes the output and flushes it to disk.
        Some(handle) => {
            drop(unsafe { Dataset::from_c_dataset(handle) });
            Ok(())
        }
        None => Err(ZonalStatsError::Warp {
            path: destination.to_path_buf(),
            message: last_gdal_error(),
        }),
    }
}

/// Aligns the landcover raster (mode) and the sample raster (nearest) onto a
/// common grid inside `workspace`.
pub fn align_pair(
    landcover: &RasterInfo,
    sample: &RasterInfo,
    workspace: &Path,
    tag: &str,
) -> Result<AlignedPair> {
    let grid = target_grid(landcover, sample)?;
    let (cols, rows) = grid.size();
    info!(
        "aligning {} and {} onto a {}x{} grid",
        landcover.file_name(),
        sample.file_name(),
        cols,
        rows
    );

    let pair = AlignedPair {
        landcover: workspace.join(format!("{}_landcover_aligned.tif", tag)),
        sample: workspace.join(format!("{}_sample_aligned.tif", tag)),
    };

    warp_to_grid(&landcover.path, &pair.landcover, &grid, Resampling::Mode)?;
    warp_to_grid(&sample.path, &pair.sample, &grid, Resampling::Nearest)?;

    Ok(pair)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(gt: [f64; 6], width: usize, height: usize) -> RasterInfo {
        RasterInfo {
            path: PathBuf::from(format!("{}x{}.tif", width, height)),
            width,
            height,
            geo_transform: gt,
            projection: String::new(),
            nodata: None,
            block_size: (width, 1),
        }
    }

    #[test]
    fn test_target_grid_uses_sample_pixel_size() {
        let landcover = info([0.0, 10.0, 0.0, 100.0, 0.0, -10.0], 10, 10);
        let sample = info([20.0, 20.0, 0.0, 80.0, 0.0, -20.0], 2, 2);

        let grid = target_grid(&landcover, &sample).unwrap();

        assert_eq!(grid.bbox, BoundingBox::new(20.0, 40.0, 60.0, 80.0).unwrap());
        assert_eq!(grid.pixel_size, (20.0, -20.0));
        assert_eq!(grid.size(), (2, 2));
    }

    #[test]
    fn test_target_grid_is_the_intersection() {
        let landcover = info([0.0, 1.0, 0.0, 4.0, 0.0, -1.0], 4, 4);
        let sample = info([2.0, 1.0, 0.0, 6.0, 0.0, -1.0], 4, 4);

        let grid = target_grid(&landcover, &sample).unwrap();

        assert_eq!(grid.bbox, BoundingBox::new(2.0, 2.0, 4.0, 4.0).unwrap());
        assert_eq!(grid.size(), (2, 2));
    }

    #[test]
    fn test_disjoint_rasters_fail() {
        let landcover = info([0.0, 1.0, 0.0, 4.0, 0.0, -1.0], 4, 4);
        let sample = info([100.0, 1.0, 0.0, 4.0, 0.0, -1.0], 4, 4);

        let err = target_grid(&landcover, &sample).unwrap_err();
        assert!(matches!(err, ZonalStatsError::NoOverlap { .. }));
    }

    #[test]
    fn test_zero_pixel_size_fails() {
        let landcover = info([0.0, 1.0, 0.0, 4.0, 0.0, -1.0], 4, 4);
        let sample = info([0.0, 0.0, 0.0, 4.0, 0.0, -1.0], 4, 4);

        let err = target_grid(&landcover, &sample).unwrap_err();
        assert!(matches!(err, ZonalStatsError::InvalidPixelSize(_)));
    }

    #[test]
    fn test_warp_args() {
        let grid = TargetGrid {
            bbox: BoundingBox::new(0.0, 0.0, 4.0, 4.0).unwrap(),
            pixel_size: (1.0, -1.0),
            projection: String::new(),
        };

        let args = grid.warp_args(Resampling::Mode);

        assert_eq!(&args[..6], &["-of", "GTiff", "-overwrite", "-r", "mode", "-te"]);
        assert_eq!(args.len(), 13);
        assert!(!args.contains(&"-t_srs".to_string()));
        assert_eq!(grid.warp_args(Resampling::Nearest)[4], "near");
    }
}
