use std::path::Path;

use gdal::raster::Buffer;
use gdal::{Dataset, DriverManager};
use log::debug;

use crate::codes::{LandcoverCode, is_close};
use crate::error::{Result, ZonalStatsError};
use crate::raster::{block_grid, read_window};

/// Fill value for masked-out pixels: the sample nodata, or NaN when it has none.
pub fn fill_value(sample_nodata: Option<f64>) -> f64 {
    sample_nodata.unwrap_or(f64::NAN)
}

/// Keeps `base` where `mask == code`, `nodata` elsewhere. Returns the number
/// of output pixels holding valid data.
pub fn mask_out(mask: &[f64], base: &[f64], code: f64, nodata: f64, out: &mut [f32]) -> usize {
    let mut valid = 0;
    for ((out, &m), &b) in out.iter_mut().zip(mask).zip(base) {
        *out = if m == code { b as f32 } else { nodata as f32 };
        if is_valid(*out as f64, nodata) {
            valid += 1;
        }
    }
    valid
}

fn is_valid(value: f64, nodata: f64) -> bool {
    !value.is_nan() && (nodata.is_nan() || !is_close(value, nodata))
}

/// Writes a single band Float32 GeoTIFF at `output` holding the sample values
/// of the pixels whose aligned landcover value is `code`.
pub fn write_masked_raster(
    landcover_aligned: &Path,
    sample_aligned: &Path,
    code: LandcoverCode,
    sample_nodata: Option<f64>,
    output: &Path,
    block_size: Option<usize>,
) -> Result<usize> {
    let landcover_ds = Dataset::open(landcover_aligned)?;
    let sample_ds = Dataset::open(sample_aligned)?;
    let landcover_band = landcover_ds.rasterband(1)?;
    let sample_band = sample_ds.rasterband(1)?;

    let (width, height) = sample_ds.raster_size();
    if landcover_ds.raster_size() != (width, height) {
        let (lw, lh) = landcover_ds.raster_size();
        return Err(ZonalStatsError::InvalidInput(format!(
            "aligned rasters differ in size: {}x{} vs {}x{}",
            lw, lh, width, height
        )));
    }

    let nodata = fill_value(sample_nodata);

    let driver = DriverManager::get_driver_by_name("GTiff")?;
    let mut out_ds = driver.create_with_band_type::<f32, _>(output, width, height, 1)?;
    out_ds.set_geo_transform(&sample_ds.geo_transform()?)?;
    out_ds.set_projection(&sample_ds.projection())?;

    let mut out_band = out_ds.rasterband(1)?;
    out_band.set_no_data_value(Some(nodata))?;

    let grid = block_grid(&sample_band, block_size);
    let mut valid = 0;

    for window in grid.iter() {
        let mask = read_window(&landcover_band, &window)?;
        let base = read_window(&sample_band, &window)?;

        let mut masked = vec![0.0f32; window.len()];
        valid += mask_out(&mask, &base, code.value(), nodata, &mut masked);

        let mut buffer = Buffer::new(window.size(), masked);
        out_band.write(window.offset(), window.size(), &mut buffer)?;
    }

    debug!(
        "lucode {}: {} valid pixels written to {}",
        code,
        valid,
        output.display()
    );

    Ok(valid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_out_keeps_matching_pixels() {
        let mask = [1.0, 2.0, 1.0, -9999.0];
        let base = [10.0, 20.0, 30.0, 40.0];
        let mut out = [0.0f32; 4];

        let valid = mask_out(&mask, &base, 1.0, -1.0, &mut out);

        assert_eq!(out, [10.0, -1.0, 30.0, -1.0]);
        assert_eq!(valid, 2);
    }

    #[test]
    fn test_mask_out_is_pointwise() {
        let mask = [3.0, 3.0, 5.0, 3.0, 5.0, 5.0];
        let base = [1.5, 2.5, 3.5, 4.5, 5.5, 6.5];

        let mut whole = [0.0f32; 6];
        mask_out(&mask, &base, 5.0, -1.0, &mut whole);

        // Any split of the arrays gives the same pixels
        for split in 1..6 {
            let mut left = vec![0.0f32; split];
            let mut right = vec![0.0f32; 6 - split];
            mask_out(&mask[..split], &base[..split], 5.0, -1.0, &mut left);
            mask_out(&mask[split..], &base[split..], 5.0, -1.0, &mut right);
            left.extend(right);
            assert_eq!(left, whole.to_vec());
        }
    }

    #[test]
    fn test_sample_nodata_under_code_is_not_valid() {
        let mask = [7.0, 7.0];
        let base = [-1.0, 4.0];
        let mut out = [0.0f32; 2];

        let valid = mask_out(&mask, &base, 7.0, -1.0, &mut out);

        assert_eq!(out, [-1.0, 4.0]);
        assert_eq!(valid, 1);
    }

    #[test]
    fn test_nan_fill_when_sample_has_no_nodata() {
        let nodata = fill_value(None);
        let mask = [1.0, 2.0];
        let base = [0.5, 0.25];
        let mut out = [0.0f32; 2];

        let valid = mask_out(&mask, &base, 2.0, nodata, &mut out);

        assert!(out[0].is_nan());
        assert_eq!(out[1], 0.25);
        assert_eq!(valid, 1);
    }

    #[test]
    fn test_no_matching_pixels() {
        let mut out = [0.0f32; 3];
        let valid = mask_out(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0], 4.0, -9999.0, &mut out);

        assert_eq!(valid, 0);
        assert!(out.iter().all(|&v| v == -9999.0));
    }
}
