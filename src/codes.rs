use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use gdal::Dataset;
use log::debug;

use crate::error::Result;
use crate::raster::{block_grid, read_window};

const ISCLOSE_RTOL: f64 = 1e-5;
const ISCLOSE_ATOL: f64 = 1e-8;

/// Approximate equality with numpy's `isclose` default tolerances.
pub fn is_close(a: f64, b: f64) -> bool {
    if a == b {
        return true;
    }
    (a - b).abs() <= ISCLOSE_ATOL + ISCLOSE_RTOL * b.abs()
}

/// A landcover class value. Totally ordered so it can live in a sorted set.
#[derive(Debug, Clone, Copy)]
pub struct LandcoverCode(f64);

impl LandcoverCode {
    pub fn new(value: f64) -> Self {
        // -0.0 and 0.0 are the same class
        Self(if value == 0.0 { 0.0 } else { value })
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Integer form used in the report and in file names.
    pub fn as_int(&self) -> i64 {
        self.0 as i64
    }
}

impl PartialEq for LandcoverCode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for LandcoverCode {}

impl PartialOrd for LandcoverCode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LandcoverCode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for LandcoverCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_int())
    }
}

/// Distinct landcover codes, iterated in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeSet {
    codes: BTreeSet<LandcoverCode>,
}

impl CodeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds every finite value of `values` that is not close to `nodata`.
    pub fn accumulate(&mut self, values: &[f64], nodata: Option<f64>) {
        for &value in values {
            if !value.is_finite() {
                continue;
            }
            if nodata.is_some_and(|nd| is_close(value, nd)) {
                continue;
            }
            self.codes.insert(LandcoverCode::new(value));
        }
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LandcoverCode> {
        self.codes.iter()
    }

    pub fn values(&self) -> Vec<f64> {
        self.codes.iter().map(|c| c.value()).collect()
    }
}

impl FromIterator<f64> for CodeSet {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let values: Vec<f64> = iter.into_iter().collect();
        let mut set = CodeSet::new();
        set.accumulate(&values, None);
        set
    }
}

impl fmt::Display for CodeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let codes: Vec<String> = self.codes.iter().map(|c| c.to_string()).collect();
        write!(f, "{{{}}}", codes.join(", "))
    }
}

/// Scans band 1 of `path` block by block and returns its distinct non-nodata values.
pub fn scan_unique_codes(path: &Path, block_size: Option<usize>) -> Result<CodeSet> {
    let dataset = Dataset::open(path)?;
    let band = dataset.rasterband(1)?;
    let nodata = band.no_data_value();

    let grid = block_grid(&band, block_size);
    let mut codes = CodeSet::new();

    for window in grid.iter() {
        let values = read_window(&band, &window)?;
        codes.accumulate(&values, nodata);
    }

    debug!(
        "{}: {} distinct codes over {} blocks",
        path.display(),
        codes.len(),
        grid.total_blocks()
    );

    Ok(codes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_close() {
        assert!(is_close(-9999.0, -9999.0));
        assert!(is_close(-9999.0001, -9999.0));
        assert!(is_close(-3.4028235e38, f32::MIN as f64));
        assert!(!is_close(1.0, 2.0));
        assert!(!is_close(0.0, 1e-6));
    }

    #[test]
    fn test_accumulate_skips_nodata_and_non_finite() {
        let mut codes = CodeSet::new();
        codes.accumulate(
            &[1.0, 2.0, -9999.0, f64::NAN, f64::INFINITY, 2.0, 1.0],
            Some(-9999.0),
        );

        assert_eq!(codes.values(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_accumulate_tolerates_float_nodata_encoding() {
        let nodata = f32::MIN as f64;
        let mut codes = CodeSet::new();
        codes.accumulate(&[nodata * (1.0 - 1e-7), 5.0], Some(nodata));

        assert_eq!(codes.values(), vec![5.0]);
    }

    #[test]
    fn test_without_nodata_every_finite_value_is_a_code() {
        let mut codes = CodeSet::new();
        codes.accumulate(&[0.0, -0.0, 3.0, f64::NAN], None);

        assert_eq!(codes.len(), 2);
        assert_eq!(codes.values(), vec![0.0, 3.0]);
    }

    #[test]
    fn test_codes_are_sorted_ascending() {
        let codes: CodeSet = [40.0, -3.0, 12.0, 40.0, 7.0].into_iter().collect();

        assert_eq!(codes.values(), vec![-3.0, 7.0, 12.0, 40.0]);
        assert_eq!(codes.to_string(), "{-3, 7, 12, 40}");
    }

    #[test]
    fn test_accumulation_is_independent_of_block_split() {
        let data: Vec<f64> = (0..97).map(|i| ((i * 7) % 11) as f64).collect();

        let mut whole = CodeSet::new();
        whole.accumulate(&data, Some(0.0));

        for chunk in [1, 3, 10, 96] {
            let mut split = CodeSet::new();
            for block in data.chunks(chunk) {
                split.accumulate(block, Some(0.0));
            }
            assert_eq!(split, whole, "chunk size {}", chunk);
        }
    }
}
