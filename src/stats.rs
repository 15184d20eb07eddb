use std::fmt;
use std::path::Path;

use gdal::Dataset;

use crate::error::Result;

/// Summary statistics of the valid pixels of one zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub stdev: f64,
}

impl ZoneStats {
    /// Statistics of a zone without any valid pixel.
    pub fn undefined() -> Self {
        Self {
            min: f64::NAN,
            max: f64::NAN,
            mean: f64::NAN,
            stdev: f64::NAN,
        }
    }

    pub fn is_defined(&self) -> bool {
        !(self.min.is_nan() && self.max.is_nan() && self.mean.is_nan() && self.stdev.is_nan())
    }
}

impl fmt::Display for ZoneStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "min={} max={} mean={} stdev={}",
            self.min, self.max, self.mean, self.stdev
        )
    }
}

/// Exact band statistics of band 1 of `path`, computed by GDAL.
pub fn band_statistics(path: &Path) -> Result<ZoneStats> {
    let dataset = Dataset::open(path)?;
    let band = dataset.rasterband(1)?;

    let stats = match band.get_statistics(true, false)? {
        Some(s) => ZoneStats {
            min: s.min,
            max: s.max,
            mean: s.mean,
            stdev: s.std_dev,
        },
        None => ZoneStats::undefined(),
    };

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undefined_stats() {
        let stats = ZoneStats::undefined();
        assert!(!stats.is_defined());
        assert!(stats.mean.is_nan());
    }

    #[test]
    fn test_defined_stats() {
        let stats = ZoneStats {
            min: 1.0,
            max: 3.0,
            mean: 2.0,
            stdev: 1.0,
        };
        assert!(stats.is_defined());
        assert_eq!(stats.to_string(), "min=1 max=3 mean=2 stdev=1");
    }
}
