use std::collections::HashSet;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{Result, ZonalStatsError};

pub fn validate_landcover_path(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(ZonalStatsError::InvalidInput(format!(
            "{} is not a valid file",
            path.display()
        )));
    }
    Ok(())
}

/// Expands each pattern and returns the matching files, deduplicated, in
/// first-seen order.
pub fn expand_sample_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut paths = Vec::new();

    for pattern in patterns {
        let pattern = pattern.as_ref();
        let mut matched = 0;
        for entry in glob::glob(pattern)? {
            // Unreadable directory entries are skipped like the shell would
            let Ok(path) = entry else { continue };
            if path.is_file() && seen.insert(path.clone()) {
                paths.push(path);
                matched += 1;
            }
        }
        debug!("{}: {} new files", pattern, matched);
    }

    if paths.is_empty() {
        let patterns: Vec<&str> = patterns.iter().map(|p| p.as_ref()).collect();
        return Err(ZonalStatsError::InvalidInput(format!(
            "No files found matching: {:?}",
            patterns
        )));
    }

    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_missing_landcover_path() {
        let dir = tempdir().unwrap();
        assert!(validate_landcover_path(&dir.path().join("lulc.tif")).is_err());
        // A directory is not a raster file either
        assert!(validate_landcover_path(dir.path()).is_err());
    }

    #[test]
    fn test_existing_landcover_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lulc.tif");
        fs::write(&path, b"").unwrap();
        assert!(validate_landcover_path(&path).is_ok());
    }

    #[test]
    fn test_expand_and_deduplicate() {
        let dir = tempdir().unwrap();
        for name in ["a.tif", "b.tif", "c.txt"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("d.tif")).unwrap();

        let all = format!("{}/*.tif", dir.path().display());
        let single = format!("{}/b.tif", dir.path().display());

        let paths = expand_sample_patterns(&[single, all]).unwrap();

        assert_eq!(
            paths,
            vec![dir.path().join("b.tif"), dir.path().join("a.tif")]
        );
    }

    #[test]
    fn test_no_matches_is_an_error() {
        let dir = tempdir().unwrap();
        let pattern = format!("{}/*.tif", dir.path().display());

        let err = expand_sample_patterns(&[pattern]).unwrap_err();
        assert!(matches!(err, ZonalStatsError::InvalidInput(_)));
        assert!(err.to_string().starts_with("No files found matching"));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = expand_sample_patterns(&["[a-"]).unwrap_err();
        assert!(matches!(err, ZonalStatsError::Glob(_)));
    }
}
