use serde::Deserialize;
use serde::Deserializer;
use serde::de::Error;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

pub mod error;
pub use error::ConfigError;

/// GDAL block cache limit applied once at startup (1 GiB).
pub const DEFAULT_CACHE_MAX_BYTES: u64 = 1 << 30;
/// Smallest accepted cache limit; GDAL_CACHEMAX values below 100000 would be read as megabytes.
pub const MIN_CACHE_MAX_BYTES: u64 = 1 << 20;
pub const DEFAULT_FLOAT_PRECISION: u8 = 6;
pub const DEFAULT_WORKSPACE_PREFIX: &str = "zonal_stats_temp_workspace_";

#[derive(Debug, Clone)]
pub struct RunConfig {
    cache_max_bytes: u64,
    float_precision: u8,
    output_dir: PathBuf,
    workspace_parent: PathBuf,
    workspace_prefix: String,
    block_size: Option<usize>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            cache_max_bytes: DEFAULT_CACHE_MAX_BYTES,
            float_precision: DEFAULT_FLOAT_PRECISION,
            output_dir: PathBuf::from("."),
            workspace_parent: PathBuf::from("."),
            workspace_prefix: DEFAULT_WORKSPACE_PREFIX.to_string(),
            block_size: None,
        }
    }
}

// Every field is optional in the file; missing ones fall back to the defaults above.
impl<'de> Deserialize<'de> for RunConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(deny_unknown_fields)]
        struct RunConfigHelper {
            cache_max_bytes: Option<u64>,
            float_precision: Option<u8>,
            output_dir: Option<PathBuf>,
            workspace_parent: Option<PathBuf>,
            workspace_prefix: Option<String>,
            block_size: Option<usize>,
        }

        let helper = RunConfigHelper::deserialize(deserializer)?;
        let defaults = RunConfig::default();

        let cache_max_bytes = helper.cache_max_bytes.unwrap_or(defaults.cache_max_bytes);
        if cache_max_bytes < MIN_CACHE_MAX_BYTES {
            return Err(D::Error::custom(ConfigError::CacheSize));
        }

        let float_precision = helper.float_precision.unwrap_or(defaults.float_precision);
        if float_precision > 12 {
            return Err(D::Error::custom(ConfigError::FloatPrecision(
                float_precision,
            )));
        }

        if helper.block_size == Some(0) {
            return Err(D::Error::custom(ConfigError::BlockSize));
        }

        let workspace_prefix = helper
            .workspace_prefix
            .unwrap_or(defaults.workspace_prefix);
        if workspace_prefix.is_empty() {
            return Err(D::Error::custom(ConfigError::EmptyPrefix));
        }

        Ok(RunConfig {
            cache_max_bytes,
            float_precision,
            output_dir: helper.output_dir.unwrap_or(defaults.output_dir),
            workspace_parent: helper.workspace_parent.unwrap_or(defaults.workspace_parent),
            workspace_prefix,
            block_size: helper.block_size,
        })
    }
}

impl RunConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<RunConfig, ConfigError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let config: RunConfig = serde_json::from_reader(reader).map_err(ConfigError::from)?;

        Ok(config)
    }

    /// Same defaults, but output and workspace rooted at `dir`.
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            output_dir: dir.as_ref().to_path_buf(),
            workspace_parent: dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    pub fn with_block_size(mut self, block_size: Option<usize>) -> Self {
        self.block_size = block_size.filter(|&b| b > 0);
        self
    }

    pub fn cache_max_bytes(&self) -> u64 {
        self.cache_max_bytes
    }

    pub fn float_precision(&self) -> usize {
        self.float_precision as usize
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn workspace_parent(&self) -> &Path {
        &self.workspace_parent
    }

    pub fn workspace_prefix(&self) -> &str {
        &self.workspace_prefix
    }

    pub fn block_size(&self) -> Option<usize> {
        self.block_size
    }
}
