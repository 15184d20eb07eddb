use std::fmt;

#[derive(Debug)]
pub enum ConfigError {
    CacheSize,
    FloatPrecision(u8),
    BlockSize,
    EmptyPrefix,
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::CacheSize => write!(f, "cache_max_bytes must be at least 1048576"),
            ConfigError::FloatPrecision(p) => {
                write!(f, "float_precision should be between 0 and 12, got {}", p)
            }
            ConfigError::BlockSize => write!(f, "block_size must be greater than 0"),
            ConfigError::EmptyPrefix => write!(f, "workspace_prefix cannot be empty"),
            ConfigError::Io(e) => write!(f, "I/O error: {}", e),
            ConfigError::Json(e) => write!(f, "Failed to parse JSON: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> ConfigError {
        ConfigError::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> ConfigError {
        ConfigError::Json(err)
    }
}
