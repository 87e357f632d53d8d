use crate::{env_or_default, env_parse, ConfigError, FromEnv};
use std::path::PathBuf;

/// 5 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Where uploaded files are written and how large they may be.
#[derive(Clone, Debug)]
pub struct UploadConfig {
    pub dir: PathBuf,
    pub max_file_bytes: usize,
}

impl UploadConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            max_file_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl FromEnv for UploadConfig {
    /// - UPLOAD_DIR: defaults to `uploads`
    /// - UPLOAD_MAX_BYTES: defaults to 5 MiB
    fn from_env() -> Result<Self, ConfigError> {
        let dir = PathBuf::from(env_or_default("UPLOAD_DIR", "uploads"));
        let max_file_bytes: usize =
            env_parse("UPLOAD_MAX_BYTES", &DEFAULT_MAX_UPLOAD_BYTES.to_string())?;

        if max_file_bytes == 0 {
            return Err(ConfigError::Invalid {
                key: "UPLOAD_MAX_BYTES".to_string(),
                details: "must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            dir,
            max_file_bytes,
        })
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self::new("uploads")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_config_defaults() {
        temp_env::with_vars(
            [("UPLOAD_DIR", None::<&str>), ("UPLOAD_MAX_BYTES", None::<&str>)],
            || {
                let config = UploadConfig::from_env().unwrap();
                assert_eq!(config.dir, PathBuf::from("uploads"));
                assert_eq!(config.max_file_bytes, 5 * 1024 * 1024);
            },
        );
    }

    #[test]
    fn test_upload_config_custom() {
        temp_env::with_vars(
            [
                ("UPLOAD_DIR", Some("/var/lib/catalog/uploads")),
                ("UPLOAD_MAX_BYTES", Some("1024")),
            ],
            || {
                let config = UploadConfig::from_env().unwrap();
                assert_eq!(config.dir, PathBuf::from("/var/lib/catalog/uploads"));
                assert_eq!(config.max_file_bytes, 1024);
            },
        );
    }

    #[test]
    fn test_upload_config_rejects_zero_limit() {
        temp_env::with_var("UPLOAD_MAX_BYTES", Some("0"), || {
            let err = UploadConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("UPLOAD_MAX_BYTES"));
        });
    }
}
