use crate::persistence::{get_data_dir, FileStorage};
use anyhow::Result;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Runtime configuration resolved from the command line and environment
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding tasks.json and hourlyRate.json
    pub data_dir: PathBuf,
}

impl Config {
    /// Use `dir_override` if given, otherwise discover .tally (local, then home)
    pub fn resolve(dir_override: Option<PathBuf>) -> Result<Self> {
        let data_dir = match dir_override {
            Some(dir) => dir,
            None => get_data_dir()?,
        };
        Ok(Self { data_dir })
    }

    pub fn open_storage(&self) -> Result<FileStorage> {
        FileStorage::open(&self.data_dir)
    }
}

/// Install the stderr log subscriber. `RUST_LOG` overrides the default `warn`.
pub fn init_logging() {
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| {
            let raw = raw.trim();
            if raw.is_empty() {
                return None;
            }
            EnvFilter::try_new(raw).ok()
        })
        .unwrap_or_else(|| EnvFilter::new("warn"));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_with_override() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = Config::resolve(Some(temp_dir.path().join("data"))).unwrap();
        assert_eq!(config.data_dir, temp_dir.path().join("data"));

        let storage = config.open_storage().unwrap();
        assert!(storage.dir().is_dir());
    }

    #[test]
    fn test_resolve_default_uses_tally_dir() {
        let config = Config::resolve(None).unwrap();
        assert!(config.data_dir.to_string_lossy().contains(".tally"));
    }
}
