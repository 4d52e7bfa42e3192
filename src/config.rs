use std::env;
use std::sync::Arc;

use serde::Deserialize;

use crate::adapter::instrumented::InstrumentedAdapter;
use crate::adapter::memory::MemoryAdapter;
use crate::adapter::Adapter;
use crate::error::Result;

/// Top-level gatekeeper.toml configuration
#[derive(Debug, Deserialize, Default, Clone)]
pub struct GatekeeperConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    /// Wrap the adapter in [`InstrumentedAdapter`].
    #[serde(default)]
    pub instrument: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Sled,
}

fn default_backend() -> StorageBackend {
    StorageBackend::Memory
}

fn default_data_dir() -> String {
    "./data".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            data_dir: default_data_dir(),
        }
    }
}

impl GatekeeperConfig {
    /// Load configuration from a TOML file, falling back to defaults if the file
    /// doesn't exist or cannot be parsed.
    pub fn load(path: &str) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!(path, error = %e, "failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Apply environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) {
        // GK_STORAGE
        if let Ok(val) = env::var("GK_STORAGE") {
            match val.to_lowercase().as_str() {
                "memory" => self.storage.backend = StorageBackend::Memory,
                "sled" => self.storage.backend = StorageBackend::Sled,
                other => tracing::warn!(value = other, "unknown GK_STORAGE value"),
            }
        }

        // GK_DATA_DIR
        if let Ok(val) = env::var("GK_DATA_DIR") {
            if !val.trim().is_empty() {
                self.storage.data_dir = val.trim().to_string();
            }
        }

        // GK_INSTRUMENT
        if let Ok(val) = env::var("GK_INSTRUMENT") {
            match val.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.instrument = true,
                "0" | "false" | "no" => self.instrument = false,
                other => tracing::warn!(value = other, "unknown GK_INSTRUMENT value"),
            }
        }
    }

    /// Builds the configured storage backend.
    pub fn open_adapter(&self) -> Result<Arc<dyn Adapter>> {
        let adapter: Arc<dyn Adapter> = match self.storage.backend {
            StorageBackend::Memory => Arc::new(MemoryAdapter::new()),
            StorageBackend::Sled => open_sled(&self.storage.data_dir)?,
        };
        tracing::debug!(
            adapter = adapter.name(),
            instrument = self.instrument,
            "opened adapter"
        );
        if self.instrument {
            Ok(Arc::new(InstrumentedAdapter::new(adapter)))
        } else {
            Ok(adapter)
        }
    }
}

#[cfg(feature = "sled")]
fn open_sled(data_dir: &str) -> Result<Arc<dyn Adapter>> {
    Ok(Arc::new(crate::adapter::sled_store::SledAdapter::open(data_dir)?))
}

#[cfg(not(feature = "sled"))]
fn open_sled(_data_dir: &str) -> Result<Arc<dyn Adapter>> {
    Err(crate::error::Error::Config(
        "sled storage requires the 'sled' feature. Enable it in Cargo.toml: gatekeeper-lib = { features = [\"sled\"] }".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = GatekeeperConfig::load("/nonexistent/gatekeeper.toml");
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.storage.data_dir, "./data");
        assert!(!config.instrument);
    }

    #[test]
    fn test_load_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"instrument = true

[storage]
backend = "sled"
data_dir = "/var/lib/gatekeeper"
"#
        )
        .unwrap();

        let config = GatekeeperConfig::load(file.path().to_str().unwrap());
        assert_eq!(config.storage.backend, StorageBackend::Sled);
        assert_eq!(config.storage.data_dir, "/var/lib/gatekeeper");
        assert!(config.instrument);
    }

    #[test]
    fn test_load_invalid_toml_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[storage]\nbackend = \"redis\"").unwrap();
        let config = GatekeeperConfig::load(file.path().to_str().unwrap());
        assert_eq!(config.storage.backend, StorageBackend::Memory);
    }

    #[test]
    fn test_open_memory_adapter() {
        let config = GatekeeperConfig {
            instrument: true,
            ..Default::default()
        };
        let adapter = config.open_adapter().unwrap();
        assert_eq!(adapter.name(), "memory");
        assert!(adapter.features().unwrap().is_empty());
    }

    #[cfg(feature = "sled")]
    #[test]
    fn test_open_sled_adapter() {
        let dir = tempfile::tempdir().unwrap();
        let config = GatekeeperConfig {
            storage: StorageConfig {
                backend: StorageBackend::Sled,
                data_dir: dir.path().to_str().unwrap().to_string(),
            },
            instrument: false,
        };
        let adapter = config.open_adapter().unwrap();
        assert_eq!(adapter.name(), "sled");
    }
}
