//! Configuration management for the Pdfdesk server

use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Base directory holding the `uploads/` and `outputs/` roots
    pub data_dir: PathBuf,
    /// Maximum accepted upload size in bytes
    pub max_upload_bytes: u64,
    /// Idle time after which a session workspace is reclaimed
    pub retention: Duration,
}

const DEFAULT_MAX_UPLOAD_MB: u64 = 50;
const DEFAULT_RETENTION_SECS: u64 = 3600;

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            storage: StorageConfig {
                data_dir: env::temp_dir().join("pdfdesk"),
                max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
                retention: Duration::from_secs(DEFAULT_RETENTION_SECS),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Config::default();

        Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: env::var("SERVER_PORT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.server.port),
            },
            storage: StorageConfig {
                data_dir: env::var("DATA_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.storage.data_dir),
                max_upload_bytes: env::var("MAX_UPLOAD_MB")
                    .ok()
                    .and_then(|v| v.parse::<u64>().ok())
                    .map(|mb| mb * 1024 * 1024)
                    .unwrap_or(defaults.storage.max_upload_bytes),
                retention: env::var("RETENTION_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.storage.retention),
            },
        }
    }

    /// Root directory for inbound (uploaded) documents
    pub fn uploads_root(&self) -> PathBuf {
        self.storage.data_dir.join("uploads")
    }

    /// Root directory for generated artifacts
    pub fn outputs_root(&self) -> PathBuf {
        self.storage.data_dir.join("outputs")
    }
}
