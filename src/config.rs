use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use dotenvy::dotenv;

fn default_max_file_size() -> usize {
    // 10 MB in bytes
    10 * 1024 * 1024
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory where uploaded files are stored. Passed explicitly to
    /// the storage layer instead of living in process-wide state.
    pub upload_dir: PathBuf,
    pub database_path: PathBuf,
    pub max_file_size: usize,
    pub bind_addr: SocketAddr,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file first
        dotenv().ok();

        let upload_dir = std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());
        let database_path =
            std::env::var("DATABASE_PATH").unwrap_or_else(|_| "dashboard.db".to_string());

        let max_file_size = match std::env::var("MAX_FILE_SIZE") {
            Ok(raw) => raw
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid MAX_FILE_SIZE: {}", e))?,
            Err(_) => default_max_file_size(),
        };

        let bind_addr = std::env::var("BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid BIND_ADDR: {}", e))?;

        Ok(Config {
            upload_dir: PathBuf::from(upload_dir),
            database_path: PathBuf::from(database_path),
            max_file_size,
            bind_addr,
        })
    }
}
