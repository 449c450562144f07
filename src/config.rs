use serde::Deserialize;
use std::path::PathBuf;

/// Default request body limit: 5MB.
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    /// Directory holding the sample `good-profile.json` / `bad-profile.json` reports.
    pub profiles_dir: PathBuf,
    pub body_limit_bytes: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            profiles_dir: std::env::var("PROFILES_DIR")
                .map(|dir| {
                    if dir.trim().is_empty() {
                        anyhow::bail!("PROFILES_DIR cannot be empty");
                    }
                    Ok(PathBuf::from(dir))
                })
                .unwrap_or_else(|_| Ok(PathBuf::from("data")))?,
            body_limit_bytes: std::env::var("BODY_LIMIT_BYTES")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(|s| {
                    s.trim()
                        .parse()
                        .map_err(|_| anyhow::anyhow!("BODY_LIMIT_BYTES must be a positive number"))
                })
                .transpose()?
                .unwrap_or(DEFAULT_BODY_LIMIT_BYTES),
        };

        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Profiles dir: {}", config.profiles_dir.display());
        tracing::debug!("Body limit: {} bytes", config.body_limit_bytes);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            profiles_dir: PathBuf::from("data"),
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
        }
    }
}
