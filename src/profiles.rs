//! Loading of raw bureau reports from disk.
//!
//! Two sample reports ship with the service (`good` and `bad`) so the
//! presentation layer can toggle between a clean and a risky profile.

use crate::errors::AppError;
use serde_json::Value;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Sample profile shipped with the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Good,
    Bad,
}

impl Profile {
    pub fn file_name(&self) -> &'static str {
        match self {
            Profile::Good => "good-profile.json",
            Profile::Bad => "bad-profile.json",
        }
    }

    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(self.file_name())
    }
}

impl FromStr for Profile {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "good" => Ok(Profile::Good),
            "bad" => Ok(Profile::Bad),
            other => Err(AppError::BadRequest(format!(
                "Unknown profile '{}', expected 'good' or 'bad'",
                other
            ))),
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Profile::Good => write!(f, "good"),
            Profile::Bad => write!(f, "bad"),
        }
    }
}

/// Parse raw report bytes into a generic JSON value.
pub fn parse_document(bytes: &[u8]) -> Result<Value, AppError> {
    Ok(serde_json::from_slice(bytes)?)
}

fn read_error(path: &Path, err: std::io::Error) -> AppError {
    match err.kind() {
        ErrorKind::NotFound => AppError::NotFound(format!("Report {} not found", path.display())),
        _ => AppError::InternalError(format!("Failed to read {}: {}", path.display(), err)),
    }
}

/// Read and parse a report file (blocking).
pub fn load_document(path: &Path) -> Result<Value, AppError> {
    let bytes = std::fs::read(path).map_err(|e| read_error(path, e))?;
    parse_document(&bytes)
}

/// Read and parse a sample profile from `dir`.
pub async fn load_profile(dir: &Path, profile: Profile) -> Result<Value, AppError> {
    let path = profile.path_in(dir);
    tracing::debug!("Loading {} profile from {}", profile, path.display());

    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| read_error(&path, e))?;
    parse_document(&bytes)
}
