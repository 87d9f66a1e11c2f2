use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::models::resume::ResumeExample;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("{path} contains no resume examples")]
    Empty { path: PathBuf },
}

/// Reads the resume example index (a JSON array of records) from disk.
/// Called once at startup; the result is never reloaded.
pub fn load_corpus(path: &Path) -> Result<Vec<ResumeExample>, CorpusError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CorpusError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let examples: Vec<ResumeExample> =
        serde_json::from_str(&raw).map_err(|source| CorpusError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    if examples.is_empty() {
        return Err(CorpusError::Empty {
            path: path.to_path_buf(),
        });
    }

    info!("Loaded {} resume examples from {}", examples.len(), path.display());
    Ok(examples)
}
