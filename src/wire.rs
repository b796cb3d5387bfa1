//! Decoding of detector messages.
//!
//! A device message is a JSON array of `{ "name" | "class" | "label", "confidence", "bbox"? }`
//! records. Replay files hold one message per line; blank lines are skipped.

use crate::event_model::Detection;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WireError {
    #[error("failed to read detection feed {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse device message: {source}")]
    ParseError { source: serde_json::Error },
    #[error("failed to parse device message on line {line}: {source}")]
    LineParseError {
        line: usize,
        source: serde_json::Error,
    },
}

/// Decodes one device message into its detections.
pub fn decode_batch(payload: &str) -> Result<Vec<Detection>, WireError> {
    serde_json::from_str(payload).map_err(|source| WireError::ParseError { source })
}

/// Decodes a JSON-lines stream of device messages, preserving line order.
pub fn decode_batches(payload: &str) -> Result<Vec<Vec<Detection>>, WireError> {
    payload
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line).map_err(|source| WireError::LineParseError {
                line: idx + 1,
                source,
            })
        })
        .collect()
}

/// Loads a JSON-lines replay file.
pub fn load_batches(path: impl AsRef<Path>) -> Result<Vec<Vec<Detection>>, WireError> {
    let path_ref = path.as_ref();
    let payload = fs::read_to_string(path_ref).map_err(|source| WireError::ReadError {
        path: path_ref.to_path_buf(),
        source,
    })?;
    decode_batches(&payload)
}
