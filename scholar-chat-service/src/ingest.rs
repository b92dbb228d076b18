//! Plain-text paper ingestion. Anything that is not UTF-8 text is turned
//! away here and never reaches a session.

use std::path::Path;

use thiserror::Error;
use tracing::{debug, warn};

use crate::{models::Notice, notices};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    #[error("{name} is not a plain-text file (content type {content_type})")]
    UnsupportedType { name: String, content_type: String },

    #[error("{name} is not valid UTF-8 text")]
    NotUtf8 { name: String },

    #[error("Failed to read {name}: {reason}")]
    Read { name: String, reason: String },
}

impl IngestError {
    pub fn notice(&self) -> Notice {
        match self {
            IngestError::UnsupportedType { .. } | IngestError::NotUtf8 { .. } => {
                notices::invalid_file("Please upload a plain text (.txt) file.")
            }
            IngestError::Read { reason, .. } => notices::invalid_file(reason),
        }
    }
}

/// A decoded text file ready to be submitted as a paper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperFile {
    pub name: String,
    pub text: String,
}

fn is_text_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(|mime| mime.trim().eq_ignore_ascii_case("text/plain"))
        .unwrap_or(false)
}

fn has_text_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"))
}

/// Accepts `text/plain` content, or a `.txt` name when the content type is
/// missing or generic.
pub fn decode_paper(
    name: &str,
    content_type: Option<&str>,
    bytes: Vec<u8>,
) -> Result<PaperFile, IngestError> {
    let accepted = match content_type {
        Some(ct) if is_text_type(ct) => true,
        Some(ct) if ct.starts_with("application/octet-stream") => has_text_extension(name),
        Some(_) => false,
        None => has_text_extension(name),
    };

    if !accepted {
        warn!(file = name, content_type = ?content_type, "Rejected non-text upload");
        return Err(IngestError::UnsupportedType {
            name: name.to_string(),
            content_type: content_type.unwrap_or("unknown").to_string(),
        });
    }

    let text = String::from_utf8(bytes).map_err(|_| {
        warn!(file = name, "Rejected upload with invalid UTF-8");
        IngestError::NotUtf8 {
            name: name.to_string(),
        }
    })?;

    debug!(file = name, len = text.len(), "Decoded paper file");
    Ok(PaperFile {
        name: name.to_string(),
        text,
    })
}

pub async fn read_paper_file(path: impl AsRef<Path>) -> Result<PaperFile, IngestError> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let bytes = tokio::fs::read(path).await.map_err(|e| IngestError::Read {
        name: name.clone(),
        reason: e.to_string(),
    })?;

    decode_paper(&name, None, bytes)
}
