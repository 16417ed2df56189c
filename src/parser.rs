//! Decoding of presentation definition and submission documents.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::de::DeserializeOwned;

#[derive(Debug, thiserror::Error)]
pub enum ParserError {
    #[error("document not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The document could not be read, or is not UTF-8.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// The document is not valid JSON, or does not have the expected shape. The
    /// message starts with the path of the offending element.
    #[error("decoding failure: {0}")]
    DecodingFailure(String),
}

/// Decode a JSON document, e.g. a [PresentationDefinitionContainer].
///
/// [PresentationDefinitionContainer]: crate::core::presentation_definition::PresentationDefinitionContainer
pub fn decode_str<T: DeserializeOwned>(json: &str) -> Result<T, ParserError> {
    let mut deserializer = serde_json::Deserializer::from_str(json);

    let decoded = serde_path_to_error::deserialize(&mut deserializer)
        .map_err(|e| ParserError::DecodingFailure(format!("{}: {}", e.path(), e.inner())))?;

    deserializer
        .end()
        .map_err(|e| ParserError::DecodingFailure(e.to_string()))?;

    Ok(decoded)
}

/// Decode raw bytes holding a UTF-8 JSON document.
pub fn decode_slice<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ParserError> {
    let json = std::str::from_utf8(bytes).map_err(|e| ParserError::InvalidData(e.to_string()))?;
    decode_str(json)
}

/// Read and decode the JSON document at `path`.
pub fn decode_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ParserError> {
    let path = path.as_ref();

    let bytes = fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ParserError::NotFound(path.to_path_buf()),
        _ => ParserError::InvalidData(format!("{}: {e}", path.display())),
    })?;

    tracing::debug!("decoding {}", path.display());
    decode_slice(&bytes)
}
