//! Parsing of the `data:image/png;base64,...` favicon URI servers advertise
//! in their status response.

use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Favicon {
    pub mimetype: String,
    pub raw_bytes: Vec<u8>,
    pub size: usize,
    pub crc32: u32,
}

#[derive(Debug, Error)]
pub enum FaviconParseError {
    #[error("favicon uri did not start with \"data:\"")]
    NotADataUri,
    #[error("favicon uri was missing a comma separating mimetype from payload")]
    MissingSeparator,
    #[error("favicon mimetype was missing \";base64\"")]
    NotBase64,
    #[error("base64 payload was invalid: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

impl Favicon {
    /// Parses a `data:<mimetype>;base64,<payload>` URI. On any malformed
    /// input, callers should log and keep whatever favicon was previously
    /// stored rather than propagate an error up through a poll.
    pub fn parse(data_uri: &str) -> Result<Favicon, FaviconParseError> {
        let rest = data_uri
            .strip_prefix("data:")
            .ok_or(FaviconParseError::NotADataUri)?;

        let (header, payload) = rest
            .split_once(',')
            .ok_or(FaviconParseError::MissingSeparator)?;

        let mimetype = header
            .strip_suffix(";base64")
            .ok_or(FaviconParseError::NotBase64)?
            .to_string();

        let raw_bytes = base64::engine::general_purpose::STANDARD.decode(payload)?;
        let size = raw_bytes.len();
        let crc32 = crc32fast::hash(&raw_bytes);

        Ok(Favicon {
            mimetype,
            raw_bytes,
            size,
            crc32,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_png_favicon_and_computes_crc() {
        let uri = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUg==";
        let favicon = Favicon::parse(uri).unwrap();
        assert_eq!(favicon.mimetype, "image/png");
        assert_eq!(favicon.size, favicon.raw_bytes.len());
        assert_eq!(favicon.crc32, crc32fast::hash(&favicon.raw_bytes));
    }

    #[test]
    fn rejects_non_data_uri() {
        assert!(matches!(
            Favicon::parse("https://example.com/icon.png"),
            Err(FaviconParseError::NotADataUri)
        ));
    }
}
