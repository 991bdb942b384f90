//! Decoder seam: frame in, ordered list of decoded strings out.

use super::capture::Frame;
use thiserror::Error;

/// A frame that could not be decoded. Never leaves the pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("undecodable frame: {0}")]
pub struct DecodeError(pub String);

pub trait Decoder: Send + 'static {
    /// Zero, one or several codes may be visible in one frame; they are
    /// returned in the order they should be processed.
    fn decode(&mut self, frame: &Frame) -> Result<Vec<String>, DecodeError>;
}

/// Decoder for text frames: the payload is UTF-8 and several codes are
/// separated by `;`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextDecoder;

impl Decoder for TextDecoder {
    fn decode(&mut self, frame: &Frame) -> Result<Vec<String>, DecodeError> {
        let text = std::str::from_utf8(&frame.data).map_err(|e| DecodeError(e.to_string()))?;

        Ok(text
            .split(';')
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
            .collect())
    }
}
