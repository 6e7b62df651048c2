//! Request size limits.
//!
//! The whole request body is buffered before the handler runs, so the front
//! enforces a ceiling twice:
//! - 413 up front when the declared `Content-Length` is already too large
//! - 413 mid-read when a chunked or lying client crosses the ceiling

use bytes::{Bytes, BytesMut};

/// Body size violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecurityError {
    /// Request body too large (413)
    PayloadTooLarge { size: usize, limit: usize },
}

impl std::fmt::Display for SecurityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecurityError::PayloadTooLarge { size, limit } => {
                write!(f, "Request payload size {} exceeds limit {}", size, limit)
            }
        }
    }
}

impl std::error::Error for SecurityError {}

impl SecurityError {
    pub fn status(&self) -> u16 {
        413
    }
}

/// Validate the declared request body size
pub fn validate_body_size(
    content_length: Option<usize>,
    limit: usize,
) -> Result<(), SecurityError> {
    if let Some(size) = content_length {
        if size > limit {
            return Err(SecurityError::PayloadTooLarge { size, limit });
        }
    }
    Ok(())
}

/// Accumulates body chunks, refusing to grow past `limit`.
#[derive(Debug)]
pub struct BodyCollector {
    buf: BytesMut,
    limit: usize,
}

impl BodyCollector {
    pub fn new(limit: usize) -> Self {
        Self {
            buf: BytesMut::new(),
            limit,
        }
    }

    pub fn push(&mut self, chunk: &[u8]) -> Result<(), SecurityError> {
        let size = self.buf.len().saturating_add(chunk.len());
        if size > self.limit {
            return Err(SecurityError::PayloadTooLarge {
                size,
                limit: self.limit,
            });
        }
        self.buf.extend_from_slice(chunk);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }
}
