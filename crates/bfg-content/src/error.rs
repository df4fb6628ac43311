//! Error types for content access.

use crate::store::ContentRef;
use thiserror::Error;

/// Errors raised while reading or comparing baseline content.
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Content not found: {0}")]
    NotFound(ContentRef),

    #[error("I/O error reading {reference}: {source}")]
    Io {
        reference: ContentRef,
        #[source]
        source: std::io::Error,
    },
}

impl ContentError {
    /// Wrap an I/O error with the reference it was raised for.
    pub fn io(reference: &ContentRef, source: std::io::Error) -> Self {
        ContentError::Io {
            reference: reference.clone(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ContentError>;
