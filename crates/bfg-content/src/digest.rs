//! Streaming content digests.
//!
//! Contents are hashed in bounded chunks so memory use does not depend on
//! the size of a baseline. Two policies are provided: plain SHA-256 over
//! the bytes, and the git blob framing used by SHA-256 object-format
//! repositories.

use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use std::fmt;
use std::io::{self, ErrorKind, Read};
use std::sync::Arc;

/// A 32-byte content digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct Digest([u8; 32]);

impl Digest {
    /// Create a digest from raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Digest(bytes)
    }

    /// Get the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string for display.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Truncated display (first 8 chars).
    pub fn short(&self) -> String {
        self.to_hex()[..8].to_string()
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({}...)", self.short())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Incremental SHA-256 hasher.
pub struct StreamHasher {
    inner: Sha256,
}

impl StreamHasher {
    pub fn new() -> Self {
        StreamHasher {
            inner: Sha256::new(),
        }
    }

    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    pub fn finalize(self) -> Digest {
        let result = self.inner.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&result);
        Digest(bytes)
    }

    /// Feed exactly `size` bytes from `reader`, `chunk_size` at a time.
    ///
    /// A reader that ends early fails with `UnexpectedEof`; one that yields
    /// more than `size` bytes fails with `InvalidData`.
    pub fn consume(
        &mut self,
        reader: &mut dyn Read,
        size: u64,
        chunk_size: usize,
    ) -> io::Result<()> {
        let mut buf = vec![0u8; chunk_size.max(1)];
        let mut total: u64 = 0;

        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            total += n as u64;
            if total > size {
                return Err(io::Error::new(
                    ErrorKind::InvalidData,
                    format!("content longer than its declared size of {} bytes", size),
                ));
            }
            self.update(&buf[..n]);
        }

        if total < size {
            return Err(io::Error::new(
                ErrorKind::UnexpectedEof,
                format!("content ended after {} of {} bytes", total, size),
            ));
        }
        Ok(())
    }

    /// Hash a byte slice directly.
    pub fn hash(data: &[u8]) -> Digest {
        let mut hasher = Self::new();
        hasher.update(data);
        hasher.finalize()
    }
}

impl Default for StreamHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Computes a fixed-length digest from a size and a byte stream.
///
/// Implementations must be collision resistant: two contents are treated
/// as identical exactly when their digests are equal.
pub trait DigestFunction: Send + Sync {
    fn digest(&self, size: u64, reader: &mut dyn Read, chunk_size: usize) -> io::Result<Digest>;
}

/// SHA-256 over the raw bytes.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sha256Digest;

impl DigestFunction for Sha256Digest {
    fn digest(&self, size: u64, reader: &mut dyn Read, chunk_size: usize) -> io::Result<Digest> {
        let mut hasher = StreamHasher::new();
        hasher.consume(reader, size, chunk_size)?;
        Ok(hasher.finalize())
    }
}

/// SHA-256 over `blob <size>\0<bytes>`, the git blob object id in a
/// SHA-256 repository.
#[derive(Clone, Copy, Debug, Default)]
pub struct GitBlobDigest;

impl DigestFunction for GitBlobDigest {
    fn digest(&self, size: u64, reader: &mut dyn Read, chunk_size: usize) -> io::Result<Digest> {
        let mut hasher = StreamHasher::new();
        hasher.update(format!("blob {}\0", size).as_bytes());
        hasher.consume(reader, size, chunk_size)?;
        Ok(hasher.finalize())
    }
}

/// Selects the digest function used for content comparisons.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DigestPolicy {
    Sha256,
    #[default]
    GitBlob,
}

impl DigestPolicy {
    pub fn build(self) -> Arc<dyn DigestFunction> {
        match self {
            DigestPolicy::Sha256 => Arc::new(Sha256Digest),
            DigestPolicy::GitBlob => Arc::new(GitBlobDigest),
        }
    }
}
