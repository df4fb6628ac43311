//! Content handles and the stores that resolve them to bytes.
//!
//! The comparison engine never touches a filesystem directly; it asks a
//! [`ContentStore`] for the size of a handle and for a reader over its
//! bytes.

use crate::error::{ContentError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs::{self, File};
use std::io::{Cursor, ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Opaque handle to a piece of baseline content.
///
/// Two handles may denote identical bytes; equality of handles says
/// nothing about equality of content.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentRef(String);

impl ContentRef {
    pub fn new(id: impl Into<String>) -> Self {
        ContentRef(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentRef({:?})", self.0)
    }
}

impl fmt::Display for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContentRef {
    fn from(s: &str) -> Self {
        ContentRef(s.to_string())
    }
}

impl From<String> for ContentRef {
    fn from(s: String) -> Self {
        ContentRef(s)
    }
}

/// Read-only access to the bytes behind content handles.
pub trait ContentStore: Send + Sync {
    /// Byte size of the content.
    fn size(&self, reference: &ContentRef) -> Result<u64>;

    /// Open a streaming reader over the content.
    fn open(&self, reference: &ContentRef) -> Result<Box<dyn Read + '_>>;

    /// Read the whole content into memory.
    ///
    /// Only meant for callers that know the content is small; the
    /// comparison engine never uses it.
    fn read_all(&self, reference: &ContentRef) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.open(reference)?
            .read_to_end(&mut buf)
            .map_err(|e| ContentError::io(reference, e))?;
        Ok(buf)
    }
}

/// In-memory content store.
///
/// Counts size lookups and opens so tests can check how much I/O a
/// comparison needed.
#[derive(Debug, Default)]
pub struct MemoryContentStore {
    contents: HashMap<ContentRef, Vec<u8>>,
    size_queries: AtomicUsize,
    opens: AtomicUsize,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `bytes` under `reference`, replacing any previous content.
    pub fn insert(&mut self, reference: impl Into<ContentRef>, bytes: impl Into<Vec<u8>>) {
        self.contents.insert(reference.into(), bytes.into());
    }

    pub fn contains(&self, reference: &ContentRef) -> bool {
        self.contents.contains_key(reference)
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// Number of `size` calls served so far.
    pub fn size_queries(&self) -> usize {
        self.size_queries.load(Ordering::Relaxed)
    }

    /// Number of `open` calls served so far.
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::Relaxed)
    }

    pub fn reset_counters(&self) {
        self.size_queries.store(0, Ordering::Relaxed);
        self.opens.store(0, Ordering::Relaxed);
    }

    fn bytes(&self, reference: &ContentRef) -> Result<&[u8]> {
        self.contents
            .get(reference)
            .map(Vec::as_slice)
            .ok_or_else(|| ContentError::NotFound(reference.clone()))
    }
}

impl ContentStore for MemoryContentStore {
    fn size(&self, reference: &ContentRef) -> Result<u64> {
        self.size_queries.fetch_add(1, Ordering::Relaxed);
        Ok(self.bytes(reference)?.len() as u64)
    }

    fn open(&self, reference: &ContentRef) -> Result<Box<dyn Read + '_>> {
        self.opens.fetch_add(1, Ordering::Relaxed);
        Ok(Box::new(Cursor::new(self.bytes(reference)?)))
    }
}

/// Store whose handles are paths relative to a root directory.
#[derive(Clone, Debug)]
pub struct FsContentStore {
    root: PathBuf,
}

impl FsContentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsContentStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_of(&self, reference: &ContentRef) -> PathBuf {
        self.root.join(reference.as_str())
    }

    fn map_err(reference: &ContentRef, e: std::io::Error) -> ContentError {
        if e.kind() == ErrorKind::NotFound {
            ContentError::NotFound(reference.clone())
        } else {
            ContentError::io(reference, e)
        }
    }
}

impl ContentStore for FsContentStore {
    fn size(&self, reference: &ContentRef) -> Result<u64> {
        fs::metadata(self.path_of(reference))
            .map(|m| m.len())
            .map_err(|e| Self::map_err(reference, e))
    }

    fn open(&self, reference: &ContentRef) -> Result<Box<dyn Read + '_>> {
        let file = File::open(self.path_of(reference)).map_err(|e| Self::map_err(reference, e))?;
        Ok(Box::new(file))
    }
}
