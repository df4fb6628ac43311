//! Content equality over collections of handles.
//!
//! Handles are bucketed by byte size first, which separates obviously
//! different contents without reading them. Only handles sharing a size
//! are digested, and only then is their content streamed.
//!
//! When several handles denote the same content, the representative kept
//! is the lexically smallest handle, so results do not depend on the order
//! handles were supplied in.

use crate::digest::{Digest, DigestFunction, DigestPolicy};
use crate::error::{ContentError, Result};
use crate::store::{ContentRef, ContentStore};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;
use tracing::trace;

/// Default read size when streaming content into a digest (1 MiB).
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Configuration for content comparisons.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EqualityConfig {
    /// Digest used to decide equality of same-sized contents.
    pub digest: DigestPolicy,

    /// Bytes read per chunk while digesting.
    pub chunk_size: usize,
}

impl Default for EqualityConfig {
    fn default() -> Self {
        EqualityConfig {
            digest: DigestPolicy::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Compares content handles by the bytes they denote.
pub struct ContentComparator<S> {
    store: Arc<S>,
    digest: Arc<dyn DigestFunction>,
    chunk_size: usize,
}

impl<S> Clone for ContentComparator<S> {
    fn clone(&self) -> Self {
        ContentComparator {
            store: Arc::clone(&self.store),
            digest: Arc::clone(&self.digest),
            chunk_size: self.chunk_size,
        }
    }
}

impl<S: ContentStore> ContentComparator<S> {
    /// Create a comparator with the default configuration.
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(store, EqualityConfig::default())
    }

    pub fn with_config(store: Arc<S>, config: EqualityConfig) -> Self {
        Self::with_digest(store, config.digest.build(), config.chunk_size)
    }

    /// Create a comparator around a custom digest function.
    pub fn with_digest(store: Arc<S>, digest: Arc<dyn DigestFunction>, chunk_size: usize) -> Self {
        ContentComparator {
            store,
            digest,
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Digest the content behind a single handle.
    pub fn digest_of(&self, reference: &ContentRef) -> Result<Digest> {
        let size = self.store.size(reference)?;
        self.digest_sized(reference, size)
    }

    fn digest_sized(&self, reference: &ContentRef, size: u64) -> Result<Digest> {
        let mut reader = self.store.open(reference)?;
        let digest = self
            .digest
            .digest(size, &mut reader, self.chunk_size)
            .map_err(|e| ContentError::io(reference, e))?;
        trace!(reference = %reference, size, digest = %digest.short(), "digested content");
        Ok(digest)
    }

    /// One representative handle per distinct content, in sorted order.
    ///
    /// Each representative is the smallest handle of its content class.
    /// Duplicate handles count once. Zero or one distinct handle is
    /// returned as-is without touching the store.
    pub fn unique_contents<'a, I>(&self, refs: I) -> Result<Vec<ContentRef>>
    where
        I: IntoIterator<Item = &'a ContentRef>,
    {
        let distinct: BTreeSet<&ContentRef> = refs.into_iter().collect();
        if distinct.len() <= 1 {
            return Ok(distinct.into_iter().cloned().collect());
        }

        let mut by_size: BTreeMap<u64, Vec<&ContentRef>> = BTreeMap::new();
        for reference in distinct {
            by_size
                .entry(self.store.size(reference)?)
                .or_default()
                .push(reference);
        }

        let mut unique = Vec::new();
        for (size, group) in by_size {
            if group.len() == 1 {
                unique.push(group[0].clone());
                continue;
            }

            let mut seen: HashSet<Digest> = HashSet::new();
            for reference in group {
                if seen.insert(self.digest_sized(reference, size)?) {
                    unique.push(reference.clone());
                }
            }
        }

        unique.sort();
        Ok(unique)
    }

    /// True iff the handles denote exactly one distinct content.
    ///
    /// An empty collection is not "all the same". Differing sizes answer
    /// `false` without reading any content, and digesting stops at the
    /// first mismatch.
    pub fn all_same<'a, I>(&self, refs: I) -> Result<bool>
    where
        I: IntoIterator<Item = &'a ContentRef>,
    {
        let distinct: BTreeSet<&ContentRef> = refs.into_iter().collect();
        if distinct.len() <= 1 {
            return Ok(distinct.len() == 1);
        }

        let mut size = None;
        for reference in &distinct {
            let s = self.store.size(reference)?;
            match size {
                None => size = Some(s),
                Some(expected) if expected != s => return Ok(false),
                Some(_) => {}
            }
        }
        let size = size.unwrap_or(0);

        let mut iter = distinct.into_iter();
        let first = match iter.next() {
            Some(r) => self.digest_sized(r, size)?,
            None => return Ok(false),
        };
        for reference in iter {
            if self.digest_sized(reference, size)? != first {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Content equality of two handles.
    pub fn same_content(&self, a: &ContentRef, b: &ContentRef) -> Result<bool> {
        self.all_same([a, b])
    }
}
