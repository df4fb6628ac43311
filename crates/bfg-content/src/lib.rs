//! # bfg-content
//!
//! Content-addressed equality for baseline references.
//!
//! This crate provides:
//! - Opaque content handles and the read-only stores that resolve them
//! - Streaming digests with pluggable policies (plain SHA-256, git blob)
//! - Size-bucketed comparison of handle collections
//!
//! ## Example
//!
//! ```rust
//! use bfg_content::{ContentComparator, ContentRef, MemoryContentStore};
//! use std::sync::Arc;
//!
//! let mut store = MemoryContentStore::new();
//! store.insert("platform/gtk/test-expected.txt", "layer at (0,0) size 800x600");
//! store.insert("platform/wpe/test-expected.txt", "layer at (0,0) size 800x600");
//!
//! let cmp = ContentComparator::new(Arc::new(store));
//! let gtk = ContentRef::from("platform/gtk/test-expected.txt");
//! let wpe = ContentRef::from("platform/wpe/test-expected.txt");
//!
//! assert!(cmp.all_same([&gtk, &wpe]).unwrap());
//! assert_eq!(cmp.unique_contents([&wpe, &gtk]).unwrap(), vec![gtk]);
//! ```

mod digest;
mod equality;
mod error;
mod store;

pub use digest::{Digest, DigestFunction, DigestPolicy, GitBlobDigest, Sha256Digest, StreamHasher};
pub use equality::{ContentComparator, EqualityConfig, DEFAULT_CHUNK_SIZE};
pub use error::{ContentError, Result};
pub use store::{ContentRef, ContentStore, FsContentStore, MemoryContentStore};
