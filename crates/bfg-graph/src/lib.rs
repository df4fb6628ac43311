//! # bfg-graph
//!
//! Platform fallback graph for per-platform test baselines.
//!
//! Each platform falls back, through an ordered chain, to more generic
//! platforms and finally to the default platform. Chains share suffixes,
//! so together they form a DAG. This crate provides:
//! - Resolution of the baseline that applies to a platform
//! - Removal of baselines that are redundant with their ancestors
//! - Removal of baselines that no chain ever selects
//! - Merging of content-identical sibling baselines onto a shared ancestor
//!
//! All comparisons are by content, through [`bfg_content::ContentComparator`].
//!
//! ## Example
//!
//! ```rust
//! use bfg_content::{ContentComparator, ContentRef, MemoryContentStore};
//! use bfg_graph::{Platform, PlatformGraph};
//! use std::sync::Arc;
//!
//! let mut store = MemoryContentStore::new();
//! store.insert("gtk/expected.txt", "A");
//! store.insert("wpe/expected.txt", "A");
//!
//! let mut graph = PlatformGraph::with_chains(
//!     ContentComparator::new(Arc::new(store)),
//!     [["gtk", "glib", "wk2"], ["wpe", "glib", "wk2"]],
//! );
//! graph.set_baseline(&"gtk".into(), ContentRef::from("gtk/expected.txt")).unwrap();
//! graph.set_baseline(&"wpe".into(), ContentRef::from("wpe/expected.txt")).unwrap();
//!
//! let report = graph.cleanup().unwrap();
//! assert_eq!(report.removed, 2);
//! assert_eq!(graph.assignment_count(), 1);
//! assert!(graph.get_baseline(&Platform::from("wpe"), true).unwrap().is_some());
//! ```

mod cleanup;
mod error;
mod graph;
mod platform;
mod redundancy;
mod resolver;

pub use cleanup::{CleanupConfig, CleanupReport};
pub use error::{GraphError, Result};
pub use graph::{InheritedSet, PlatformGraph};
pub use platform::Platform;
