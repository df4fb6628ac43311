//! The platform fallback graph.
//!
//! Every registered fallback chain contributes its consecutive pairs as
//! edges pointing from the more specific platform to the next, more
//! generic one. Chains that share a suffix share those nodes, so the
//! result is a DAG rather than a tree. Platforms are keyed by identifier;
//! a platform reachable from several chains is a single node.

use crate::error::{GraphError, Result};
use crate::platform::Platform;
use bfg_content::{ContentComparator, ContentRef, ContentStore};
use std::cell::{Cell, Ref, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Content values seen at a platform across every chain through it.
///
/// `None` stands for "no baseline on this path".
pub type InheritedSet = BTreeSet<Option<ContentRef>>;

pub(crate) type InheritedMap = BTreeMap<Platform, InheritedSet>;

/// Direction of a walk along every chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Walk {
    /// From the default platform toward the chain head.
    TowardHead,
    /// From the chain head toward the default platform.
    TowardDefault,
}

/// DAG of platforms built from fallback chains, with per-platform baselines.
pub struct PlatformGraph<S> {
    pub(crate) comparator: ContentComparator<S>,

    /// Forward edges: platform -> next, more generic platforms.
    pub(crate) successors: BTreeMap<Platform, BTreeSet<Platform>>,

    /// Reverse edges: platform -> platforms falling back to it.
    pub(crate) predecessors: BTreeMap<Platform, BTreeSet<Platform>>,

    /// Complete chain (ending in the default platform) per chain head.
    pub(crate) chains: BTreeMap<Platform, Vec<Platform>>,

    /// Explicit baseline assignments.
    pub(crate) baselines: BTreeMap<Platform, ContentRef>,

    /// Cached inheritance data, valid while `dirty` is false.
    pub(crate) inherited: RefCell<InheritedMap>,
    pub(crate) dirty: Cell<bool>,
}

impl<S: ContentStore> PlatformGraph<S> {
    /// Create a graph holding only the default platform.
    pub fn new(comparator: ContentComparator<S>) -> Self {
        let default = Platform::default();
        let mut graph = PlatformGraph {
            comparator,
            successors: BTreeMap::new(),
            predecessors: BTreeMap::new(),
            chains: BTreeMap::new(),
            baselines: BTreeMap::new(),
            inherited: RefCell::new(BTreeMap::new()),
            dirty: Cell::new(true),
        };
        graph.successors.insert(default.clone(), BTreeSet::new());
        graph.predecessors.insert(default.clone(), BTreeSet::new());
        graph.chains.insert(default.clone(), vec![default]);
        graph
    }

    /// Create a graph and register every chain in `chains`.
    pub fn with_chains<I, C, P>(comparator: ContentComparator<S>, chains: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: IntoIterator<Item = P>,
        P: Into<Platform>,
    {
        let mut graph = Self::new(comparator);
        for chain in chains {
            graph.add_chain(chain);
        }
        graph
    }

    /// Register a fallback chain, most specific platform first.
    ///
    /// The default platform is appended implicitly; a chain that already
    /// ends in it is not extended again. Edges are only ever added, so
    /// registering a chain twice, or chains sharing a suffix, leaves the
    /// existing structure intact. Re-registering a head replaces the chain
    /// used to resolve that head. An empty chain is ignored.
    pub fn add_chain<C, P>(&mut self, chain: C)
    where
        C: IntoIterator<Item = P>,
        P: Into<Platform>,
    {
        let mut complete: Vec<Platform> = chain.into_iter().map(Into::into).collect();
        while complete.last().is_some_and(Platform::is_default) {
            complete.pop();
        }
        if complete.is_empty() {
            return;
        }
        complete.push(Platform::default());

        for platform in &complete {
            self.successors.entry(platform.clone()).or_default();
            self.predecessors.entry(platform.clone()).or_default();
        }
        for pair in complete.windows(2) {
            let (from, to) = (&pair[0], &pair[1]);
            if let Some(next) = self.successors.get_mut(from) {
                next.insert(to.clone());
            }
            if let Some(prev) = self.predecessors.get_mut(to) {
                prev.insert(from.clone());
            }
        }

        debug!(head = ?complete[0], length = complete.len(), "registered fallback chain");
        self.chains.insert(complete[0].clone(), complete);
        self.invalidate();
    }

    /// An independent copy: nodes, edges, chains and assignments.
    ///
    /// The copy shares the read-only content store but no mutable state,
    /// and starts with its inheritance cache invalidated.
    pub fn copy(&self) -> Self {
        PlatformGraph {
            comparator: self.comparator.clone(),
            successors: self.successors.clone(),
            predecessors: self.predecessors.clone(),
            chains: self.chains.clone(),
            baselines: self.baselines.clone(),
            inherited: RefCell::new(BTreeMap::new()),
            dirty: Cell::new(true),
        }
    }

    pub fn comparator(&self) -> &ContentComparator<S> {
        &self.comparator
    }

    pub fn contains(&self, platform: &Platform) -> bool {
        self.successors.contains_key(platform)
    }

    /// All platforms, in identifier order.
    pub fn platforms(&self) -> impl Iterator<Item = &Platform> {
        self.successors.keys()
    }

    /// Chain heads, including the default platform.
    pub fn roots(&self) -> impl Iterator<Item = &Platform> {
        self.chains.keys()
    }

    /// The complete chain registered for `head`, if any.
    pub fn chain(&self, head: &Platform) -> Option<&[Platform]> {
        self.chains.get(head).map(Vec::as_slice)
    }

    /// Immediate, more generic neighbours of `platform`.
    pub fn successors(&self, platform: &Platform) -> Result<&BTreeSet<Platform>> {
        self.successors
            .get(platform)
            .ok_or_else(|| GraphError::UnknownPlatform(platform.clone()))
    }

    /// Platforms that fall back directly to `platform`.
    pub fn predecessors(&self, platform: &Platform) -> Result<&BTreeSet<Platform>> {
        self.predecessors
            .get(platform)
            .ok_or_else(|| GraphError::UnknownPlatform(platform.clone()))
    }

    /// Explicit assignments, in platform order.
    pub fn assignments(&self) -> &BTreeMap<Platform, ContentRef> {
        &self.baselines
    }

    /// Number of explicit assignments.
    pub fn assignment_count(&self) -> usize {
        self.baselines.len()
    }

    pub(crate) fn ensure_known(&self, platform: &Platform) -> Result<()> {
        if self.contains(platform) {
            Ok(())
        } else {
            Err(GraphError::UnknownPlatform(platform.clone()))
        }
    }

    pub(crate) fn invalidate(&self) {
        self.dirty.set(true);
    }

    /// Walk every chain in `direction`, tracking the most recently passed
    /// assignment, and collect per platform the values active there.
    pub(crate) fn active_values(&self, direction: Walk) -> InheritedMap {
        let mut seen: InheritedMap = self
            .successors
            .keys()
            .map(|p| (p.clone(), InheritedSet::new()))
            .collect();

        for chain in self.chains.values() {
            let mut current: Option<&ContentRef> = None;
            let mut visit = |platform: &Platform| {
                if let Some(baseline) = self.baselines.get(platform) {
                    current = Some(baseline);
                }
                seen.entry(platform.clone())
                    .or_default()
                    .insert(current.cloned());
            };
            match direction {
                Walk::TowardHead => chain.iter().rev().for_each(&mut visit),
                Walk::TowardDefault => chain.iter().for_each(&mut visit),
            }
        }

        seen
    }

    /// Inheritance data, recomputed first if any mutation invalidated it.
    pub(crate) fn inherited_map(&self) -> Ref<'_, InheritedMap> {
        if self.dirty.get() {
            let computed = self.active_values(Walk::TowardHead);
            *self.inherited.borrow_mut() = computed;
            self.dirty.set(false);
        }
        self.inherited.borrow()
    }

    /// The inherited set of `platform`: every value it can observe across
    /// the chains passing through it, walking up from the default platform.
    pub fn inherited_baselines(&self, platform: &Platform) -> Result<InheritedSet> {
        self.ensure_known(platform)?;
        Ok(self
            .inherited_map()
            .get(platform)
            .cloned()
            .unwrap_or_default())
    }
}
