//! Elimination and merge passes over baseline assignments.
//!
//! None of these passes changes what any chain head resolves to, compared
//! by content: an assignment is only cleared when resolution provably
//! falls through to identical content, and only created where no chain
//! can observe it yet.

use crate::error::{GraphError, Result};
use crate::graph::{InheritedSet, PlatformGraph, Walk};
use crate::platform::Platform;
use bfg_content::{ContentRef, ContentStore};
use std::collections::BTreeSet;
use tracing::debug;

impl<S: ContentStore> PlatformGraph<S> {
    /// Whether the baseline of `platform` is implied by its ancestors.
    ///
    /// The values inherited by the platform's immediate successors must
    /// all be concrete and, together with the platform's own baseline,
    /// share one content. A platform without successors, or whose
    /// successors can see no baseline or diverging contents, is never
    /// redundant.
    pub fn is_redundant(&self, platform: &Platform) -> Result<bool> {
        self.ensure_known(platform)?;
        let own = self
            .baselines
            .get(platform)
            .ok_or_else(|| GraphError::NoAssignment(platform.clone()))?;

        let mut candidates = InheritedSet::new();
        {
            let inherited = self.inherited_map();
            for next in self.successors(platform)? {
                if let Some(values) = inherited.get(next) {
                    candidates.extend(values.iter().cloned());
                }
            }
        }

        if candidates.is_empty() || candidates.contains(&None) {
            return Ok(false);
        }

        let refs = candidates.iter().flatten().chain(std::iter::once(own));
        Ok(self.comparator.all_same(refs)?)
    }

    /// Every assigned platform that is currently redundant.
    pub fn redundant_platforms(&self) -> Result<BTreeSet<Platform>> {
        let mut redundant = BTreeSet::new();
        for platform in self.baselines.keys() {
            if self.is_redundant(platform)? {
                redundant.insert(platform.clone());
            }
        }
        Ok(redundant)
    }

    /// Clear every redundant assignment, in platform order.
    ///
    /// Each platform is judged against the state left by the removals
    /// before it. Returns the number of assignments cleared.
    pub fn remove_redundant(&mut self) -> Result<usize> {
        let assigned: Vec<Platform> = self.baselines.keys().cloned().collect();
        let mut removed = 0;

        for platform in assigned {
            if self.is_redundant(&platform)? {
                self.remove_baseline(&platform)?;
                debug!(platform = ?platform, "removed redundant baseline");
                removed += 1;
            }
        }

        Ok(removed)
    }

    /// Clear assignments that no chain ever selects.
    ///
    /// Each chain uses the first assignment met walking from its head
    /// toward the default platform; assignments behind it are unreachable
    /// from that chain. Returns the number of assignments cleared.
    pub fn remove_overridden(&mut self) -> usize {
        let mut used: BTreeSet<&Platform> = BTreeSet::new();
        for chain in self.chains.values() {
            if let Some(selected) = chain.iter().find(|p| self.baselines.contains_key(*p)) {
                used.insert(selected);
            }
        }

        let unused: Vec<Platform> = self
            .baselines
            .keys()
            .filter(|p| !used.contains(p))
            .cloned()
            .collect();

        for platform in &unused {
            self.baselines.remove(platform);
            debug!(platform = ?platform, "removed overridden baseline");
        }
        if !unused.is_empty() {
            self.invalidate();
        }

        unused.len()
    }

    /// Hoist content shared by every chain through a platform onto it.
    ///
    /// Walking each chain from its head, a platform sees the baseline its
    /// chain would already have selected at that point. Where every chain
    /// through the platform has selected a baseline and all of them share
    /// one content, the platform is assigned the smallest of those
    /// references. Descendants holding the same content then become
    /// redundant. Returns the number of platforms assigned or reassigned.
    pub fn merge_duplicates(&mut self) -> Result<usize> {
        let active = self.active_values(Walk::TowardDefault);
        let mut merged = Vec::new();

        for (platform, values) in &active {
            if values.is_empty() || values.contains(&None) {
                continue;
            }
            if !self.comparator.all_same(values.iter().flatten())? {
                continue;
            }
            let Some(representative) = smallest(values) else {
                continue;
            };
            if self.baselines.get(platform) != Some(representative) {
                merged.push((platform.clone(), representative.clone()));
            }
        }

        for (platform, reference) in &merged {
            debug!(platform = ?platform, baseline = %reference, "merged duplicate baselines");
            self.baselines.insert(platform.clone(), reference.clone());
        }
        if !merged.is_empty() {
            self.invalidate();
        }

        Ok(merged.len())
    }
}

/// Lexically smallest reference in a set, ignoring the "no baseline" marker.
pub(crate) fn smallest(values: &InheritedSet) -> Option<&ContentRef> {
    values.iter().flatten().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bfg_content::{ContentComparator, MemoryContentStore};
    use std::sync::Arc;

    fn p(id: &str) -> Platform {
        Platform::from(id)
    }

    fn r(id: &str) -> ContentRef {
        ContentRef::from(id)
    }

    /// Graph over `chains` where each `(platform, content)` pair is stored
    /// under its own handle `<platform>/expected.txt`.
    fn fixture(chains: &[&[&str]], assigned: &[(&str, &str)]) -> PlatformGraph<MemoryContentStore> {
        let mut store = MemoryContentStore::new();
        for (platform, content) in assigned {
            store.insert(format!("{}/expected.txt", platform), *content);
        }
        let mut graph = PlatformGraph::with_chains(
            ContentComparator::new(Arc::new(store)),
            chains.iter().map(|c| c.iter().copied()),
        );
        for (platform, _) in assigned {
            graph
                .set_baseline(&p(platform), r(&format!("{}/expected.txt", platform)))
                .unwrap();
        }
        graph
    }

    const GLIB: &[&[&str]] = &[&["gtk", "glib", "wk2"], &["wpe", "glib", "wk2"]];

    #[test]
    fn test_is_redundant_requires_assignment() {
        let graph = fixture(GLIB, &[]);
        assert!(matches!(
            graph.is_redundant(&p("gtk")),
            Err(GraphError::NoAssignment(_))
        ));
        assert!(matches!(
            graph.is_redundant(&p("ios")),
            Err(GraphError::UnknownPlatform(_))
        ));
    }

    #[test]
    fn test_default_is_never_redundant() {
        let graph = fixture(GLIB, &[("", "A")]);
        assert!(!graph.is_redundant(&Platform::default()).unwrap());
    }

    #[test]
    fn test_same_content_as_ancestor_is_redundant() {
        let graph = fixture(GLIB, &[("gtk", "A"), ("wk2", "A")]);
        assert!(graph.is_redundant(&p("gtk")).unwrap());
        assert!(!graph.is_redundant(&p("wk2")).unwrap());
    }

    #[test]
    fn test_different_content_is_not_redundant() {
        let graph = fixture(GLIB, &[("gtk", "A"), ("wk2", "B")]);
        assert!(!graph.is_redundant(&p("gtk")).unwrap());
    }

    #[test]
    fn test_gap_below_is_not_redundant() {
        let graph = fixture(GLIB, &[("gtk", "A")]);
        assert!(!graph.is_redundant(&p("gtk")).unwrap());
        assert_eq!(
            graph.inherited_baselines(&p("glib")).unwrap(),
            InheritedSet::from([None])
        );
    }

    #[test]
    fn test_diverging_successors_block_redundancy() {
        // "mid" falls back to "left" on one chain and "right" on another.
        let chains: &[&[&str]] = &[&["top", "mid", "left"], &["mid", "right"]];
        let graph = fixture(chains, &[("mid", "A"), ("left", "A"), ("right", "B")]);
        assert!(!graph.is_redundant(&p("mid")).unwrap());

        let agreeing = fixture(chains, &[("mid", "A"), ("left", "A"), ("right", "A")]);
        assert!(agreeing.is_redundant(&p("mid")).unwrap());
    }

    #[test]
    fn test_inherited_set_tracks_ambiguity() {
        let chains: &[&[&str]] = &[&["top", "mid", "left"], &["mid", "right"]];
        let graph = fixture(chains, &[("left", "A"), ("right", "B")]);
        assert_eq!(
            graph.inherited_baselines(&p("mid")).unwrap(),
            InheritedSet::from([Some(r("left/expected.txt")), Some(r("right/expected.txt"))])
        );
        assert_eq!(
            graph.inherited_baselines(&p("top")).unwrap(),
            InheritedSet::from([Some(r("left/expected.txt"))])
        );
        assert_eq!(
            graph.inherited_baselines(&Platform::default()).unwrap(),
            InheritedSet::from([None])
        );
    }

    #[test]
    fn test_inherited_cache_follows_mutations() {
        let mut graph = fixture(GLIB, &[("gtk", "A"), ("wk2", "A")]);
        assert!(graph.is_redundant(&p("gtk")).unwrap());

        graph.remove_baseline(&p("wk2")).unwrap();
        assert!(!graph.is_redundant(&p("gtk")).unwrap());

        graph.set_baseline(&p("glib"), r("wk2/expected.txt")).unwrap();
        assert!(graph.is_redundant(&p("gtk")).unwrap());
    }

    #[test]
    fn test_remove_redundant_counts() {
        let mut graph = fixture(
            GLIB,
            &[("gtk", "A"), ("wpe", "A"), ("glib", "A"), ("wk2", "B")],
        );
        assert_eq!(graph.remove_redundant().unwrap(), 2);
        assert_eq!(graph.get_baseline(&p("gtk"), false).unwrap(), None);
        assert_eq!(graph.get_baseline(&p("wpe"), false).unwrap(), None);
        assert!(graph.get_baseline(&p("glib"), false).unwrap().is_some());
        assert_eq!(graph.remove_redundant().unwrap(), 0);
    }

    #[test]
    fn test_sole_assignment_is_not_overridden() {
        let chains: &[&[&str]] = &[&[
            "mac-ventura-wk1",
            "mac-ventura",
            "mac-wk1",
            "mac",
        ]];
        let mut graph = fixture(chains, &[("mac-ventura-wk1", "X")]);
        assert_eq!(graph.remove_overridden(), 0);
        assert!(graph
            .get_baseline(&p("mac-ventura-wk1"), false)
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_remove_overridden_clears_shadowed() {
        let chains: &[&[&str]] = &[&["mac-wk1", "mac"]];
        let mut graph = fixture(chains, &[("mac-wk1", "A"), ("mac", "B"), ("", "C")]);
        // "" is still selected by the default platform's own chain.
        assert_eq!(graph.remove_overridden(), 1);
        assert_eq!(graph.get_baseline(&p("mac"), false).unwrap(), None);
        assert!(graph.get_baseline(&Platform::default(), false).unwrap().is_some());
    }

    #[test]
    fn test_merge_hoists_shared_content() {
        let mut graph = fixture(GLIB, &[("gtk", "A"), ("wpe", "A")]);
        let merged = graph.merge_duplicates().unwrap();

        assert_eq!(merged, 2);
        assert_eq!(
            graph.get_baseline(&p("glib"), false).unwrap(),
            Some(&r("gtk/expected.txt"))
        );
        assert_eq!(
            graph.get_baseline(&p("wk2"), false).unwrap(),
            Some(&r("gtk/expected.txt"))
        );
        // The default platform's own chain sees nothing, so it is left alone.
        assert_eq!(graph.get_baseline(&Platform::default(), false).unwrap(), None);

        assert!(graph.remove_redundant().unwrap() >= 2);
        assert_eq!(graph.get_baseline(&p("gtk"), false).unwrap(), None);
        assert_eq!(graph.get_baseline(&p("wpe"), false).unwrap(), None);

        let resolved = graph.get_all_baselines(true, true).unwrap();
        let store = graph.comparator().store();
        for head in ["gtk", "wpe"] {
            let reference = resolved[&p(head)].as_ref().unwrap();
            assert_eq!(store.read_all(reference).unwrap(), b"A");
        }
        let glib = graph.get_baseline(&p("glib"), true).unwrap().unwrap();
        assert_eq!(store.read_all(glib).unwrap(), b"A");
    }

    #[test]
    fn test_merge_skips_divergent_siblings() {
        let mut graph = fixture(GLIB, &[("gtk", "A"), ("wpe", "B")]);
        assert_eq!(graph.merge_duplicates().unwrap(), 0);
        assert_eq!(graph.remove_redundant().unwrap(), 0);
        assert_eq!(graph.get_baseline(&p("glib"), false).unwrap(), None);
    }

    #[test]
    fn test_merge_skips_partially_covered() {
        // "wpe" reaches "glib" without any baseline, so nothing is hoisted.
        let chains: &[&[&str]] = &[&["gtk4", "gtk", "glib"], &["gtk", "glib"], &["wpe", "glib"]];
        let mut graph = fixture(chains, &[("gtk", "A")]);
        assert_eq!(graph.merge_duplicates().unwrap(), 0);
    }
}
