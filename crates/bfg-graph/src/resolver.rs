//! Baseline assignment and resolution.
//!
//! Resolution walks a platform's chain from the platform itself toward
//! the default platform and picks the first explicit assignment.

use crate::error::{GraphError, Result};
use crate::graph::PlatformGraph;
use crate::platform::Platform;
use bfg_content::{ContentRef, ContentStore, Digest};
use std::collections::BTreeMap;

impl<S: ContentStore> PlatformGraph<S> {
    /// Assign `reference` as the explicit baseline of `platform`.
    pub fn set_baseline(&mut self, platform: &Platform, reference: ContentRef) -> Result<()> {
        self.ensure_known(platform)?;
        self.baselines.insert(platform.clone(), reference);
        self.invalidate();
        Ok(())
    }

    /// Clear the explicit baseline of `platform`, returning it.
    pub fn remove_baseline(&mut self, platform: &Platform) -> Result<ContentRef> {
        self.ensure_known(platform)?;
        let removed = self
            .baselines
            .remove(platform)
            .ok_or_else(|| GraphError::NoAssignment(platform.clone()))?;
        self.invalidate();
        Ok(removed)
    }

    /// The chain used to resolve `platform`.
    ///
    /// A chain head resolves along its own chain. Any other platform
    /// resolves along the suffix, starting at itself, of the first chain
    /// (in head order) that passes through it.
    pub fn resolution_path(&self, platform: &Platform) -> Result<&[Platform]> {
        self.ensure_known(platform)?;
        if let Some(chain) = self.chains.get(platform) {
            return Ok(chain.as_slice());
        }
        self.chains
            .values()
            .find_map(|chain| {
                chain
                    .iter()
                    .position(|p| p == platform)
                    .map(|pos| &chain[pos..])
            })
            .ok_or_else(|| GraphError::UnknownPlatform(platform.clone()))
    }

    /// The baseline that applies to `platform`.
    ///
    /// Without `inherit` this is the platform's own assignment. With it,
    /// the most specific assignment on the platform's resolution path.
    pub fn get_baseline(&self, platform: &Platform, inherit: bool) -> Result<Option<&ContentRef>> {
        self.ensure_known(platform)?;
        if !inherit {
            return Ok(self.baselines.get(platform));
        }
        Ok(self
            .resolution_path(platform)?
            .iter()
            .find_map(|p| self.baselines.get(p)))
    }

    /// Resolved baselines for every chain head and the default platform.
    ///
    /// With `skip_missing`, heads resolving to nothing are left out.
    pub fn get_all_baselines(
        &self,
        inherit: bool,
        skip_missing: bool,
    ) -> Result<BTreeMap<Platform, Option<ContentRef>>> {
        let mut resolved = BTreeMap::new();
        for root in self.chains.keys() {
            let baseline = self.get_baseline(root, inherit)?.cloned();
            if baseline.is_none() && skip_missing {
                continue;
            }
            resolved.insert(root.clone(), baseline);
        }
        Ok(resolved)
    }

    /// Content digest of what every head and the default platform resolve
    /// to. Two graph states resolve identically exactly when these match.
    pub fn resolved_digests(&self) -> Result<BTreeMap<Platform, Option<Digest>>> {
        let mut digests = BTreeMap::new();
        for (root, baseline) in self.get_all_baselines(true, false)? {
            let digest = match baseline {
                Some(reference) => Some(self.comparator.digest_of(&reference)?),
                None => None,
            };
            digests.insert(root, digest);
        }
        Ok(digests)
    }
}
