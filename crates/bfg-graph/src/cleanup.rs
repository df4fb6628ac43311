//! Cleanup orchestration.
//!
//! A cleanup round runs the elimination and merge passes in a fixed
//! order:
//!
//! 1. `remove_overridden` drops assignments no chain selects
//! 2. `remove_redundant` drops assignments implied by their ancestors
//! 3. `merge_duplicates` hoists shared content onto common ancestors
//! 4. `remove_redundant` drops the descendants the merge made redundant
//! 5. `remove_overridden` drops merged assignments no chain ended up using
//!
//! Once step 4 has run no assignment may still be redundant: clearing a
//! redundant baseline never changes, by content, what any other platform
//! inherits, so one pass catches all of them. Step 5 can expose new
//! redundancy, which the next round picks up. Rounds repeat until one
//! leaves the assignments untouched, which makes a second cleanup of the
//! result a no-op.

use crate::error::{GraphError, Result};
use crate::graph::PlatformGraph;
use bfg_content::ContentStore;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

/// Configuration for [`PlatformGraph::cleanup_with`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupConfig {
    /// Rounds allowed before giving up on reaching a fixed point.
    pub max_rounds: usize,

    /// Whether to check, after each consolidating pass, that nothing is
    /// left redundant.
    pub verify_convergence: bool,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        CleanupConfig {
            max_rounds: 64,
            verify_convergence: true,
        }
    }
}

/// Outcome of a cleanup.
///
/// The pass tallies add up every round. `removed`, `added` and
/// `reassigned` compare the final assignments with those the cleanup
/// started from, so a merged assignment that a later pass drops again is
/// not counted as a removal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupReport {
    /// Rounds run, including the final one that changed nothing.
    pub rounds: usize,

    /// Assignments cleared by the leading `remove_overridden` pass.
    pub overridden_removed: usize,

    /// Assignments cleared by the first `remove_redundant` pass.
    pub redundant_removed: usize,

    /// Platforms assigned or reassigned by `merge_duplicates`.
    pub merged: usize,

    /// Assignments cleared by the `remove_redundant` pass after merging.
    pub consolidated: usize,

    /// Merged assignments swept because no chain selects them.
    pub unused_merges_removed: usize,

    /// Platforms assigned before the cleanup and unassigned after it.
    pub removed: usize,

    /// Platforms unassigned before the cleanup and assigned after it.
    pub added: usize,

    /// Platforms assigned before and after, to a different reference.
    pub reassigned: usize,
}

impl CleanupReport {
    /// Whether the cleanup changed any assignment.
    pub fn changed(&self) -> bool {
        self.removed + self.added + self.reassigned > 0
    }
}

impl<S: ContentStore> PlatformGraph<S> {
    /// Run cleanup with the default configuration.
    pub fn cleanup(&mut self) -> Result<CleanupReport> {
        self.cleanup_with(&CleanupConfig::default())
    }

    /// Run cleanup rounds until the assignments stop changing.
    ///
    /// Fails with `ConvergenceViolation` if the consolidating pass of a
    /// round leaves a redundant assignment behind (when
    /// `verify_convergence` is set), or if
    /// `max_rounds` rounds pass without reaching a fixed point. The graph
    /// is left in whatever state the failing round produced.
    pub fn cleanup_with(&mut self, config: &CleanupConfig) -> Result<CleanupReport> {
        let initial = self.baselines.clone();
        let mut report = CleanupReport::default();
        let max_rounds = config.max_rounds.max(1);
        let mut converged = false;

        while report.rounds < max_rounds {
            report.rounds += 1;
            let before = self.baselines.clone();

            let overridden = self.remove_overridden();
            let redundant = self.remove_redundant()?;
            let merged = self.merge_duplicates()?;
            let consolidated = self.remove_redundant()?;

            if config.verify_convergence {
                let leftover = self.redundant_platforms()?;
                if !leftover.is_empty() {
                    error!(round = report.rounds, leftover = ?leftover, "redundant baselines survived consolidation");
                    return Err(GraphError::ConvergenceViolation(format!(
                        "{} redundant baseline(s) left after merging in round {}: {:?}",
                        leftover.len(),
                        report.rounds,
                        leftover
                    )));
                }
            }

            let swept = self.remove_overridden();

            debug!(
                round = report.rounds,
                overridden, redundant, merged, consolidated, swept,
                "cleanup round finished"
            );

            report.overridden_removed += overridden;
            report.redundant_removed += redundant;
            report.merged += merged;
            report.consolidated += consolidated;
            report.unused_merges_removed += swept;

            if self.baselines == before {
                converged = true;
                break;
            }
        }

        if !converged {
            error!(rounds = report.rounds, "cleanup did not reach a fixed point");
            return Err(GraphError::ConvergenceViolation(format!(
                "assignments still changing after {} round(s)",
                report.rounds
            )));
        }

        for (platform, reference) in &initial {
            match self.baselines.get(platform) {
                None => report.removed += 1,
                Some(current) if current != reference => report.reassigned += 1,
                Some(_) => {}
            }
        }
        report.added = self
            .baselines
            .keys()
            .filter(|p| !initial.contains_key(*p))
            .count();

        info!(
            rounds = report.rounds,
            removed = report.removed,
            added = report.added,
            reassigned = report.reassigned,
            remaining = self.baselines.len(),
            "baseline cleanup complete"
        );

        Ok(report)
    }
}
