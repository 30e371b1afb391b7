//! Selection engine.
//!
//! Filters a catalog snapshot through a `SelectionPolicy`, ranks the
//! survivors, and keeps the `target_count` best. Pure: no I/O, and the same
//! inputs always produce the same sequence.

use tracing::{debug, info};

use super::conservative::ConservativePolicy;
use super::SelectionPolicy;
use crate::types::{HoldingSet, LoanId, LoanListing};

pub struct SelectionEngine {
    policy: Box<dyn SelectionPolicy>,
}

impl Default for SelectionEngine {
    fn default() -> Self {
        Self::new(Box::new(ConservativePolicy::default()))
    }
}

impl SelectionEngine {
    pub fn new(policy: Box<dyn SelectionPolicy>) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &dyn SelectionPolicy {
        self.policy.as_ref()
    }

    /// Pick up to `target_count` eligible, unowned listings with the highest
    /// rank key.
    ///
    /// Survivors are stable-sorted ascending by rank key and the top
    /// `min(target_count, survivors)` are returned in that ascending order.
    /// Ties keep catalog order. Fewer survivors than requested is not an
    /// error.
    pub fn select(
        &self,
        catalog: &[LoanListing],
        owned: &HoldingSet,
        target_count: usize,
    ) -> Vec<LoanId> {
        if target_count == 0 || catalog.is_empty() {
            return Vec::new();
        }

        let mut survivors: Vec<&LoanListing> = Vec::with_capacity(catalog.len());
        for listing in catalog {
            match self.policy.evaluate(listing, owned) {
                Ok(()) => survivors.push(listing),
                Err(reason) => {
                    debug!(listing = %listing, reason = %reason, "Listing rejected");
                }
            }
        }

        // `sort_by_key` is stable.
        survivors.sort_by_key(|l| self.policy.rank_key(l));

        let keep = target_count.min(survivors.len());
        let selected: Vec<LoanId> = survivors[survivors.len() - keep..]
            .iter()
            .map(|l| l.id)
            .collect();

        info!(
            policy = self.policy.name(),
            catalog = catalog.len(),
            owned = owned.len(),
            eligible = survivors.len(),
            target = target_count,
            selected = selected.len(),
            "Selection complete"
        );

        selected
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
