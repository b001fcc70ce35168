use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use aid_domain::TenantId;

/// Per-tenant deletion ballots, shared across the universes of one
/// orchestrated pair and keyed by universe name.
///
/// A tenant becomes deletable only when every universe serving it has voted;
/// any dissent removes that universe's ballot immediately. A single coarse
/// lock serializes concurrent voters.
#[derive(Debug, Default)]
pub struct DeleteVotes {
    inner: Mutex<HashMap<TenantId, HashSet<String>>>,
}

impl DeleteVotes {
    pub fn new() -> Self {
        DeleteVotes::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<TenantId, HashSet<String>>> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Record `universe`'s vote to delete `tenant`. Voting twice is a no-op.
    pub fn vote(&self, tenant: &TenantId, universe: &str) {
        self.lock()
            .entry(tenant.clone())
            .or_default()
            .insert(universe.to_string());
    }

    /// Discard `universe`'s vote for `tenant`, if any.
    pub fn dissent(&self, tenant: &TenantId, universe: &str) {
        if let Some(votes) = self.lock().get_mut(tenant) {
            votes.remove(universe);
        }
    }

    pub fn votes_for(&self, tenant: &TenantId) -> HashSet<String> {
        self.lock().get(tenant).cloned().unwrap_or_default()
    }

    /// Tenants for which every universe in `required` has voted, sorted.
    pub fn unanimous(&self, required: &[&str]) -> Vec<TenantId> {
        let guard = self.lock();
        let mut out: Vec<TenantId> = guard
            .iter()
            .filter(|(_, votes)| required.iter().all(|name| votes.contains(*name)))
            .map(|(tenant, _)| tenant.clone())
            .collect();
        out.sort();
        out
    }

    /// Forget all ballots for `tenant`, e.g. after it was purged.
    pub fn clear(&self, tenant: &TenantId) {
        self.lock().remove(tenant);
    }

    pub fn snapshot(&self) -> HashMap<TenantId, HashSet<String>> {
        self.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voting_twice_leaves_a_single_ballot() {
        let votes = DeleteVotes::new();
        let t1 = TenantId::new("t1");
        votes.vote(&t1, "desired");
        votes.vote(&t1, "desired");
        assert_eq!(votes.votes_for(&t1).len(), 1);
    }

    #[test]
    fn dissent_discards_only_the_dissenting_universe() {
        let votes = DeleteVotes::new();
        let t1 = TenantId::new("t1");
        votes.vote(&t1, "desired");
        votes.vote(&t1, "observed");
        votes.dissent(&t1, "desired");
        assert_eq!(
            votes.votes_for(&t1),
            HashSet::from(["observed".to_string()])
        );
        // Dissenting without a prior vote is fine.
        votes.dissent(&TenantId::new("t2"), "desired");
    }

    #[test]
    fn unanimous_requires_every_listed_universe() {
        let votes = DeleteVotes::new();
        let t1 = TenantId::new("t1");
        let t2 = TenantId::new("t2");
        votes.vote(&t1, "desired");
        votes.vote(&t1, "observed");
        votes.vote(&t2, "desired");
        assert_eq!(votes.unanimous(&["desired", "observed"]), vec![t1.clone()]);

        votes.clear(&t1);
        assert!(votes.unanimous(&["desired", "observed"]).is_empty());
    }
}
