use tracing::{debug, info};

use aid_domain::TenantId;
use aid_tree::{HashTree, HashTreeView};

use crate::errors::ReconcileError;
use crate::universe::{ResourceBatch, Universe};
use crate::votes::DeleteVotes;

/// Knobs for one reconcile pass. The defaults fit regular universes;
/// operational overlays vote more aggressively.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconcileOptions {
    /// Treat empty-or-dummy local trees as deletable without consulting the
    /// peer.
    pub skip_dummy: bool,
    /// Vote every served tenant for deletion regardless of state.
    pub always_vote_deletion: bool,
}

/// Drive `mine` toward `other`.
///
/// Diffs the two universes tenant by tenant, votes on tenant deletion,
/// hydrates the accumulated key delta into full resources and pushes it
/// through `mine`. Returns false when both delta buckets came out empty, in
/// which case nothing is hydrated or pushed.
pub async fn reconcile_pass<U>(
    mine: &U,
    other: &dyn Universe,
    delete_votes: &DeleteVotes,
    options: ReconcileOptions,
) -> Result<bool, ReconcileError>
where
    U: Universe + ?Sized,
{
    let my_state = mine.state().await?;
    let other_state = other.get_optimized_state(&my_state).await?;

    let mut create_keys = Vec::new();
    let mut delete_keys = Vec::new();
    let mut shared: Vec<&TenantId> = other_state
        .keys()
        .filter(|tenant| my_state.contains_key(*tenant))
        .collect();
    shared.sort();
    for tenant in shared {
        let difference = other_state[tenant].diff(&my_state[tenant]);
        if !difference.is_empty() {
            debug!(
                tenant = %tenant,
                mine = mine.name(),
                other = other.name(),
                add = difference.add.len(),
                remove = difference.remove.len(),
                "universes differ for tenant"
            );
        }
        create_keys.extend(difference.add);
        delete_keys.extend(difference.remove);
    }

    vote_on_deletions(mine, &my_state, &other_state, delete_votes, options);

    if create_keys.is_empty() && delete_keys.is_empty() {
        debug!(mine = mine.name(), other = other.name(), "universes are in sync");
        return Ok(false);
    }

    // Hydrate after the full diff so store round-trips batch up.
    let batch = ResourceBatch {
        create: other.get_resources(&create_keys).await?,
        delete: mine.get_resources_for_delete(&delete_keys).await?,
    };
    debug!(
        mine = mine.name(),
        other = other.name(),
        creates = batch.create.len(),
        deletes = batch.delete.len(),
        "pushing resource delta"
    );
    mine.push_resources(batch).await?;
    Ok(true)
}

fn vote_on_deletions<U>(
    mine: &U,
    my_state: &HashTreeView,
    other_state: &HashTreeView,
    delete_votes: &DeleteVotes,
    options: ReconcileOptions,
) where
    U: Universe + ?Sized,
{
    let mut tenants: Vec<(&TenantId, &HashTree)> = my_state.iter().collect();
    tenants.sort_by_key(|(tenant, _)| *tenant);
    for (tenant, tree) in tenants {
        if options.always_vote_deletion
            || (options.skip_dummy && (tree.is_empty() || tree.has_dummy_root()))
        {
            if options.always_vote_deletion {
                debug!(universe = mine.name(), tenant = %tenant, "voting for tenant removal");
            } else {
                info!(universe = mine.name(), tenant = %tenant, "voting for tenant removal");
            }
            delete_votes.vote(tenant, mine.name());
            continue;
        }
        if tree.is_empty() {
            match other_state.get(tenant) {
                Some(theirs) if !theirs.is_empty() => {
                    // The peer still has data for this tenant: withdraw any
                    // earlier ballot of ours.
                    delete_votes.dissent(tenant, mine.name());
                }
                _ => {
                    info!(universe = mine.name(), tenant = %tenant, "voting for tenant removal");
                    delete_votes.vote(tenant, mine.name());
                }
            }
        }
    }
}
