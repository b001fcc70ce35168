use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use aid_config::{load_config, load_snapshot, AidConfig, Snapshot};
use aid_domain::TenantId;
use aid_reconciler::{
    DeleteVotes, DesiredOperationalUniverse, DesiredUniverse, Universe,
};
use aid_store::{InMemoryStore, IntentStore};

use crate::output::{
    self, DiffReport, SyncReport, TenantDelta, TenantFingerprint, TreeReport,
};

fn resolve_config(path: Option<PathBuf>) -> Result<AidConfig> {
    match path {
        Some(path) => {
            load_config(&path).with_context(|| format!("loading config {}", path.display()))
        }
        None => Ok(AidConfig::default()),
    }
}

/// Seed an in-memory intent store from a snapshot file.
async fn build_store(snapshot: &Snapshot) -> Result<Arc<InMemoryStore>> {
    let store = Arc::new(InMemoryStore::new());
    for resource in &snapshot.resources {
        store.create(resource, true).await?;
    }
    for (parent, fault) in &snapshot.faults {
        store.set_fault(parent, fault).await?;
    }
    Ok(store)
}

/// The worlds of one diff/sync run: two snapshot-backed stores with a config
/// and an operational universe over each.
struct Worlds {
    desired: DesiredUniverse,
    observed: DesiredUniverse,
    desired_op: DesiredOperationalUniverse,
    observed_op: DesiredOperationalUniverse,
    tenants: Vec<TenantId>,
}

async fn build_worlds(
    desired_path: &PathBuf,
    observed_path: &PathBuf,
    config: &AidConfig,
) -> Result<Worlds> {
    let desired_snapshot = load_snapshot(desired_path)
        .with_context(|| format!("loading snapshot {}", desired_path.display()))?;
    let observed_snapshot = load_snapshot(observed_path)
        .with_context(|| format!("loading snapshot {}", observed_path.display()))?;

    let desired_store = build_store(&desired_snapshot).await?;
    let observed_store = build_store(&observed_snapshot).await?;

    let tenants: Vec<TenantId> = desired_snapshot
        .tenants()
        .into_iter()
        .chain(observed_snapshot.tenants())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let worlds = Worlds {
        desired: DesiredUniverse::new("desired", desired_store.clone(), config),
        observed: DesiredUniverse::new("observed", observed_store.clone(), config),
        desired_op: DesiredOperationalUniverse::new(
            "desired-operational",
            desired_store.clone(),
            config,
        ),
        observed_op: DesiredOperationalUniverse::new(
            "observed-operational",
            observed_store.clone(),
            config,
        ),
        tenants,
    };
    worlds.desired.serve(&worlds.tenants);
    worlds.observed.serve(&worlds.tenants);
    worlds.desired_op.serve(&worlds.tenants);
    worlds.observed_op.serve(&worlds.tenants);
    Ok(worlds)
}

/// Per-tenant key deltas that would drive `mine` toward `other`, without
/// hydrating or pushing anything.
async fn collect_differences(
    mine: &dyn Universe,
    other: &dyn Universe,
) -> Result<Vec<TenantDelta>> {
    let my_state = mine.state().await?;
    let other_state = other.get_optimized_state(&my_state).await?;

    let mut tenants: Vec<&TenantId> = other_state
        .keys()
        .filter(|tenant| my_state.contains_key(*tenant))
        .collect();
    tenants.sort();

    let mut out = Vec::new();
    for tenant in tenants {
        let difference = other_state[tenant].diff(&my_state[tenant]);
        if difference.is_empty() {
            continue;
        }
        out.push(TenantDelta {
            tenant: tenant.to_string(),
            create: difference.add.iter().map(|k| k.to_string()).collect(),
            delete: difference.remove.iter().map(|k| k.to_string()).collect(),
        });
    }
    Ok(out)
}

fn emit<T: serde::Serialize>(json: bool, report: &T, text: String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{}", text);
    }
    Ok(())
}

// ── Commands ─────────────────────────────────────────────────────────────────

pub async fn diff(
    desired_path: PathBuf,
    observed_path: PathBuf,
    config_path: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let config = resolve_config(config_path)?;
    let worlds = build_worlds(&desired_path, &observed_path, &config).await?;

    let report = DiffReport {
        config: collect_differences(&worlds.observed, &worlds.desired).await?,
        operational: collect_differences(&worlds.desired_op, &worlds.observed_op).await?,
    };
    emit(json, &report, output::render_diff(&report))
}

pub async fn sync(
    desired_path: PathBuf,
    observed_path: PathBuf,
    max_passes: u32,
    config_path: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let config = resolve_config(config_path)?;
    let worlds = build_worlds(&desired_path, &observed_path, &config).await?;
    let votes = DeleteVotes::new();

    let mut passes = 0;
    let mut in_sync = false;
    while passes < max_passes {
        passes += 1;
        worlds.observed.observe().await?;
        worlds.desired_op.observe().await?;

        let config_changed = worlds.observed.reconcile(&worlds.desired, &votes).await?;
        let operational_changed = worlds
            .desired_op
            .reconcile(&worlds.observed_op, &votes)
            .await?;
        info!(pass = passes, config_changed, operational_changed, "reconcile pass finished");
        if !config_changed && !operational_changed {
            in_sync = true;
            break;
        }
    }

    // A tenant goes away only when every reconciling universe agreed.
    let voters = [worlds.observed.name(), worlds.desired_op.name()];
    let purged = votes.unanimous(&voters);
    for tenant in &purged {
        info!(tenant = %tenant, "all universes voted, purging tenant");
        worlds.desired.cleanup_state(tenant).await?;
        worlds.observed.cleanup_state(tenant).await?;
        votes.clear(tenant);
    }

    let report = SyncReport {
        passes,
        in_sync,
        purged_tenants: purged.iter().map(|t| t.to_string()).collect(),
    };
    emit(json, &report, output::render_sync(&report))
}

pub async fn tree(
    snapshot_path: PathBuf,
    tenant: Option<String>,
    operational: bool,
    json: bool,
) -> Result<()> {
    let snapshot = load_snapshot(&snapshot_path)
        .with_context(|| format!("loading snapshot {}", snapshot_path.display()))?;
    let store = build_store(&snapshot).await?;

    let tenants: Vec<TenantId> = snapshot
        .tenants()
        .into_iter()
        .filter(|t| tenant.as_deref().map_or(true, |want| t.as_str() == want))
        .collect();
    let request = tenants.iter().map(|t| (t.clone(), None)).collect();
    let view = store.find_changed(&request, operational).await?;

    let mut report = TreeReport::default();
    for tenant in tenants {
        let Some(tree) = view.get(&tenant) else {
            continue;
        };
        report.tenants.push(TenantFingerprint {
            tenant: tenant.to_string(),
            root_hash: tree.root_full_hash().map(str::to_string),
            dummy_root: tree.has_dummy_root(),
        });
    }
    emit(json, &report, output::render_tree(&report))
}
