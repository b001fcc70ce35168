use serde::Serialize;

/// Key delta of one tenant, one direction.
#[derive(Debug, Serialize)]
pub struct TenantDelta {
    pub tenant: String,
    pub create: Vec<String>,
    pub delete: Vec<String>,
}

/// What `aid diff` found: config deltas drive the observed side toward the
/// desired one; operational deltas pull fault state back.
#[derive(Debug, Default, Serialize)]
pub struct DiffReport {
    pub config: Vec<TenantDelta>,
    pub operational: Vec<TenantDelta>,
}

impl DiffReport {
    pub fn is_empty(&self) -> bool {
        self.config.is_empty() && self.operational.is_empty()
    }
}

#[derive(Debug, Serialize)]
pub struct SyncReport {
    pub passes: u32,
    pub in_sync: bool,
    pub purged_tenants: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TenantFingerprint {
    pub tenant: String,
    pub root_hash: Option<String>,
    pub dummy_root: bool,
}

#[derive(Debug, Default, Serialize)]
pub struct TreeReport {
    pub tenants: Vec<TenantFingerprint>,
}

fn render_deltas(out: &mut String, deltas: &[TenantDelta]) {
    for delta in deltas {
        out.push_str(&format!("  tenant {}\n", delta.tenant));
        for key in &delta.create {
            out.push_str(&format!("    + {}\n", key));
        }
        for key in &delta.delete {
            out.push_str(&format!("    - {}\n", key));
        }
    }
}

/// Render a diff report as human-readable text.
pub fn render_diff(report: &DiffReport) -> String {
    if report.is_empty() {
        return "In sync.\n".to_string();
    }
    let mut out = String::new();
    if !report.config.is_empty() {
        out.push_str("Config differences (desired -> observed):\n");
        render_deltas(&mut out, &report.config);
    }
    if !report.operational.is_empty() {
        out.push_str("Operational differences (observed -> desired):\n");
        render_deltas(&mut out, &report.operational);
    }
    out
}

pub fn render_sync(report: &SyncReport) -> String {
    let mut out = String::new();
    if report.in_sync {
        out.push_str(&format!("In sync after {} pass(es).\n", report.passes));
    } else {
        out.push_str(&format!(
            "Still diverged after {} pass(es); raise --max-passes or inspect the snapshots.\n",
            report.passes
        ));
    }
    for tenant in &report.purged_tenants {
        out.push_str(&format!("  purged tenant {}\n", tenant));
    }
    out
}

pub fn render_tree(report: &TreeReport) -> String {
    if report.tenants.is_empty() {
        return "No tenants.\n".to_string();
    }
    let mut out = String::new();
    for entry in &report.tenants {
        let hash = entry.root_hash.as_deref().unwrap_or("<empty>");
        if entry.dummy_root {
            out.push_str(&format!("{}  {} (dummy root)\n", hash, entry.tenant));
        } else {
            out.push_str(&format!("{}  {}\n", hash, entry.tenant));
        }
    }
    out
}
