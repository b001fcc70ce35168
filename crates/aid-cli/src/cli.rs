use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "aid",
    about = "Detect and repair inconsistencies between a desired and an observed state snapshot",
    version
)]
pub struct Cli {
    /// Emit machine-readable JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Path to the agent config file. Defaults apply when absent.
    #[arg(long, env = "AID_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show per-tenant differences between two snapshots without applying.
    Diff {
        /// Snapshot of the desired (intent) state.
        #[arg(long)]
        desired: PathBuf,

        /// Snapshot of the observed (fabric) state.
        #[arg(long)]
        observed: PathBuf,
    },

    /// Reconcile the observed state toward the desired one, and pull
    /// operational state (faults) the other way, until both sides agree.
    Sync {
        /// Snapshot of the desired (intent) state.
        #[arg(long)]
        desired: PathBuf,

        /// Snapshot of the observed (fabric) state.
        #[arg(long)]
        observed: PathBuf,

        /// Upper bound on reconcile passes per direction.
        #[arg(long, default_value_t = 5)]
        max_passes: u32,
    },

    /// Dump per-tenant tree fingerprints of one snapshot.
    Tree {
        /// Snapshot file to summarize.
        snapshot: PathBuf,

        /// Restrict the dump to one tenant.
        #[arg(long)]
        tenant: Option<String>,

        /// Use the operational (fault) trees instead of the config trees.
        #[arg(long)]
        operational: bool,
    },
}
