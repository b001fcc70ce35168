pub mod desired;
pub mod errors;
pub mod ledger;
pub mod operational;
pub mod reconcile;
pub mod universe;
pub mod votes;

mod dispatch;
mod fatal;

pub use desired::DesiredUniverse;
pub use errors::{ErrorKind, ReconcileError};
pub use ledger::{FailureLedger, LedgerVerdict};
pub use operational::DesiredOperationalUniverse;
pub use reconcile::{reconcile_pass, ReconcileOptions};
pub use universe::{ResourceBatch, Universe, UniverseObject};
pub use votes::DeleteVotes;
