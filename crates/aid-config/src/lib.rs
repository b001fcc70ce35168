pub mod error;
pub mod loader;
pub mod raw;
pub mod snapshot;

pub use error::ConfigError;
pub use loader::{load_config, AidConfig};
pub use snapshot::{load_snapshot, Snapshot};
