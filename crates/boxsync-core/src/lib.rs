pub mod config;
pub mod error;
pub mod logging;

pub mod checksum;
pub mod manifest;
pub mod reconcile;
pub mod scheduler;
pub mod sync;
pub mod transfer;

pub use error::{SyncError, SyncResult};
