//! CLI command handlers. Each command is in its own file.

mod checksum;
mod completions;
mod sync;

pub use checksum::run_checksum;
pub use completions::run_completions;
pub use sync::run_sync_command;
