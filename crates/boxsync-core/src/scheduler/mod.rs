//! Download orchestration.
//!
//! Every manifest entry becomes one unit of work: mark its path as touched,
//! validate the local copy, download when needed and re-validate. Units run
//! on blocking threads under a fixed-size permit pool; the run ends with a
//! barrier that waits for all of them.

mod outcome;
mod pool;
mod run;
mod touched;
mod unit;

pub use outcome::{ArtifactProgress, ArtifactReport, Outcome, RunReport};
pub use pool::{PermitGuard, PermitPool};
pub use run::Orchestrator;
pub use touched::TouchedSet;
