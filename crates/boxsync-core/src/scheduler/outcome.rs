//! Per-box outcomes and the report of one orchestrator run.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use crate::transfer::TransferProgress;

/// Result of processing one manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Local file already matched; no network call was made.
    UpToDate,
    Downloaded,
    Failed(String),
}

impl Outcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::UpToDate => write!(f, "up-to-date"),
            Outcome::Downloaded => write!(f, "downloaded"),
            Outcome::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Report line for one box.
#[derive(Debug, Clone)]
pub struct ArtifactReport {
    pub id: u64,
    pub url: String,
    pub path: PathBuf,
    pub outcome: Outcome,
}

/// Progress event for one box, sent to the CLI while its transfer runs.
#[derive(Debug, Clone, Copy)]
pub struct ArtifactProgress {
    pub id: u64,
    pub progress: TransferProgress,
}

/// Everything one orchestrator run produced.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// One entry per processed box, in completion order.
    pub reports: Vec<ArtifactReport>,
    /// Paths protected from reconciliation; frozen once all units finished.
    pub touched: BTreeSet<PathBuf>,
    /// Highest number of boxes processed at the same time.
    pub peak_in_flight: usize,
}

impl RunReport {
    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.reports.iter().filter(|r| pred(&r.outcome)).count()
    }

    pub fn up_to_date(&self) -> usize {
        self.count(|o| *o == Outcome::UpToDate)
    }

    pub fn downloaded(&self) -> usize {
        self.count(|o| *o == Outcome::Downloaded)
    }

    pub fn failed(&self) -> usize {
        self.count(Outcome::is_failed)
    }

    pub fn has_failures(&self) -> bool {
        self.reports.iter().any(|r| r.outcome.is_failed())
    }

    pub fn failures(&self) -> impl Iterator<Item = &ArtifactReport> {
        self.reports.iter().filter(|r| r.outcome.is_failed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(id: u64, outcome: Outcome) -> ArtifactReport {
        ArtifactReport {
            id,
            url: format!("http://x/{}.box", id),
            path: PathBuf::from(format!("/b/{}", id)),
            outcome,
        }
    }

    #[test]
    fn run_report_counts() {
        let run = RunReport {
            reports: vec![
                report(1, Outcome::UpToDate),
                report(2, Outcome::Downloaded),
                report(3, Outcome::Failed("transfer error".into())),
                report(4, Outcome::Downloaded),
            ],
            ..Default::default()
        };
        assert_eq!(run.up_to_date(), 1);
        assert_eq!(run.downloaded(), 2);
        assert_eq!(run.failed(), 1);
        assert!(run.has_failures());
        assert_eq!(run.failures().map(|r| r.id).collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn outcome_display() {
        assert_eq!(Outcome::UpToDate.to_string(), "up-to-date");
        assert_eq!(
            Outcome::Failed("checksum mismatch".into()).to_string(),
            "failed: checksum mismatch"
        );
    }
}
