//! Orchestrators: full sweep and retry of missing combinations
//!
//! Both drive a [`Capture`] implementation over a list of combinations one at
//! a time. Per-combination failures are logged and tallied, never fatal.

mod full;
mod retry;

pub use full::full_sweep;
pub use retry::{RetryOutcome, RetryPlan};

use crate::capture::{Capture, CaptureRecord};
use crate::keyboard::Combination;
use crate::store::StoreSnapshot;
use crate::utils::describe_code;
use log::{info, warn};
use std::path::PathBuf;

/// Where an orchestrator writes its results
#[derive(Debug, Clone)]
pub struct OutputPaths {
    /// JSON store
    pub store: PathBuf,
    /// Optional human-readable companion
    pub text: Option<PathBuf>,
}

impl OutputPaths {
    pub fn new(store: impl Into<PathBuf>) -> Self {
        Self {
            store: store.into(),
            text: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<PathBuf>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// A combination that could not be captured
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureFailure {
    pub combination: Combination,
    pub reason: String,
}

/// Tally of one orchestrator run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub successful: usize,
    pub failures: Vec<CaptureFailure>,
}

impl RunSummary {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn describe(&self) -> String {
        format!(
            "{} successful, {} failed, {} total",
            self.successful,
            self.failed(),
            self.total
        )
    }
}

/// Result of a run that reached the store
#[derive(Debug, Clone)]
pub struct SweepReport {
    pub summary: RunSummary,
    pub snapshot: StoreSnapshot,
}

/// Capture each combination in order, collecting successes
pub fn run_captures<C: Capture + ?Sized>(
    capturer: &mut C,
    combinations: &[Combination],
) -> (Vec<CaptureRecord>, RunSummary) {
    let total = combinations.len();
    let mut records = Vec::with_capacity(total);
    let mut summary = RunSummary {
        total,
        ..RunSummary::default()
    };

    for (index, combination) in combinations.iter().enumerate() {
        let label = combination.label();
        match capturer.capture(combination) {
            Ok(record) => {
                info!(
                    "[{}/{}] {} ... ok vk={} ascii={} unicode={}",
                    index + 1,
                    total,
                    label,
                    record.vk,
                    describe_code(record.ascii),
                    describe_code(record.unicode),
                );
                summary.successful += 1;
                records.push(record);
            }
            Err(e) => {
                warn!("[{}/{}] {} ... FAILED: {}", index + 1, total, label, e);
                summary.failures.push(CaptureFailure {
                    combination: combination.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    info!("Capture finished: {}", summary.describe());
    (records, summary)
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::capture::{Capture, CaptureError, CaptureRecord, HelperOutput};
    use crate::keyboard::Combination;
    use std::time::Duration;

    /// Capturer that answers from a closure and remembers what it was asked
    pub struct ScriptedCapture<F> {
        pub answer: F,
        pub seen: Vec<Combination>,
    }

    impl<F: FnMut(&Combination) -> Option<u32>> ScriptedCapture<F> {
        pub fn new(answer: F) -> Self {
            Self {
                answer,
                seen: Vec::new(),
            }
        }
    }

    impl<F: FnMut(&Combination) -> Option<u32>> Capture for ScriptedCapture<F> {
        fn capture(&mut self, combination: &Combination) -> Result<CaptureRecord, CaptureError> {
            self.seen.push(combination.clone());
            match (self.answer)(combination) {
                Some(vk) => Ok(CaptureRecord::new(
                    combination,
                    HelperOutput {
                        vk,
                        ascii: None,
                        unicode: None,
                    },
                )),
                None => Err(CaptureError::Timeout(Duration::from_secs(3))),
            }
        }
    }
}
