//! Retry: capture only what the store is missing and merge it back

use super::{run_captures, OutputPaths, SweepReport};
use crate::capture::{Capture, CaptureRecord};
use crate::keyboard::Combination;
use crate::store::{self, StoreError};
use log::info;
use std::collections::HashSet;
use std::path::Path;

/// How a retry ended
#[derive(Debug, Clone)]
pub enum RetryOutcome {
    /// Nothing was missing; the store was left untouched
    Complete,
    /// The confirmation gate said no; nothing was simulated
    Declined,
    /// Missing combinations were attempted and merged
    Ran(SweepReport),
}

/// Existing records and the combinations still to capture
#[derive(Debug, Clone)]
pub struct RetryPlan {
    existing: Vec<CaptureRecord>,
    missing: Vec<Combination>,
}

impl RetryPlan {
    /// Load the store at `path` (missing or corrupt means empty) and diff it
    /// against `space`
    pub fn prepare(path: &Path, space: &[Combination]) -> Self {
        Self::from_records(store::load(path), space)
    }

    pub fn from_records(existing: Vec<CaptureRecord>, space: &[Combination]) -> Self {
        let present: HashSet<Combination> =
            existing.iter().map(CaptureRecord::combination).collect();
        let missing = space
            .iter()
            .filter(|c| !present.contains(*c))
            .cloned()
            .collect();
        Self { existing, missing }
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn missing(&self) -> &[Combination] {
        &self.missing
    }

    pub fn existing(&self) -> &[CaptureRecord] {
        &self.existing
    }

    /// Ask `confirm`, then capture the missing combinations and merge them
    /// into the existing records (new captures win).
    pub fn execute<C, F>(
        self,
        capturer: &mut C,
        outputs: &OutputPaths,
        confirm: F,
    ) -> Result<RetryOutcome, StoreError>
    where
        C: Capture + ?Sized,
        F: FnOnce(&[Combination]) -> bool,
    {
        if self.is_complete() {
            info!("No missing combinations; store is complete");
            return Ok(RetryOutcome::Complete);
        }

        if !confirm(&self.missing) {
            info!("Retry declined; {} combinations left missing", self.missing.len());
            return Ok(RetryOutcome::Declined);
        }

        info!(
            "Retrying {} missing combinations ({} already stored)",
            self.missing.len(),
            self.existing.len()
        );

        let (records, summary) = run_captures(capturer, &self.missing);
        let merged = store::merge(self.existing, records);
        let snapshot = store::save(&outputs.store, merged)?;

        if let Some(text) = &outputs.text {
            store::write_text(text, &snapshot.combinations)?;
        }

        Ok(RetryOutcome::Ran(SweepReport { summary, snapshot }))
    }
}
