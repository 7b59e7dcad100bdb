//! Full sweep: capture the whole space and overwrite the store

use super::{run_captures, OutputPaths, SweepReport};
use crate::capture::Capture;
use crate::keyboard::Combination;
use crate::store::{self, StoreError};
use log::info;

/// Capture every combination in `space` and write a brand-new store.
///
/// Nothing is persisted until the whole space has been attempted, and any
/// previous store at the output path is replaced rather than merged.
pub fn full_sweep<C: Capture + ?Sized>(
    capturer: &mut C,
    space: &[Combination],
    outputs: &OutputPaths,
) -> Result<SweepReport, StoreError> {
    info!("Full sweep of {} combinations", space.len());

    let (records, summary) = run_captures(capturer, space);
    let snapshot = store::save(&outputs.store, records)?;

    if let Some(text) = &outputs.text {
        store::write_text(text, &snapshot.combinations)?;
    }

    Ok(SweepReport { summary, snapshot })
}
