//! Human-readable companion file, grouped by modifier set

use super::{sort_canonical, write_atomic, StoreError};
use crate::capture::CaptureRecord;
use crate::utils::describe_code;
use std::fmt::Write as _;
use std::path::Path;

/// Render records as aligned text, one group per modifier set
pub fn render_text(records: &[CaptureRecord]) -> String {
    let mut sorted = records.to_vec();
    sort_canonical(&mut sorted);

    let label_width = sorted.iter().map(|r| r.combo.len()).max().unwrap_or(0).max(5);

    let mut out = String::new();
    let _ = writeln!(out, "Console key capture - {} combinations", sorted.len());

    let mut current = None;
    for record in &sorted {
        if current != Some(record.modifiers) {
            current = Some(record.modifiers);
            let _ = writeln!(out);
            let _ = writeln!(out, "=== {} ===", record.modifiers.label());
        }
        let _ = writeln!(
            out,
            "  {:<label_width$}  vk={:<12} ascii={:<12} unicode={}",
            record.combo,
            describe_code(Some(record.vk_decimal)),
            describe_code(record.ascii),
            describe_code(record.unicode),
            label_width = label_width,
        );
    }

    out
}

/// Write the text rendering to `path`
pub fn write_text(path: &Path, records: &[CaptureRecord]) -> Result<(), StoreError> {
    write_atomic(path, render_text(records).as_bytes())
}
