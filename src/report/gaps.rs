//! Gap report: which combinations the store is still missing

use crate::keyboard::{display_key, Combination};
use crate::store::StoreSnapshot;
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Missing combinations of a store, grouped by key
#[derive(Debug, Clone, PartialEq)]
pub struct GapReport {
    /// Size of the expected combination space
    pub expected: usize,
    /// Expected combinations present in the store
    pub captured: usize,
    /// Missing combinations per key name, canonical order within each key
    pub missing: BTreeMap<String, Vec<Combination>>,
}

impl GapReport {
    pub fn build(snapshot: &StoreSnapshot, space: &[Combination]) -> Self {
        let present = snapshot.keys();
        let mut missing: BTreeMap<String, Vec<Combination>> = BTreeMap::new();
        let mut captured = 0;

        for combination in space {
            if present.contains(combination) {
                captured += 1;
            } else {
                missing
                    .entry(combination.key.clone())
                    .or_default()
                    .push(combination.clone());
            }
        }

        for combos in missing.values_mut() {
            combos.sort();
        }

        Self {
            expected: space.len(),
            captured,
            missing,
        }
    }

    pub fn missing_count(&self) -> usize {
        self.missing.values().map(Vec::len).sum()
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// Percentage of the space that has been captured
    pub fn coverage(&self) -> f64 {
        if self.expected == 0 {
            return 100.0;
        }
        self.captured as f64 / self.expected as f64 * 100.0
    }

    /// Keys with the most missing combinations, ties broken by key name
    pub fn most_problematic(&self, limit: usize) -> Vec<(&str, usize)> {
        let mut ranked: Vec<(&str, usize)> = self
            .missing
            .iter()
            .map(|(key, combos)| (key.as_str(), combos.len()))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(limit);
        ranked
    }

    pub fn render(&self, top: usize) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== Capture gap report ===");
        let _ = writeln!(out, "Expected combinations: {}", self.expected);
        let _ = writeln!(out, "Captured:              {}", self.captured);
        let _ = writeln!(out, "Missing:               {}", self.missing_count());
        let _ = writeln!(out, "Coverage:              {:.1}%", self.coverage());

        if self.is_complete() {
            let _ = writeln!(out);
            let _ = writeln!(out, "All combinations captured.");
            return out;
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "--- Missing by key ---");
        for (key, combos) in &self.missing {
            let labels: Vec<String> = combos.iter().map(Combination::label).collect();
            let _ = writeln!(
                out,
                "{} ({} missing): {}",
                display_key(key),
                combos.len(),
                labels.join(", ")
            );
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "--- Most problematic keys ---");
        for (rank, (key, count)) in self.most_problematic(top).iter().enumerate() {
            let _ = writeln!(out, "{:>3}. {:<12} {} missing", rank + 1, display_key(key), count);
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{CaptureRecord, HelperOutput};
    use crate::keyboard::{combination_space, ModifierState, MODIFIER_SETS};

    fn snapshot_of(combos: &[Combination]) -> StoreSnapshot {
        StoreSnapshot::new(
            combos
                .iter()
                .map(|c| {
                    CaptureRecord::new(
                        c,
                        HelperOutput {
                            vk: 1,
                            ascii: None,
                            unicode: None,
                        },
                    )
                })
                .collect(),
        )
    }

    #[test]
    fn complete_store_has_no_gaps() {
        let space = combination_space(&["a", "b"], &MODIFIER_SETS);
        let report = GapReport::build(&snapshot_of(&space), &space);
        assert!(report.is_complete());
        assert_eq!(report.captured, 16);
        assert_eq!(report.coverage(), 100.0);
        assert!(report.render(5).contains("All combinations captured."));
    }

    #[test]
    fn gaps_group_by_key() {
        let space = combination_space(&["a", "b", "c"], &MODIFIER_SETS);
        let present: Vec<_> = space
            .iter()
            .filter(|c| {
                !(c.key == "a" && c.modifiers.ctrl)
                    && !(c.key == "c" && c.modifiers.alt && c.modifiers.shift)
            })
            .cloned()
            .collect();

        let report = GapReport::build(&snapshot_of(&present), &space);
        assert_eq!(report.missing_count(), 6);
        assert_eq!(report.missing["a"].len(), 4);
        assert_eq!(report.missing["c"].len(), 2);
        assert!(!report.missing.contains_key("b"));
        assert_eq!(report.captured, 18);
        assert_eq!(report.most_problematic(1), vec![("a", 4)]);
    }

    #[test]
    fn ranking_breaks_ties_by_key() {
        let space = combination_space(&["x", "y"], &[ModifierState::NONE]);
        let report = GapReport::build(&snapshot_of(&[]), &space);
        assert_eq!(report.most_problematic(10), vec![("x", 1), ("y", 1)]);
    }

    #[test]
    fn records_outside_space_are_ignored() {
        let space = combination_space(&["a"], &[ModifierState::NONE]);
        let extra = vec![Combination::new("q", ModifierState::NONE)];
        let report = GapReport::build(&snapshot_of(&extra), &space);
        assert_eq!(report.captured, 0);
        assert_eq!(report.missing_count(), 1);
    }

    #[test]
    fn render_lists_missing_labels() {
        let space = combination_space(&["a"], &MODIFIER_SETS[..2]);
        let report = GapReport::build(&snapshot_of(&space[..1]), &space);
        let text = report.render(3);
        assert!(text.contains("A (1 missing): Ctrl+A"));
        assert!(text.contains("Coverage:              50.0%"));
        assert!(text.contains("  1. A"));
    }
}
