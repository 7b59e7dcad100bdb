//! Pattern report: logical regularities in captured console codes

use crate::capture::CaptureRecord;
use crate::keyboard::catalog::{ARROWS, EDITING, FUNCTION, LETTERS, NAVIGATION};
use crate::keyboard::ModifierState;
use crate::store::StoreSnapshot;
use crate::utils::describe_code;
use std::collections::BTreeMap;
use std::fmt::Write as _;

const CTRL_ONLY: ModifierState = ModifierState::new(true, false, false);
const SHIFT_ONLY: ModifierState = ModifierState::new(false, true, false);
const ALT_ONLY: ModifierState = ModifierState::new(false, false, true);

/// Aggregate counts over the whole store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternStats {
    pub records: usize,
    pub distinct_vk: usize,
    pub with_ascii: usize,
    pub with_unicode: usize,
    pub without_char: usize,
}

/// Combinations that share one virtual-key code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VkGroup {
    pub vk: u32,
    pub combos: Vec<String>,
}

/// A record whose ascii value differs from the expected one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub combo: String,
    pub expected: u32,
    pub actual: Option<u32>,
}

/// Outcome of checking one letter rule
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LetterCheck {
    pub checked: usize,
    pub matching: usize,
    pub mismatches: Vec<Mismatch>,
}

impl LetterCheck {
    fn observe(&mut self, record: &CaptureRecord, expected: u32) {
        self.checked += 1;
        if record.ascii == Some(expected) {
            self.matching += 1;
        } else {
            self.mismatches.push(Mismatch {
                combo: record.combo.clone(),
                expected,
                actual: record.ascii,
            });
        }
    }

    pub fn holds(&self) -> bool {
        self.checked > 0 && self.mismatches.is_empty()
    }
}

/// Everything the pattern analysis found
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternReport {
    pub stats: PatternStats,
    /// Sorted by vk code
    pub vk_groups: Vec<VkGroup>,
    /// Ctrl+Letter produces ASCII 1-26
    pub ctrl_letters: LetterCheck,
    /// Shift+Letter produces the upper-case letter
    pub shift_letters: LetterCheck,
    /// Alt-only combinations: (with a character, without)
    pub alt_with_char: usize,
    pub alt_without_char: usize,
    /// Function-key combinations that produced a character
    pub function_with_char: Vec<String>,
    pub function_total: usize,
    /// Unmodified special keys and their ascii value
    pub special_keys: Vec<(String, Option<u32>)>,
}

fn letter_offset(key: &str) -> Option<u32> {
    if !LETTERS.contains(&key) {
        return None;
    }
    key.bytes().next().map(|b| u32::from(b - b'a'))
}

impl PatternReport {
    pub fn build(snapshot: &StoreSnapshot) -> Self {
        Self::from_records(&snapshot.combinations)
    }

    pub fn from_records(records: &[CaptureRecord]) -> Self {
        let mut report = PatternReport::default();
        let mut by_vk: BTreeMap<u32, Vec<String>> = BTreeMap::new();

        for record in records {
            by_vk
                .entry(record.vk_decimal)
                .or_default()
                .push(record.combo.clone());

            report.stats.records += 1;
            if record.ascii.is_some() {
                report.stats.with_ascii += 1;
            }
            if record.unicode.is_some() {
                report.stats.with_unicode += 1;
            }
            if !record.produces_char() {
                report.stats.without_char += 1;
            }

            let key = record.key.as_str();

            if let Some(offset) = letter_offset(key) {
                if record.modifiers == CTRL_ONLY {
                    report.ctrl_letters.observe(record, offset + 1);
                } else if record.modifiers == SHIFT_ONLY {
                    report.shift_letters.observe(record, u32::from(b'A') + offset);
                }
            }

            if record.modifiers == ALT_ONLY {
                if record.produces_char() {
                    report.alt_with_char += 1;
                } else {
                    report.alt_without_char += 1;
                }
            }

            if FUNCTION.contains(&key) {
                report.function_total += 1;
                if record.ascii.is_some() {
                    report.function_with_char.push(record.combo.clone());
                }
            }

            let special =
                EDITING.contains(&key) || ARROWS.contains(&key) || NAVIGATION.contains(&key);
            if special && record.modifiers.is_empty() {
                report.special_keys.push((record.combo.clone(), record.ascii));
            }
        }

        report.stats.distinct_vk = by_vk.len();
        report.vk_groups = by_vk
            .into_iter()
            .map(|(vk, combos)| VkGroup { vk, combos })
            .collect();
        report.special_keys.sort();

        report
    }

    fn render_letter_check(out: &mut String, title: &str, check: &LetterCheck) {
        let _ = writeln!(out);
        let _ = writeln!(out, "--- {} ---", title);
        if check.checked == 0 {
            let _ = writeln!(out, "No data");
            return;
        }
        let verdict = if check.holds() { "holds" } else { "does not hold" };
        let _ = writeln!(
            out,
            "{}/{} match; pattern {}",
            check.matching, check.checked, verdict
        );
        for m in &check.mismatches {
            let _ = writeln!(
                out,
                "  {:<16} expected {:<12} got {}",
                m.combo,
                describe_code(Some(m.expected)),
                describe_code(m.actual)
            );
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== Capture pattern report ===");

        let _ = writeln!(out);
        let _ = writeln!(out, "--- Virtual-key codes ---");
        let _ = writeln!(out, "{:<12} {:>6}  Combinations", "VK", "Count");
        for group in &self.vk_groups {
            let preview: Vec<&str> = group.combos.iter().take(4).map(String::as_str).collect();
            let more = group.combos.len().saturating_sub(preview.len());
            let suffix = if more > 0 { format!(" (+{} more)", more) } else { String::new() };
            let _ = writeln!(
                out,
                "{:<12} {:>6}  {}{}",
                describe_code(Some(group.vk)),
                group.combos.len(),
                preview.join(", "),
                suffix
            );
        }

        Self::render_letter_check(&mut out, "Ctrl+Letter -> ASCII 1-26", &self.ctrl_letters);
        Self::render_letter_check(&mut out, "Shift+Letter -> upper case", &self.shift_letters);

        let _ = writeln!(out);
        let _ = writeln!(out, "--- Alt ---");
        let _ = writeln!(
            out,
            "Alt-only combinations: {} produce a character, {} produce none",
            self.alt_with_char, self.alt_without_char
        );

        let _ = writeln!(out);
        let _ = writeln!(out, "--- Function keys ---");
        if self.function_with_char.is_empty() {
            let _ = writeln!(out, "{} combinations, none produce a character", self.function_total);
        } else {
            let _ = writeln!(
                out,
                "{} combinations, {} produce a character: {}",
                self.function_total,
                self.function_with_char.len(),
                self.function_with_char.join(", ")
            );
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "--- Special keys (no modifiers) ---");
        for (combo, ascii) in &self.special_keys {
            let _ = writeln!(out, "  {:<12} ascii={}", combo, describe_code(*ascii));
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "--- Statistics ---");
        let _ = writeln!(out, "Records:            {}", self.stats.records);
        let _ = writeln!(out, "Distinct VK codes:  {}", self.stats.distinct_vk);
        let _ = writeln!(out, "With ASCII:         {}", self.stats.with_ascii);
        let _ = writeln!(out, "With Unicode:       {}", self.stats.with_unicode);
        let _ = writeln!(out, "No character:       {}", self.stats.without_char);

        out
    }
}
