//! Read-only reports over a saved store

mod gaps;
mod patterns;

pub use gaps::GapReport;
pub use patterns::{LetterCheck, Mismatch, PatternReport, PatternStats, VkGroup};
