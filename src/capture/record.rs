//! Helper output parsing and capture records

use crate::keyboard::{Combination, ModifierState};
use crate::utils::{CodePointHex, HexExt};
use serde::{Deserialize, Serialize};

/// One structured line emitted by the capture helper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelperOutput {
    /// Virtual-key code
    pub vk: u32,
    /// ASCII byte, absent when the key produces no character
    #[serde(default)]
    pub ascii: Option<u32>,
    /// Unicode code point
    #[serde(default)]
    pub unicode: Option<u32>,
}

/// Why helper output could not be used
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseFailure {
    Empty,
    Malformed(String),
}

impl HelperOutput {
    /// Parse drained helper stdout.
    ///
    /// Exactly one non-blank line is allowed, and it must be a JSON object
    /// with at least `vk`.
    pub fn parse(stdout: &str) -> Result<Self, ParseFailure> {
        let mut lines = stdout.lines().map(str::trim).filter(|l| !l.is_empty());
        let line = lines.next().ok_or(ParseFailure::Empty)?;

        let extra = lines.count();
        if extra > 0 {
            return Err(ParseFailure::Malformed(format!(
                "expected one line, got {} more after {:?}",
                extra, line
            )));
        }

        serde_json::from_str(line)
            .map_err(|e| ParseFailure::Malformed(format!("{}: {:?}", e, line)))
    }
}

/// A successfully captured combination, in its persisted shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRecord {
    pub key: String,
    pub modifiers: ModifierState,
    pub combo: String,
    /// Virtual-key code in hex
    pub vk: String,
    pub vk_decimal: u32,
    pub ascii: Option<u32>,
    pub ascii_hex: Option<String>,
    pub unicode: Option<u32>,
    pub unicode_hex: Option<String>,
}

impl CaptureRecord {
    pub fn new(combination: &Combination, output: HelperOutput) -> Self {
        Self {
            key: combination.key.clone(),
            modifiers: combination.modifiers,
            combo: combination.label(),
            vk: output.vk.to_hex(),
            vk_decimal: output.vk,
            ascii: output.ascii,
            ascii_hex: output.ascii.to_hex(),
            unicode: output.unicode,
            unicode_hex: output.unicode.map(|u| u.to_code_point_hex()),
        }
    }

    pub fn combination(&self) -> Combination {
        Combination::new(self.key.clone(), self.modifiers)
    }

    /// Whether the key produced any character
    pub fn produces_char(&self) -> bool {
        self.ascii.is_some() || self.unicode.is_some()
    }
}
