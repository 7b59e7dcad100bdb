//! Modifier state and key/modifier combinations

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Modifier keys the capture pipeline can chord, in press order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Ctrl,
    Shift,
    Alt,
}

impl Modifier {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ctrl => "Ctrl",
            Self::Shift => "Shift",
            Self::Alt => "Alt",
        }
    }
}

/// Held modifier keys for one combination
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModifierState {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl ModifierState {
    pub const NONE: ModifierState = ModifierState::new(false, false, false);

    pub const fn new(ctrl: bool, shift: bool, alt: bool) -> Self {
        Self { ctrl, shift, alt }
    }

    pub fn is_empty(&self) -> bool {
        !(self.ctrl || self.shift || self.alt)
    }

    /// Active modifiers in the fixed Ctrl, Shift, Alt order
    pub fn active(&self) -> Vec<Modifier> {
        let mut mods = Vec::with_capacity(3);
        if self.ctrl {
            mods.push(Modifier::Ctrl);
        }
        if self.shift {
            mods.push(Modifier::Shift);
        }
        if self.alt {
            mods.push(Modifier::Alt);
        }
        mods
    }

    /// "Ctrl+Shift" style prefix without the trailing key
    pub fn label(&self) -> String {
        let names: Vec<&str> = self.active().iter().map(|m| m.name()).collect();
        if names.is_empty() {
            "No modifiers".to_string()
        } else {
            names.join("+")
        }
    }
}

/// One key together with the modifiers held while it is pressed.
///
/// Identity of the whole system: the result store never holds two records
/// for the same combination. Ordering is canonical: ctrl, shift, alt
/// (`false` before `true`), then key name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Combination {
    pub key: String,
    pub modifiers: ModifierState,
}

impl Combination {
    pub fn new(key: impl Into<String>, modifiers: ModifierState) -> Self {
        Self {
            key: key.into(),
            modifiers,
        }
    }

    /// Human-readable label, e.g. `Ctrl+Shift+A`
    pub fn label(&self) -> String {
        let mut parts: Vec<String> = self
            .modifiers
            .active()
            .iter()
            .map(|m| m.name().to_string())
            .collect();
        parts.push(display_key(&self.key));
        parts.join("+")
    }
}

impl Ord for Combination {
    fn cmp(&self, other: &Self) -> Ordering {
        self.modifiers
            .cmp(&other.modifiers)
            .then_with(|| self.key.cmp(&other.key))
    }
}

impl PartialOrd for Combination {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Display name for a key: `a` -> `A`, `f5` -> `F5`, `page_up` -> `PageUp`
pub fn display_key(key: &str) -> String {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => return c.to_uppercase().collect(),
        (None, _) => return String::new(),
        _ => {}
    }

    if let Some(num) = key.strip_prefix('f') {
        if !num.is_empty() && num.chars().all(|c| c.is_ascii_digit()) {
            return format!("F{}", num);
        }
    }

    key.split('_')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifier_state_field_order_matches_canonical_order() {
        // Derived Ord compares ctrl, then shift, then alt
        let none = ModifierState::NONE;
        let alt = ModifierState::new(false, false, true);
        let shift = ModifierState::new(false, true, false);
        let ctrl = ModifierState::new(true, false, false);
        assert!(none < alt);
        assert!(alt < shift);
        assert!(shift < ctrl);
    }

    #[test]
    fn active_modifiers_are_in_press_order() {
        let all = ModifierState::new(true, true, true);
        assert_eq!(all.active(), vec![Modifier::Ctrl, Modifier::Shift, Modifier::Alt]);
        assert!(ModifierState::NONE.active().is_empty());
    }

    #[test]
    fn combination_labels() {
        let combo = Combination::new("a", ModifierState::new(true, true, false));
        assert_eq!(combo.label(), "Ctrl+Shift+A");

        let combo = Combination::new("page_up", ModifierState::new(false, false, true));
        assert_eq!(combo.label(), "Alt+PageUp");

        let combo = Combination::new(";", ModifierState::NONE);
        assert_eq!(combo.label(), ";");
    }

    #[test]
    fn display_key_names() {
        assert_eq!(display_key("z"), "Z");
        assert_eq!(display_key("f12"), "F12");
        assert_eq!(display_key("space"), "Space");
        assert_eq!(display_key("page_down"), "PageDown");
        assert_eq!(display_key("backspace"), "Backspace");
    }

    #[test]
    fn combinations_sort_by_modifiers_then_key() {
        let mut combos = vec![
            Combination::new("b", ModifierState::new(true, false, false)),
            Combination::new("a", ModifierState::new(true, false, false)),
            Combination::new("z", ModifierState::NONE),
        ];
        combos.sort();
        assert_eq!(combos[0].key, "z");
        assert_eq!(combos[1].key, "a");
        assert_eq!(combos[2].key, "b");
    }

    #[test]
    fn modifier_state_label() {
        assert_eq!(ModifierState::NONE.label(), "No modifiers");
        assert_eq!(ModifierState::new(true, false, true).label(), "Ctrl+Alt");
    }
}
