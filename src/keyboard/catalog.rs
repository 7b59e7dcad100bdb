//! Fixed US-layout key catalog and the combination space built from it

use super::{Combination, ModifierState};
use std::collections::BTreeSet;

/// Letter keys
pub const LETTERS: &[&str] = &[
    "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m", "n", "o", "p", "q", "r",
    "s", "t", "u", "v", "w", "x", "y", "z",
];

/// Digit row
pub const DIGITS: &[&str] = &["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"];

/// Punctuation keys of the US layout
pub const SYMBOLS: &[&str] = &["`", "-", "=", "[", "]", "\\", ";", "'", ",", ".", "/"];

/// Editing and whitespace keys
pub const EDITING: &[&str] = &["space", "enter", "tab", "backspace", "escape"];

/// Arrow keys
pub const ARROWS: &[&str] = &["up", "down", "left", "right"];

/// Function keys
pub const FUNCTION: &[&str] = &[
    "f1", "f2", "f3", "f4", "f5", "f6", "f7", "f8", "f9", "f10", "f11", "f12",
];

/// Navigation cluster
pub const NAVIGATION: &[&str] = &["home", "end", "page_up", "page_down", "insert", "delete"];

/// All eight modifier states, none first
pub const MODIFIER_SETS: [ModifierState; 8] = [
    ModifierState::new(false, false, false),
    ModifierState::new(true, false, false),
    ModifierState::new(false, true, false),
    ModifierState::new(false, false, true),
    ModifierState::new(true, true, false),
    ModifierState::new(true, false, true),
    ModifierState::new(false, true, true),
    ModifierState::new(true, true, true),
];

/// The complete key catalog, grouped as above
pub fn all_keys() -> Vec<&'static str> {
    [LETTERS, DIGITS, SYMBOLS, EDITING, ARROWS, FUNCTION, NAVIGATION]
        .iter()
        .flat_map(|group| group.iter().copied())
        .collect()
}

/// Cartesian product of `keys` and `modifiers`, in canonical order.
///
/// Duplicate inputs collapse, so each (key, modifiers) pair appears once.
pub fn combination_space(keys: &[&str], modifiers: &[ModifierState]) -> Vec<Combination> {
    let space: BTreeSet<Combination> = modifiers
        .iter()
        .flat_map(|mods| keys.iter().map(move |key| Combination::new(*key, *mods)))
        .collect();
    space.into_iter().collect()
}

/// Combination space of the full catalog
pub fn full_space() -> Vec<Combination> {
    combination_space(&all_keys(), &MODIFIER_SETS)
}
