//! Key name to simulation-backend key mapping

use super::catalog::SYMBOLS;
use std::fmt;

/// Named keys the simulation backend exposes as symbolic constants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Space,
    Enter,
    Tab,
    Backspace,
    Escape,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Delete,
}

/// Backend representation of a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MappedKey {
    /// Symbolic special key
    Named(NamedKey),
    /// Function key `F1`..`F12`
    Function(u8),
    /// Character-producing key, identified by its unshifted character
    Char(char),
}

impl fmt::Display for MappedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(named) => write!(f, "{:?}", named),
            Self::Function(n) => write!(f, "F{}", n),
            Self::Char(c) => write!(f, "'{}'", c),
        }
    }
}

fn named_key(name: &str) -> Option<NamedKey> {
    let key = match name {
        "space" => NamedKey::Space,
        "enter" => NamedKey::Enter,
        "tab" => NamedKey::Tab,
        "backspace" => NamedKey::Backspace,
        "escape" => NamedKey::Escape,
        "up" => NamedKey::Up,
        "down" => NamedKey::Down,
        "left" => NamedKey::Left,
        "right" => NamedKey::Right,
        "home" => NamedKey::Home,
        "end" => NamedKey::End,
        "page_up" => NamedKey::PageUp,
        "page_down" => NamedKey::PageDown,
        "insert" => NamedKey::Insert,
        "delete" => NamedKey::Delete,
        _ => return None,
    };
    Some(key)
}

fn function_key(name: &str) -> Option<u8> {
    let digits = name.strip_prefix('f')?;
    if digits.is_empty() || digits.starts_with('0') || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let n: u8 = digits.parse().ok()?;
    (1..=12).contains(&n).then_some(n)
}

fn char_key(name: &str) -> Option<char> {
    let mut chars = name.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    if c.is_ascii_alphabetic() {
        Some(c.to_ascii_lowercase())
    } else if c.is_ascii_digit() || SYMBOLS.contains(&name) {
        Some(c)
    } else {
        None
    }
}

/// Translate a key name into the backend representation.
///
/// Returns `None` for names outside the three supported shapes (named
/// special keys, `f1`..`f12`, single letters/digits/listed symbols).
pub fn map_key(name: &str) -> Option<MappedKey> {
    if let Some(named) = named_key(name) {
        return Some(MappedKey::Named(named));
    }
    if let Some(n) = function_key(name) {
        return Some(MappedKey::Function(n));
    }
    char_key(name).map(MappedKey::Char)
}
