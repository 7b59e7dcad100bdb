//! OS-level key simulation
//!
//! The capture driver talks to a [`KeySimulator`]; the real backend sends
//! synthetic events through `enigo` and requires the `virtual-send` feature
//! plus the platform's input libraries. Without the feature a stub reports
//! the backend as unavailable.

use super::{MappedKey, Modifier, ModifierState};
use thiserror::Error;

/// Failure raised by a simulation backend
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("key simulation not available - build with --features virtual-send")]
    Unavailable,
    #[error("failed to initialise simulation backend: {0}")]
    Init(String),
    #[error("{action} failed for {key}: {reason}")]
    Input {
        action: &'static str,
        key: String,
        reason: String,
    },
    #[error("unsupported key on this platform: {0}")]
    Unsupported(String),
}

/// A key the simulator can press or release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimKey {
    Modifier(Modifier),
    Target(MappedKey),
}

/// Direction of one simulated key event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Press(SimKey),
    Release(SimKey),
}

/// Backend that injects key events into the focused surface
pub trait KeySimulator {
    fn press(&mut self, key: SimKey) -> Result<(), SimulationError>;
    fn release(&mut self, key: SimKey) -> Result<(), SimulationError>;

    fn apply(&mut self, action: KeyAction) -> Result<(), SimulationError> {
        match action {
            KeyAction::Press(key) => self.press(key),
            KeyAction::Release(key) => self.release(key),
        }
    }
}

/// Event order for a physical-style chord: modifiers down (Ctrl, Shift, Alt),
/// key down, key up, modifiers up in reverse order.
pub fn chord_sequence(modifiers: ModifierState, key: MappedKey) -> Vec<KeyAction> {
    let mods = modifiers.active();
    let mut actions = Vec::with_capacity(mods.len() * 2 + 2);

    actions.extend(mods.iter().map(|m| KeyAction::Press(SimKey::Modifier(*m))));
    actions.push(KeyAction::Press(SimKey::Target(key)));
    actions.push(KeyAction::Release(SimKey::Target(key)));
    actions.extend(mods.iter().rev().map(|m| KeyAction::Release(SimKey::Modifier(*m))));

    actions
}

/// Release every modifier, ignoring errors. Used after a failed chord so no
/// modifier stays logically held.
pub fn release_all_modifiers<S: KeySimulator + ?Sized>(simulator: &mut S) {
    for m in [Modifier::Alt, Modifier::Shift, Modifier::Ctrl] {
        let _ = simulator.release(SimKey::Modifier(m));
    }
}

/// System key simulator backed by enigo
#[cfg(feature = "virtual-send")]
pub struct SystemSimulator {
    enigo: enigo::Enigo,
}

#[cfg(feature = "virtual-send")]
impl SystemSimulator {
    pub fn new() -> Result<Self, SimulationError> {
        let enigo = enigo::Enigo::new(&enigo::Settings::default())
            .map_err(|e| SimulationError::Init(e.to_string()))?;
        Ok(Self { enigo })
    }

    fn to_enigo(key: SimKey) -> Result<enigo::Key, SimulationError> {
        use super::NamedKey;
        use enigo::Key;

        let mapped = match key {
            SimKey::Modifier(Modifier::Ctrl) => Key::Control,
            SimKey::Modifier(Modifier::Shift) => Key::Shift,
            SimKey::Modifier(Modifier::Alt) => Key::Alt,
            SimKey::Target(MappedKey::Char(c)) => Key::Unicode(c),
            SimKey::Target(MappedKey::Function(n)) => match n {
                1 => Key::F1,
                2 => Key::F2,
                3 => Key::F3,
                4 => Key::F4,
                5 => Key::F5,
                6 => Key::F6,
                7 => Key::F7,
                8 => Key::F8,
                9 => Key::F9,
                10 => Key::F10,
                11 => Key::F11,
                12 => Key::F12,
                other => return Err(SimulationError::Unsupported(format!("F{}", other))),
            },
            SimKey::Target(MappedKey::Named(named)) => match named {
                NamedKey::Space => Key::Space,
                NamedKey::Enter => Key::Return,
                NamedKey::Tab => Key::Tab,
                NamedKey::Backspace => Key::Backspace,
                NamedKey::Escape => Key::Escape,
                NamedKey::Up => Key::UpArrow,
                NamedKey::Down => Key::DownArrow,
                NamedKey::Left => Key::LeftArrow,
                NamedKey::Right => Key::RightArrow,
                NamedKey::Home => Key::Home,
                NamedKey::End => Key::End,
                NamedKey::PageUp => Key::PageUp,
                NamedKey::PageDown => Key::PageDown,
                NamedKey::Delete => Key::Delete,
                #[cfg(not(target_os = "macos"))]
                NamedKey::Insert => Key::Insert,
                #[cfg(target_os = "macos")]
                NamedKey::Insert => {
                    return Err(SimulationError::Unsupported("Insert".to_string()))
                }
            },
        };
        Ok(mapped)
    }

    fn send(
        &mut self,
        key: SimKey,
        direction: enigo::Direction,
        action: &'static str,
    ) -> Result<(), SimulationError> {
        use enigo::Keyboard;

        let mapped = Self::to_enigo(key)?;
        self.enigo
            .key(mapped, direction)
            .map_err(|e| SimulationError::Input {
                action,
                key: format!("{:?}", key),
                reason: e.to_string(),
            })
    }
}

#[cfg(feature = "virtual-send")]
impl KeySimulator for SystemSimulator {
    fn press(&mut self, key: SimKey) -> Result<(), SimulationError> {
        self.send(key, enigo::Direction::Press, "press")
    }

    fn release(&mut self, key: SimKey) -> Result<(), SimulationError> {
        self.send(key, enigo::Direction::Release, "release")
    }
}

/// Stub implementation when virtual-send feature is not enabled
#[cfg(not(feature = "virtual-send"))]
pub struct SystemSimulator;

#[cfg(not(feature = "virtual-send"))]
impl SystemSimulator {
    pub fn new() -> Result<Self, SimulationError> {
        Err(SimulationError::Unavailable)
    }
}

#[cfg(not(feature = "virtual-send"))]
impl KeySimulator for SystemSimulator {
    fn press(&mut self, _key: SimKey) -> Result<(), SimulationError> {
        Err(SimulationError::Unavailable)
    }

    fn release(&mut self, _key: SimKey) -> Result<(), SimulationError> {
        Err(SimulationError::Unavailable)
    }
}
