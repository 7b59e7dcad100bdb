//! Key catalog, combination space, key mapping and simulation

pub mod catalog;
mod combo;
pub mod keymap;
pub mod simulate;

pub use catalog::{all_keys, combination_space, full_space, MODIFIER_SETS};
pub use combo::{display_key, Combination, Modifier, ModifierState};
pub use keymap::{map_key, MappedKey, NamedKey};
pub use simulate::{
    chord_sequence, KeyAction, KeySimulator, SimKey, SimulationError, SystemSimulator,
};
