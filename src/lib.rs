//! Keyprobe - console key-combination capture utility
//!
//! Enumerates every key/modifier combination of a US layout, chords each one
//! into a helper process's console, records the virtual-key code, ASCII byte
//! and Unicode code point the console reports, and keeps the results in a
//! JSON store that can be retried and analysed.

pub mod capture;
pub mod config;
pub mod keyboard;
pub mod logging;
pub mod report;
pub mod store;
pub mod sweep;
pub mod utils;

pub use config::Config;
