//! Capture pipeline: helper process, focus, output parsing and the driver

pub mod driver;
pub mod focus;
pub mod helper;
pub mod record;

pub use driver::{Capture, CaptureDriver, CaptureError};
pub use focus::FocusOutcome;
pub use helper::{locate_helper, HelperCommand, HelperNotFound, HelperSession};
pub use record::{CaptureRecord, HelperOutput};
