//! Capture session driver
//!
//! One capture is a strict sequence against a fresh helper process:
//!
//! 1. launch the helper with its own console and piped output
//! 2. wait for its console to settle
//! 3. map the key (unmapped keys abort the session)
//! 4. bring the helper window to the foreground (best-effort)
//! 5. chord the combination
//! 6. wait, bounded, for the helper to exit; kill it on timeout
//! 7. parse the single line it printed
//!
//! Every path out of a session leaves the helper dead and reaped. Calls must
//! be serialised: keyboard and focus state are global to the OS.

use super::focus::{self, FocusFn, FocusOutcome};
use super::helper::HelperCommand;
use super::record::{CaptureRecord, HelperOutput, ParseFailure};
use crate::config::CaptureConfig;
use crate::keyboard::simulate::release_all_modifiers;
use crate::keyboard::{
    chord_sequence, map_key, Combination, KeyAction, KeySimulator, MappedKey, ModifierState,
    SimKey, SimulationError,
};
use log::{debug, warn};
use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::Duration;
use thiserror::Error;

/// Why a single combination was not captured
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("failed to launch helper: {0}")]
    Launch(#[source] io::Error),
    #[error("no simulation mapping for key {0:?}")]
    UnmappedKey(String),
    #[error("key simulation failed: {0}")]
    Simulation(#[from] SimulationError),
    #[error("helper did not exit within {0:?}")]
    Timeout(Duration),
    #[error("failed waiting for helper: {0}")]
    Wait(#[source] io::Error),
    #[error("helper produced no output")]
    EmptyOutput,
    #[error("malformed helper output: {0}")]
    MalformedOutput(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ParseFailure> for CaptureError {
    fn from(failure: ParseFailure) -> Self {
        match failure {
            ParseFailure::Empty => CaptureError::EmptyOutput,
            ParseFailure::Malformed(detail) => CaptureError::MalformedOutput(detail),
        }
    }
}

/// Something that can capture one combination
pub trait Capture {
    fn capture(&mut self, combination: &Combination) -> Result<CaptureRecord, CaptureError>;
}

/// Drives the helper process and key simulator for one combination at a time
pub struct CaptureDriver<S: KeySimulator> {
    helper: HelperCommand,
    simulator: S,
    config: CaptureConfig,
    focus: FocusFn,
}

impl<S: KeySimulator> CaptureDriver<S> {
    pub fn new(helper: HelperCommand, simulator: S, config: CaptureConfig) -> Self {
        Self {
            helper: helper.new_console(config.new_console),
            simulator,
            config,
            focus: focus::focus_process,
        }
    }

    /// Replace the platform focus routine
    pub fn with_focus(mut self, focus: FocusFn) -> Self {
        self.focus = focus;
        self
    }

    pub fn simulator(&self) -> &S {
        &self.simulator
    }

    fn run_session(&mut self, combination: &Combination) -> Result<CaptureRecord, CaptureError> {
        let label = combination.label();
        let grace = self.config.drain_grace();

        let mut session = self.helper.spawn().map_err(CaptureError::Launch)?;
        debug!("{}: helper pid {}", label, session.id());

        thread::sleep(self.config.settle());

        let Some(key) = map_key(&combination.key) else {
            session.kill();
            session.drain(grace);
            return Err(CaptureError::UnmappedKey(combination.key.clone()));
        };

        match (self.focus)(session.id()) {
            FocusOutcome::Focused => thread::sleep(self.config.focus_settle()),
            other => warn!("{}: focus not acquired ({}); continuing", label, other.as_str()),
        }

        if let Err(e) = self.chord(combination.modifiers, key) {
            release_all_modifiers(&mut self.simulator);
            session.kill();
            session.drain(grace);
            return Err(e.into());
        }

        let timeout = self.config.timeout();
        if session.wait_timeout(timeout).map_err(CaptureError::Wait)?.is_none() {
            session.kill();
            let partial = session.drain(grace);
            if !partial.stdout.is_empty() {
                debug!("{}: discarded partial output {:?}", label, partial.stdout);
            }
            return Err(CaptureError::Timeout(timeout));
        }

        let text = session.drain(grace);
        if !text.stderr.trim().is_empty() {
            debug!("{}: helper stderr: {}", label, text.stderr.trim());
        }

        let output = HelperOutput::parse(&text.stdout)?;
        Ok(CaptureRecord::new(combination, output))
    }

    fn chord(&mut self, modifiers: ModifierState, key: MappedKey) -> Result<(), SimulationError> {
        for action in chord_sequence(modifiers, key) {
            self.simulator.apply(action)?;
            let pause = match action {
                KeyAction::Press(SimKey::Target(_)) => self.config.key_hold(),
                _ => self.config.modifier_gap(),
            };
            thread::sleep(pause);
        }
        Ok(())
    }
}

impl<S: KeySimulator> Capture for CaptureDriver<S> {
    fn capture(&mut self, combination: &Combination) -> Result<CaptureRecord, CaptureError> {
        match panic::catch_unwind(AssertUnwindSafe(|| self.run_session(combination))) {
            Ok(result) => result,
            Err(payload) => {
                // The session guard has already killed the helper while unwinding
                release_all_modifiers(&mut self.simulator);
                Err(CaptureError::Internal(panic_message(payload.as_ref())))
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic during capture".to_string()
    }
}
