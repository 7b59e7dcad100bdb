//! Integration tests for Keyprobe
//!
//! These tests drive the real capture driver against a stub helper process:
//! a shell loop that waits for a trigger file and prints its contents. The
//! file-trigger simulator writes that file when the chorded key is released,
//! so the helper only "sees" the combination after the full chord.

#![cfg(unix)]

use keyprobe::capture::{focus, Capture, CaptureDriver, CaptureError, HelperCommand};
use keyprobe::config::CaptureConfig;
use keyprobe::keyboard::{
    combination_space, Combination, KeySimulator, MappedKey, Modifier, ModifierState, SimKey,
    SimulationError, MODIFIER_SETS,
};
use keyprobe::report::GapReport;
use keyprobe::store;
use keyprobe::sweep::{full_sweep, OutputPaths, RetryOutcome, RetryPlan};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Waits for `$0/out`, prints it and removes it
const TRIGGER_SCRIPT: &str =
    r#"while [ ! -f "$0/out" ]; do sleep 0.01; done; cat "$0/out"; rm -f "$0/out""#;

/// Records its pid and never exits on its own
const HANGING_SCRIPT: &str = r#"echo $$ > "$0/pid"; exec sleep 30"#;

fn stub_helper(script: &str, dir: &Path) -> HelperCommand {
    HelperCommand::new("/bin/sh").args([
        "-c".to_string(),
        script.to_string(),
        dir.to_string_lossy().into_owned(),
    ])
}

fn fast_config(timeout_ms: u64) -> CaptureConfig {
    CaptureConfig {
        settle_ms: 20,
        timeout_ms,
        modifier_gap_ms: 1,
        key_hold_ms: 1,
        focus_settle_ms: 0,
        drain_grace_ms: 500,
        new_console: false,
    }
}

/// Canned helper answer for a combination; `None` means the helper hangs
type Responder = fn(&Combination) -> Option<u32>;

/// Tracks held modifiers and answers through the trigger file on key release
struct FileTriggerSimulator {
    dir: PathBuf,
    held: ModifierState,
    respond: Responder,
    chords: usize,
}

impl FileTriggerSimulator {
    fn new(dir: &Path, respond: Responder) -> Self {
        Self {
            dir: dir.to_path_buf(),
            held: ModifierState::NONE,
            respond,
            chords: 0,
        }
    }

    fn set_modifier(&mut self, modifier: Modifier, down: bool) {
        match modifier {
            Modifier::Ctrl => self.held.ctrl = down,
            Modifier::Shift => self.held.shift = down,
            Modifier::Alt => self.held.alt = down,
        }
    }

    fn trigger(&mut self, key: MappedKey) -> Result<(), SimulationError> {
        let name = match key {
            MappedKey::Char(c) => c.to_string(),
            other => return Err(SimulationError::Unsupported(other.to_string())),
        };
        self.chords += 1;

        let Some(vk) = (self.respond)(&Combination::new(name, self.held)) else {
            return Ok(());
        };
        let tmp = self.dir.join("out.tmp");
        fs::write(&tmp, format!("{{\"vk\": {}}}\n", vk)).unwrap();
        fs::rename(&tmp, self.dir.join("out")).unwrap();
        Ok(())
    }
}

impl KeySimulator for FileTriggerSimulator {
    fn press(&mut self, key: SimKey) -> Result<(), SimulationError> {
        if let SimKey::Modifier(m) = key {
            self.set_modifier(m, true);
        }
        Ok(())
    }

    fn release(&mut self, key: SimKey) -> Result<(), SimulationError> {
        match key {
            SimKey::Modifier(m) => {
                self.set_modifier(m, false);
                Ok(())
            }
            SimKey::Target(k) => self.trigger(k),
        }
    }
}

fn letter_vk(combination: &Combination) -> Option<u32> {
    match combination.key.as_str() {
        "a" => Some(65),
        "b" => Some(66),
        _ => None,
    }
}

fn letter_vk_except_ctrl_a(combination: &Combination) -> Option<u32> {
    if combination.key == "a" && combination.modifiers == ModifierState::new(true, false, false) {
        return None;
    }
    letter_vk(combination)
}

fn stub_driver(
    dir: &Path,
    respond: Responder,
    timeout_ms: u64,
) -> CaptureDriver<FileTriggerSimulator> {
    CaptureDriver::new(
        stub_helper(TRIGGER_SCRIPT, dir),
        FileTriggerSimulator::new(dir, respond),
        fast_config(timeout_ms),
    )
    .with_focus(focus::assume_focused)
}

fn two_key_space() -> Vec<Combination> {
    combination_space(&["a", "b"], &MODIFIER_SETS)
}

// ---------------------------------------------------------------------------
// Single captures
// ---------------------------------------------------------------------------

#[test]
fn driver_captures_one_combination() {
    let dir = tempfile::tempdir().unwrap();
    let mut driver = stub_driver(dir.path(), letter_vk, 2000);

    let combination = Combination::new("b", ModifierState::new(false, true, true));
    let record = driver.capture(&combination).unwrap();

    assert_eq!(record.key, "b");
    assert_eq!(record.modifiers, ModifierState::new(false, true, true));
    assert_eq!(record.combo, "Shift+Alt+B");
    assert_eq!(record.vk, "0x42");
    assert_eq!(record.vk_decimal, 66);
    assert_eq!(record.ascii, None);
    assert_eq!(record.unicode, None);
    assert_eq!(driver.simulator().chords, 1);
}

#[test]
fn driver_times_out_and_leaves_no_process() {
    let dir = tempfile::tempdir().unwrap();
    let mut driver = CaptureDriver::new(
        stub_helper(HANGING_SCRIPT, dir.path()),
        FileTriggerSimulator::new(dir.path(), letter_vk),
        fast_config(300),
    )
    .with_focus(focus::assume_focused);

    let start = Instant::now();
    let err = driver
        .capture(&Combination::new("a", ModifierState::NONE))
        .unwrap_err();
    let elapsed = start.elapsed();

    assert!(matches!(err, CaptureError::Timeout(t) if t == Duration::from_millis(300)));
    assert!(elapsed >= Duration::from_millis(300));
    assert!(elapsed < Duration::from_secs(3), "took {:?}", elapsed);

    let pid = fs::read_to_string(dir.path().join("pid")).unwrap();
    let alive = Command::new("kill")
        .args(["-0", pid.trim()])
        .status()
        .unwrap()
        .success();
    assert!(!alive, "helper pid {} still running", pid.trim());
}

#[test]
fn garbage_helper_output_is_a_failure() {
    let dir = tempfile::tempdir().unwrap();
    let mut driver = CaptureDriver::new(
        HelperCommand::new("/bin/sh").args(["-c", "echo not-json"]),
        FileTriggerSimulator::new(dir.path(), letter_vk),
        fast_config(2000),
    )
    .with_focus(focus::assume_focused);

    let err = driver
        .capture(&Combination::new("a", ModifierState::NONE))
        .unwrap_err();
    assert!(matches!(err, CaptureError::MalformedOutput(_)));
}

// ---------------------------------------------------------------------------
// Sweeps
// ---------------------------------------------------------------------------

#[test]
fn full_sweep_of_two_keys_fills_store() {
    let dir = tempfile::tempdir().unwrap();
    let outputs = OutputPaths::new(dir.path().join("capture.json"))
        .with_text(dir.path().join("capture.txt"));
    let mut driver = stub_driver(dir.path(), letter_vk, 2000);

    let report = full_sweep(&mut driver, &two_key_space(), &outputs).unwrap();

    assert_eq!(report.summary.successful, 16);
    assert_eq!(report.summary.failed(), 0);

    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&outputs.store).unwrap()).unwrap();
    assert_eq!(raw["total_combinations"], 16);
    assert!(raw["generated_at"].is_string());
    let combos = raw["combinations"].as_array().unwrap();
    assert_eq!(combos.len(), 16);
    for combo in combos {
        assert!(combo["ascii"].is_null());
        assert!(combo["unicode"].is_null());
        let expected = if combo["key"] == "a" { 65 } else { 66 };
        assert_eq!(combo["vk_decimal"], expected);
    }

    let text = fs::read_to_string(dir.path().join("capture.txt")).unwrap();
    assert!(text.contains("=== Ctrl+Shift+Alt ==="));
}

#[test]
fn retry_recaptures_only_missing_combinations() {
    let dir = tempfile::tempdir().unwrap();
    let outputs = OutputPaths::new(dir.path().join("capture.json"));
    let space = two_key_space();
    let mut driver = stub_driver(dir.path(), letter_vk, 2000);

    full_sweep(&mut driver, &space, &outputs).unwrap();

    let removed = [
        Combination::new("a", ModifierState::new(false, true, false)),
        Combination::new("b", ModifierState::new(true, false, true)),
    ];
    let kept: Vec<_> = store::load(&outputs.store)
        .into_iter()
        .filter(|r| !removed.contains(&r.combination()))
        .collect();
    store::save(&outputs.store, kept).unwrap();

    let plan = RetryPlan::prepare(&outputs.store, &space);
    let mut expected_missing = removed.to_vec();
    expected_missing.sort();
    assert_eq!(plan.missing(), expected_missing.as_slice());

    let chords_before = driver.simulator().chords;
    let outcome = plan
        .execute(&mut driver, &outputs, |missing| missing.len() == 2)
        .unwrap();

    let RetryOutcome::Ran(report) = outcome else {
        panic!("retry did not run: {:?}", outcome);
    };
    assert_eq!(report.summary.successful, 2);
    assert_eq!(driver.simulator().chords - chords_before, 2);

    let snapshot = store::load_snapshot(&outputs.store).unwrap();
    assert_eq!(snapshot.total_combinations, 16);
    assert_eq!(snapshot.keys().len(), 16);

    let again = RetryPlan::prepare(&outputs.store, &space);
    assert!(again.is_complete());
}

#[test]
fn declined_retry_simulates_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let outputs = OutputPaths::new(dir.path().join("capture.json"));
    let mut driver = stub_driver(dir.path(), letter_vk, 2000);

    let plan = RetryPlan::prepare(&outputs.store, &two_key_space());
    assert_eq!(plan.missing().len(), 16);

    let outcome = plan.execute(&mut driver, &outputs, |_| false).unwrap();

    assert!(matches!(outcome, RetryOutcome::Declined));
    assert_eq!(driver.simulator().chords, 0);
    assert!(!outputs.store.exists());
}

#[test]
fn timed_out_combination_shows_up_as_gap() {
    let dir = tempfile::tempdir().unwrap();
    let outputs = OutputPaths::new(dir.path().join("capture.json"));
    let space = two_key_space();
    let mut driver = stub_driver(dir.path(), letter_vk_except_ctrl_a, 500);

    let report = full_sweep(&mut driver, &space, &outputs).unwrap();

    assert_eq!(report.summary.successful, 15);
    assert_eq!(report.summary.failed(), 1);
    let ctrl_a = Combination::new("a", ModifierState::new(true, false, false));
    assert_eq!(report.summary.failures[0].combination, ctrl_a);

    let snapshot = store::load_snapshot(&outputs.store).unwrap();
    let gaps = GapReport::build(&snapshot, &space);
    assert_eq!(gaps.missing_count(), 1);
    assert_eq!(gaps.missing.len(), 1);
    assert_eq!(gaps.missing["a"], vec![ctrl_a]);
    assert!(gaps.render(5).contains("Ctrl+A"));
}
