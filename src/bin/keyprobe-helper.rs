//! Console capture helper
//!
//! Reads raw input records from its own console until the first key-down of
//! a non-modifier key, prints `{"vk":..,"ascii":..,"unicode":..}` on one
//! stdout line and exits. Diagnostics go to stderr only.

use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    platform::run()
}

#[cfg(windows)]
mod platform {
    use keyprobe::capture::HelperOutput;
    use log::{debug, error};
    use std::io::{self, Write};
    use std::process::ExitCode;
    use windows::core::w;
    use windows::Win32::Foundation::{CloseHandle, GENERIC_READ, GENERIC_WRITE, HANDLE};
    use windows::Win32::Storage::FileSystem::{
        CreateFileW, FILE_FLAGS_AND_ATTRIBUTES, FILE_SHARE_READ, FILE_SHARE_WRITE, OPEN_EXISTING,
    };
    use windows::Win32::System::Console::{
        FlushConsoleInputBuffer, ReadConsoleInputW, SetConsoleMode, CONSOLE_MODE, INPUT_RECORD,
        KEY_EVENT, KEY_EVENT_RECORD,
    };

    /// Shift, Ctrl, Alt and their left/right variants
    const MODIFIER_VKS: &[u16] = &[0x10, 0x11, 0x12, 0xA0, 0xA1, 0xA2, 0xA3, 0xA4, 0xA5];

    fn output_for(key: &KEY_EVENT_RECORD) -> HelperOutput {
        let unit = unsafe { key.uChar.UnicodeChar };
        let unicode = (unit != 0).then_some(u32::from(unit));
        HelperOutput {
            vk: u32::from(key.wVirtualKeyCode),
            ascii: unicode.filter(|c| *c < 0x80),
            unicode,
        }
    }

    fn read_first_key(input: HANDLE) -> windows::core::Result<HelperOutput> {
        unsafe {
            // Raw mode: Ctrl chords arrive as key events, no line editing or echo
            SetConsoleMode(input, CONSOLE_MODE(0))?;
            FlushConsoleInputBuffer(input)?;
        }

        let mut records = [INPUT_RECORD::default(); 16];
        loop {
            let mut read = 0u32;
            unsafe { ReadConsoleInputW(input, &mut records, &mut read)? };

            for record in &records[..read as usize] {
                if u32::from(record.EventType) != KEY_EVENT {
                    continue;
                }
                let key = unsafe { record.Event.KeyEvent };
                if !key.bKeyDown.as_bool() {
                    continue;
                }
                if MODIFIER_VKS.contains(&key.wVirtualKeyCode) {
                    debug!("skipping modifier vk {:#04x}", key.wVirtualKeyCode);
                    continue;
                }
                return Ok(output_for(&key));
            }
        }
    }

    pub fn run() -> ExitCode {
        let input = unsafe {
            CreateFileW(
                w!("CONIN$"),
                GENERIC_READ.0 | GENERIC_WRITE.0,
                FILE_SHARE_READ | FILE_SHARE_WRITE,
                None,
                OPEN_EXISTING,
                FILE_FLAGS_AND_ATTRIBUTES(0),
                HANDLE::default(),
            )
        };
        let input = match input {
            Ok(handle) => handle,
            Err(e) => {
                error!("failed to open console input: {}", e);
                return ExitCode::FAILURE;
            }
        };

        let result = read_first_key(input);
        unsafe {
            let _ = CloseHandle(input);
        }

        let output = match result {
            Ok(output) => output,
            Err(e) => {
                error!("failed to read console input: {}", e);
                return ExitCode::FAILURE;
            }
        };

        let line = match serde_json::to_string(&output) {
            Ok(line) => line,
            Err(e) => {
                error!("failed to encode output: {}", e);
                return ExitCode::FAILURE;
            }
        };

        let mut stdout = io::stdout().lock();
        if writeln!(stdout, "{}", line).and_then(|_| stdout.flush()).is_err() {
            return ExitCode::FAILURE;
        }
        ExitCode::SUCCESS
    }
}

#[cfg(not(windows))]
mod platform {
    use log::error;
    use std::process::ExitCode;

    pub fn run() -> ExitCode {
        error!("keyprobe-helper reads Windows console input and is not supported on this platform");
        ExitCode::from(2)
    }
}
