//! Foreground focus for the helper's console window
//!
//! Simulated key events go to whichever window has focus, so the driver
//! brings the helper's window forward before chording. This is best-effort:
//! callers log anything other than [`FocusOutcome::Focused`] and continue.

/// Result of a focus attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusOutcome {
    /// Window found and brought to the foreground
    Focused,
    /// Window found but the OS refused the foreground change
    Refused,
    /// No visible window owned by the process
    NotFound,
    /// Focus control not implemented on this platform
    Unsupported,
}

impl FocusOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Focused => "focused",
            Self::Refused => "foreground change refused",
            Self::NotFound => "no window found for helper process",
            Self::Unsupported => "focus control unsupported on this platform",
        }
    }
}

/// Signature of a focus routine; lets tests swap the platform one out
pub type FocusFn = fn(u32) -> FocusOutcome;

/// Bring the first visible window owned by `pid` to the foreground
#[cfg(windows)]
pub fn focus_process(pid: u32) -> FocusOutcome {
    use windows::Win32::UI::WindowsAndMessaging::{SetForegroundWindow, ShowWindow, SW_RESTORE};

    let Some(hwnd) = platform::find_window(pid) else {
        return FocusOutcome::NotFound;
    };

    unsafe {
        let _ = ShowWindow(hwnd, SW_RESTORE);
        if SetForegroundWindow(hwnd).as_bool() {
            FocusOutcome::Focused
        } else {
            FocusOutcome::Refused
        }
    }
}

#[cfg(not(windows))]
pub fn focus_process(_pid: u32) -> FocusOutcome {
    FocusOutcome::Unsupported
}

/// Focus routine that does nothing and reports success
pub fn assume_focused(_pid: u32) -> FocusOutcome {
    FocusOutcome::Focused
}

#[cfg(windows)]
mod platform {
    use windows::Win32::Foundation::{BOOL, HWND, LPARAM};
    use windows::Win32::UI::WindowsAndMessaging::{
        EnumWindows, GetWindowThreadProcessId, IsWindowVisible,
    };

    struct Search {
        pid: u32,
        found: Option<HWND>,
    }

    unsafe extern "system" fn visit(hwnd: HWND, lparam: LPARAM) -> BOOL {
        let search = &mut *(lparam.0 as *mut Search);
        let mut owner = 0u32;
        GetWindowThreadProcessId(hwnd, Some(&mut owner as *mut u32));
        if owner == search.pid && IsWindowVisible(hwnd).as_bool() {
            search.found = Some(hwnd);
            return BOOL(0);
        }
        BOOL(1)
    }

    pub(super) fn find_window(pid: u32) -> Option<HWND> {
        let mut search = Search { pid, found: None };
        // EnumWindows reports an error when the callback stops early
        unsafe {
            let _ = EnumWindows(Some(visit), LPARAM(&mut search as *mut Search as isize));
        }
        search.found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_descriptions() {
        assert_eq!(FocusOutcome::Focused.as_str(), "focused");
        assert!(FocusOutcome::NotFound.as_str().contains("no window"));
    }

    #[test]
    fn assume_focused_always_succeeds() {
        assert_eq!(assume_focused(1), FocusOutcome::Focused);
    }

    #[cfg(not(windows))]
    #[test]
    fn focus_is_unsupported_off_windows() {
        assert_eq!(focus_process(std::process::id()), FocusOutcome::Unsupported);
    }
}
