//! Shared utility functions and traits

/// Extension trait for rendering console codes in hexadecimal.
///
/// Codes are written as `0x` followed by upper-case digits, padded to at
/// least two digits so single-byte values line up in reports.
///
/// # Example
///
/// ```
/// use keyprobe::utils::HexExt;
///
/// assert_eq!(65u32.to_hex(), "0x41");
/// assert_eq!(13u32.to_hex(), "0x0D");
/// assert_eq!(0x2190u32.to_hex(), "0x2190");
/// assert_eq!(Some(1u32).to_hex(), Some("0x01".to_string()));
/// assert_eq!(None::<u32>.to_hex(), None);
/// ```
pub trait HexExt {
    type Output;

    fn to_hex(&self) -> Self::Output;
}

impl HexExt for u32 {
    type Output = String;

    fn to_hex(&self) -> String {
        format!("0x{:02X}", self)
    }
}

impl HexExt for Option<u32> {
    type Output = Option<String>;

    fn to_hex(&self) -> Option<String> {
        self.map(|v| v.to_hex())
    }
}

/// Unicode code points are written with at least four hex digits
/// (`0x0041`, `0x2190`, `0x1F600`).
pub trait CodePointHex {
    fn to_code_point_hex(&self) -> String;
}

impl CodePointHex for u32 {
    fn to_code_point_hex(&self) -> String {
        format!("0x{:04X}", self)
    }
}

/// Render an optional code as `0x41 (65)`, or `-` when absent
pub fn describe_code(code: Option<u32>) -> String {
    match code {
        Some(v) => format!("{} ({})", v.to_hex(), v),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_pads_to_two_digits() {
        assert_eq!(0u32.to_hex(), "0x00");
        assert_eq!(9u32.to_hex(), "0x09");
        assert_eq!(255u32.to_hex(), "0xFF");
    }

    #[test]
    fn hex_keeps_wide_values() {
        assert_eq!(0x1B3u32.to_hex(), "0x1B3");
        assert_eq!(0xFFFFu32.to_hex(), "0xFFFF");
    }

    #[test]
    fn optional_hex() {
        assert_eq!(Some(27u32).to_hex(), Some("0x1B".to_string()));
        assert_eq!(None::<u32>.to_hex(), None);
    }

    #[test]
    fn code_points_pad_to_four_digits() {
        assert_eq!(0x41u32.to_code_point_hex(), "0x0041");
        assert_eq!(0x2190u32.to_code_point_hex(), "0x2190");
        assert_eq!(0x1F600u32.to_code_point_hex(), "0x1F600");
    }

    #[test]
    fn describe_code_formats() {
        assert_eq!(describe_code(Some(65)), "0x41 (65)");
        assert_eq!(describe_code(None), "-");
    }
}
