// ── HRESULT translation ───────────────────────────────────────────────────────
//
// An `HResult` is an opaque signed 32-bit status code.  Turning one into text
// is a platform capability: on Windows the system message table knows the
// description, everywhere else we can only say that we cannot translate it.
// Both behaviours sit behind `StatusTranslator`; `describe_hresult` picks the
// one compiled for the current target.
//
// No Win32 imports here; the native lookup lives in
// `platform::win32::message_table`.

use std::fmt;

/// Platform status code.  On Windows the bits encode severity, facility and
/// code; elsewhere the value has no interpretable substructure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct HResult(pub(crate) i32);

impl HResult {
    /// Promote a Win32 error code (`GetLastError()` value) to an HRESULT,
    /// the way `HRESULT_FROM_WIN32` does.
    #[cfg_attr(not(any(windows, test)), allow(dead_code))]
    pub(crate) fn from_win32(code: u32) -> Self {
        if code as i32 <= 0 {
            Self(code as i32)
        } else {
            Self(((code & 0x0000_FFFF) | 0x8007_0000) as i32)
        }
    }

    /// Bit pattern of the code, for display.
    pub(crate) fn bits(self) -> u32 {
        self.0 as u32
    }
}

/// `0x` followed by exactly eight upper-case hex digits.
impl fmt::Display for HResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.bits())
    }
}

#[cfg(windows)]
impl From<windows::core::HRESULT> for HResult {
    fn from(hr: windows::core::HRESULT) -> Self {
        Self(hr.0)
    }
}

// ── Translator capability ─────────────────────────────────────────────────────

/// Turns a status code into human-readable text.
///
/// Implementations never fail and never return an empty string.
pub(crate) trait StatusTranslator {
    fn describe(&self, code: HResult) -> String;
}

/// Translator for targets without a system message table.
#[cfg_attr(windows, allow(dead_code))]
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct FallbackTranslator;

impl StatusTranslator for FallbackTranslator {
    fn describe(&self, code: HResult) -> String {
        format!("{code}: HRESULT translation requires Windows runtime")
    }
}

/// The translator compiled for this target.
pub(crate) fn platform_translator() -> &'static dyn StatusTranslator {
    #[cfg(windows)]
    {
        &crate::platform::win32::message_table::MessageTableTranslator
    }
    #[cfg(not(windows))]
    {
        &FallbackTranslator
    }
}

/// Describe `code` with the platform translator.
pub(crate) fn describe_hresult(code: HResult) -> String {
    platform_translator().describe(code)
}

// ── Message composition ───────────────────────────────────────────────────────

/// Build the final description from an optional looked-up text.
///
/// Trailing CR/LF are stripped.  Missing or blank text yields the
/// `Unknown HRESULT` form.
#[cfg_attr(not(any(windows, test)), allow(dead_code))]
pub(crate) fn compose_description(code: HResult, text: Option<&str>) -> String {
    match text.map(|t| t.trim_end_matches(['\r', '\n'])) {
        Some(t) if !t.is_empty() => format!("{code}: {t}"),
        _ => format!("{code}: Unknown HRESULT"),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_zero_padded_upper_hex() {
        assert_eq!(HResult(5).to_string(), "0x00000005");
        assert_eq!(HResult(0).to_string(), "0x00000000");
        assert_eq!(HResult(-1).to_string(), "0xFFFFFFFF");
        assert_eq!(HResult(0x887A_0005_u32 as i32).to_string(), "0x887A0005");
    }

    #[test]
    fn from_win32_sets_facility_win32() {
        // ERROR_ACCESS_DENIED
        assert_eq!(HResult::from_win32(5).bits(), 0x8007_0005);
        assert_eq!(HResult::from_win32(0).bits(), 0);
    }

    #[test]
    fn fallback_names_missing_runtime() {
        assert_eq!(
            FallbackTranslator.describe(HResult(5)),
            "0x00000005: HRESULT translation requires Windows runtime"
        );
    }

    #[test]
    fn fallback_handles_extremes() {
        for raw in [0, -1, i32::MIN, i32::MAX] {
            let text = FallbackTranslator.describe(HResult(raw));
            assert!(text.starts_with(&HResult(raw).to_string()));
            assert!(text.ends_with("requires Windows runtime"));
        }
    }

    #[test]
    fn describe_never_empty() {
        for raw in [0, 5, -1, i32::MIN, 0x887A_0005_u32 as i32] {
            let text = describe_hresult(HResult(raw));
            assert!(!text.is_empty());
            assert!(text.starts_with(&format!("0x{:08X}: ", raw as u32)));
        }
    }

    #[cfg(not(windows))]
    #[test]
    fn describe_uses_fallback_off_windows() {
        assert_eq!(
            describe_hresult(HResult(5)),
            "0x00000005: HRESULT translation requires Windows runtime"
        );
    }

    #[test]
    fn compose_strips_line_terminators() {
        let text = compose_description(HResult(5), Some("Access is denied.\r\n"));
        assert_eq!(text, "0x00000005: Access is denied.");
    }

    #[test]
    fn compose_without_text_is_unknown() {
        assert_eq!(
            compose_description(HResult(5), None),
            "0x00000005: Unknown HRESULT"
        );
        assert_eq!(
            compose_description(HResult(5), Some("\r\n")),
            "0x00000005: Unknown HRESULT"
        );
    }
}
