#![allow(unsafe_code)]

use windows::Win32::{
    Foundation::HWND,
    Graphics::Gdi::{MonitorFromWindow, HMONITOR, MONITOR_DEFAULTTONULL},
    UI::HiDpi::{
        GetDpiForMonitor, GetDpiForSystem, GetDpiForWindow, SetProcessDpiAwarenessContext,
        DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2, MDT_EFFECTIVE_DPI,
    },
};

pub(crate) const BASE_DPI: u32 = 96;

/// Scale a value in logical units (96 DPI) to device pixels at `dpi`.
pub(crate) fn scale(px: i32, dpi: u32) -> i32 {
    px.saturating_mul(dpi as i32) / BASE_DPI as i32
}

/// Convert device pixels at `dpi` back to logical units.
pub(crate) fn unscale(px: i32, dpi: u32) -> i32 {
    if dpi == 0 {
        return px;
    }
    px.saturating_mul(BASE_DPI as i32) / dpi as i32
}

/// Opt into Per-Monitor v2 DPI awareness.
/// MUST be called before any window is created on the calling thread.
pub(crate) fn init() {
    // SAFETY: Must precede all window creation; single call at process start.
    unsafe {
        let _ = SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2);
    }
}

/// Return the DPI for `hwnd`. Falls back to BASE_DPI (96) on failure.
pub(crate) fn get_for_window(hwnd: HWND) -> u32 {
    // SAFETY: GetDpiForWindow returns 0 for an invalid handle; it never
    // dereferences anything the caller owns.
    let v = unsafe { GetDpiForWindow(hwnd) };
    if v == 0 {
        BASE_DPI
    } else {
        v
    }
}

/// Return the primary-monitor system DPI. Used before window creation.
pub(crate) fn get_system_dpi() -> u32 {
    // SAFETY: GetDpiForSystem takes no parameters and always succeeds on Win10+.
    let v = unsafe { GetDpiForSystem() };
    if v == 0 {
        BASE_DPI
    } else {
        v
    }
}

/// The monitor hosting `hwnd`, or `None` if the window is on no monitor.
pub(crate) fn monitor_for_window(hwnd: HWND) -> Option<HMONITOR> {
    // SAFETY: MonitorFromWindow accepts any HWND value and returns a null
    // HMONITOR when MONITOR_DEFAULTTONULL finds no match.
    let monitor = unsafe { MonitorFromWindow(hwnd, MONITOR_DEFAULTTONULL) };
    (!monitor.is_invalid()).then_some(monitor)
}

/// Effective (horizontal, vertical) DPI of `monitor`.
pub(crate) fn get_for_monitor(monitor: HMONITOR) -> Option<(u32, u32)> {
    let (mut x, mut y) = (0u32, 0u32);
    // SAFETY: `x` and `y` are valid writable u32 slots; an unknown monitor
    // handle makes the call fail with E_INVALIDARG rather than fault.
    unsafe { GetDpiForMonitor(monitor, MDT_EFFECTIVE_DPI, &mut x, &mut y) }.ok()?;
    (x != 0 && y != 0).then_some((x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_round_trips_at_integer_factors() {
        assert_eq!(scale(100, 192), 200);
        assert_eq!(unscale(200, 192), 100);
        assert_eq!(unscale(150, 144), 100);
        assert_eq!(unscale(10, 0), 10);
    }

    #[test]
    fn huge_values_saturate_instead_of_overflowing() {
        assert_eq!(scale(i32::MAX, 192), i32::MAX / 96);
        assert_eq!(scale(20_000_000, 192), i32::MAX / 96);
        assert_eq!(unscale(i32::MAX, 96), i32::MAX / 96);
    }
}
