// ── Window metrics ────────────────────────────────────────────────────────────
//
// A `WindowMetrics` is a snapshot of one window's logical size, backing
// pixel size and display DPI, recomputed from scratch on every query.  It
// keeps no reference to the window it came from.

pub mod tracker;

use std::fmt;

use crate::platform::{DisplayDpi, WindowId, WindowSystem};

/// DPI assumed when the hosting display cannot be queried.
pub(crate) const REFERENCE_DPI: f32 = 96.0;

/// Size and DPI state of a window at one instant.
///
/// Invariant: `pixel_width >= logical_width` and
/// `pixel_height >= logical_height`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct WindowMetrics {
    pub(crate) logical_width: i32,
    pub(crate) logical_height: i32,
    pub(crate) pixel_width: i32,
    pub(crate) pixel_height: i32,
    /// `pixel_width / logical_width`; 1.0 when the logical width is zero.
    pub(crate) dpi_scale_x: f32,
    /// `pixel_height / logical_height`; 1.0 when the logical height is zero.
    pub(crate) dpi_scale_y: f32,
    pub(crate) ddpi: f32,
    pub(crate) hdpi: f32,
    pub(crate) vdpi: f32,
}

impl Default for WindowMetrics {
    fn default() -> Self {
        Self {
            logical_width: 0,
            logical_height: 0,
            pixel_width: 0,
            pixel_height: 0,
            dpi_scale_x: 1.0,
            dpi_scale_y: 1.0,
            ddpi: 0.0,
            hdpi: 0.0,
            vdpi: 0.0,
        }
    }
}

impl fmt::Display for WindowMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "logical {}x{}, pixels {}x{}, scale {:.2}x{:.2}, dpi {:.1} (h {:.1}, v {:.1})",
            self.logical_width,
            self.logical_height,
            self.pixel_width,
            self.pixel_height,
            self.dpi_scale_x,
            self.dpi_scale_y,
            self.ddpi,
            self.hdpi,
            self.vdpi,
        )
    }
}

/// Take a fresh snapshot of `window`.
///
/// `None`, or a handle `system` no longer recognises, yields
/// `WindowMetrics::default()`.  Display lookup or DPI query failures fall
/// back to `REFERENCE_DPI` on all three axes.
pub(crate) fn query_window_metrics<S>(system: &S, window: Option<WindowId>) -> WindowMetrics
where
    S: WindowSystem + ?Sized,
{
    let Some(window) = window.filter(|&w| system.is_window(w)) else {
        return WindowMetrics::default();
    };

    let (logical_width, logical_height) = system.logical_size(window);
    let (raw_width, raw_height) = system.drawable_size(window);

    let dpi = system
        .display_for_window(window)
        .and_then(|display| system.display_dpi(display))
        .unwrap_or_else(|| DisplayDpi::uniform(REFERENCE_DPI));

    // Some drivers report the drawable size before the backing store catches
    // up with the logical size.
    let pixel_width = raw_width.max(logical_width);
    let pixel_height = raw_height.max(logical_height);

    WindowMetrics {
        logical_width,
        logical_height,
        pixel_width,
        pixel_height,
        dpi_scale_x: axis_scale(pixel_width, logical_width),
        dpi_scale_y: axis_scale(pixel_height, logical_height),
        ddpi: dpi.diagonal,
        hdpi: dpi.horizontal,
        vdpi: dpi.vertical,
    }
}

fn axis_scale(pixels: i32, logical: i32) -> f32 {
    if logical > 0 {
        pixels as f32 / logical as f32
    } else {
        1.0
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
