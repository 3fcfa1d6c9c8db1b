// ── Platform abstraction layer ────────────────────────────────────────────────
//
// This module defines the interface the rest of the codebase uses to talk to
// the windowing system.  No `unsafe` lives here; all Win32 FFI is confined to
// the `win32` sub-module and never leaks outward.  `headless` is the dummy
// driver: in-memory windows and displays with a scripted event queue.

pub mod headless;
#[cfg(windows)]
pub mod win32;

use crate::error::Result;

// ── Handles ───────────────────────────────────────────────────────────────────

/// Opaque window handle issued by a `WindowSystem`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct WindowId(pub(crate) usize);

/// Opaque display handle issued by a `WindowSystem`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct DisplayId(pub(crate) usize);

/// Dots-per-inch reported for one display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct DisplayDpi {
    pub(crate) diagonal: f32,
    pub(crate) horizontal: f32,
    pub(crate) vertical: f32,
}

impl DisplayDpi {
    /// A display with the same DPI on both axes.
    pub(crate) fn uniform(dpi: f32) -> Self {
        Self {
            diagonal: dpi,
            horizontal: dpi,
            vertical: dpi,
        }
    }

    /// Derive the diagonal DPI from the per-axis values.
    #[cfg_attr(not(any(windows, test)), allow(dead_code))]
    pub(crate) fn from_axes(horizontal: f32, vertical: f32) -> Self {
        Self {
            diagonal: ((horizontal * horizontal + vertical * vertical) / 2.0).sqrt(),
            horizontal,
            vertical,
        }
    }
}

// ── Window creation ───────────────────────────────────────────────────────────

/// Parameters for `WindowSystem::create_window`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct WindowDesc {
    pub(crate) title: String,
    /// Requested client width in logical units.
    pub(crate) width: i32,
    /// Requested client height in logical units.
    pub(crate) height: i32,
}

// ── Events ────────────────────────────────────────────────────────────────────

/// What changed about a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WindowEventKind {
    /// The pixel backing store changed size.
    DrawableSizeChanged,
    /// The logical size changed to `width` x `height`.
    Resized { width: i32, height: i32 },
    /// The window now sits on a display with a different DPI.
    DpiChanged,
}

/// One entry from the windowing system's event queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WindowEvent {
    Quit,
    Window {
        window: WindowId,
        kind: WindowEventKind,
    },
}

// ── WindowSystem ──────────────────────────────────────────────────────────────

/// The windowing-system operations Blockforge needs.
///
/// Size and DPI queries take a handle the caller obtained from
/// `create_window`; implementations return zeros for handles they do not
/// recognise rather than failing.
pub(crate) trait WindowSystem {
    /// Human-readable backend name, logged at startup.
    fn driver_name(&self) -> &str;

    fn create_window(&mut self, desc: &WindowDesc) -> Result<WindowId>;

    fn destroy_window(&mut self, window: WindowId);

    /// `true` while `window` refers to a live window.
    fn is_window(&self, window: WindowId) -> bool;

    /// Client size in logical (DPI-independent) units.
    fn logical_size(&self, window: WindowId) -> (i32, i32);

    /// Client size in physical pixels of the backing surface.
    fn drawable_size(&self, window: WindowId) -> (i32, i32);

    /// The display currently hosting `window`, if it can be determined.
    fn display_for_window(&self, window: WindowId) -> Option<DisplayId>;

    /// DPI of `display`, if the query succeeds.
    fn display_dpi(&self, display: DisplayId) -> Option<DisplayDpi>;

    /// Next pending event, or `None` when the queue is empty.  Never blocks.
    fn poll_event(&mut self) -> Option<WindowEvent>;
}
