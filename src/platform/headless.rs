// ── Headless window system ────────────────────────────────────────────────────
//
// Pure-Rust stand-in for a video driver: windows and displays are plain
// records, and events come from a FIFO queue that callers fill.  Used when no
// native driver is requested and as the windowing fake in tests.

use std::collections::{HashMap, VecDeque};

use crate::error::{Error, Result};
use crate::metrics::REFERENCE_DPI;

use super::{DisplayDpi, DisplayId, WindowDesc, WindowEvent, WindowEventKind, WindowId, WindowSystem};

pub(crate) const CATEGORY: &str = "Headless";

/// One simulated window.
#[derive(Debug, Clone)]
struct HeadlessWindow {
    logical: (i32, i32),
    /// Pixels per logical unit.
    scale: f32,
    display: Option<DisplayId>,
    /// Raw drawable size reported instead of `logical * scale`.
    drawable_override: Option<(i32, i32)>,
}

impl HeadlessWindow {
    fn drawable(&self) -> (i32, i32) {
        self.drawable_override.unwrap_or_else(|| {
            (
                (self.logical.0 as f32 * self.scale).round() as i32,
                (self.logical.1 as f32 * self.scale).round() as i32,
            )
        })
    }
}

/// In-memory windowing system with scripted events.
#[derive(Debug)]
pub(crate) struct HeadlessWindowSystem {
    /// `None` entries model displays whose DPI query fails.
    displays: Vec<Option<DisplayDpi>>,
    windows: HashMap<WindowId, HeadlessWindow>,
    next_window: usize,
    /// Scale given to newly created windows.
    default_scale: f32,
    events: VecDeque<WindowEvent>,
}

impl Default for HeadlessWindowSystem {
    fn default() -> Self {
        Self::new(1.0)
    }
}

// Scripting hooks; the bootstrap only needs `new`.
#[cfg_attr(not(test), allow(dead_code))]
impl HeadlessWindowSystem {
    /// A system with one reference-DPI display; new windows use `scale`.
    pub(crate) fn new(scale: f32) -> Self {
        Self {
            displays: vec![Some(DisplayDpi::uniform(REFERENCE_DPI * scale))],
            windows: HashMap::new(),
            // Zero stays unused so a default-constructed id is never live.
            next_window: 1,
            default_scale: scale,
            events: VecDeque::new(),
        }
    }

    /// Register another display.  `None` makes its DPI query fail.
    pub(crate) fn add_display(&mut self, dpi: Option<DisplayDpi>) -> DisplayId {
        self.displays.push(dpi);
        DisplayId(self.displays.len() - 1)
    }

    /// Append `event` to the queue.
    pub(crate) fn push_event(&mut self, event: WindowEvent) {
        self.events.push_back(event);
    }

    /// Queue a quit request.
    pub(crate) fn request_quit(&mut self) {
        self.push_event(WindowEvent::Quit);
    }

    /// Change the logical size and queue `Resized` then `DrawableSizeChanged`.
    pub(crate) fn resize(&mut self, window: WindowId, width: i32, height: i32) {
        let Some(w) = self.windows.get_mut(&window) else {
            return;
        };
        w.logical = (width, height);
        self.push_event(WindowEvent::Window {
            window,
            kind: WindowEventKind::Resized { width, height },
        });
        self.push_event(WindowEvent::Window {
            window,
            kind: WindowEventKind::DrawableSizeChanged,
        });
    }

    /// Move `window` to `display` with a new pixel scale and queue `DpiChanged`.
    pub(crate) fn move_to_display(&mut self, window: WindowId, display: DisplayId, scale: f32) {
        let Some(w) = self.windows.get_mut(&window) else {
            return;
        };
        w.display = Some(display);
        w.scale = scale;
        self.push_event(WindowEvent::Window {
            window,
            kind: WindowEventKind::DpiChanged,
        });
    }

    /// Set the hosting display without queuing anything.  `None` makes the
    /// display lookup fail.
    pub(crate) fn set_display(&mut self, window: WindowId, display: Option<DisplayId>) {
        if let Some(w) = self.windows.get_mut(&window) {
            w.display = display;
        }
    }

    /// Report `size` as the drawable size regardless of logical size and scale.
    pub(crate) fn set_drawable_override(&mut self, window: WindowId, size: Option<(i32, i32)>) {
        if let Some(w) = self.windows.get_mut(&window) {
            w.drawable_override = size;
        }
    }

    /// Number of events still queued.
    pub(crate) fn pending_events(&self) -> usize {
        self.events.len()
    }
}

impl WindowSystem for HeadlessWindowSystem {
    fn driver_name(&self) -> &str {
        "headless"
    }

    fn create_window(&mut self, desc: &WindowDesc) -> Result<WindowId> {
        if desc.width <= 0 || desc.height <= 0 {
            return Err(Error::new(
                CATEGORY,
                "CreateWindow",
                format!("window size {}x{} is not positive", desc.width, desc.height),
                format!("create_window({})", desc.title),
            ));
        }

        let id = WindowId(self.next_window);
        self.next_window += 1;
        self.windows.insert(
            id,
            HeadlessWindow {
                logical: (desc.width, desc.height),
                scale: self.default_scale,
                display: Some(DisplayId(0)),
                drawable_override: None,
            },
        );
        Ok(id)
    }

    fn destroy_window(&mut self, window: WindowId) {
        self.windows.remove(&window);
        self.events.retain(|e| match e {
            WindowEvent::Window { window: w, .. } => *w != window,
            WindowEvent::Quit => true,
        });
    }

    fn is_window(&self, window: WindowId) -> bool {
        self.windows.contains_key(&window)
    }

    fn logical_size(&self, window: WindowId) -> (i32, i32) {
        self.windows.get(&window).map_or((0, 0), |w| w.logical)
    }

    fn drawable_size(&self, window: WindowId) -> (i32, i32) {
        self.windows.get(&window).map_or((0, 0), HeadlessWindow::drawable)
    }

    fn display_for_window(&self, window: WindowId) -> Option<DisplayId> {
        let display = self.windows.get(&window)?.display?;
        (display.0 < self.displays.len()).then_some(display)
    }

    fn display_dpi(&self, display: DisplayId) -> Option<DisplayDpi> {
        self.displays.get(display.0).copied().flatten()
    }

    fn poll_event(&mut self) -> Option<WindowEvent> {
        self.events.pop_front()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn desc(width: i32, height: i32) -> WindowDesc {
        WindowDesc {
            title: "test".to_owned(),
            width,
            height,
        }
    }

    #[test]
    fn drawable_follows_scale() {
        let mut sys = HeadlessWindowSystem::new(2.0);
        let w = sys.create_window(&desc(640, 480)).expect("create");
        assert_eq!(sys.logical_size(w), (640, 480));
        assert_eq!(sys.drawable_size(w), (1280, 960));
    }

    #[test]
    fn zero_size_window_is_rejected() {
        let mut sys = HeadlessWindowSystem::default();
        let err = sys.create_window(&desc(0, 480)).expect_err("must fail");
        assert_eq!(err.category, "Headless");
        assert_eq!(err.code, "CreateWindow");
        assert_eq!(err.context, "create_window(test)");
    }

    #[test]
    fn resize_queues_resized_then_drawable() {
        let mut sys = HeadlessWindowSystem::default();
        let w = sys.create_window(&desc(100, 100)).expect("create");
        sys.resize(w, 300, 200);
        assert_eq!(
            sys.poll_event(),
            Some(WindowEvent::Window {
                window: w,
                kind: WindowEventKind::Resized {
                    width: 300,
                    height: 200
                },
            })
        );
        assert_eq!(
            sys.poll_event(),
            Some(WindowEvent::Window {
                window: w,
                kind: WindowEventKind::DrawableSizeChanged,
            })
        );
        assert_eq!(sys.poll_event(), None);
    }

    #[test]
    fn missing_display_dpi_is_none() {
        let mut sys = HeadlessWindowSystem::default();
        let d = sys.add_display(None);
        assert_eq!(sys.display_dpi(d), None);
        assert_eq!(sys.display_dpi(DisplayId(0)), Some(DisplayDpi::uniform(96.0)));
    }

    #[test]
    fn destroyed_window_is_gone_with_its_events() {
        let mut sys = HeadlessWindowSystem::default();
        let w = sys.create_window(&desc(100, 100)).expect("create");
        sys.resize(w, 50, 50);
        sys.request_quit();
        sys.destroy_window(w);
        assert!(!sys.is_window(w));
        assert_eq!(sys.logical_size(w), (0, 0));
        assert_eq!(sys.pending_events(), 1);
        assert_eq!(sys.poll_event(), Some(WindowEvent::Quit));
    }
}
