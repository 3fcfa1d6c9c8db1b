// ── Metrics tracker ───────────────────────────────────────────────────────────
//
// Reacts to window events from the host loop.  It never polls on its own:
// every qualifying event is handled exactly once, in delivery order, with no
// coalescing of bursts.
//
//   DrawableSizeChanged → snapshot, report, surface_invalidated
//   DpiChanged          → snapshot, report, surface_invalidated
//   Resized             → report the logical size only
//   Quit                → Flow::Quit

use crate::logging::LogSink;
use crate::platform::{WindowEvent, WindowEventKind, WindowId, WindowSystem};

use super::{query_window_metrics, WindowMetrics};

/// Receives the "recreate everything sized in physical pixels" signal.
pub(crate) trait SurfaceListener {
    fn surface_invalidated(&mut self, window: WindowId, metrics: &WindowMetrics);
}

/// Listener for hosts with no pixel-sized resources yet.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct NoSurfaces;

impl SurfaceListener for NoSurfaces {
    fn surface_invalidated(&mut self, _window: WindowId, _metrics: &WindowMetrics) {}
}

/// What the host loop should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Quit,
}

/// Dispatches window events to metrics reports.
pub(crate) struct MetricsTracker<'a> {
    sink: &'a dyn LogSink,
}

impl<'a> MetricsTracker<'a> {
    pub(crate) fn new(sink: &'a dyn LogSink) -> Self {
        Self { sink }
    }

    /// Snapshot `window` and log it with `reason` as the prefix.
    pub(crate) fn report<S>(&self, system: &S, window: WindowId, reason: &str) -> WindowMetrics
    where
        S: WindowSystem + ?Sized,
    {
        let metrics = query_window_metrics(system, Some(window));
        self.sink.info(&format!("{reason}: {metrics}"));
        metrics
    }

    /// Handle one event.
    pub(crate) fn handle<S>(
        &self,
        system: &S,
        event: &WindowEvent,
        listener: &mut dyn SurfaceListener,
    ) -> Flow
    where
        S: WindowSystem + ?Sized,
    {
        let (window, kind) = match *event {
            WindowEvent::Quit => {
                self.sink
                    .info("Received quit event. Terminating bootstrap loop.");
                return Flow::Quit;
            }
            WindowEvent::Window { window, kind } => (window, kind),
        };

        match kind {
            WindowEventKind::DrawableSizeChanged => {
                let metrics = self.report(system, window, "Drawable size changed");
                listener.surface_invalidated(window, &metrics);
            }
            WindowEventKind::DpiChanged => {
                let metrics = self.report(system, window, "Display DPI changed");
                listener.surface_invalidated(window, &metrics);
            }
            WindowEventKind::Resized { width, height } => {
                self.sink
                    .info(&format!("Window resized to {width}x{height}"));
            }
        }
        Flow::Continue
    }

    /// Drain every pending event from `system`, in order.
    ///
    /// Stops at the first `Quit`, leaving later events queued.
    pub(crate) fn pump<S>(&self, system: &mut S, listener: &mut dyn SurfaceListener) -> Flow
    where
        S: WindowSystem + ?Sized,
    {
        while let Some(event) = system.poll_event() {
            if self.handle(&*system, &event, listener) == Flow::Quit {
                return Flow::Quit;
            }
        }
        Flow::Continue
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{CapturingSink, Severity};
    use crate::platform::headless::HeadlessWindowSystem;
    use crate::platform::{DisplayDpi, WindowDesc};

    #[derive(Default)]
    struct RecordingListener {
        invalidations: Vec<(WindowId, WindowMetrics)>,
    }

    impl SurfaceListener for RecordingListener {
        fn surface_invalidated(&mut self, window: WindowId, metrics: &WindowMetrics) {
            self.invalidations.push((window, *metrics));
        }
    }

    fn setup(scale: f32) -> (HeadlessWindowSystem, WindowId) {
        let mut sys = HeadlessWindowSystem::new(scale);
        let w = sys
            .create_window(&WindowDesc {
                title: "tracker".to_owned(),
                width: 800,
                height: 600,
            })
            .expect("create window");
        (sys, w)
    }

    fn event(window: WindowId, kind: WindowEventKind) -> WindowEvent {
        WindowEvent::Window { window, kind }
    }

    #[test]
    fn drawable_change_signals_once() {
        let (sys, w) = setup(1.0);
        let sink = CapturingSink::default();
        let mut listener = RecordingListener::default();
        let tracker = MetricsTracker::new(&sink);

        let flow = tracker.handle(
            &sys,
            &event(w, WindowEventKind::DrawableSizeChanged),
            &mut listener,
        );

        assert_eq!(flow, Flow::Continue);
        assert_eq!(listener.invalidations.len(), 1);
        assert_eq!(listener.invalidations[0].1.pixel_width, 800);
        assert_eq!(sink.lines().len(), 1);
        assert_eq!(sink.lines()[0].0, Severity::Info);
    }

    #[test]
    fn dpi_change_signals_once_with_new_metrics() {
        let (mut sys, w) = setup(1.0);
        let hidpi = sys.add_display(Some(DisplayDpi::uniform(192.0)));
        sys.move_to_display(w, hidpi, 2.0);
        let sink = CapturingSink::default();
        let mut listener = RecordingListener::default();

        let flow = MetricsTracker::new(&sink).pump(&mut sys, &mut listener);

        assert_eq!(flow, Flow::Continue);
        assert_eq!(listener.invalidations.len(), 1);
        let m = listener.invalidations[0].1;
        assert_eq!((m.pixel_width, m.pixel_height), (1600, 1200));
        assert_eq!(m.dpi_scale_x, 2.0);
        assert_eq!(m.hdpi, 192.0);
        assert!(sink.messages()[0].starts_with("Display DPI changed: "));
    }

    #[test]
    fn logical_resize_never_signals() {
        let (sys, w) = setup(1.0);
        let sink = CapturingSink::default();
        let mut listener = RecordingListener::default();

        MetricsTracker::new(&sink).handle(
            &sys,
            &event(
                w,
                WindowEventKind::Resized {
                    width: 1024,
                    height: 768,
                },
            ),
            &mut listener,
        );

        assert!(listener.invalidations.is_empty());
        assert_eq!(sink.messages(), vec!["Window resized to 1024x768".to_owned()]);
    }

    #[test]
    fn scripted_sequence_is_reported_in_order_without_coalescing() {
        let (mut sys, w) = setup(1.0);
        sys.push_event(event(
            w,
            WindowEventKind::Resized {
                width: 640,
                height: 480,
            },
        ));
        sys.push_event(event(w, WindowEventKind::DpiChanged));
        sys.push_event(event(
            w,
            WindowEventKind::Resized {
                width: 320,
                height: 240,
            },
        ));
        let sink = CapturingSink::default();
        let mut listener = RecordingListener::default();

        MetricsTracker::new(&sink).pump(&mut sys, &mut listener);

        let messages = sink.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0], "Window resized to 640x480");
        assert!(messages[1].starts_with("Display DPI changed: "));
        assert_eq!(messages[2], "Window resized to 320x240");
        assert_eq!(listener.invalidations.len(), 1);
    }

    #[test]
    fn rapid_drawable_changes_each_signal() {
        let (mut sys, w) = setup(1.0);
        for _ in 0..5 {
            sys.push_event(event(w, WindowEventKind::DrawableSizeChanged));
        }
        let sink = CapturingSink::default();
        let mut listener = RecordingListener::default();

        MetricsTracker::new(&sink).pump(&mut sys, &mut listener);

        assert_eq!(listener.invalidations.len(), 5);
        assert_eq!(sink.lines().len(), 5);
    }

    #[test]
    fn headless_resize_reports_logical_then_drawable() {
        let (mut sys, w) = setup(2.0);
        sys.resize(w, 400, 300);
        let sink = CapturingSink::default();
        let mut listener = RecordingListener::default();

        MetricsTracker::new(&sink).pump(&mut sys, &mut listener);

        let messages = sink.messages();
        assert_eq!(messages[0], "Window resized to 400x300");
        assert!(messages[1].starts_with("Drawable size changed: logical 400x300, pixels 800x600"));
        assert_eq!(listener.invalidations.len(), 1);
    }

    #[test]
    fn quit_stops_the_pump_and_leaves_the_rest() {
        let (mut sys, w) = setup(1.0);
        sys.request_quit();
        sys.push_event(event(w, WindowEventKind::DrawableSizeChanged));
        let sink = CapturingSink::default();
        let mut listener = RecordingListener::default();

        let flow = MetricsTracker::new(&sink).pump(&mut sys, &mut listener);

        assert_eq!(flow, Flow::Quit);
        assert!(listener.invalidations.is_empty());
        assert_eq!(sys.pending_events(), 1);
    }
}
