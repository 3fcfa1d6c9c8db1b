// ── Bootstrap lifecycle ───────────────────────────────────────────────────────
//
// Loads the config, installs logging, opens one window on the selected video
// driver and runs the event loop for a fixed time.  Any failure on the way is
// turned into one canonical `Error`, logged once at critical severity, and
// ends the process with a failure status.  All of this runs on the main
// thread; the window system and the tracker are never shared.

use std::{
    process::ExitCode,
    thread,
    time::{Duration, Instant},
};

use crate::config::{BootstrapConfig, VideoDriver};
use crate::error::{format_error, Error, Result};
use crate::logging::{self, LogFacadeSink, LogSink};
use crate::metrics::tracker::{Flow, MetricsTracker, NoSurfaces};
use crate::platform::{headless::HeadlessWindowSystem, WindowDesc, WindowSystem};

/// Run the bootstrap and map the outcome to a process exit status.
pub(crate) fn run() -> ExitCode {
    let config = BootstrapConfig::from_env();
    let level = config
        .as_ref()
        .ok()
        .and_then(|c| c.level_filter().ok())
        .unwrap_or(log::LevelFilter::Info);

    let session = logging::init(level);
    let sink = LogFacadeSink;

    let outcome = config
        .map_err(Error::from)
        .and_then(|config| bootstrap(&config, &sink));

    let status = match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            report_fatal(&sink, &error);
            ExitCode::FAILURE
        }
    };

    // Shutdown: flush everything before the process exits.
    drop(session);
    status
}

/// Log `error` as the single critical line of a failed run.
fn report_fatal(sink: &dyn LogSink, error: &Error) {
    sink.critical(&format_error(error));
}

fn bootstrap(config: &BootstrapConfig, sink: &dyn LogSink) -> Result<()> {
    sink.info("Blockforge prototype bootstrap running.");

    match config.video_driver {
        VideoDriver::Headless => {
            let mut system = HeadlessWindowSystem::new(config.headless_scale);
            run_with(&mut system, config, sink)
        }
        VideoDriver::Native => run_native(config, sink),
    }
}

#[cfg(windows)]
fn run_native(config: &BootstrapConfig, sink: &dyn LogSink) -> Result<()> {
    let mut system = crate::platform::win32::window::Win32WindowSystem::new()?;
    run_with(&mut system, config, sink)
}

#[cfg(not(windows))]
fn run_native(_config: &BootstrapConfig, _sink: &dyn LogSink) -> Result<()> {
    Err(Error::new(
        "Platform",
        "Init",
        "the native video driver requires Windows",
        "video_driver = native",
    ))
}

/// Open the bootstrap window on `system` and pump events until the run time
/// elapses or a quit event arrives.
fn run_with<S>(system: &mut S, config: &BootstrapConfig, sink: &dyn LogSink) -> Result<()>
where
    S: WindowSystem + ?Sized,
{
    sink.info(&format!(
        "Window system initialized using '{}' video driver.",
        system.driver_name()
    ));

    let window = system.create_window(&WindowDesc {
        title: config.window_title.clone(),
        width: config.window_width,
        height: config.window_height,
    })?;
    sink.info(&format!(
        "Window created at {}x{} (high DPI allowed).",
        config.window_width, config.window_height
    ));

    let tracker = MetricsTracker::new(sink);
    tracker.report(&*system, window, "Initial window metrics");

    let poll_interval = Duration::from_millis(config.poll_interval_ms);
    let deadline = Instant::now() + Duration::from_millis(config.run_time_ms);

    while Instant::now() < deadline {
        if tracker.pump(system, &mut NoSurfaces) == Flow::Quit {
            break;
        }
        thread::sleep(poll_interval);
    }

    sink.info("Shutting down Blockforge bootstrap.");
    system.destroy_window(window);
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
