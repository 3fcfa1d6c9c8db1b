// ── Logging ───────────────────────────────────────────────────────────────────
//
// The core never calls `log` macros itself; it writes through a `LogSink`
// handle owned by whoever drives it.  `LogFacadeSink` is the production sink
// and forwards to the `log` facade, which `init` wires to `env_logger` with
// the Blockforge line pattern:
//
//   [2024-05-01 12:00:00.123][main][info][Blockforge] message
//
// `init` returns a `LogSession`; dropping it is the shutdown step.

use std::io::Write;

use log::{Level, LevelFilter};

/// Logger name printed in every line.
pub(crate) const LOGGER_NAME: &str = "Blockforge";

/// Target carrying `Severity::Critical` records through the `log` facade,
/// which has no level above `Error`.
pub(crate) const CRITICAL_TARGET: &str = "blockforge::critical";

/// Target for every other record written by `LogFacadeSink`.
const DEFAULT_TARGET: &str = "blockforge";

// ── Severity ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[allow(dead_code)] // the bootstrap itself only writes info and critical
pub(crate) enum Severity {
    Trace,
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    fn level(self) -> Level {
        match self {
            Self::Trace => Level::Trace,
            Self::Debug => Level::Debug,
            Self::Info => Level::Info,
            Self::Warning => Level::Warn,
            Self::Error | Self::Critical => Level::Error,
        }
    }
}

/// Parse the level names accepted in `BootstrapConfig::log_level`.
pub(crate) fn parse_level(name: &str) -> Option<LevelFilter> {
    match name.to_ascii_lowercase().as_str() {
        "off" => Some(LevelFilter::Off),
        "trace" => Some(LevelFilter::Trace),
        "debug" => Some(LevelFilter::Debug),
        "info" => Some(LevelFilter::Info),
        "warn" | "warning" => Some(LevelFilter::Warn),
        "error" | "critical" => Some(LevelFilter::Error),
        _ => None,
    }
}

// ── Sink ──────────────────────────────────────────────────────────────────────

/// Destination for leveled, already formatted text.
pub(crate) trait LogSink {
    fn write(&self, severity: Severity, message: &str);

    fn info(&self, message: &str) {
        self.write(Severity::Info, message);
    }

    fn critical(&self, message: &str) {
        self.write(Severity::Critical, message);
    }
}

/// Forwards to the `log` facade and flushes at `Warning` and above, so the
/// line is visible even if the process terminates right after.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct LogFacadeSink;

impl LogSink for LogFacadeSink {
    fn write(&self, severity: Severity, message: &str) {
        let target = if severity == Severity::Critical {
            CRITICAL_TARGET
        } else {
            DEFAULT_TARGET
        };
        log::log!(target: target, severity.level(), "{message}");
        if needs_flush(severity) {
            log::logger().flush();
        }
    }
}

fn needs_flush(severity: Severity) -> bool {
    severity >= Severity::Warning
}

// ── Session ───────────────────────────────────────────────────────────────────

/// Live logging session.  Dropping it flushes pending output.
#[derive(Debug)]
pub(crate) struct LogSession {
    _private: (),
}

impl Drop for LogSession {
    fn drop(&mut self) {
        log::logger().flush();
    }
}

/// Install the process logger at `level`.
///
/// `RUST_LOG` overrides `level`.  If a logger is already installed, only the
/// maximum level changes, in either direction.
pub(crate) fn init(level: LevelFilter) -> LogSession {
    // The installed filter admits everything; `log::set_max_level` is the
    // only gate.
    let logger = env_logger::Builder::new()
        .filter_level(LevelFilter::Trace)
        .parse_default_env()
        .target(env_logger::Target::Stdout)
        .format(|buf, record| {
            let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
            writeln!(
                buf,
                "{}",
                render_line(
                    &timestamp.to_string(),
                    &thread_label(),
                    level_label(record.level(), record.target()),
                    &record.args().to_string(),
                )
            )
        })
        .build();

    let max = if std::env::var_os(env_logger::DEFAULT_FILTER_ENV).is_some() {
        logger.filter()
    } else {
        level
    };
    // Err means a logger is already installed; keep it.
    let _ = log::set_boxed_logger(Box::new(logger));
    log::set_max_level(max);
    LogSession { _private: () }
}

fn thread_label() -> String {
    let current = std::thread::current();
    match current.name() {
        Some(name) => name.to_owned(),
        None => format!("{:?}", current.id()),
    }
}

fn level_label(level: Level, target: &str) -> &'static str {
    if target == CRITICAL_TARGET {
        return "critical";
    }
    match level {
        Level::Error => "error",
        Level::Warn => "warning",
        Level::Info => "info",
        Level::Debug => "debug",
        Level::Trace => "trace",
    }
}

fn render_line(timestamp: &str, thread: &str, level: &str, message: &str) -> String {
    format!("[{timestamp}][{thread}][{level}][{LOGGER_NAME}] {message}")
}

// ── Capturing sink (tests) ────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) use capture::CapturingSink;


// ── Tests ─────────────────────────────────────────────────────────────────────
