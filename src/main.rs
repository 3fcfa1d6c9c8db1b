// ── Safety policy ────────────────────────────────────────────────────────────
// Unsafe code is forbidden everywhere except `platform::win32` (Win32 FFI:
// window management, DPI queries, the system message table).
// Each unsafe block in that module MUST carry a `// SAFETY:` comment.
#![deny(unsafe_code)]

mod app;
mod config;
mod error;
mod hresult;
mod logging;
mod metrics;
mod platform;

fn main() -> std::process::ExitCode {
    app::run()
}
