// ── Win32 platform implementation ─────────────────────────────────────────────
//
// This is the only module tree in the codebase where `unsafe` code is
// permitted.  Every `unsafe` block MUST carry a `// SAFETY:` comment that
// states:
//   • which invariant makes the operation sound, and
//   • what the caller is responsible for maintaining.
//
// Nothing in this module is `pub` beyond what callers genuinely need; keep the
// unsafe surface as small as possible.

#![allow(unsafe_code)]

// ── Sub-modules ───────────────────────────────────────────────────────────────

pub mod message_table; // FormatMessageW-backed StatusTranslator
pub mod window; // Win32WindowSystem: window class, message pump, size/DPI queries

pub(crate) mod dpi; // per-monitor DPI v2 helpers
