// ── Canonical error record ────────────────────────────────────────────────────
//
// Every failure Blockforge reports, whatever its origin (an HRESULT, a
// windowing-system call, a malformed config file), is normalised into one
// `Error` value and rendered by `format_error`.  Nothing else in the crate
// assembles error text by hand.
//
// Wire form: `category|code|message|context`.  Field values are NOT escaped;
// a `|` inside a field makes the formatted string ambiguous to split.

use crate::hresult::{describe_hresult, HResult};

// ── Categories ────────────────────────────────────────────────────────────────

/// Graphics-API domain used by `make_dx_error`.
#[allow(dead_code)]
pub(crate) const DX12_CATEGORY: &str = "DX12";

/// Configuration loading.
pub(crate) const CONFIG_CATEGORY: &str = "Config";

// ── Error ─────────────────────────────────────────────────────────────────────

/// One failure, described by four plain text fields.
///
/// An empty field is legal; its position is still emitted by `format_error`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{category}|{code}|{message}|{context}")]
pub(crate) struct Error {
    /// Subsystem namespace, e.g. `"DX12"` or `"Win32"`.
    pub(crate) category: String,
    /// Operation identifier within the category, e.g. `"CreateDevice"`.
    pub(crate) code: String,
    /// Human-readable description of what went wrong.
    pub(crate) message: String,
    /// The call site or operation being attempted.
    pub(crate) context: String,
}

impl Error {
    pub(crate) fn new(
        category: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            code: code.into(),
            message: message.into(),
            context: context.into(),
        }
    }
}

/// Render `error` in the canonical `category|code|message|context` form.
pub(crate) fn format_error(error: &Error) -> String {
    error.to_string()
}

/// Build a DX12-category error whose message is the translated `status`.
#[allow(dead_code)]
pub(crate) fn make_dx_error(code: impl Into<String>, status: HResult, context: &str) -> Error {
    Error {
        category: DX12_CATEGORY.to_owned(),
        code: code.into(),
        message: describe_hresult(status),
        context: context.to_owned(),
    }
}

// ── Configuration errors ──────────────────────────────────────────────────────

/// Failures while reading `BootstrapConfig`.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        let context = match &e {
            ConfigError::Io { path, .. } | ConfigError::Parse { path, .. } => path.clone(),
            ConfigError::InvalidValue { field, .. } => (*field).to_owned(),
        };
        Error::new(CONFIG_CATEGORY, "Load", e.to_string(), context)
    }
}

/// Convenience alias used throughout the crate.
pub(crate) type Result<T> = std::result::Result<T, Error>;

// ── Tests ─────────────────────────────────────────────────────────────────────
