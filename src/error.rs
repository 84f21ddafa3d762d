use thiserror::Error;

/// Errors arising from response field extraction.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("empty frame")]
    EmptyFrame,

    #[error("{kind}: missing {field}{}", format_raw_suffix(raw))]
    MissingField {
        kind: &'static str,
        field: &'static str,
        /// Frame text (lossy, truncated) for debug context.
        raw: String,
    },

    #[error("{kind}: malformed integer field {field}{}", format_raw_suffix(raw))]
    BadInteger {
        kind: &'static str,
        field: &'static str,
        /// Frame text (lossy, truncated) for debug context.
        raw: String,
    },

    #[error("unrecognised SIM state{}", format_raw_suffix(raw))]
    UnknownPinState {
        /// Frame text (lossy, truncated) for debug context.
        raw: String,
    },
}

impl WireError {
    /// Create a `MissingField` error (raw text filled in later via `with_raw`).
    pub(crate) fn missing(kind: &'static str, field: &'static str) -> Self {
        Self::MissingField { kind, field, raw: String::new() }
    }

    /// Create a `BadInteger` error (raw text filled in later via `with_raw`).
    pub(crate) fn bad_integer(kind: &'static str, field: &'static str) -> Self {
        Self::BadInteger { kind, field, raw: String::new() }
    }

    /// Attach the frame bytes to grammar errors for diagnostics.
    ///
    /// Extraction may already have overwritten delimiters with NUL; those
    /// are rendered as `\0`.
    pub fn with_raw(self, frame: &[u8]) -> Self {
        let raw = raw_text(frame);
        match self {
            Self::MissingField { kind, field, .. } => Self::MissingField { kind, field, raw },
            Self::BadInteger { kind, field, .. } => Self::BadInteger { kind, field, raw },
            Self::UnknownPinState { .. } => Self::UnknownPinState { raw },
            other => other,
        }
    }
}

/// Render frame bytes as escaped ASCII, capped at 64 bytes.
fn raw_text(frame: &[u8]) -> String {
    let limit = 64;
    let mut s: String = frame
        .iter()
        .take(limit)
        .flat_map(|&b| std::ascii::escape_default(b))
        .map(char::from)
        .collect();
    if frame.len() > limit {
        s.push_str("...");
    }
    s
}

/// Format raw text as a suffix like ` | +CLIP: 12345\r` (empty if no text).
fn format_raw_suffix(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    format!(" | {raw}")
}

pub type Result<T> = std::result::Result<T, WireError>;
