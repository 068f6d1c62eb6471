//! Error handling

use std::path::{Path, PathBuf};

/// Errors raised by the petmeme jobs and the caption compositor.
#[derive(Debug)]
pub enum MemeError {
    /// A call to a generative service failed: network error, non-success
    /// status or a response body that didn't have the expected shape.
    RemoteCallFailed {
        /// Which call failed, eg `generateContent`
        call: String,
        /// Human readable detail
        message: String,
    },
    /// A directory, file or credential the job needs isn't there
    MissingInput(String),
    /// Image, base64 or font bytes couldn't be decoded
    DecodeFailed(String),
    /// An image couldn't be serialized
    EncodeFailed(String),
    /// A JSON record file (or model output) didn't match the expected schema
    InvalidRecord {
        /// Where the record came from
        path: PathBuf,
        /// What was wrong with it
        message: String,
    },
    /// The caption couldn't be wrapped inside the margins at any permitted
    /// font size. Reported, never fatal.
    LayoutInfeasible {
        /// Font size the caption was rendered at anyway
        font_size: u32,
        /// Widest wrapped line, in pixels
        widest_line: f32,
        /// Width available between the margins, in pixels
        max_width: f32,
    },
    /// Filesystem errors
    Io(std::io::Error),
}

impl MemeError {
    /// Shorthand for a [MemeError::RemoteCallFailed].
    pub fn remote(call: &str, message: impl Into<String>) -> Self {
        MemeError::RemoteCallFailed {
            call: call.to_string(),
            message: message.into(),
        }
    }

    /// Shorthand for a [MemeError::InvalidRecord].
    pub fn invalid_record(path: &Path, message: impl Into<String>) -> Self {
        MemeError::InvalidRecord {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    /// Missing inputs abort a job, everything else is skipped per item.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            MemeError::MissingInput(_) | MemeError::InvalidRecord { .. } | MemeError::Io(_)
        )
    }
}

impl std::fmt::Display for MemeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemeError::RemoteCallFailed { call, message } => {
                write!(f, "Remote call {call} failed: {message}")
            }
            MemeError::MissingInput(what) => write!(f, "Missing input: {what}"),
            MemeError::DecodeFailed(message) => write!(f, "Decode failed: {message}"),
            MemeError::EncodeFailed(message) => write!(f, "Encode failed: {message}"),
            MemeError::InvalidRecord { path, message } => {
                write!(f, "Invalid record in {}: {message}", path.display())
            }
            MemeError::LayoutInfeasible {
                font_size,
                widest_line,
                max_width,
            } => write!(
                f,
                "Caption overflows the margins at {font_size}px ({widest_line:.0}px > {max_width:.0}px)"
            ),
            MemeError::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for MemeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MemeError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for MemeError {
    fn from(err: std::io::Error) -> Self {
        MemeError::Io(err)
    }
}

impl From<reqwest::Error> for MemeError {
    fn from(err: reqwest::Error) -> Self {
        let call = err
            .url()
            .map(|url| url.path().rsplit('/').next().unwrap_or_default().to_string())
            .unwrap_or_else(|| "request".to_string());
        // The URL carries the API key as a query parameter.
        MemeError::RemoteCallFailed {
            call,
            message: err.without_url().to_string(),
        }
    }
}

impl From<base64::DecodeError> for MemeError {
    fn from(err: base64::DecodeError) -> Self {
        MemeError::DecodeFailed(format!("invalid base64 payload: {err}"))
    }
}
