use std::fmt;

use thiserror::Error;

/// One removable entry found on a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemHandle {
    /// Position on the page, starting at 0.
    pub index: usize,
    /// Absolute location the removal control points at.
    pub target: String,
    pub label: Option<String>,
}

/// A fetched and decoded listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedPage {
    /// Location after redirects.
    pub location: String,
    pub html: String,
    pub encoding_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("listing markup missing: selector {selector:?} matched nothing")]
    UnexpectedShape { selector: String },
    #[error("invalid selector {selector:?}: {message}")]
    InvalidSelector { selector: String, message: String },
    #[error("invalid page location {location:?}")]
    InvalidLocation { location: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("removal of {target} failed: {kind}")]
pub struct RemovalError {
    pub target: String,
    pub kind: FailureKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("navigation to {location} failed: {message}")]
pub struct NavigationError {
    pub location: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    UnsupportedContentType { content_type: String },
    Decode { encoding: String },
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::UnsupportedContentType { content_type } => {
                write!(f, "unsupported content type {content_type}")
            }
            FailureKind::Decode { encoding } => write!(f, "could not decode as {encoding}"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
