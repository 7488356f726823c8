//! Error taxonomy observed on the FOTA API

use std::fmt;

/// Classification of a non-success HTTP status returned by the FOTA API.
///
/// The harness never produces these locally; they describe what the remote
/// service answered so scenarios can assert on the class of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    /// 400 - invalid pagination/query parameters or malformed body
    BadRequest,
    /// 401 - missing, invalid or expired credentials
    AuthRequired,
    /// 403 - signature mismatch on a signed download
    Forbidden,
    /// 404 - unknown route or resource
    NotFound,
    /// 405 - wrong HTTP verb on a known route
    MethodNotAllowed,
    /// Any other status
    Other(u16),
}

impl ApiErrorKind {
    /// Classify an HTTP status code
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            401 => Self::AuthRequired,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            405 => Self::MethodNotAllowed,
            other => Self::Other(other),
        }
    }

    /// Returns the HTTP status code for this kind
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::AuthRequired => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::MethodNotAllowed => 405,
            Self::Other(status) => *status,
        }
    }
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadRequest => write!(f, "BadRequest"),
            Self::AuthRequired => write!(f, "AuthRequired"),
            Self::Forbidden => write!(f, "Forbidden"),
            Self::NotFound => write!(f, "NotFound"),
            Self::MethodNotAllowed => write!(f, "MethodNotAllowed"),
            Self::Other(status) => write!(f, "HTTP {}", status),
        }
    }
}
