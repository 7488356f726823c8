//! Explicit credentials for a single request

use std::fmt;

use fota_core::token::redact;

/// What to put in the `Authorization` header.
///
/// Every raw request takes one of these so a scenario can send a valid
/// token, a corrupted one, an empty header or no header at all.
#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    /// `Authorization: Bearer <token>`
    Bearer(String),
    /// Header value sent verbatim, e.g. a token without the scheme
    Raw(String),
    /// Header present with an empty value
    Empty,
    /// Header omitted
    None,
}

impl Auth {
    pub fn bearer(token: impl Into<String>) -> Self {
        Auth::Bearer(token.into())
    }

    pub fn raw(value: impl Into<String>) -> Self {
        Auth::Raw(value.into())
    }

    /// Value of the `Authorization` header, if one is sent
    pub fn header_value(&self) -> Option<String> {
        match self {
            Auth::Bearer(token) => Some(format!("Bearer {}", token)),
            Auth::Raw(value) => Some(value.clone()),
            Auth::Empty => Some(String::new()),
            Auth::None => None,
        }
    }
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Auth::Bearer(token) => write!(f, "Bearer({})", redact(token)),
            Auth::Raw(value) => write!(f, "Raw({})", redact(value)),
            Auth::Empty => f.write_str("Empty"),
            Auth::None => f.write_str("None"),
        }
    }
}
