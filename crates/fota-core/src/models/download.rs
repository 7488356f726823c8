//! Signed firmware download links

use serde::{Deserialize, Serialize};

/// Components of a signed `firmware/download` link.
///
/// Every field is optional on the wire so scenarios can drop or corrupt
/// parts of a valid link and observe how the service gates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedDownload {
    /// Firmware file name, the last path segment
    pub file: String,
    #[serde(default)]
    pub id: Option<u64>,
    /// Expiry as unix seconds
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub sig: Option<String>,
}

impl SignedDownload {
    pub fn new(file: impl Into<String>, id: u64, exp: i64, sig: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            id: Some(id),
            exp: Some(exp),
            sig: Some(sig.into()),
        }
    }

    /// Query parameters in `id`, `exp`, `sig` order, omitting absent ones
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(3);
        if let Some(id) = self.id {
            pairs.push(("id", id.to_string()));
        }
        if let Some(exp) = self.exp {
            pairs.push(("exp", exp.to_string()));
        }
        if let Some(sig) = &self.sig {
            pairs.push(("sig", sig.clone()));
        }
        pairs
    }

    pub fn without_id(&self) -> Self {
        Self {
            id: None,
            ..self.clone()
        }
    }

    pub fn with_exp(&self, exp: i64) -> Self {
        Self {
            exp: Some(exp),
            ..self.clone()
        }
    }

    /// Same link with one extra character appended to the signature
    pub fn with_tampered_sig(&self) -> Self {
        let sig = format!("{}F", self.sig.as_deref().unwrap_or_default());
        Self {
            sig: Some(sig),
            ..self.clone()
        }
    }

    pub fn is_expired_at(&self, now_unix: i64) -> bool {
        self.exp.map(|exp| exp <= now_unix).unwrap_or(false)
    }
}
