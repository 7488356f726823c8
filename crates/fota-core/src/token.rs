//! Bearer token display helpers

/// Short, log-safe rendition of a token: the first few characters and the
/// total length
pub fn redact(token: &str) -> String {
    let prefix: String = token.chars().take(6).collect();
    if prefix.len() == token.len() {
        return "***".to_string();
    }
    format!("{}…({} chars)", prefix, token.chars().count())
}
