//! Keeping response bodies and credentials out of debug logs
//!
//! Bodies can hold DKIM keys, ACME tokens and session data, so logs only get a
//! bounded prefix of them.

/// Bytes of a body kept in a log line
const LOG_PREFIX_BYTES: usize = 256;

/// `s` itself when short, else its first `LOG_PREFIX_BYTES` (on a char boundary)
/// followed by the full length.
pub fn truncate_for_log(s: &str) -> String {
    if s.len() <= LOG_PREFIX_BYTES {
        return s.to_string();
    }
    let cut = s
        .char_indices()
        .map(|(i, _)| i)
        .take_while(|&i| i <= LOG_PREFIX_BYTES)
        .last()
        .unwrap_or(0);
    format!("{}... ({} bytes)", &s[..cut], s.len())
}

/// Only the length of a secret.
pub fn mask_secret(secret: &str) -> String {
    format!("<{} chars>", secret.chars().count())
}
