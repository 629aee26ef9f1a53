//! Shared helpers for provider implementations

use std::time::Duration;

use reqwest::{Client, ClientBuilder};

use crate::error::{ProviderError, Result};
use crate::types::DnsRecordType;

// ============ HTTP Client ============

/// Default connect timeout (seconds)
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// Default request timeout (seconds)
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client builder with the default timeouts applied
pub fn http_client_builder() -> ClientBuilder {
    Client::builder()
        .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
        .user_agent(concat!("zonehop/", env!("CARGO_PKG_VERSION")))
}

/// Build a client, falling back to reqwest defaults if the TLS backend refuses the builder
pub fn build_client(builder: ClientBuilder) -> Client {
    builder.build().unwrap_or_else(|e| {
        log::warn!("Failed to build configured HTTP client, using defaults: {e}");
        Client::new()
    })
}

/// HTTP client with timeouts
pub fn create_http_client() -> Client {
    build_client(http_client_builder())
}

// ============ Record types ============

/// Parse a record type mnemonic
pub fn parse_record_type(record_type: &str, provider: &str) -> Result<DnsRecordType> {
    record_type
        .parse()
        .map_err(|raw: String| ProviderError::UnsupportedRecordType {
            provider: provider.to_string(),
            record_type: raw,
        })
}

/// Reject record types outside a provider's allow-list
pub fn ensure_supported_type(
    record_type: &DnsRecordType,
    allowed: &[DnsRecordType],
    provider: &str,
) -> Result<()> {
    if allowed.contains(record_type) {
        Ok(())
    } else {
        Err(ProviderError::UnsupportedRecordType {
            provider: provider.to_string(),
            record_type: record_type.to_string(),
        })
    }
}

// ============ Priority ============

/// Split a leading `"<priority> "` off MX/SRV content.
///
/// `"10 mail.example.com"` becomes `(Some(10), "mail.example.com")`. Other record types,
/// and content without a leading integer, pass through unchanged with `None`.
pub fn split_priority(record_type: &DnsRecordType, value: &str) -> (Option<u16>, String) {
    if !record_type.has_priority() {
        return (None, value.to_string());
    }
    let trimmed = value.trim();
    if let Some((head, rest)) = trimmed.split_once(char::is_whitespace)
        && let Ok(prio) = head.parse::<u16>()
    {
        let rest = rest.trim();
        if !rest.is_empty() {
            return (Some(prio), rest.to_string());
        }
    }
    (None, value.to_string())
}

// ============ Names ============

/// Strip the trailing dot of a domain name
pub fn normalize_domain_name(name: &str) -> String {
    name.trim_end_matches('.').to_string()
}

/// Full name to zone-relative name
/// e.g. "www.example.com" + "example.com" -> "www"
/// e.g. "example.com" + "example.com" -> "@"
pub fn full_name_to_relative(full_name: &str, zone_name: &str) -> String {
    let full = normalize_domain_name(full_name);
    let zone = normalize_domain_name(zone_name);

    if full.is_empty() || full == "@" || full.eq_ignore_ascii_case(&zone) {
        "@".to_string()
    } else if full.len() > zone.len() + 1
        && full.as_bytes()[full.len() - zone.len() - 1] == b'.'
        && full[full.len() - zone.len()..].eq_ignore_ascii_case(&zone)
    {
        full[..full.len() - zone.len() - 1].to_string()
    } else {
        full
    }
}

/// Zone-relative name to full name
/// e.g. "www" + "example.com" -> "www.example.com"
/// e.g. "@" + "example.com" -> "example.com"
pub fn relative_to_full_name(relative_name: &str, zone_name: &str) -> String {
    let zone = normalize_domain_name(zone_name);

    if relative_name == "@" || relative_name.is_empty() {
        zone
    } else {
        format!("{relative_name}.{zone}")
    }
}

/// Whether a record name denotes the zone apex (`@`, empty, or the zone itself)
pub fn is_apex(name: &str, zone_name: &str) -> bool {
    full_name_to_relative(name, zone_name) == "@"
}

// ============ TXT quoting ============

/// Longest character-string a TXT record can hold, in bytes
const TXT_CHUNK_BYTES: usize = 255;

/// Quote TXT content as one or more character-strings, escaping embedded quotes
///
/// Content longer than 255 bytes (DKIM keys) becomes `"..." "..."`, cut on
/// character boundaries. Content that is already quoted is returned as is.
pub fn quote_txt(value: &str) -> String {
    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        return value.to_string();
    }

    let mut chunks = Vec::new();
    let mut rest = value;
    while rest.len() > TXT_CHUNK_BYTES {
        let mut cut = TXT_CHUNK_BYTES;
        while !rest.is_char_boundary(cut) {
            cut -= 1;
        }
        let (head, tail) = rest.split_at(cut);
        chunks.push(head);
        rest = tail;
    }
    chunks.push(rest);

    chunks
        .iter()
        .map(|chunk| format!("\"{}\"", chunk.replace('\\', "\\\\").replace('"', "\\\"")))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Join the quoted character-strings of TXT content into plain text
///
/// `"v=spf1 " "-all"` becomes `v=spf1 -all`. Unquoted content is returned as is.
pub fn unquote_txt(value: &str) -> String {
    let trimmed = value.trim();
    if !trimmed.starts_with('"') {
        return trimmed.to_string();
    }

    let mut out = String::with_capacity(trimmed.len());
    let mut in_quotes = false;
    let mut chars = trimmed.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => in_quotes = !in_quotes,
            '\\' if in_quotes => {
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            c if in_quotes => out.push(c),
            _ => {}
        }
    }
    out
}
