//! The error type of every provider call.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What went wrong talking to a DNS provider.
///
/// Every variant names the provider it came from. `raw_message` fields keep the
/// provider's own wording for display; nothing branches on it.
///
/// `NetworkError`, `Timeout` and `RateLimited` are transient. They are only
/// retried when a provider is built with a non-zero `max_retries`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum ProviderError {
    /// Connection failures and gateway errors (HTTP 502-504).
    NetworkError { provider: String, detail: String },

    Timeout { provider: String, detail: String },

    RateLimited {
        provider: String,
        /// Seconds, from `Retry-After`.
        retry_after: Option<u64>,
        raw_message: Option<String>,
    },

    /// Wrong or expired credentials, or a missing second factor.
    InvalidCredentials {
        provider: String,
        raw_message: Option<String>,
    },

    PermissionDenied {
        provider: String,
        raw_message: Option<String>,
    },

    /// Account limits reached; not transient.
    QuotaExceeded {
        provider: String,
        raw_message: Option<String>,
    },

    ZoneNotFound {
        provider: String,
        zone: String,
        raw_message: Option<String>,
    },

    ZoneExists {
        provider: String,
        zone: String,
        raw_message: Option<String>,
    },

    /// `record_id` is the provider id, or `name/TYPE` where records have none.
    RecordNotFound {
        provider: String,
        record_id: String,
        raw_message: Option<String>,
    },

    RecordExists {
        provider: String,
        record_name: String,
        raw_message: Option<String>,
    },

    InvalidParameter {
        provider: String,
        param: String,
        detail: String,
    },

    UnsupportedRecordType {
        provider: String,
        record_type: String,
    },

    /// The API has no way to do this (e.g. `delete_zone` on `TransIP`).
    Unsupported { provider: String, operation: String },

    /// The response did not have the expected shape.
    ParseError { provider: String, detail: String },

    SerializationError { provider: String, detail: String },

    /// An API error without a more specific mapping.
    Unknown {
        provider: String,
        raw_code: Option<String>,
        raw_message: String,
    },
}

impl ProviderError {
    /// Whether the error comes from the request or the account state (log at
    /// `warn`) rather than from a fault (log at `error`).
    #[must_use]
    pub fn is_expected(&self) -> bool {
        !matches!(
            self,
            Self::NetworkError { .. }
                | Self::Timeout { .. }
                | Self::RateLimited { .. }
                | Self::ParseError { .. }
                | Self::SerializationError { .. }
                | Self::Unknown { .. }
        )
    }

    pub fn provider(&self) -> &str {
        match self {
            Self::NetworkError { provider, .. }
            | Self::Timeout { provider, .. }
            | Self::RateLimited { provider, .. }
            | Self::InvalidCredentials { provider, .. }
            | Self::PermissionDenied { provider, .. }
            | Self::QuotaExceeded { provider, .. }
            | Self::ZoneNotFound { provider, .. }
            | Self::ZoneExists { provider, .. }
            | Self::RecordNotFound { provider, .. }
            | Self::RecordExists { provider, .. }
            | Self::InvalidParameter { provider, .. }
            | Self::UnsupportedRecordType { provider, .. }
            | Self::Unsupported { provider, .. }
            | Self::ParseError { provider, .. }
            | Self::SerializationError { provider, .. }
            | Self::Unknown { provider, .. } => provider,
        }
    }

    fn raw_message(&self) -> Option<&str> {
        match self {
            Self::InvalidCredentials { raw_message, .. }
            | Self::PermissionDenied { raw_message, .. }
            | Self::QuotaExceeded { raw_message, .. }
            | Self::ZoneNotFound { raw_message, .. }
            | Self::ZoneExists { raw_message, .. } => raw_message.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] ", self.provider())?;
        match self {
            Self::NetworkError { detail, .. } => write!(f, "network error: {detail}")?,
            Self::Timeout { detail, .. } => write!(f, "request timed out: {detail}")?,
            Self::RateLimited {
                retry_after: Some(secs),
                ..
            } => write!(f, "rate limited, retry after {secs}s")?,
            Self::RateLimited { .. } => f.write_str("rate limited")?,
            Self::InvalidCredentials { .. } => f.write_str("invalid credentials")?,
            Self::PermissionDenied { .. } => f.write_str("permission denied")?,
            Self::QuotaExceeded { .. } => f.write_str("quota exceeded")?,
            Self::ZoneNotFound { zone, .. } => write!(f, "zone {zone} not found")?,
            Self::ZoneExists { zone, .. } => write!(f, "zone {zone} already exists")?,
            Self::RecordNotFound { record_id, .. } => write!(f, "record {record_id} not found")?,
            Self::RecordExists { record_name, .. } => {
                write!(f, "record {record_name} already exists")?;
            }
            Self::InvalidParameter { param, detail, .. } => {
                write!(f, "invalid {param}: {detail}")?;
            }
            Self::UnsupportedRecordType { record_type, .. } => {
                write!(f, "record type {record_type} not supported")?;
            }
            Self::Unsupported { operation, .. } => write!(f, "{operation} not supported")?,
            Self::ParseError { detail, .. } => write!(f, "unexpected response: {detail}")?,
            Self::SerializationError { detail, .. } => {
                write!(f, "cannot encode request: {detail}")?;
            }
            Self::Unknown {
                raw_code: Some(code),
                raw_message,
                ..
            } => write!(f, "{raw_message} (code {code})")?,
            Self::Unknown { raw_message, .. } => f.write_str(raw_message)?,
        }
        match self.raw_message() {
            Some(msg) => write!(f, " ({msg})"),
            None => Ok(()),
        }
    }
}

impl std::error::Error for ProviderError {}

pub type Result<T> = std::result::Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn zone_missing(raw: Option<&str>) -> ProviderError {
        ProviderError::ZoneNotFound {
            provider: "hetzner".into(),
            zone: "example.com".into(),
            raw_message: raw.map(Into::into),
        }
    }

    #[test]
    fn messages_name_provider_and_subject() {
        assert_eq!(
            zone_missing(None).to_string(),
            "[hetzner] zone example.com not found"
        );
        assert_eq!(
            zone_missing(Some("Zone not found")).to_string(),
            "[hetzner] zone example.com not found (Zone not found)"
        );
        let unsupported = ProviderError::Unsupported {
            provider: "transip".into(),
            operation: "delete_zone".into(),
        };
        assert_eq!(unsupported.to_string(), "[transip] delete_zone not supported");
    }

    #[test]
    fn rate_limit_mentions_wait() {
        let e = ProviderError::RateLimited {
            provider: "hetznercloud".into(),
            retry_after: Some(30),
            raw_message: None,
        };
        assert_eq!(e.to_string(), "[hetznercloud] rate limited, retry after 30s");
    }

    #[test]
    fn unknown_keeps_api_code() {
        let e = ProviderError::Unknown {
            provider: "inwx".into(),
            raw_code: Some("2400".into()),
            raw_message: "Command failed".into(),
        };
        assert_eq!(e.to_string(), "[inwx] Command failed (code 2400)");
    }

    #[test]
    fn serialized_with_code_tag() {
        let json = serde_json::to_value(zone_missing(None)).unwrap();
        assert_eq!(json["code"], "ZoneNotFound");
        assert_eq!(json["zone"], "example.com");

        let back: ProviderError = serde_json::from_value(json).unwrap();
        assert!(matches!(back, ProviderError::ZoneNotFound { zone, .. } if zone == "example.com"));
    }

    #[test]
    fn faults_are_not_expected() {
        assert!(zone_missing(None).is_expected());
        assert!(
            ProviderError::InvalidCredentials {
                provider: "inwx".into(),
                raw_message: None,
            }
            .is_expected()
        );
        assert!(
            !ProviderError::Timeout {
                provider: "inwx".into(),
                detail: "30s".into(),
            }
            .is_expected()
        );
        assert!(
            !ProviderError::ParseError {
                provider: "inwx".into(),
                detail: "eof".into(),
            }
            .is_expected()
        );
        assert_eq!(zone_missing(None).provider(), "hetzner");
    }
}
