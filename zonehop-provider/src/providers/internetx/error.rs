//! `AutoDNS` error mapping
//!
//! The raw code is the HTTP status; the message starts with the `AutoDNS` message
//! code when one was returned (e.g. `EF02022: Zone already exists.`).

use crate::error::ProviderError;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::InternetxProvider;

impl ProviderErrorMapper for InternetxProvider {
    fn provider_name(&self) -> &'static str {
        "internetx"
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError {
        let lower = raw.message.to_ascii_lowercase();
        let not_found = lower.contains("not found") || lower.contains("does not exist");

        match raw.code.as_deref() {
            Some("401") => ProviderError::InvalidCredentials {
                provider: self.provider_name().to_string(),
                raw_message: Some(raw.message),
            },

            Some("403") => ProviderError::PermissionDenied {
                provider: self.provider_name().to_string(),
                raw_message: Some(raw.message),
            },

            Some("429") => ProviderError::RateLimited {
                provider: self.provider_name().to_string(),
                retry_after: None,
                raw_message: Some(raw.message),
            },

            Some(code) if code == "404" || not_found => match (context.record_id, context.zone) {
                (Some(record_id), _) => ProviderError::RecordNotFound {
                    provider: self.provider_name().to_string(),
                    record_id,
                    raw_message: Some(raw.message),
                },
                (None, Some(zone)) => ProviderError::ZoneNotFound {
                    provider: self.provider_name().to_string(),
                    zone,
                    raw_message: Some(raw.message),
                },
                (None, None) => self.unknown_error(raw),
            },

            Some(_) if lower.contains("already exists") => match context.record_name {
                Some(record_name) => ProviderError::RecordExists {
                    provider: self.provider_name().to_string(),
                    record_name,
                    raw_message: Some(raw.message),
                },
                None => ProviderError::ZoneExists {
                    provider: self.provider_name().to_string(),
                    zone: context.zone.unwrap_or_else(|| "<unknown>".to_string()),
                    raw_message: Some(raw.message),
                },
            },

            Some("400") => ProviderError::InvalidParameter {
                provider: self.provider_name().to_string(),
                param: context.record_name.unwrap_or_else(|| "request".to_string()),
                detail: raw.message,
            },

            _ => self.unknown_error(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> InternetxProvider {
        InternetxProvider::new(String::new(), String::new(), "4".to_string())
    }

    #[test]
    fn unauthorized() {
        let err = provider().map_error(
            RawApiError::with_code("401", "EF01000: Login failed."),
            ErrorContext::default(),
        );
        assert!(matches!(err, ProviderError::InvalidCredentials { .. }));
    }

    #[test]
    fn missing_zone_by_message() {
        let err = provider().map_error(
            RawApiError::with_code("400", "EF02023: Zone example.com not found."),
            ErrorContext::zone("example.com"),
        );
        assert!(matches!(err, ProviderError::ZoneNotFound { zone, .. } if zone == "example.com"));
    }

    #[test]
    fn existing_zone_and_record() {
        let p = provider();
        let zone = p.map_error(
            RawApiError::with_code("400", "Zone already exists."),
            ErrorContext::zone("example.com"),
        );
        assert!(matches!(zone, ProviderError::ZoneExists { .. }));

        let record = p.map_error(
            RawApiError::with_code("400", "Resource record already exists."),
            ErrorContext::record("example.com", "www", None),
        );
        assert!(matches!(record, ProviderError::RecordExists { record_name, .. } if record_name == "www"));
    }

    #[test]
    fn other_bad_request_is_invalid_parameter() {
        let err = provider().map_error(
            RawApiError::with_code("400", "EF02050: Invalid value."),
            ErrorContext::record("example.com", "www", None),
        );
        assert!(matches!(err, ProviderError::InvalidParameter { param, .. } if param == "www"));
    }

    #[test]
    fn server_error_is_unknown() {
        let err = provider().map_error(
            RawApiError::with_code("500", "HTTP 500"),
            ErrorContext::default(),
        );
        assert!(matches!(err, ProviderError::Unknown { .. }));
    }
}
