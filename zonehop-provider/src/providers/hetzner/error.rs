//! Hetzner DNS error mapping
//!
//! The API reports errors by HTTP status; the message is free text.

use crate::error::ProviderError;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::HetznerProvider;

impl ProviderErrorMapper for HetznerProvider {
    fn provider_name(&self) -> &'static str {
        "hetzner"
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError {
        let already_exists = raw.message.to_ascii_lowercase().contains("already");
        match raw.code.as_deref() {
            Some("401") => ProviderError::InvalidCredentials {
                provider: self.provider_name().to_string(),
                raw_message: Some(raw.message),
            },

            Some("403") => ProviderError::PermissionDenied {
                provider: self.provider_name().to_string(),
                raw_message: Some(raw.message),
            },

            Some("404") => match (context.record_id, context.zone) {
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

            // 409 Conflict; 422 is also used for "zone already exists"
            Some(code @ ("409" | "422"))
                if context.record_name.is_none() && (code == "409" || already_exists) =>
            {
                ProviderError::ZoneExists {
                    provider: self.provider_name().to_string(),
                    zone: context.zone.unwrap_or_else(|| "<unknown>".to_string()),
                    raw_message: Some(raw.message),
                }
            }
            Some("409") => ProviderError::RecordExists {
                provider: self.provider_name().to_string(),
                record_name: context.record_name.unwrap_or_default(),
                raw_message: Some(raw.message),
            },

            Some("422") => ProviderError::InvalidParameter {
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

    fn provider() -> HetznerProvider {
        HetznerProvider::new(String::new())
    }

    #[test]
    fn unauthorized() {
        let err = provider().map_error(
            RawApiError::with_code("401", "Invalid authentication credentials"),
            ErrorContext::default(),
        );
        assert!(matches!(err, ProviderError::InvalidCredentials { .. }));
    }

    #[test]
    fn not_found_uses_context() {
        let p = provider();
        let zone = p.map_error(
            RawApiError::with_code("404", "zone not found"),
            ErrorContext::zone("example.com"),
        );
        assert!(matches!(zone, ProviderError::ZoneNotFound { .. }));

        let record = p.map_error(
            RawApiError::with_code("404", "record not found"),
            ErrorContext::record("example.com", "www", Some("abc")),
        );
        assert!(matches!(record, ProviderError::RecordNotFound { record_id, .. } if record_id == "abc"));
    }

    #[test]
    fn duplicate_zone_on_422() {
        let err = provider().map_error(
            RawApiError::with_code("422", "zone name already taken"),
            ErrorContext::zone("example.com"),
        );
        assert!(matches!(err, ProviderError::ZoneExists { zone, .. } if zone == "example.com"));
    }

    #[test]
    fn invalid_record_on_422() {
        let err = provider().map_error(
            RawApiError::with_code("422", "invalid value"),
            ErrorContext::record("example.com", "www", None),
        );
        assert!(matches!(err, ProviderError::InvalidParameter { param, .. } if param == "www"));
    }

    #[test]
    fn duplicate_record_on_409() {
        let err = provider().map_error(
            RawApiError::with_code("409", "conflict"),
            ErrorContext::record("example.com", "www", None),
        );
        assert!(matches!(err, ProviderError::RecordExists { .. }));
    }
}
