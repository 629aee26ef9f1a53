//! `TransIP` error mapping
//!
//! Errors are reported by HTTP status with a free-text `error` message.

use crate::error::ProviderError;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::TransipProvider;

impl ProviderErrorMapper for TransipProvider {
    fn provider_name(&self) -> &'static str {
        "transip"
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError {
        match raw.code.as_deref() {
            Some("401") => ProviderError::InvalidCredentials {
                provider: self.provider_name().to_string(),
                raw_message: Some(raw.message),
            },

            Some("403") => ProviderError::PermissionDenied {
                provider: self.provider_name().to_string(),
                raw_message: Some(raw.message),
            },

            Some("404") => match context.zone {
                Some(zone) => ProviderError::ZoneNotFound {
                    provider: self.provider_name().to_string(),
                    zone,
                    raw_message: Some(raw.message),
                },
                None => self.unknown_error(raw),
            },

            // 406 carries validation failures of the submitted entry list
            Some("400" | "406" | "422") => ProviderError::InvalidParameter {
                provider: self.provider_name().to_string(),
                param: "dnsEntries".to_string(),
                detail: raw.message,
            },

            Some("409") => ProviderError::Unknown {
                provider: self.provider_name().to_string(),
                raw_code: raw.code,
                raw_message: format!("domain is locked or busy: {}", raw.message),
            },

            Some("429") => ProviderError::RateLimited {
                provider: self.provider_name().to_string(),
                retry_after: None,
                raw_message: Some(raw.message),
            },

            _ => self.unknown_error(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> TransipProvider {
        TransipProvider::new(String::new())
    }

    #[test]
    fn unauthorized() {
        let err = provider().map_error(
            RawApiError::with_code("401", "Your access token has expired"),
            ErrorContext::default(),
        );
        assert!(matches!(err, ProviderError::InvalidCredentials { .. }));
    }

    #[test]
    fn missing_domain() {
        let err = provider().map_error(
            RawApiError::with_code("404", "Domain with name 'missing.example' not found"),
            ErrorContext::zone("missing.example"),
        );
        assert!(matches!(err, ProviderError::ZoneNotFound { zone, .. } if zone == "missing.example"));
    }

    #[test]
    fn rejected_entries() {
        let err = provider().map_error(
            RawApiError::with_code("406", "Invalid content for MX entry"),
            ErrorContext::zone("example.com"),
        );
        assert!(matches!(err, ProviderError::InvalidParameter { .. }));
    }

    #[test]
    fn rate_limited() {
        let err = provider().map_error(
            RawApiError::with_code("429", "Rate limit exceeded"),
            ErrorContext::default(),
        );
        assert!(matches!(err, ProviderError::RateLimited { .. }));
    }
}
