//! INWX error mapping
//!
//! Reference: <https://www.inwx.de/en/help/apidoc/f/ch04.html>
//!
//! Result codes 1000-1999 mean success. The 2xxx range is mapped below; the same
//! "object exists / does not exist" codes serve zones and records, so the
//! [`ErrorContext`] decides which variant is produced.

use crate::error::ProviderError;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::InwxProvider;

impl ProviderErrorMapper for InwxProvider {
    fn provider_name(&self) -> &'static str {
        "inwx"
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError {
        match raw.code.as_deref() {
            // 2200: Authentication error, 2202: Invalid authorization information
            Some("2200" | "2202") => ProviderError::InvalidCredentials {
                provider: self.provider_name().to_string(),
                raw_message: Some(raw.message),
            },

            // 2201: Authorization error
            Some("2201") => ProviderError::PermissionDenied {
                provider: self.provider_name().to_string(),
                raw_message: Some(raw.message),
            },

            // 2302: Object exists
            Some("2302") => match (context.record_name, context.zone) {
                (Some(record_name), _) => ProviderError::RecordExists {
                    provider: self.provider_name().to_string(),
                    record_name,
                    raw_message: Some(raw.message),
                },
                (None, zone) => ProviderError::ZoneExists {
                    provider: self.provider_name().to_string(),
                    zone: zone.unwrap_or_else(|| "<unknown>".to_string()),
                    raw_message: Some(raw.message),
                },
            },

            // 2303: Object does not exist
            Some("2303") => match (context.record_id, context.zone) {
                (Some(record_id), _) => ProviderError::RecordNotFound {
                    provider: self.provider_name().to_string(),
                    record_id,
                    raw_message: Some(raw.message),
                },
                (None, zone) => ProviderError::ZoneNotFound {
                    provider: self.provider_name().to_string(),
                    zone: zone.unwrap_or_else(|| "<unknown>".to_string()),
                    raw_message: Some(raw.message),
                },
            },

            // 2003: Required parameter missing, 2004: Parameter value range error,
            // 2005: Parameter value syntax error, 2308: Data management policy violation
            Some("2003" | "2004" | "2005" | "2308") => ProviderError::InvalidParameter {
                provider: self.provider_name().to_string(),
                param: context.record_name.unwrap_or_else(|| "request".to_string()),
                detail: raw.message,
            },

            // 2502: Session limit exceeded
            Some("2502") => ProviderError::RateLimited {
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

    fn provider() -> InwxProvider {
        InwxProvider::new(String::new(), String::new())
    }

    #[test]
    fn auth_errors() {
        let p = provider();
        for code in ["2200", "2202"] {
            let err = p.map_error(
                RawApiError::with_code(code, "Authentication error"),
                ErrorContext::default(),
            );
            assert!(matches!(err, ProviderError::InvalidCredentials { .. }), "{code}");
        }
    }

    #[test]
    fn object_exists_depends_on_context() {
        let p = provider();
        let zone = p.map_error(
            RawApiError::with_code("2302", "Object exists"),
            ErrorContext::zone("example.com"),
        );
        assert!(matches!(zone, ProviderError::ZoneExists { zone, .. } if zone == "example.com"));

        let record = p.map_error(
            RawApiError::with_code("2302", "Object exists"),
            ErrorContext::record("example.com", "www", None),
        );
        assert!(matches!(
            record,
            ProviderError::RecordExists { record_name, .. } if record_name == "www"
        ));
    }

    #[test]
    fn object_missing_depends_on_context() {
        let p = provider();
        let zone = p.map_error(
            RawApiError::with_code("2303", "Object does not exist"),
            ErrorContext::zone("example.com"),
        );
        assert!(matches!(zone, ProviderError::ZoneNotFound { .. }));

        let record = p.map_error(
            RawApiError::with_code("2303", "Object does not exist"),
            ErrorContext::record("example.com", "www", Some("17")),
        );
        assert!(matches!(
            record,
            ProviderError::RecordNotFound { record_id, .. } if record_id == "17"
        ));
    }

    #[test]
    fn parameter_errors() {
        let p = provider();
        let err = p.map_error(
            RawApiError::with_code("2005", "Parameter value syntax error"),
            ErrorContext::record("example.com", "www", None),
        );
        assert!(matches!(err, ProviderError::InvalidParameter { param, .. } if param == "www"));
    }

    #[test]
    fn unknown_code_falls_back() {
        let p = provider();
        let err = p.map_error(
            RawApiError::with_code("2400", "Command failed"),
            ErrorContext::default(),
        );
        assert!(matches!(
            err,
            ProviderError::Unknown { raw_code: Some(code), .. } if code == "2400"
        ));
    }
}
