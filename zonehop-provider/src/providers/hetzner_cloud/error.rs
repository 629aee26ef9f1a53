//! Hetzner Cloud error mapping
//!
//! Reference: <https://docs.hetzner.cloud/reference/cloud#errors>

use crate::error::ProviderError;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::HetznerCloudProvider;

impl ProviderErrorMapper for HetznerCloudProvider {
    fn provider_name(&self) -> &'static str {
        "hetznercloud"
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError {
        match raw.code.as_deref() {
            Some("unauthorized") => ProviderError::InvalidCredentials {
                provider: self.provider_name().to_string(),
                raw_message: Some(raw.message),
            },

            Some("forbidden" | "protected") => ProviderError::PermissionDenied {
                provider: self.provider_name().to_string(),
                raw_message: Some(raw.message),
            },

            Some("not_found") => match (context.record_id, context.zone) {
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

            Some("uniqueness_error") => match context.record_name {
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

            Some("invalid_input" | "json_error") => ProviderError::InvalidParameter {
                provider: self.provider_name().to_string(),
                param: context.record_name.unwrap_or_else(|| "request".to_string()),
                detail: raw.message,
            },

            Some("rate_limit_exceeded") => ProviderError::RateLimited {
                provider: self.provider_name().to_string(),
                retry_after: None,
                raw_message: Some(raw.message),
            },

            Some("resource_limit_exceeded") => ProviderError::QuotaExceeded {
                provider: self.provider_name().to_string(),
                raw_message: Some(raw.message),
            },

            Some("maintenance" | "service_error" | "server_error" | "timeout") => {
                ProviderError::NetworkError {
                    provider: self.provider_name().to_string(),
                    detail: raw.message,
                }
            }

            _ => self.unknown_error(raw),
        }
    }
}
