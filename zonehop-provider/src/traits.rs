use async_trait::async_trait;

use crate::error::{ProviderError, Result};
use crate::types::{
    BatchCreateFailure, BatchCreateResult, CreateRecordRequest, CreateZoneRequest, DnsRecord,
    ProviderMetadata, Zone,
};

/// Raw API error (internal use)
#[derive(Debug, Clone)]
pub(crate) struct RawApiError {
    /// Error code (format differs per provider)
    pub code: Option<String>,
    /// Original error message
    pub message: String,
}

impl RawApiError {
    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }
}

/// Extra information used while mapping an API error (internal use)
#[derive(Debug, Clone, Default)]
pub(crate) struct ErrorContext {
    /// Record name (for `RecordExists` and similar)
    pub record_name: Option<String>,
    /// Record id (for `RecordNotFound` and similar)
    pub record_id: Option<String>,
    /// Zone name (for `ZoneNotFound` / `ZoneExists`)
    pub zone: Option<String>,
}

impl ErrorContext {
    pub fn zone(zone: &str) -> Self {
        Self {
            zone: Some(zone.to_string()),
            ..Self::default()
        }
    }

    pub fn record(zone: &str, record_name: &str, record_id: Option<&str>) -> Self {
        Self {
            record_name: Some(record_name.to_string()),
            record_id: record_id.map(ToString::to_string),
            zone: Some(zone.to_string()),
        }
    }
}

/// Provider error mapping (internal use)
///
/// Each provider implements this to turn raw API errors into [`ProviderError`].
pub(crate) trait ProviderErrorMapper {
    /// Provider identifier
    fn provider_name(&self) -> &'static str;

    /// Map a raw API error to the unified error type
    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError;

    /// Shortcut: parse error
    fn parse_error(&self, detail: impl ToString) -> ProviderError {
        ProviderError::ParseError {
            provider: self.provider_name().to_string(),
            detail: detail.to_string(),
        }
    }

    /// Shortcut: unknown error (fallback)
    fn unknown_error(&self, raw: RawApiError) -> ProviderError {
        ProviderError::Unknown {
            provider: self.provider_name().to_string(),
            raw_code: raw.code,
            raw_message: raw.message,
        }
    }

    /// Shortcut: operation without an API equivalent
    fn unsupported(&self, operation: &str) -> ProviderError {
        ProviderError::Unsupported {
            provider: self.provider_name().to_string(),
            operation: operation.to_string(),
        }
    }

    /// Shortcut: zone missing from the account
    fn zone_not_found(&self, zone: &str) -> ProviderError {
        ProviderError::ZoneNotFound {
            provider: self.provider_name().to_string(),
            zone: zone.to_string(),
            raw_message: None,
        }
    }

    /// Shortcut: zone already in the account
    fn zone_already_exists(&self, zone: &str) -> ProviderError {
        ProviderError::ZoneExists {
            provider: self.provider_name().to_string(),
            zone: zone.to_string(),
            raw_message: None,
        }
    }
}

/// DNS provider capability.
///
/// Zone arguments are zone names (`"example.com"`); record names are relative to the
/// zone with `"@"` for the apex. Implementations issue requests one at a time.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Provider identifier
    fn id(&self) -> &'static str;

    /// Provider metadata (type level)
    ///
    /// Returns the provider's name, description and credential fields.
    /// Callable before a provider instance exists.
    fn metadata() -> ProviderMetadata
    where
        Self: Sized;

    /// Whether the credentials are accepted.
    ///
    /// Authentication failures yield `Ok(false)`; transport failures are returned as errors.
    async fn validate_credentials(&self) -> Result<bool>;

    /// All zones in the account (every page). Empty when the account has none.
    async fn list_zones(&self) -> Result<Vec<Zone>>;

    /// A single zone by name, [`ProviderError::ZoneNotFound`] when absent.
    async fn get_zone(&self, zone: &str) -> Result<Zone>;

    /// Whether a zone exists in the account.
    async fn zone_exists(&self, zone: &str) -> Result<bool> {
        let wanted = zone.trim_end_matches('.');
        Ok(self
            .list_zones()
            .await?
            .iter()
            .any(|z| z.name.eq_ignore_ascii_case(wanted)))
    }

    /// Create a zone, [`ProviderError::ZoneExists`] when the name is taken.
    async fn create_zone(&self, req: &CreateZoneRequest) -> Result<Zone>;

    /// Delete a zone and all of its records.
    async fn delete_zone(&self, zone: &str) -> Result<()>;

    /// All records of a zone. Order is unspecified.
    async fn list_records(&self, zone: &str) -> Result<Vec<DnsRecord>>;

    /// Add one record without disturbing the others.
    async fn create_record(&self, zone: &str, req: &CreateRecordRequest) -> Result<DnsRecord>;

    /// Replace `record` (as returned by [`list_records`](Self::list_records)) with `req`.
    async fn update_record(
        &self,
        zone: &str,
        record: &DnsRecord,
        req: &CreateRecordRequest,
    ) -> Result<DnsRecord>;

    /// Delete one record.
    ///
    /// Providers match on whatever identity they have: the record id, the `name/TYPE`
    /// RRSet key plus value, or the name/type/content tuple.
    async fn delete_record(&self, zone: &str, record: &DnsRecord) -> Result<()>;

    /// Full record set as served by the provider's zone transfer or zone file export.
    ///
    /// Defaults to [`list_records`](Self::list_records).
    async fn zone_transfer(&self, zone: &str) -> Result<Vec<DnsRecord>> {
        self.list_records(zone).await
    }

    /// Create several records one after another.
    ///
    /// Failures are collected per request; the remaining requests still run.
    async fn batch_create_records(
        &self,
        zone: &str,
        requests: &[CreateRecordRequest],
    ) -> Result<BatchCreateResult> {
        let mut created_records = Vec::new();
        let mut failures = Vec::new();

        for (i, req) in requests.iter().enumerate() {
            match self.create_record(zone, req).await {
                Ok(record) => created_records.push(record),
                Err(e) => failures.push(BatchCreateFailure {
                    request_index: i,
                    record_name: req.name.clone(),
                    reason: e.to_string(),
                }),
            }
        }

        Ok(BatchCreateResult {
            success_count: created_records.len(),
            failed_count: failures.len(),
            created_records,
            failures,
        })
    }

    /// End the API session, if the provider keeps one.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Providers whose API only accepts the complete record set of a zone.
///
/// Single-record changes are read-modify-write cycles layered on top of this
/// (see [`crate::record_set`]); they are not atomic against concurrent writers.
#[async_trait]
pub trait ReplaceRecordSet: DnsProvider {
    /// Read the complete record set.
    async fn fetch_record_set(&self, zone: &str) -> Result<Vec<DnsRecord>>;

    /// Overwrite the complete record set with `records`.
    async fn replace_record_set(&self, zone: &str, records: &[DnsRecord]) -> Result<()>;
}
