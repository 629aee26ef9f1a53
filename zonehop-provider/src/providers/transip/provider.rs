//! `TransIP` `DnsProvider` and `ReplaceRecordSet` implementations

use async_trait::async_trait;

use crate::error::{ProviderError, Result};
use crate::providers::common::{normalize_domain_name, parse_record_type, split_priority};
use crate::record_set;
use crate::traits::{DnsProvider, ErrorContext, ProviderErrorMapper, ReplaceRecordSet};
use crate::types::{
    CreateRecordRequest, CreateZoneRequest, DnsRecord, FieldType, ProviderCredentialField,
    ProviderFeatures, ProviderLimits, ProviderMetadata, ProviderType, Zone,
};

use super::types::{DnsEntries, DnsEntry, DomainResponse, DomainsResponse, NameserversResponse};
use super::{DEFAULT_TTL, PAGE_SIZE, TransipProvider};

impl TransipProvider {
    fn domain_path(zone: &str) -> String {
        format!("/domains/{}", urlencoding::encode(&normalize_domain_name(zone)))
    }

    /// Convert an entry. An entry whose type cannot be read is an error, since
    /// the next whole-set write would otherwise drop it.
    fn to_dns_record(&self, entry: DnsEntry) -> Result<DnsRecord> {
        let record_type = parse_record_type(&entry.entry_type, self.provider_name())?;
        let (priority, value) = split_priority(&record_type, &entry.content);
        Ok(DnsRecord {
            id: None,
            name: entry.name,
            record_type,
            value,
            ttl: entry.expire,
            priority,
        })
    }

    fn to_entry(record: &DnsRecord) -> DnsEntry {
        DnsEntry {
            name: record.name.clone(),
            expire: record.ttl,
            entry_type: record.record_type.to_string(),
            content: record.content_with_priority(),
        }
    }
}

#[async_trait]
impl DnsProvider for TransipProvider {
    fn id(&self) -> &'static str {
        "transip"
    }

    fn metadata() -> ProviderMetadata {
        ProviderMetadata {
            id: ProviderType::Transip,
            name: "TransIP".to_string(),
            description: "TransIP REST API v6 (whole record set replacement)".to_string(),
            required_fields: vec![ProviderCredentialField {
                key: "accessToken".to_string(),
                label: "Access Token".to_string(),
                field_type: FieldType::Password,
                placeholder: None,
                help_text: Some("Bearer token from the control panel or /auth".to_string()),
            }],
            optional_fields: Vec::new(),
            features: ProviderFeatures {
                replaces_record_set: true,
                ..ProviderFeatures::default()
            },
            limits: ProviderLimits {
                max_page_size_zones: PAGE_SIZE,
                max_page_size_records: PAGE_SIZE,
            },
        }
    }

    async fn validate_credentials(&self) -> Result<bool> {
        match self
            .get::<DomainsResponse>("/domains?page=1&pageSize=1", ErrorContext::default())
            .await
        {
            Ok(_) => Ok(true),
            Err(ProviderError::InvalidCredentials { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn list_zones(&self) -> Result<Vec<Zone>> {
        let mut zones = Vec::new();
        let mut page = 1u32;

        loop {
            let resp: DomainsResponse = self
                .get(
                    &format!("/domains?page={page}&pageSize={PAGE_SIZE}"),
                    ErrorContext::default(),
                )
                .await?;
            let count = resp.domains.len();
            zones.extend(resp.domains.into_iter().map(|d| Zone::named(d.name)));
            if u32::try_from(count).unwrap_or(u32::MAX) < PAGE_SIZE {
                break;
            }
            page += 1;
        }

        Ok(zones)
    }

    async fn get_zone(&self, zone: &str) -> Result<Zone> {
        let path = Self::domain_path(zone);
        let domain: DomainResponse = self.get(&path, ErrorContext::zone(zone)).await?;
        let ns: NameserversResponse = self
            .get(&format!("{path}/nameservers"), ErrorContext::zone(zone))
            .await?;

        let mut zone = Zone::named(domain.domain.name);
        zone.nameservers = ns.nameservers.into_iter().map(|n| n.hostname).collect();
        Ok(zone)
    }

    async fn zone_exists(&self, zone: &str) -> Result<bool> {
        match self
            .get::<DomainResponse>(&Self::domain_path(zone), ErrorContext::zone(zone))
            .await
        {
            Ok(_) => Ok(true),
            Err(ProviderError::ZoneNotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Zones exist only as registered domains; this reports `ZoneExists` for a domain
    /// already in the account and `Unsupported` otherwise.
    async fn create_zone(&self, req: &CreateZoneRequest) -> Result<Zone> {
        if self.zone_exists(&req.name).await? {
            return Err(self.zone_already_exists(&req.name));
        }
        Err(self.unsupported("create_zone"))
    }

    async fn delete_zone(&self, _zone: &str) -> Result<()> {
        Err(self.unsupported("delete_zone"))
    }

    async fn list_records(&self, zone: &str) -> Result<Vec<DnsRecord>> {
        let resp: DnsEntries = self
            .get(&format!("{}/dns", Self::domain_path(zone)), ErrorContext::zone(zone))
            .await?;
        resp.dns_entries
            .into_iter()
            .map(|entry| self.to_dns_record(entry))
            .collect()
    }

    async fn create_record(&self, zone: &str, req: &CreateRecordRequest) -> Result<DnsRecord> {
        record_set::add_record(self, zone, req, DEFAULT_TTL).await
    }

    async fn update_record(
        &self,
        zone: &str,
        record: &DnsRecord,
        req: &CreateRecordRequest,
    ) -> Result<DnsRecord> {
        record_set::replace_record(self, zone, record, req, DEFAULT_TTL).await
    }

    async fn delete_record(&self, zone: &str, record: &DnsRecord) -> Result<()> {
        record_set::remove_record(self, zone, record).await
    }
}

#[async_trait]
impl ReplaceRecordSet for TransipProvider {
    async fn fetch_record_set(&self, zone: &str) -> Result<Vec<DnsRecord>> {
        self.list_records(zone).await
    }

    async fn replace_record_set(&self, zone: &str, records: &[DnsRecord]) -> Result<()> {
        let body = DnsEntries {
            dns_entries: records.iter().map(Self::to_entry).collect(),
        };
        self.put(
            &format!("{}/dns", Self::domain_path(zone)),
            &body,
            ErrorContext::zone(zone),
        )
        .await
    }
}
