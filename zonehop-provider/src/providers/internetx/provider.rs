//! `AutoDNS` `DnsProvider` trait implementation

use async_trait::async_trait;

use crate::error::{ProviderError, Result};
use crate::providers::common::{
    ensure_supported_type, normalize_domain_name, parse_record_type, split_priority,
};
use crate::traits::{DnsProvider, ErrorContext, ProviderErrorMapper};
use crate::types::{
    CreateRecordRequest, CreateZoneRequest, DnsRecord, FieldType, ProviderCredentialField,
    ProviderFeatures, ProviderLimits, ProviderMetadata, ProviderType, Zone,
};

use super::axfr;
use super::types::{
    AutoZone, NameServer, ResourceRecord, SearchFilter, SearchQuery, SearchView, Soa, ZoneStream,
};
use super::{
    DEFAULT_TTL, InternetxProvider, PAGE_SIZE, SOA_EXPIRE, SOA_REFRESH, SOA_RETRY, SOA_TTL,
    SUPPORTED_TYPES,
};

/// System nameservers of an account: `a.ns<id>.net` through `d.ns<id>.net`.
fn system_nameservers(account_id: &str) -> Vec<String> {
    ["a", "b", "c", "d"]
        .iter()
        .map(|host| format!("{host}.ns{account_id}.net"))
        .collect()
}

fn wire_name(name: &str) -> &str {
    if name == "@" { "" } else { name }
}

fn default_soa(origin: &str, email: Option<&str>) -> Soa {
    Soa {
        refresh: SOA_REFRESH,
        retry: SOA_RETRY,
        expire: SOA_EXPIRE,
        ttl: SOA_TTL,
        email: Some(
            email
                .map(ToString::to_string)
                .unwrap_or_else(|| format!("hostmaster@{origin}")),
        ),
    }
}

impl InternetxProvider {
    fn to_zone(zone: AutoZone) -> Zone {
        let record_count = if zone.resource_records.is_empty() {
            None
        } else {
            u32::try_from(zone.resource_records.len()).ok()
        };
        Zone {
            id: zone.origin.clone(),
            name: zone.origin,
            ttl: zone.soa.map(|soa| soa.ttl),
            mode: None,
            nameservers: zone.name_servers.into_iter().map(|ns| ns.name).collect(),
            record_count,
        }
    }

    fn to_dns_record(&self, rr: ResourceRecord, zone_ttl: u32) -> Result<DnsRecord> {
        let record_type = parse_record_type(&rr.record_type, self.provider_name())?;
        let (priority, value) = match rr.pref {
            Some(pref) if record_type.has_priority() => (Some(pref), rr.value),
            _ => split_priority(&record_type, &rr.value),
        };
        Ok(DnsRecord {
            id: None,
            name: if rr.name.is_empty() { "@".to_string() } else { rr.name },
            record_type,
            value,
            ttl: rr.ttl.unwrap_or(zone_ttl),
            priority,
        })
    }

    fn rr_from_request(req: &CreateRecordRequest) -> ResourceRecord {
        ResourceRecord {
            name: wire_name(&req.name).to_string(),
            ttl: Some(req.ttl.unwrap_or(DEFAULT_TTL)),
            record_type: req.record_type.to_string(),
            value: req.value.clone(),
            pref: req.priority.filter(|_| req.record_type.has_priority()),
        }
    }

    fn rr_from_record(record: &DnsRecord) -> ResourceRecord {
        ResourceRecord {
            name: wire_name(&record.name).to_string(),
            ttl: Some(record.ttl),
            record_type: record.record_type.to_string(),
            value: record.value.clone(),
            pref: record.priority.filter(|_| record.record_type.has_priority()),
        }
    }

    async fn search_zones(
        &self,
        origin: Option<&str>,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<AutoZone>> {
        let query = SearchQuery {
            filters: origin
                .map(|value| SearchFilter {
                    key: "name",
                    value,
                    operator: "EQUAL",
                })
                .into_iter()
                .collect(),
            view: SearchView {
                offset,
                limit,
                children: false,
            },
        };
        let ctx = origin.map(ErrorContext::zone).unwrap_or_default();
        self.post("/zone/_search", &query, ctx).await
    }

    /// Zone summary (origin and virtual nameserver), if the zone exists.
    async fn find_zone(&self, origin: &str) -> Result<Option<AutoZone>> {
        let origin = normalize_domain_name(origin);
        Ok(self
            .search_zones(Some(&origin), 0, 1)
            .await?
            .into_iter()
            .find(|z| z.origin.eq_ignore_ascii_case(&origin)))
    }

    /// Full zone including records.
    async fn zone_info(&self, origin: &str) -> Result<AutoZone> {
        let summary = self
            .find_zone(origin)
            .await?
            .ok_or_else(|| self.zone_not_found(origin))?;
        let path = match &summary.virtual_name_server {
            Some(vns) => format!(
                "/zone/{}/{}",
                urlencoding::encode(&summary.origin),
                urlencoding::encode(vns)
            ),
            None => format!("/zone/{}", urlencoding::encode(&summary.origin)),
        };
        self.get::<AutoZone>(&path, ErrorContext::zone(origin))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| self.zone_not_found(origin))
    }

    async fn stream(&self, zone: &str, body: &ZoneStream, ctx: ErrorContext) -> Result<()> {
        let path = format!("/zone/{}/_stream", urlencoding::encode(&normalize_domain_name(zone)));
        self.post::<serde_json::Value, _>(&path, body, ctx)
            .await
            .map(|_| ())
    }

    /// First nameserver of the zone, used when no AXFR server is configured.
    async fn transfer_server(&self, zone: &str) -> Result<String> {
        self.zone_info(zone)
            .await?
            .name_servers
            .into_iter()
            .next()
            .map(|ns| ns.name)
            .ok_or_else(|| ProviderError::InvalidParameter {
                provider: self.provider_name().to_string(),
                param: "axfrServer".to_string(),
                detail: format!("{zone} lists no nameserver to transfer from"),
            })
    }

    /// Nameservers the system would assign, from a zone check without nameservers.
    async fn suggested_nameservers(&self, origin: &str, soa: &Soa) -> Result<Vec<String>> {
        let check = AutoZone {
            origin: origin.to_string(),
            soa: Some(soa.clone()),
            ..AutoZone::default()
        };
        let zones: Vec<AutoZone> = self
            .post("/zone/_check", &check, ErrorContext::zone(origin))
            .await?;
        Ok(zones
            .into_iter()
            .flat_map(|z| z.name_servers)
            .map(|ns| ns.name)
            .collect())
    }

    async fn nameservers_of_existing_zone(&self) -> Result<Vec<String>> {
        let Some(existing) = self.search_zones(None, 0, 1).await?.into_iter().next() else {
            return Ok(Vec::new());
        };
        let info = self.zone_info(&existing.origin).await?;
        Ok(info.name_servers.into_iter().map(|ns| ns.name).collect())
    }

    /// Nameservers for a new zone: zone check, then account convention, then an existing zone.
    async fn resolve_nameservers(&self, origin: &str, soa: &Soa) -> Result<Vec<String>> {
        match self.suggested_nameservers(origin, soa).await {
            Ok(ns) if !ns.is_empty() => return Ok(ns),
            Ok(_) => log::debug!("[internetx] Zone check for {origin} suggested no nameservers"),
            Err(e) => log::warn!("[internetx] Zone check for {origin} failed: {e}"),
        }

        if let Some(account_id) = &self.account_id {
            return Ok(system_nameservers(account_id));
        }

        let ns = self.nameservers_of_existing_zone().await?;
        if ns.is_empty() {
            return Err(ProviderError::InvalidParameter {
                provider: self.provider_name().to_string(),
                param: "nameservers".to_string(),
                detail: format!(
                    "no nameservers given for {origin} and none could be derived from the account"
                ),
            });
        }
        log::info!("[internetx] Using nameservers of an existing zone for {origin}: {ns:?}");
        Ok(ns)
    }
}

#[async_trait]
impl DnsProvider for InternetxProvider {
    fn id(&self) -> &'static str {
        "internetx"
    }

    fn metadata() -> ProviderMetadata {
        ProviderMetadata {
            id: ProviderType::Internetx,
            name: "InternetX AutoDNS".to_string(),
            description: "AutoDNS JSON API (Domainrobot)".to_string(),
            required_fields: vec![
                ProviderCredentialField {
                    key: "username".to_string(),
                    label: "Username".to_string(),
                    field_type: FieldType::Text,
                    placeholder: None,
                    help_text: None,
                },
                ProviderCredentialField {
                    key: "password".to_string(),
                    label: "Password".to_string(),
                    field_type: FieldType::Password,
                    placeholder: None,
                    help_text: None,
                },
            ],
            optional_fields: vec![
                ProviderCredentialField {
                    key: "context".to_string(),
                    label: "Context".to_string(),
                    field_type: FieldType::Text,
                    placeholder: Some("4".to_string()),
                    help_text: Some("Value of the X-Domainrobot-Context header".to_string()),
                },
                ProviderCredentialField {
                    key: "accountId".to_string(),
                    label: "Account Id".to_string(),
                    field_type: FieldType::Text,
                    placeholder: None,
                    help_text: Some("Used to derive the system nameservers".to_string()),
                },
                ProviderCredentialField {
                    key: "mfaCode".to_string(),
                    label: "2FA Code".to_string(),
                    field_type: FieldType::Text,
                    placeholder: None,
                    help_text: None,
                },
                ProviderCredentialField {
                    key: "axfrServer".to_string(),
                    label: "AXFR Server".to_string(),
                    field_type: FieldType::Text,
                    placeholder: Some("a.ns14.net:53".to_string()),
                    help_text: Some("Nameserver to pull zone transfers from".to_string()),
                },
            ],
            features: ProviderFeatures {
                zone_management: true,
                second_factor: true,
                ..ProviderFeatures::default()
            },
            limits: ProviderLimits {
                max_page_size_zones: PAGE_SIZE,
                max_page_size_records: PAGE_SIZE,
            },
        }
    }

    async fn validate_credentials(&self) -> Result<bool> {
        match self.search_zones(None, 0, 1).await {
            Ok(_) => Ok(true),
            Err(ProviderError::InvalidCredentials { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn list_zones(&self) -> Result<Vec<Zone>> {
        let mut zones = Vec::new();
        let mut offset = 0u32;

        loop {
            let page = self.search_zones(None, offset, PAGE_SIZE).await?;
            let count = u32::try_from(page.len()).unwrap_or(u32::MAX);
            zones.extend(page.into_iter().map(Self::to_zone));
            if count < PAGE_SIZE {
                break;
            }
            offset += PAGE_SIZE;
        }

        Ok(zones)
    }

    async fn get_zone(&self, zone: &str) -> Result<Zone> {
        self.zone_info(zone).await.map(Self::to_zone)
    }

    async fn zone_exists(&self, zone: &str) -> Result<bool> {
        Ok(self.find_zone(zone).await?.is_some())
    }

    async fn create_zone(&self, req: &CreateZoneRequest) -> Result<Zone> {
        let origin = normalize_domain_name(&req.name);
        if self.find_zone(&origin).await?.is_some() {
            return Err(self.zone_already_exists(&origin));
        }

        let mut soa = default_soa(&origin, req.soa_email.as_deref());
        if let Some(ttl) = req.ttl {
            soa.ttl = ttl;
        }
        let nameservers = if req.nameservers.is_empty() {
            self.resolve_nameservers(&origin, &soa).await?
        } else {
            req.nameservers.clone()
        };

        let body = AutoZone {
            origin: origin.clone(),
            virtual_name_server: None,
            soa: Some(soa),
            name_servers: nameservers
                .iter()
                .map(|name| NameServer { name: name.clone() })
                .collect(),
            resource_records: Vec::new(),
        };
        let created: Vec<AutoZone> = self
            .post("/zone", &body, ErrorContext::zone(&origin))
            .await?;
        log::info!("[internetx] Created zone {origin} on {nameservers:?}");

        Ok(created
            .into_iter()
            .next()
            .map_or_else(|| Self::to_zone(body), Self::to_zone))
    }

    async fn delete_zone(&self, zone: &str) -> Result<()> {
        let summary = self
            .find_zone(zone)
            .await?
            .ok_or_else(|| self.zone_not_found(zone))?;
        let path = format!(
            "/zone/{}/{}",
            urlencoding::encode(&summary.origin),
            urlencoding::encode(summary.virtual_name_server.as_deref().unwrap_or_default())
        );
        self.delete(&path, ErrorContext::zone(zone)).await?;
        log::info!("[internetx] Deleted zone {zone}");
        Ok(())
    }

    async fn list_records(&self, zone: &str) -> Result<Vec<DnsRecord>> {
        let info = self.zone_info(zone).await?;
        let zone_ttl = info.soa.as_ref().map_or(DEFAULT_TTL, |soa| soa.ttl);
        info
            .resource_records
            .into_iter()
            .map(|rr| self.to_dns_record(rr, zone_ttl))
            .collect()
    }

    async fn create_record(&self, zone: &str, req: &CreateRecordRequest) -> Result<DnsRecord> {
        ensure_supported_type(&req.record_type, &SUPPORTED_TYPES, self.provider_name())?;
        let body = ZoneStream {
            adds: vec![Self::rr_from_request(req)],
            rems: Vec::new(),
        };
        self.stream(zone, &body, ErrorContext::record(zone, &req.name, None))
            .await?;
        Ok(req.to_record(None, DEFAULT_TTL))
    }

    /// Adds the new record and removes the old one in a single stream request.
    async fn update_record(
        &self,
        zone: &str,
        record: &DnsRecord,
        req: &CreateRecordRequest,
    ) -> Result<DnsRecord> {
        ensure_supported_type(&req.record_type, &SUPPORTED_TYPES, self.provider_name())?;
        let body = ZoneStream {
            adds: vec![Self::rr_from_request(req)],
            rems: vec![Self::rr_from_record(record)],
        };
        self.stream(zone, &body, ErrorContext::record(zone, &req.name, None))
            .await?;
        Ok(req.to_record(None, DEFAULT_TTL))
    }

    async fn delete_record(&self, zone: &str, record: &DnsRecord) -> Result<()> {
        let key = format!("{}/{}", record.name, record.record_type);
        let body = ZoneStream {
            adds: Vec::new(),
            rems: vec![Self::rr_from_record(record)],
        };
        self.stream(zone, &body, ErrorContext::record(zone, &record.name, Some(&key)))
            .await
    }

    /// Records as served by AXFR, which includes the ones derived from the main IP
    /// and `www` settings that the zone info leaves out.
    async fn zone_transfer(&self, zone: &str) -> Result<Vec<DnsRecord>> {
        let server = match &self.axfr_server {
            Some(server) => server.clone(),
            None => self.transfer_server(zone).await?,
        };
        axfr::transfer(self.provider_name(), &server, zone, self.axfr_timeout).await
    }
}
