//! Hetzner DNS `DnsProvider` trait implementation

use async_trait::async_trait;
use reqwest::Method;

use crate::error::{ProviderError, Result};
use crate::providers::common::{parse_record_type, split_priority, unquote_txt};
use crate::traits::{DnsProvider, ErrorContext, ProviderErrorMapper};
use crate::types::{
    CreateRecordRequest, CreateZoneRequest, DnsRecord, DnsRecordType, FieldType,
    ProviderCredentialField, ProviderFeatures, ProviderLimits, ProviderMetadata, ProviderType,
    Zone,
};
use crate::zonefile::parse_zone_text;

use super::types::{
    CreateZoneBody, HetznerRecord, HetznerZone, RecordBody, RecordResponse, RecordsResponse,
    ZoneResponse, ZonesResponse,
};
use super::{DEFAULT_TTL, HetznerProvider, PAGE_SIZE};

impl HetznerProvider {
    fn to_zone(zone: HetznerZone) -> Zone {
        Zone {
            id: zone.id,
            name: zone.name,
            ttl: zone.ttl,
            mode: None,
            nameservers: zone.ns,
            record_count: zone.records_count,
        }
    }

    /// Convert an API record; MX/SRV priority is split out of the value.
    fn to_dns_record(&self, rec: HetznerRecord, zone_ttl: u32) -> Result<DnsRecord> {
        let record_type = parse_record_type(&rec.record_type, self.provider_name())?;
        let (priority, value) = split_priority(&record_type, &rec.value);
        let value = if record_type == DnsRecordType::Txt {
            unquote_txt(&value)
        } else {
            value
        };
        Ok(DnsRecord {
            id: Some(rec.id),
            name: rec.name,
            record_type,
            value,
            ttl: rec.ttl.unwrap_or(zone_ttl),
            priority,
        })
    }

    /// Look a zone up by name.
    async fn find_zone(&self, zone: &str) -> Result<HetznerZone> {
        let name = zone.trim_end_matches('.');
        let resp: ZonesResponse = self
            .get(
                &format!("/zones?name={}", urlencoding::encode(name)),
                ErrorContext::zone(zone),
            )
            .await?;
        resp.zones
            .into_iter()
            .find(|z| z.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| self.zone_not_found(zone))
    }

    fn record_body<'a>(zone_id: &'a str, req: &'a CreateRecordRequest) -> RecordBody<'a> {
        let value = match req.priority {
            Some(prio) if req.record_type.has_priority() => format!("{prio} {}", req.value),
            _ => req.value.clone(),
        };
        RecordBody {
            zone_id,
            record_type: req.record_type.as_str(),
            name: &req.name,
            value,
            ttl: req.ttl,
        }
    }
}

#[async_trait]
impl DnsProvider for HetznerProvider {
    fn id(&self) -> &'static str {
        "hetzner"
    }

    fn metadata() -> ProviderMetadata {
        ProviderMetadata {
            id: ProviderType::Hetzner,
            name: "Hetzner DNS".to_string(),
            description: "Hetzner DNS Console (dns.hetzner.com)".to_string(),
            required_fields: vec![ProviderCredentialField {
                key: "apiToken".to_string(),
                label: "API Token".to_string(),
                field_type: FieldType::Password,
                placeholder: None,
                help_text: Some("Created under API Tokens in the DNS Console".to_string()),
            }],
            optional_fields: Vec::new(),
            features: ProviderFeatures {
                zone_management: true,
                zone_file_export: true,
                record_ids: true,
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
            .get::<ZonesResponse>("/zones?per_page=1", ErrorContext::default())
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
            let resp: ZonesResponse = self
                .get(
                    &format!("/zones?page={page}&per_page={PAGE_SIZE}"),
                    ErrorContext::default(),
                )
                .await?;
            let last_page = resp.meta.map_or(page, |m| m.pagination.last_page);
            zones.extend(resp.zones.into_iter().map(Self::to_zone));
            if page >= last_page {
                break;
            }
            page += 1;
        }

        Ok(zones)
    }

    async fn get_zone(&self, zone: &str) -> Result<Zone> {
        self.find_zone(zone).await.map(Self::to_zone)
    }

    async fn zone_exists(&self, zone: &str) -> Result<bool> {
        match self.find_zone(zone).await {
            Ok(_) => Ok(true),
            Err(ProviderError::ZoneNotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn create_zone(&self, req: &CreateZoneRequest) -> Result<Zone> {
        if !req.nameservers.is_empty() {
            log::warn!(
                "[hetzner] Nameservers cannot be chosen, ignoring {:?}",
                req.nameservers
            );
        }
        let body = CreateZoneBody {
            name: req.name.trim_end_matches('.'),
            ttl: req.ttl,
        };
        let resp: ZoneResponse = self
            .send_json(Method::POST, "/zones", &body, ErrorContext::zone(&req.name))
            .await?;
        log::info!("[hetzner] Created zone {} ({})", resp.zone.name, resp.zone.id);
        Ok(Self::to_zone(resp.zone))
    }

    async fn delete_zone(&self, zone: &str) -> Result<()> {
        let found = self.find_zone(zone).await?;
        self.delete(&format!("/zones/{}", found.id), ErrorContext::zone(zone))
            .await?;
        log::info!("[hetzner] Deleted zone {zone}");
        Ok(())
    }

    async fn list_records(&self, zone: &str) -> Result<Vec<DnsRecord>> {
        let found = self.find_zone(zone).await?;
        let zone_ttl = found.ttl.unwrap_or(DEFAULT_TTL);
        let mut records = Vec::new();
        let mut page = 1u32;

        loop {
            let resp: RecordsResponse = self
                .get(
                    &format!(
                        "/records?zone_id={}&page={page}&per_page={PAGE_SIZE}",
                        urlencoding::encode(&found.id)
                    ),
                    ErrorContext::zone(zone),
                )
                .await?;
            let last_page = resp.meta.map_or(page, |m| m.pagination.last_page);
            for rec in resp.records {
                records.push(self.to_dns_record(rec, zone_ttl)?);
            }
            if page >= last_page {
                break;
            }
            page += 1;
        }

        Ok(records)
    }

    async fn create_record(&self, zone: &str, req: &CreateRecordRequest) -> Result<DnsRecord> {
        let found = self.find_zone(zone).await?;
        let resp: RecordResponse = self
            .send_json(
                Method::POST,
                "/records",
                &Self::record_body(&found.id, req),
                ErrorContext::record(zone, &req.name, None),
            )
            .await?;
        let zone_ttl = found.ttl.unwrap_or(DEFAULT_TTL);
        self.to_dns_record(resp.record, zone_ttl)
    }

    async fn update_record(
        &self,
        zone: &str,
        record: &DnsRecord,
        req: &CreateRecordRequest,
    ) -> Result<DnsRecord> {
        let Some(id) = record.id.as_deref() else {
            return Err(ProviderError::InvalidParameter {
                provider: self.provider_name().to_string(),
                param: "id".to_string(),
                detail: format!("record {}/{} has no id", record.name, record.record_type),
            });
        };
        let found = self.find_zone(zone).await?;
        let resp: RecordResponse = self
            .send_json(
                Method::PUT,
                &format!("/records/{}", urlencoding::encode(id)),
                &Self::record_body(&found.id, req),
                ErrorContext::record(zone, &req.name, Some(id)),
            )
            .await?;
        let zone_ttl = found.ttl.unwrap_or(DEFAULT_TTL);
        self.to_dns_record(resp.record, zone_ttl)
    }

    async fn delete_record(&self, zone: &str, record: &DnsRecord) -> Result<()> {
        let Some(id) = record.id.as_deref() else {
            return Err(ProviderError::InvalidParameter {
                provider: self.provider_name().to_string(),
                param: "id".to_string(),
                detail: format!("record {}/{} has no id", record.name, record.record_type),
            });
        };
        self.delete(
            &format!("/records/{}", urlencoding::encode(id)),
            ErrorContext::record(zone, &record.name, Some(id)),
        )
        .await
    }

    /// Records as exported in BIND format by `GET /zones/{id}/export`.
    async fn zone_transfer(&self, zone: &str) -> Result<Vec<DnsRecord>> {
        let found = self.find_zone(zone).await?;
        let text = self
            .request_text(
                Method::GET,
                &format!("/zones/{}/export", urlencoding::encode(&found.id)),
                None,
                ErrorContext::zone(zone),
            )
            .await?;
        parse_zone_text(&found.name, &text).map_err(|e| self.parse_error(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> HetznerProvider {
        HetznerProvider::builder("tok".to_string())
            .base_url(server.uri())
            .build()
    }

    async fn mount_zone(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/zones"))
            .and(query_param("name", "example.com"))
            .and(header("Auth-API-Token", "tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "zones": [{
                    "id": "z1",
                    "name": "example.com",
                    "ttl": 7200,
                    "ns": ["hydrogen.ns.hetzner.com", "oxygen.ns.hetzner.com"],
                    "records_count": 3
                }],
                "meta": {"pagination": {"page": 1, "per_page": 100, "last_page": 1, "total_entries": 1}}
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn list_zones_follows_pagination() {
        let server = MockServer::start().await;
        for (page, name) in [("1", "a.example"), ("2", "b.example")] {
            Mock::given(method("GET"))
                .and(path("/zones"))
                .and(query_param("page", page))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "zones": [{"id": name, "name": name}],
                    "meta": {"pagination": {"page": 1, "per_page": 1, "last_page": 2, "total_entries": 2}}
                })))
                .mount(&server)
                .await;
        }

        let zones = provider(&server).list_zones().await.unwrap();
        let names: Vec<_> = zones.iter().map(|z| z.name.as_str()).collect();
        assert_eq!(names, ["a.example", "b.example"]);
    }

    #[tokio::test]
    async fn list_records_splits_priority_and_inherits_ttl() {
        let server = MockServer::start().await;
        mount_zone(&server).await;
        Mock::given(method("GET"))
            .and(path("/records"))
            .and(query_param("zone_id", "z1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "records": [
                    {"id": "r1", "type": "MX", "name": "@", "value": "10 mail.example.com.", "zone_id": "z1"},
                    {"id": "r2", "type": "TXT", "name": "@", "value": "\"v=spf1 -all\"", "ttl": 300, "zone_id": "z1"},
                    {"id": "r3", "type": "HINFO", "name": "@", "value": "x y", "zone_id": "z1"}
                ]
            })))
            .mount(&server)
            .await;

        let records = provider(&server).list_records("example.com").await.unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].priority, Some(10));
        assert_eq!(records[0].value, "mail.example.com.");
        assert_eq!(records[0].ttl, 7200);
        assert_eq!(records[1].value, "v=spf1 -all");
        assert_eq!(records[1].ttl, 300);
        assert_eq!(records[2].record_type, DnsRecordType::Other("HINFO".to_string()));
        assert_eq!(records[2].value, "x y");
    }

    #[tokio::test]
    async fn clone_to_another_account_keeps_unusual_types() {
        let server = MockServer::start().await;
        mount_zone(&server).await;
        Mock::given(method("GET"))
            .and(path("/zones/z1/export"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "$ORIGIN example.com.\n$TTL 7200\n@ IN SOA hydrogen.ns.hetzner.com. dns.hetzner.com. 1 86400 10800 3600000 3600\n@ IN NS hydrogen.ns.hetzner.com.\nwww IN A 192.0.2.1\nhost IN HINFO \"PC\" \"Linux\"\n@ IN RP admin.example.com. .\n",
            ))
            .mount(&server)
            .await;
        let destination = crate::test_utils::MockProvider::new("other");

        let report = crate::clone_zone(&provider(&server), "example.com", &destination, "example.com")
            .await
            .unwrap();
        assert_eq!(report.created.len(), 3);
        assert_eq!(report.skipped.len(), 2);

        let mut copied: Vec<String> = destination
            .records("example.com")
            .iter()
            .map(|r| format!("{}/{}", r.name, r.record_type))
            .collect();
        copied.sort();
        assert_eq!(copied, ["@/RP", "host/HINFO", "www/A"]);
    }

    #[tokio::test]
    async fn create_record_inlines_priority() {
        let server = MockServer::start().await;
        mount_zone(&server).await;
        Mock::given(method("POST"))
            .and(path("/records"))
            .and(body_json(json!({
                "zone_id": "z1",
                "type": "MX",
                "name": "@",
                "value": "20 mx2.example.com.",
                "ttl": 600
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "record": {"id": "r9", "type": "MX", "name": "@", "value": "20 mx2.example.com.", "ttl": 600}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let req = CreateRecordRequest::new("@", DnsRecordType::Mx, "mx2.example.com.")
            .with_priority(20)
            .with_ttl(600);
        let created = provider(&server)
            .create_record("example.com", &req)
            .await
            .unwrap();
        assert_eq!(created.id.as_deref(), Some("r9"));
        assert_eq!(created.priority, Some(20));
    }

    #[tokio::test]
    async fn zone_transfer_parses_export() {
        let server = MockServer::start().await;
        mount_zone(&server).await;
        Mock::given(method("GET"))
            .and(path("/zones/z1/export"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "$ORIGIN example.com.\n$TTL 7200\n@ IN SOA hydrogen.ns.hetzner.com. dns.hetzner.com. 1 86400 10800 3600000 3600\n@ IN NS hydrogen.ns.hetzner.com.\nwww 300 IN A 192.0.2.1\n",
            ))
            .mount(&server)
            .await;

        let records = provider(&server).zone_transfer("example.com").await.unwrap();
        assert_eq!(records.len(), 3);
        let www = records.iter().find(|r| r.name == "www").unwrap();
        assert_eq!(www.ttl, 300);
        assert_eq!(www.value, "192.0.2.1");
    }

    #[tokio::test]
    async fn unknown_zone_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/zones"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"message": "zone not found", "code": 404}
            })))
            .mount(&server)
            .await;

        let p = provider(&server);
        assert!(!p.zone_exists("missing.example").await.unwrap());
        let err = p.get_zone("missing.example").await;
        assert!(
            matches!(&err, Err(ProviderError::ZoneNotFound { .. })),
            "unexpected result: {err:?}"
        );
    }

    #[tokio::test]
    async fn bad_token_fails_validation() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/zones"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid authentication credentials"})),
            )
            .mount(&server)
            .await;

        assert!(!provider(&server).validate_credentials().await.unwrap());
    }
}
