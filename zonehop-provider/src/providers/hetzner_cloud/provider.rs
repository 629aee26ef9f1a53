//! Hetzner Cloud `DnsProvider` trait implementation

use async_trait::async_trait;

use crate::error::{ProviderError, Result};
use crate::providers::common::{parse_record_type, quote_txt, split_priority, unquote_txt};
use crate::traits::{DnsProvider, ErrorContext, ProviderErrorMapper};
use crate::types::{
    CreateRecordRequest, CreateZoneRequest, DnsRecord, DnsRecordType, FieldType,
    ProviderCredentialField, ProviderFeatures, ProviderLimits, ProviderMetadata, ProviderType,
    Zone, ZoneMode,
};
use crate::zonefile::parse_zone_text;

use super::types::{
    ChangeTtlAction, CloudZone, CreateZoneBody, PrimaryNameserver, RRSetRecord, RRSetResponse,
    RRSetsResponse, RecordsAction, ZoneResponse, ZonefileResponse, ZonesResponse,
};
use super::{DEFAULT_TTL, HetznerCloudProvider, PAGE_SIZE};

/// RRSet key used as record id
fn rrset_key(name: &str, record_type: &DnsRecordType) -> String {
    format!("{name}/{record_type}")
}

/// Value as stored in an RRSet: priority inline, TXT quoted.
fn to_wire(record_type: &DnsRecordType, value: &str, priority: Option<u16>) -> String {
    match (record_type, priority) {
        (DnsRecordType::Txt, _) => quote_txt(value),
        (t, Some(prio)) if t.has_priority() => format!("{prio} {value}"),
        _ => value.to_string(),
    }
}

fn from_wire(record_type: &DnsRecordType, value: &str) -> (Option<u16>, String) {
    if *record_type == DnsRecordType::Txt {
        (None, unquote_txt(value))
    } else {
        split_priority(record_type, value)
    }
}

/// `host` or `host:port`; bare IPv6 addresses keep port 53.
fn parse_primary(spec: &str) -> PrimaryNameserver {
    if let Some((address, port)) = spec.rsplit_once(':')
        && !address.contains(':')
        && let Ok(port) = port.parse()
    {
        return PrimaryNameserver {
            address: address.to_string(),
            port,
        };
    }
    PrimaryNameserver {
        address: spec.to_string(),
        port: 53,
    }
}

impl HetznerCloudProvider {
    fn to_zone(zone: CloudZone) -> Zone {
        let mode = match zone.mode.as_deref() {
            Some("secondary") => Some(ZoneMode::Secondary),
            Some("primary") => Some(ZoneMode::Primary),
            _ => None,
        };
        Zone {
            id: zone.id.to_string(),
            name: zone.name,
            ttl: zone.ttl,
            mode,
            nameservers: zone
                .authoritative_nameservers
                .map(|ns| ns.assigned)
                .unwrap_or_default(),
            record_count: zone.record_count,
        }
    }

    fn zone_path(zone: &str) -> String {
        format!("/zones/{}", urlencoding::encode(zone.trim_end_matches('.')))
    }

    /// The apex label stays a literal `@` in the path.
    fn rrset_path(zone: &str, name: &str, record_type: &DnsRecordType) -> String {
        let name = if name == "@" {
            std::borrow::Cow::Borrowed("@")
        } else {
            urlencoding::encode(name)
        };
        format!("{}/rrsets/{name}/{record_type}", Self::zone_path(zone))
    }

    async fn fetch_zone(&self, zone: &str) -> Result<CloudZone> {
        let resp: ZoneResponse = self
            .get(&Self::zone_path(zone), ErrorContext::zone(zone))
            .await?;
        Ok(resp.zone)
    }

    async fn records_action(
        &self,
        zone: &str,
        name: &str,
        record_type: &DnsRecordType,
        action: &str,
        body: &RecordsAction,
        ctx: ErrorContext,
    ) -> Result<()> {
        let path = format!(
            "{}/actions/{action}",
            Self::rrset_path(zone, name, record_type)
        );
        self.post_action(&path, body, ctx).await
    }
}

#[async_trait]
impl DnsProvider for HetznerCloudProvider {
    fn id(&self) -> &'static str {
        "hetznercloud"
    }

    fn metadata() -> ProviderMetadata {
        ProviderMetadata {
            id: ProviderType::Hetznercloud,
            name: "Hetzner Cloud DNS".to_string(),
            description: "Hetzner Cloud DNS zones and RRSets".to_string(),
            required_fields: vec![ProviderCredentialField {
                key: "apiToken".to_string(),
                label: "API Token".to_string(),
                field_type: FieldType::Password,
                placeholder: None,
                help_text: Some("Project token with read/write access".to_string()),
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
        let mut page = Some(1u32);

        while let Some(current) = page {
            let resp: ZonesResponse = self
                .get(
                    &format!("/zones?page={current}&per_page={PAGE_SIZE}"),
                    ErrorContext::default(),
                )
                .await?;
            zones.extend(resp.zones.into_iter().map(Self::to_zone));
            page = resp.meta.and_then(|m| m.pagination.next_page);
        }

        Ok(zones)
    }

    async fn get_zone(&self, zone: &str) -> Result<Zone> {
        self.fetch_zone(zone).await.map(Self::to_zone)
    }

    async fn zone_exists(&self, zone: &str) -> Result<bool> {
        match self.fetch_zone(zone).await {
            Ok(_) => Ok(true),
            Err(ProviderError::ZoneNotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn create_zone(&self, req: &CreateZoneRequest) -> Result<Zone> {
        let mode = req.mode.unwrap_or(ZoneMode::Primary);
        if mode == ZoneMode::Secondary && req.primary_nameservers.is_empty() {
            return Err(ProviderError::InvalidParameter {
                provider: self.provider_name().to_string(),
                param: "primary_nameservers".to_string(),
                detail: "secondary zones need at least one primary nameserver".to_string(),
            });
        }
        if !req.nameservers.is_empty() {
            log::warn!(
                "[hetznercloud] Authoritative nameservers are assigned by Hetzner, ignoring {:?}",
                req.nameservers
            );
        }

        let body = CreateZoneBody {
            name: req.name.trim_end_matches('.'),
            mode: match mode {
                ZoneMode::Primary => "primary",
                ZoneMode::Secondary => "secondary",
            },
            ttl: req.ttl,
            primary_nameservers: req
                .primary_nameservers
                .iter()
                .map(|s| parse_primary(s))
                .collect(),
        };
        let resp: ZoneResponse = self
            .post("/zones", &body, ErrorContext::zone(&req.name))
            .await?;
        log::info!("[hetznercloud] Created zone {}", resp.zone.name);
        Ok(Self::to_zone(resp.zone))
    }

    async fn delete_zone(&self, zone: &str) -> Result<()> {
        self.delete(&Self::zone_path(zone), ErrorContext::zone(zone))
            .await?;
        log::info!("[hetznercloud] Deleted zone {zone}");
        Ok(())
    }

    async fn list_records(&self, zone: &str) -> Result<Vec<DnsRecord>> {
        let zone_ttl = self.fetch_zone(zone).await?.ttl.unwrap_or(DEFAULT_TTL);
        let mut records = Vec::new();
        let mut page = Some(1u32);

        while let Some(current) = page {
            let resp: RRSetsResponse = self
                .get(
                    &format!(
                        "{}/rrsets?page={current}&per_page={PAGE_SIZE}",
                        Self::zone_path(zone)
                    ),
                    ErrorContext::zone(zone),
                )
                .await?;

            for rrset in resp.rrsets {
                let record_type = parse_record_type(&rrset.record_type, self.provider_name())?;
                let id = rrset_key(&rrset.name, &record_type);
                let ttl = rrset.ttl.unwrap_or(zone_ttl);
                for rec in rrset.records {
                    let (priority, value) = from_wire(&record_type, &rec.value);
                    records.push(DnsRecord {
                        id: Some(id.clone()),
                        name: rrset.name.clone(),
                        record_type: record_type.clone(),
                        value,
                        ttl,
                        priority,
                    });
                }
            }
            page = resp.meta.and_then(|m| m.pagination.next_page);
        }

        Ok(records)
    }

    async fn create_record(&self, zone: &str, req: &CreateRecordRequest) -> Result<DnsRecord> {
        let body = RecordsAction {
            ttl: req.ttl,
            records: vec![RRSetRecord {
                value: to_wire(&req.record_type, &req.value, req.priority),
            }],
        };
        self.records_action(
            zone,
            &req.name,
            &req.record_type,
            "add_records",
            &body,
            ErrorContext::record(zone, &req.name, None),
        )
        .await?;

        Ok(req.to_record(Some(rrset_key(&req.name, &req.record_type)), DEFAULT_TTL))
    }

    async fn update_record(
        &self,
        zone: &str,
        record: &DnsRecord,
        req: &CreateRecordRequest,
    ) -> Result<DnsRecord> {
        let old_key = rrset_key(&record.name, &record.record_type);
        let ctx = || ErrorContext::record(zone, &record.name, Some(&old_key));

        if record.name != req.name || record.record_type != req.record_type {
            self.create_record(zone, req).await?;
            self.delete_record(zone, record).await?;
            return Ok(req.to_record(Some(rrset_key(&req.name, &req.record_type)), DEFAULT_TTL));
        }

        let resp: RRSetResponse = self
            .get(&Self::rrset_path(zone, &record.name, &record.record_type), ctx())
            .await?;
        let old_value = to_wire(&record.record_type, &record.value, record.priority);
        let new_value = to_wire(&req.record_type, &req.value, req.priority);
        if !resp.rrset.records.iter().any(|r| r.value == old_value) {
            return Err(ProviderError::RecordNotFound {
                provider: self.provider_name().to_string(),
                record_id: old_key,
                raw_message: None,
            });
        }

        let records = resp
            .rrset
            .records
            .into_iter()
            .map(|r| {
                if r.value == old_value {
                    RRSetRecord {
                        value: new_value.clone(),
                    }
                } else {
                    r
                }
            })
            .collect();
        self.records_action(
            zone,
            &record.name,
            &record.record_type,
            "set_records",
            &RecordsAction { ttl: None, records },
            ctx(),
        )
        .await?;

        if req.ttl.is_some() && req.ttl != resp.rrset.ttl {
            let path = format!(
                "{}/actions/change_ttl",
                Self::rrset_path(zone, &record.name, &record.record_type)
            );
            self.post_action(&path, &ChangeTtlAction { ttl: req.ttl }, ctx())
                .await?;
        }

        Ok(req.to_record(Some(old_key.clone()), resp.rrset.ttl.unwrap_or(DEFAULT_TTL)))
    }

    async fn delete_record(&self, zone: &str, record: &DnsRecord) -> Result<()> {
        let key = rrset_key(&record.name, &record.record_type);
        let body = RecordsAction {
            ttl: None,
            records: vec![RRSetRecord {
                value: to_wire(&record.record_type, &record.value, record.priority),
            }],
        };
        self.records_action(
            zone,
            &record.name,
            &record.record_type,
            "remove_records",
            &body,
            ErrorContext::record(zone, &record.name, Some(&key)),
        )
        .await
    }

    /// Records of the exported zone file (`GET /zones/{zone}/zonefile`).
    async fn zone_transfer(&self, zone: &str) -> Result<Vec<DnsRecord>> {
        let resp: ZonefileResponse = self
            .get(
                &format!("{}/zonefile", Self::zone_path(zone)),
                ErrorContext::zone(zone),
            )
            .await?;
        parse_zone_text(zone, &resp.zonefile).map_err(|e| self.parse_error(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> HetznerCloudProvider {
        HetznerCloudProvider::builder("tok".to_string())
            .base_url(server.uri())
            .build()
    }

    async fn mount_zone(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/zones/example.com"))
            .and(header("Authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "zone": {
                    "id": 42,
                    "name": "example.com",
                    "mode": "primary",
                    "ttl": 3600,
                    "authoritative_nameservers": {
                        "assigned": ["hydrogen.ns.hetzner.com.", "oxygen.ns.hetzner.com."]
                    },
                    "record_count": 4
                }
            })))
            .mount(server)
            .await;
    }

    #[test]
    fn wire_values() {
        assert_eq!(to_wire(&DnsRecordType::Txt, "a b", None), "\"a b\"");
        assert_eq!(
            to_wire(&DnsRecordType::Mx, "mx.example.com.", Some(10)),
            "10 mx.example.com."
        );
        assert_eq!(
            from_wire(&DnsRecordType::Mx, "10 mx.example.com."),
            (Some(10), "mx.example.com.".to_string())
        );
        assert_eq!(from_wire(&DnsRecordType::Txt, "\"a\" \"b\""), (None, "ab".to_string()));
    }

    #[test]
    fn long_txt_goes_out_as_several_strings() {
        let dkim = format!("v=DKIM1; k=rsa; p={}", "A".repeat(290));
        let wire = to_wire(&DnsRecordType::Txt, &dkim, None);
        assert!(wire.starts_with("\"v=DKIM1; k=rsa; p=AAAA"));
        assert_eq!(wire.matches("\" \"").count(), 1);
        assert_eq!(from_wire(&DnsRecordType::Txt, &wire), (None, dkim));
    }

    #[test]
    fn apex_rrset_path_keeps_at_sign() {
        assert_eq!(
            HetznerCloudProvider::rrset_path("example.com", "@", &DnsRecordType::Mx),
            "/zones/example.com/rrsets/@/MX"
        );
        assert_eq!(
            HetznerCloudProvider::rrset_path("example.com", "*.dev", &DnsRecordType::A),
            "/zones/example.com/rrsets/%2A.dev/A"
        );
    }

    #[test]
    fn primary_nameserver_specs() {
        let p = parse_primary("192.0.2.53:5353");
        assert_eq!((p.address.as_str(), p.port), ("192.0.2.53", 5353));
        let p = parse_primary("2001:db8::53");
        assert_eq!((p.address.as_str(), p.port), ("2001:db8::53", 53));
    }

    #[tokio::test]
    async fn get_zone_maps_mode_and_nameservers() {
        let server = MockServer::start().await;
        mount_zone(&server).await;

        let zone = provider(&server).get_zone("example.com").await.unwrap();
        assert_eq!(zone.id, "42");
        assert_eq!(zone.mode, Some(ZoneMode::Primary));
        assert_eq!(zone.nameservers.len(), 2);
    }

    #[tokio::test]
    async fn list_records_flattens_rrsets_across_pages() {
        let server = MockServer::start().await;
        mount_zone(&server).await;
        Mock::given(method("GET"))
            .and(path("/zones/example.com/rrsets"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "rrsets": [{
                    "id": "@/MX", "name": "@", "type": "MX", "ttl": null,
                    "records": [{"value": "10 mx1.example.com."}, {"value": "20 mx2.example.com."}]
                }],
                "meta": {"pagination": {"page": 1, "per_page": 1, "next_page": 2, "last_page": 2}}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/zones/example.com/rrsets"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "rrsets": [{
                    "id": "@/TXT", "name": "@", "type": "TXT", "ttl": 300,
                    "records": [{"value": "\"v=spf1 -all\""}]
                }, {
                    "id": "host/HINFO", "name": "host", "type": "HINFO", "ttl": 300,
                    "records": [{"value": "\"PC\" \"Linux\""}]
                }],
                "meta": {"pagination": {"page": 2, "per_page": 1, "next_page": null, "last_page": 2}}
            })))
            .mount(&server)
            .await;

        let records = provider(&server).list_records("example.com").await.unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].id.as_deref(), Some("@/MX"));
        assert_eq!(records[0].ttl, 3600);
        assert_eq!(records[1].priority, Some(20));
        assert_eq!(records[2].value, "v=spf1 -all");
        assert_eq!(records[2].ttl, 300);
        assert_eq!(records[3].record_type, DnsRecordType::Other("HINFO".to_string()));
        assert_eq!(records[3].value, "\"PC\" \"Linux\"");
    }

    #[tokio::test]
    async fn create_record_adds_quoted_txt_value() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(
                "/zones/example.com/rrsets/_acme-challenge/TXT/actions/add_records",
            ))
            .and(body_json(json!({"ttl": 300, "records": [{"value": "\"tok\""}]})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"action": {"id": 1}})))
            .expect(1)
            .mount(&server)
            .await;

        let req = CreateRecordRequest::new("_acme-challenge", DnsRecordType::Txt, "tok").with_ttl(300);
        let created = provider(&server)
            .create_record("example.com", &req)
            .await
            .unwrap();
        assert_eq!(created.id.as_deref(), Some("_acme-challenge/TXT"));
    }

    #[tokio::test]
    async fn delete_record_removes_single_value() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/zones/example.com/rrsets/@/MX/actions/remove_records"))
            .and(body_json(json!({"records": [{"value": "10 mx1.example.com."}]})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"action": {"id": 2}})))
            .expect(1)
            .mount(&server)
            .await;

        let record = DnsRecord {
            id: Some("@/MX".to_string()),
            name: "@".to_string(),
            record_type: DnsRecordType::Mx,
            value: "mx1.example.com.".to_string(),
            ttl: 3600,
            priority: Some(10),
        };
        provider(&server)
            .delete_record("example.com", &record)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn update_in_place_uses_set_records() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/zones/example.com/rrsets/www/A"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "rrset": {
                    "id": "www/A", "name": "www", "type": "A", "ttl": 600,
                    "records": [{"value": "192.0.2.1"}, {"value": "192.0.2.2"}]
                }
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/zones/example.com/rrsets/www/A/actions/set_records"))
            .and(body_json(json!({"records": [{"value": "192.0.2.9"}, {"value": "192.0.2.2"}]})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"action": {"id": 3}})))
            .expect(1)
            .mount(&server)
            .await;

        let old = DnsRecord {
            id: Some("www/A".to_string()),
            name: "www".to_string(),
            record_type: DnsRecordType::A,
            value: "192.0.2.1".to_string(),
            ttl: 600,
            priority: None,
        };
        let req = CreateRecordRequest::new("www", DnsRecordType::A, "192.0.2.9");
        let updated = provider(&server)
            .update_record("example.com", &old, &req)
            .await
            .unwrap();
        assert_eq!(updated.ttl, 600);
    }

    #[tokio::test]
    async fn zone_transfer_reads_zonefile() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/zones/example.com/zonefile"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "zonefile": "$ORIGIN example.com.\n$TTL 3600\n@ IN NS hydrogen.ns.hetzner.com.\nwww IN A 192.0.2.1\n"
            })))
            .mount(&server)
            .await;

        let records = provider(&server).zone_transfer("example.com").await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().any(|r| r.name == "www" && r.ttl == 3600));
    }

    #[tokio::test]
    async fn secondary_zone_requires_primaries() {
        let server = MockServer::start().await;
        let mut req = CreateZoneRequest::new("example.com");
        req.mode = Some(ZoneMode::Secondary);
        let err = provider(&server).create_zone(&req).await;
        assert!(
            matches!(&err, Err(ProviderError::InvalidParameter { param, .. }) if param == "primary_nameservers"),
            "unexpected result: {err:?}"
        );
    }

    #[tokio::test]
    async fn missing_zone_does_not_exist() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/zones/missing.example"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"code": "not_found", "message": "zone not found"}
            })))
            .mount(&server)
            .await;

        assert!(!provider(&server).zone_exists("missing.example").await.unwrap());
    }
}
