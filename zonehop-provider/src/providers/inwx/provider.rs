//! INWX `DnsProvider` trait implementation

use async_trait::async_trait;

use crate::error::{ProviderError, Result};
use crate::providers::common::{full_name_to_relative, is_apex, parse_record_type};
use crate::traits::{DnsProvider, ErrorContext, ProviderErrorMapper};
use crate::types::{
    CreateRecordRequest, CreateZoneRequest, DnsRecord, FieldType, ProviderCredentialField,
    ProviderFeatures, ProviderLimits, ProviderMetadata, ProviderType, Zone,
};

use super::types::{DomainPage, InwxRecord, records_from_info};
use super::xmlrpc::Value;
use super::{DEFAULT_NAMESERVERS, DEFAULT_TTL, InwxProvider, PAGE_LIMIT};

impl InwxProvider {
    /// Convert an INWX record. Web redirects (URL, FRAME) come back as
    /// [`DnsRecordType::Other`](crate::DnsRecordType::Other).
    fn to_dns_record(&self, rec: InwxRecord, zone: &str) -> Result<DnsRecord> {
        let record_type = parse_record_type(&rec.record_type, self.provider_name())?;
        Ok(DnsRecord {
            id: Some(rec.id),
            name: full_name_to_relative(&rec.name, zone),
            priority: record_type.has_priority().then_some(rec.prio),
            record_type,
            value: rec.content,
            ttl: rec.ttl,
        })
    }

    async fn zone_info(&self, zone: &str) -> Result<Value> {
        self.call(
            "nameserver.info",
            Value::structure([("domain", zone.into())]),
            ErrorContext::zone(zone),
        )
        .await
    }

    /// Record parameters shared by create and update; the apex is the empty name.
    fn record_params(req: &CreateRecordRequest, zone: &str) -> Vec<(&'static str, Value)> {
        let name = if is_apex(&req.name, zone) {
            String::new()
        } else {
            full_name_to_relative(&req.name, zone)
        };
        let mut params: Vec<(&'static str, Value)> = vec![
            ("type", req.record_type.as_str().into()),
            ("content", req.value.as_str().into()),
            ("name", name.into()),
            ("ttl", req.ttl.unwrap_or(DEFAULT_TTL).into()),
        ];
        if let Some(prio) = req.priority {
            params.push(("prio", prio.into()));
        }
        params
    }

    fn record_id<'a>(&self, record: &'a DnsRecord) -> Result<&'a str> {
        record
            .id
            .as_deref()
            .ok_or_else(|| ProviderError::InvalidParameter {
                provider: self.provider_name().to_string(),
                param: "id".to_string(),
                detail: format!("record {}/{} has no INWX id", record.name, record.record_type),
            })
    }
}

#[async_trait]
impl DnsProvider for InwxProvider {
    fn id(&self) -> &'static str {
        "inwx"
    }

    fn metadata() -> ProviderMetadata {
        ProviderMetadata {
            id: ProviderType::Inwx,
            name: "INWX".to_string(),
            description: "INWX domrobot XML-RPC API".to_string(),
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
                    key: "mfaCode".to_string(),
                    label: "TOTP code".to_string(),
                    field_type: FieldType::Text,
                    placeholder: Some("123456".to_string()),
                    help_text: Some("Only for accounts with two-factor login".to_string()),
                },
                ProviderCredentialField {
                    key: "sandbox".to_string(),
                    label: "Use OTE".to_string(),
                    field_type: FieldType::Text,
                    placeholder: Some("false".to_string()),
                    help_text: None,
                },
            ],
            features: ProviderFeatures {
                zone_management: true,
                record_ids: true,
                second_factor: true,
                ..ProviderFeatures::default()
            },
            limits: ProviderLimits {
                max_page_size_zones: PAGE_LIMIT,
                max_page_size_records: PAGE_LIMIT,
            },
        }
    }

    async fn validate_credentials(&self) -> Result<bool> {
        match self.ensure_session().await {
            Ok(()) => Ok(true),
            Err(ProviderError::InvalidCredentials { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn list_zones(&self) -> Result<Vec<Zone>> {
        let mut zones = Vec::new();
        let mut page = 1u32;

        loop {
            let res = self
                .call(
                    "nameserver.list",
                    Value::structure([("page", page.into()), ("pagelimit", PAGE_LIMIT.into())]),
                    ErrorContext::default(),
                )
                .await?;
            let batch = DomainPage::from_value(&res)
                .ok_or_else(|| self.parse_error("nameserver.list: missing count"))?;

            let fetched = batch.domains.len();
            zones.extend(batch.domains.into_iter().map(Zone::named));
            if fetched == 0 || zones.len() >= batch.count as usize {
                break;
            }
            page += 1;
        }

        Ok(zones)
    }

    async fn get_zone(&self, zone: &str) -> Result<Zone> {
        let res = self.zone_info(zone).await?;
        let records = records_from_info(&res);
        let nameservers = records
            .iter()
            .filter(|r| r.record_type.eq_ignore_ascii_case("NS") && is_apex(&r.name, zone))
            .map(|r| r.content.clone())
            .collect();

        Ok(Zone {
            record_count: u32::try_from(records.len()).ok(),
            nameservers,
            ..Zone::named(zone)
        })
    }

    async fn zone_exists(&self, zone: &str) -> Result<bool> {
        let res = self
            .call(
                "nameserver.list",
                Value::structure([("domain", zone.into())]),
                ErrorContext::zone(zone),
            )
            .await?;
        let page = DomainPage::from_value(&res)
            .ok_or_else(|| self.parse_error("nameserver.list: missing count"))?;
        Ok(page
            .domains
            .iter()
            .any(|d| d.eq_ignore_ascii_case(zone.trim_end_matches('.'))))
    }

    async fn create_zone(&self, req: &CreateZoneRequest) -> Result<Zone> {
        let nameservers: Vec<String> = if req.nameservers.is_empty() {
            DEFAULT_NAMESERVERS.iter().map(ToString::to_string).collect()
        } else {
            req.nameservers.clone()
        };

        let mut params: Vec<(&str, Value)> = vec![
            ("domain", req.name.as_str().into()),
            ("type", "MASTER".into()),
            ("ns", nameservers.clone().into()),
        ];
        if let Some(email) = &req.soa_email {
            params.push(("soaEmail", email.as_str().into()));
        }

        self.call(
            "nameserver.create",
            Value::structure(params),
            ErrorContext::zone(&req.name),
        )
        .await?;
        log::info!("[inwx] Created zone {}", req.name);

        Ok(Zone {
            nameservers,
            ..Zone::named(req.name.trim_end_matches('.'))
        })
    }

    async fn delete_zone(&self, zone: &str) -> Result<()> {
        self.call(
            "nameserver.delete",
            Value::structure([("domain", zone.into())]),
            ErrorContext::zone(zone),
        )
        .await?;
        log::info!("[inwx] Deleted zone {zone}");
        Ok(())
    }

    async fn list_records(&self, zone: &str) -> Result<Vec<DnsRecord>> {
        let res = self.zone_info(zone).await?;
        records_from_info(&res)
            .into_iter()
            .map(|r| self.to_dns_record(r, zone))
            .collect()
    }

    async fn create_record(&self, zone: &str, req: &CreateRecordRequest) -> Result<DnsRecord> {
        let mut params = Self::record_params(req, zone);
        params.push(("domain", zone.into()));

        let res = self
            .call(
                "nameserver.createRecord",
                Value::structure(params),
                ErrorContext::record(zone, &req.name, None),
            )
            .await?;
        let id = res
            .get("id")
            .and_then(Value::to_text)
            .ok_or_else(|| self.parse_error("nameserver.createRecord: missing id"))?;

        Ok(req.to_record(Some(id), DEFAULT_TTL))
    }

    async fn update_record(
        &self,
        zone: &str,
        record: &DnsRecord,
        req: &CreateRecordRequest,
    ) -> Result<DnsRecord> {
        let id = self.record_id(record)?;
        let mut params = Self::record_params(req, zone);
        params.push(("id", id.into()));

        self.call(
            "nameserver.updateRecord",
            Value::structure(params),
            ErrorContext::record(zone, &record.name, Some(id)),
        )
        .await?;

        Ok(req.to_record(Some(id.to_string()), DEFAULT_TTL))
    }

    async fn delete_record(&self, zone: &str, record: &DnsRecord) -> Result<()> {
        let id = self.record_id(record)?;
        self.call(
            "nameserver.deleteRecord",
            Value::structure([("id", id.into())]),
            ErrorContext::record(zone, &record.name, Some(id)),
        )
        .await
        .map(|_| ())
    }

    async fn close(&self) -> Result<()> {
        self.logout().await
    }
}
