//! In-memory provider for exercising zone copies and record-set edits without HTTP.
//!
//! Enabled for this crate's tests and, through the `test-utils` feature, for
//! downstream crates.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::error::{ProviderError, Result};
use crate::traits::{DnsProvider, ReplaceRecordSet};
use crate::types::{
    CreateRecordRequest, CreateZoneRequest, DnsRecord, DnsRecordType, ProviderFeatures,
    ProviderLimits, ProviderMetadata, ProviderType, Zone,
};

const DEFAULT_TTL: u32 = 3600;

/// Record with TTL 3600 and no id.
pub fn record(name: &str, record_type: DnsRecordType, value: &str) -> DnsRecord {
    DnsRecord {
        id: None,
        name: name.to_string(),
        record_type,
        value: value.to_string(),
        ttl: DEFAULT_TTL,
        priority: None,
    }
}

fn key(zone: &str) -> String {
    zone.trim_end_matches('.').to_ascii_lowercase()
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

struct ZoneState {
    zone: Zone,
    records: Vec<DnsRecord>,
}

// ===== MockProvider =====

/// A provider account held in memory.
///
/// Every trait call is appended to [`calls`](Self::calls) as `"<operation> <zone>"`
/// (plus `name/TYPE` for record operations).
pub struct MockProvider {
    id: &'static str,
    zones: Mutex<BTreeMap<String, ZoneState>>,
    calls: Mutex<Vec<String>>,
    next_id: AtomicU64,
    replace_calls: AtomicUsize,
    create_record_calls: AtomicUsize,
    /// `create_record` fails once this many calls have succeeded
    fail_create_record_after: Mutex<Option<usize>>,
    fail_delete_zone: AtomicBool,
    /// `delete_record` fails for records with one of these values
    fail_delete_values: Mutex<Vec<String>>,
    fail_list_records: AtomicBool,
    fail_zone_exists: AtomicBool,
    /// `create_record` refuses these types, like a provider without them
    rejected_types: Mutex<Vec<DnsRecordType>>,
}

impl MockProvider {
    pub fn new(id: &'static str) -> Self {
        Self {
            id,
            zones: Mutex::new(BTreeMap::new()),
            calls: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            replace_calls: AtomicUsize::new(0),
            create_record_calls: AtomicUsize::new(0),
            fail_create_record_after: Mutex::new(None),
            fail_delete_zone: AtomicBool::new(false),
            fail_delete_values: Mutex::new(Vec::new()),
            fail_list_records: AtomicBool::new(false),
            fail_zone_exists: AtomicBool::new(false),
            rejected_types: Mutex::new(Vec::new()),
        }
    }

    /// Seed a zone with records.
    #[must_use]
    pub fn with_zone(self, name: &str, records: Vec<DnsRecord>) -> Self {
        self.insert_zone(Zone::named(name), records);
        self
    }

    /// Seed a zone that reports `nameservers`.
    #[must_use]
    pub fn with_zone_nameservers(self, name: &str, nameservers: &[&str]) -> Self {
        let zone = Zone {
            nameservers: nameservers.iter().map(ToString::to_string).collect(),
            ..Zone::named(name)
        };
        self.insert_zone(zone, Vec::new());
        self
    }

    fn insert_zone(&self, zone: Zone, records: Vec<DnsRecord>) {
        let records = records
            .into_iter()
            .map(|mut r| {
                if r.id.is_none() {
                    r.id = Some(self.fresh_id());
                }
                r
            })
            .collect();
        lock(&self.zones).insert(key(&zone.name), ZoneState { zone, records });
    }

    pub fn fail_create_record_after(&self, successes: usize) {
        *lock(&self.fail_create_record_after) = Some(successes);
    }

    pub fn fail_delete_zone(&self) {
        self.fail_delete_zone.store(true, Ordering::SeqCst);
    }

    /// Make `delete_record` fail for records whose value is `value`.
    pub fn fail_delete_record(&self, value: &str) {
        lock(&self.fail_delete_values).push(value.to_string());
    }

    pub fn fail_list_records(&self) {
        self.fail_list_records.store(true, Ordering::SeqCst);
    }

    pub fn fail_zone_exists(&self) {
        self.fail_zone_exists.store(true, Ordering::SeqCst);
    }

    /// Make `create_record` answer `UnsupportedRecordType` for `record_type`.
    pub fn reject_record_type(&self, record_type: DnsRecordType) {
        lock(&self.rejected_types).push(record_type);
    }

    /// Current records of a zone, empty when the zone is absent.
    pub fn records(&self, zone: &str) -> Vec<DnsRecord> {
        lock(&self.zones)
            .get(&key(zone))
            .map(|s| s.records.clone())
            .unwrap_or_default()
    }

    /// Current zone, if present.
    pub fn zone(&self, zone: &str) -> Option<Zone> {
        lock(&self.zones).get(&key(zone)).map(|s| s.zone.clone())
    }

    pub fn has_zone(&self, zone: &str) -> bool {
        lock(&self.zones).contains_key(&key(zone))
    }

    pub fn replace_calls(&self) -> usize {
        self.replace_calls.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    fn log_call(&self, call: String) {
        lock(&self.calls).push(call);
    }

    fn fresh_id(&self) -> String {
        self.next_id.fetch_add(1, Ordering::SeqCst).to_string()
    }

    fn network_error(&self, detail: &str) -> ProviderError {
        ProviderError::NetworkError {
            provider: self.id.to_string(),
            detail: detail.to_string(),
        }
    }

    fn zone_not_found(&self, zone: &str) -> ProviderError {
        ProviderError::ZoneNotFound {
            provider: self.id.to_string(),
            zone: zone.to_string(),
            raw_message: None,
        }
    }

    fn with_state<T>(
        &self,
        zone: &str,
        f: impl FnOnce(&mut ZoneState) -> Result<T>,
    ) -> Result<T> {
        let mut zones = lock(&self.zones);
        let state = zones
            .get_mut(&key(zone))
            .ok_or_else(|| self.zone_not_found(zone))?;
        f(state)
    }
}

#[async_trait]
impl DnsProvider for MockProvider {
    fn id(&self) -> &'static str {
        self.id
    }

    fn metadata() -> ProviderMetadata {
        ProviderMetadata {
            id: ProviderType::Memory,
            name: "Memory".to_string(),
            description: "In-memory provider".to_string(),
            required_fields: Vec::new(),
            optional_fields: Vec::new(),
            features: ProviderFeatures {
                zone_management: true,
                record_ids: true,
                replaces_record_set: true,
                ..ProviderFeatures::default()
            },
            limits: ProviderLimits {
                max_page_size_zones: 100,
                max_page_size_records: 100,
            },
        }
    }

    async fn validate_credentials(&self) -> Result<bool> {
        Ok(true)
    }

    async fn list_zones(&self) -> Result<Vec<Zone>> {
        self.log_call("list_zones".to_string());
        Ok(lock(&self.zones).values().map(|s| s.zone.clone()).collect())
    }

    async fn get_zone(&self, zone: &str) -> Result<Zone> {
        self.with_state(zone, |s| Ok(s.zone.clone()))
    }

    async fn zone_exists(&self, zone: &str) -> Result<bool> {
        self.log_call(format!("zone_exists {zone}"));
        if self.fail_zone_exists.load(Ordering::SeqCst) {
            return Err(self.network_error("zone lookup failed"));
        }
        Ok(self.has_zone(zone))
    }

    async fn create_zone(&self, req: &CreateZoneRequest) -> Result<Zone> {
        self.log_call(format!("create_zone {}", req.name));
        if self.has_zone(&req.name) {
            return Err(ProviderError::ZoneExists {
                provider: self.id.to_string(),
                zone: req.name.clone(),
                raw_message: None,
            });
        }
        let zone = Zone {
            ttl: req.ttl,
            mode: req.mode,
            nameservers: req.nameservers.clone(),
            ..Zone::named(req.name.trim_end_matches('.'))
        };
        self.insert_zone(zone.clone(), Vec::new());
        Ok(zone)
    }

    async fn delete_zone(&self, zone: &str) -> Result<()> {
        self.log_call(format!("delete_zone {zone}"));
        if self.fail_delete_zone.load(Ordering::SeqCst) {
            return Err(self.network_error("zone deletion failed"));
        }
        lock(&self.zones)
            .remove(&key(zone))
            .map(|_| ())
            .ok_or_else(|| self.zone_not_found(zone))
    }

    async fn list_records(&self, zone: &str) -> Result<Vec<DnsRecord>> {
        self.log_call(format!("list_records {zone}"));
        if self.fail_list_records.load(Ordering::SeqCst) {
            return Err(self.network_error("record listing failed"));
        }
        self.with_state(zone, |s| Ok(s.records.clone()))
    }

    async fn create_record(&self, zone: &str, req: &CreateRecordRequest) -> Result<DnsRecord> {
        self.log_call(format!(
            "create_record {zone} {}/{}",
            req.name, req.record_type
        ));
        if lock(&self.rejected_types).contains(&req.record_type) {
            return Err(ProviderError::UnsupportedRecordType {
                provider: self.id.to_string(),
                record_type: req.record_type.to_string(),
            });
        }
        let done = self.create_record_calls.fetch_add(1, Ordering::SeqCst);
        if lock(&self.fail_create_record_after).is_some_and(|limit| done >= limit) {
            return Err(ProviderError::InvalidParameter {
                provider: self.id.to_string(),
                param: "record".to_string(),
                detail: format!("rejected {}/{}", req.name, req.record_type),
            });
        }

        let record = req.to_record(Some(self.fresh_id()), DEFAULT_TTL);
        self.with_state(zone, |s| {
            if s.records.iter().any(|r| r.same_content(&record)) {
                return Err(ProviderError::RecordExists {
                    provider: self.id.to_string(),
                    record_name: record.name.clone(),
                    raw_message: None,
                });
            }
            s.records.push(record.clone());
            Ok(record)
        })
    }

    async fn update_record(
        &self,
        zone: &str,
        record: &DnsRecord,
        req: &CreateRecordRequest,
    ) -> Result<DnsRecord> {
        self.log_call(format!(
            "update_record {zone} {}/{}",
            record.name, record.record_type
        ));
        self.with_state(zone, |s| {
            let slot = s
                .records
                .iter_mut()
                .find(|r| r.same_content(record))
                .ok_or_else(|| ProviderError::RecordNotFound {
                    provider: self.id.to_string(),
                    record_id: record.id.clone().unwrap_or_default(),
                    raw_message: None,
                })?;
            *slot = req.to_record(slot.id.clone(), DEFAULT_TTL);
            Ok(slot.clone())
        })
    }

    async fn delete_record(&self, zone: &str, record: &DnsRecord) -> Result<()> {
        self.log_call(format!(
            "delete_record {zone} {}/{}",
            record.name, record.record_type
        ));
        if lock(&self.fail_delete_values).contains(&record.value) {
            return Err(self.network_error("record deletion failed"));
        }
        self.with_state(zone, |s| {
            let pos = s
                .records
                .iter()
                .position(|r| r.same_content(record))
                .ok_or_else(|| ProviderError::RecordNotFound {
                    provider: self.id.to_string(),
                    record_id: record.id.clone().unwrap_or_default(),
                    raw_message: None,
                })?;
            s.records.remove(pos);
            Ok(())
        })
    }
}

#[async_trait]
impl ReplaceRecordSet for MockProvider {
    async fn fetch_record_set(&self, zone: &str) -> Result<Vec<DnsRecord>> {
        self.with_state(zone, |s| Ok(s.records.clone()))
    }

    async fn replace_record_set(&self, zone: &str, records: &[DnsRecord]) -> Result<()> {
        self.replace_calls.fetch_add(1, Ordering::SeqCst);
        self.with_state(zone, |s| {
            s.records = records.to_vec();
            Ok(())
        })
    }
}
