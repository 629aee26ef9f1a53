//! Copying a zone from one provider account to another.
//!
//! [`clone_zone`] is all-or-nothing: the first record that cannot be created on
//! the destination aborts the copy and the destination zone is deleted again.
//! Records of types without a [`DnsRecordType`] variant are replayed like any
//! other, so a destination that cannot hold them fails the copy.
//! [`plan_replay`] is the filtering step on its own, for callers that want to
//! replay records themselves (dry runs, best-effort copies).

use crate::error::ProviderError;
use crate::providers::common::{is_apex, split_priority};
use crate::traits::DnsProvider;
use crate::types::{CreateRecordRequest, CreateZoneRequest, DnsRecord, DnsRecordType};

/// Records to create on the destination, and the source records left out.
#[derive(Debug, Clone, Default)]
pub struct ReplayPlan {
    pub requests: Vec<CreateRecordRequest>,
    /// SOA records and apex NS records; the destination provider manages those.
    pub skipped: Vec<DnsRecord>,
}

/// Build the replay plan for the records of `zone`.
///
/// SOA records and NS records at the apex are skipped. MX/SRV records that still
/// carry their priority inside the value get it split off. Everything else,
/// including [`DnsRecordType::Other`] types, is replayed with the same name,
/// value and TTL.
pub fn plan_replay(zone: &str, records: &[DnsRecord]) -> ReplayPlan {
    let mut plan = ReplayPlan::default();

    for record in records {
        let apex_ns = record.record_type == DnsRecordType::Ns && is_apex(&record.name, zone);
        if record.record_type == DnsRecordType::Soa || apex_ns {
            plan.skipped.push(record.clone());
            continue;
        }

        let mut req = CreateRecordRequest::from(record);
        if req.priority.is_none() {
            let (priority, value) = split_priority(&record.record_type, &record.value);
            req.priority = priority;
            req.value = value;
        }
        plan.requests.push(req);
    }

    plan
}

/// Outcome of a successful [`clone_zone`].
#[derive(Debug, Clone)]
pub struct CloneReport {
    pub source_zone: String,
    pub destination_zone: String,
    pub created: Vec<DnsRecord>,
    pub skipped: Vec<DnsRecord>,
}

/// Why a clone stopped.
#[derive(Debug, thiserror::Error)]
pub enum CloneError {
    #[error("could not check whether {zone} exists on the destination: {source}")]
    DestinationCheck {
        zone: String,
        #[source]
        source: ProviderError,
    },

    #[error("destination zone {zone} already exists")]
    DestinationExists { zone: String },

    #[error("could not read source zone {zone}: {source}")]
    Source {
        zone: String,
        #[source]
        source: ProviderError,
    },

    #[error("could not create destination zone {zone}: {source}")]
    CreateZone {
        zone: String,
        #[source]
        source: ProviderError,
    },

    #[error(
        "creating {record} in {zone} failed: {source} ({})",
        rollback_summary(*rolled_back, rollback_error.as_ref())
    )]
    Replay {
        zone: String,
        /// `name/TYPE` of the record that failed.
        record: String,
        #[source]
        source: ProviderError,
        rolled_back: bool,
        rollback_error: Option<ProviderError>,
    },
}

fn rollback_summary(rolled_back: bool, rollback_error: Option<&ProviderError>) -> String {
    match (rolled_back, rollback_error) {
        (true, _) => "destination zone removed".to_string(),
        (false, Some(e)) => format!("destination zone left behind, rollback failed: {e}"),
        (false, None) => "destination zone left behind".to_string(),
    }
}

/// Copy `source_zone` from `source` to a new zone `destination_zone` on `destination`.
///
/// The zone's TTL and mode are carried over. Nameservers are carried over only
/// between accounts of the same provider, since another provider cannot serve a
/// zone on foreign nameservers.
///
/// # Errors
///
/// Nothing is created on the destination when the zone already exists there or
/// the source cannot be read. A failed record creation deletes the destination
/// zone again; [`CloneError::Replay`] tells whether that worked.
pub async fn clone_zone<S, D>(
    source: &S,
    source_zone: &str,
    destination: &D,
    destination_zone: &str,
) -> Result<CloneReport, CloneError>
where
    S: DnsProvider + ?Sized,
    D: DnsProvider + ?Sized,
{
    let exists = destination
        .zone_exists(destination_zone)
        .await
        .map_err(|source| CloneError::DestinationCheck {
            zone: destination_zone.to_string(),
            source,
        })?;
    if exists {
        return Err(CloneError::DestinationExists {
            zone: destination_zone.to_string(),
        });
    }

    let source_err = |source| CloneError::Source {
        zone: source_zone.to_string(),
        source,
    };
    let zone = source.get_zone(source_zone).await.map_err(source_err)?;
    let records = source.zone_transfer(source_zone).await.map_err(source_err)?;
    let plan = plan_replay(source_zone, &records);
    log::info!(
        "[{}] {source_zone}: {} records to copy, {} skipped",
        source.id(),
        plan.requests.len(),
        plan.skipped.len()
    );

    let mut req = CreateZoneRequest::new(destination_zone);
    req.ttl = zone.ttl;
    req.mode = zone.mode;
    if source.id() == destination.id() {
        req.nameservers = zone.nameservers;
    }
    destination
        .create_zone(&req)
        .await
        .map_err(|source| CloneError::CreateZone {
            zone: destination_zone.to_string(),
            source,
        })?;

    let mut created = Vec::with_capacity(plan.requests.len());
    for req in &plan.requests {
        match destination.create_record(destination_zone, req).await {
            Ok(record) => created.push(record),
            Err(e) => {
                let record = format!("{}/{}", req.name, req.record_type);
                log::error!(
                    "[{}] {destination_zone}: creating {record} failed, rolling back: {e}",
                    destination.id()
                );
                let rollback = destination.delete_zone(destination_zone).await;
                if let Err(rb) = &rollback {
                    log::error!(
                        "[{}] {destination_zone}: rollback failed: {rb}",
                        destination.id()
                    );
                }
                return Err(CloneError::Replay {
                    zone: destination_zone.to_string(),
                    record,
                    source: e,
                    rolled_back: rollback.is_ok(),
                    rollback_error: rollback.err(),
                });
            }
        }
    }

    Ok(CloneReport {
        source_zone: source_zone.to_string(),
        destination_zone: destination_zone.to_string(),
        created,
        skipped: plan.skipped,
    })
}
