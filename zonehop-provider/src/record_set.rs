//! Single-record changes for providers that only accept whole record sets.
//!
//! Every function here reads the full set, edits it in memory and writes it back.
//! A concurrent writer between the read and the write is silently overwritten.

use crate::error::{ProviderError, Result};
use crate::traits::ReplaceRecordSet;
use crate::types::{CreateRecordRequest, DnsRecord};

fn record_key(record: &DnsRecord) -> String {
    format!("{}/{}", record.name, record.record_type)
}

/// Append one record to the set.
///
/// Fails with `RecordExists` when an identical name/type/content entry is present.
pub async fn add_record<P>(
    provider: &P,
    zone: &str,
    req: &CreateRecordRequest,
    default_ttl: u32,
) -> Result<DnsRecord>
where
    P: ReplaceRecordSet + ?Sized,
{
    let mut records = provider.fetch_record_set(zone).await?;
    let record = req.to_record(None, default_ttl);

    if records.iter().any(|r| r.same_content(&record)) {
        return Err(ProviderError::RecordExists {
            provider: provider.id().to_string(),
            record_name: record.name,
            raw_message: None,
        });
    }

    records.push(record.clone());
    log::debug!(
        "[{}] Writing {} records to {zone} (added {})",
        provider.id(),
        records.len(),
        record_key(&record)
    );
    provider.replace_record_set(zone, &records).await?;
    Ok(record)
}

/// Remove the entry matching `record` by name/type/content.
pub async fn remove_record<P>(provider: &P, zone: &str, record: &DnsRecord) -> Result<()>
where
    P: ReplaceRecordSet + ?Sized,
{
    let mut records = provider.fetch_record_set(zone).await?;
    let Some(pos) = records.iter().position(|r| r.same_content(record)) else {
        return Err(ProviderError::RecordNotFound {
            provider: provider.id().to_string(),
            record_id: record_key(record),
            raw_message: None,
        });
    };

    records.remove(pos);
    log::debug!(
        "[{}] Writing {} records to {zone} (removed {})",
        provider.id(),
        records.len(),
        record_key(record)
    );
    provider.replace_record_set(zone, &records).await
}

/// Swap the entry matching `old` for the record described by `req`.
pub async fn replace_record<P>(
    provider: &P,
    zone: &str,
    old: &DnsRecord,
    req: &CreateRecordRequest,
    default_ttl: u32,
) -> Result<DnsRecord>
where
    P: ReplaceRecordSet + ?Sized,
{
    let mut records = provider.fetch_record_set(zone).await?;
    let Some(pos) = records.iter().position(|r| r.same_content(old)) else {
        return Err(ProviderError::RecordNotFound {
            provider: provider.id().to_string(),
            record_id: record_key(old),
            raw_message: None,
        });
    };

    let updated = req.to_record(None, default_ttl);
    let duplicate = records
        .iter()
        .enumerate()
        .any(|(i, r)| i != pos && r.same_content(&updated));
    if duplicate {
        return Err(ProviderError::RecordExists {
            provider: provider.id().to_string(),
            record_name: updated.name,
            raw_message: None,
        });
    }

    records[pos] = updated.clone();
    provider.replace_record_set(zone, &records).await?;
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockProvider, record};
    use crate::types::DnsRecordType;

    fn seeded() -> MockProvider {
        MockProvider::new("mock").with_zone(
            "example.com",
            vec![
                record("@", DnsRecordType::A, "192.0.2.1"),
                record("www", DnsRecordType::Cname, "example.com."),
            ],
        )
    }

    #[tokio::test]
    async fn add_appends_and_writes_whole_set() {
        let p = seeded();
        let req = CreateRecordRequest::new("_acme-challenge", DnsRecordType::Txt, "tok");
        let created = add_record(&p, "example.com", &req, 300).await.unwrap();
        assert_eq!(created.ttl, 300);

        let set = p.records("example.com");
        assert_eq!(set.len(), 3);
        assert_eq!(p.replace_calls(), 1);
    }

    #[tokio::test]
    async fn add_rejects_identical_record() {
        let p = seeded();
        let req = CreateRecordRequest::new("@", DnsRecordType::A, "192.0.2.1");
        let err = add_record(&p, "example.com", &req, 300).await;
        assert!(
            matches!(&err, Err(ProviderError::RecordExists { .. })),
            "unexpected result: {err:?}"
        );
        assert_eq!(p.replace_calls(), 0);
    }

    #[tokio::test]
    async fn remove_drops_only_matching_entry() {
        let p = seeded();
        let target = record("www", DnsRecordType::Cname, "example.com.");
        remove_record(&p, "example.com", &target).await.unwrap();

        let set = p.records("example.com");
        assert_eq!(set.len(), 1);
        assert_eq!(set[0].record_type, DnsRecordType::A);
    }

    #[tokio::test]
    async fn remove_missing_is_not_found() {
        let p = seeded();
        let target = record("ftp", DnsRecordType::A, "192.0.2.9");
        let err = remove_record(&p, "example.com", &target).await;
        assert!(
            matches!(&err, Err(ProviderError::RecordNotFound { record_id, .. }) if record_id == "ftp/A"),
            "unexpected result: {err:?}"
        );
    }

    #[tokio::test]
    async fn replace_swaps_in_place() {
        let p = seeded();
        let old = record("@", DnsRecordType::A, "192.0.2.1");
        let req = CreateRecordRequest::new("@", DnsRecordType::A, "192.0.2.2").with_ttl(60);
        let updated = replace_record(&p, "example.com", &old, &req, 300)
            .await
            .unwrap();
        assert_eq!(updated.ttl, 60);

        let set = p.records("example.com");
        assert_eq!(set.len(), 2);
        assert!(set.iter().any(|r| r.value == "192.0.2.2"));
        assert!(!set.iter().any(|r| r.value == "192.0.2.1"));
    }
}
