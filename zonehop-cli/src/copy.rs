//! Best-effort zone copy between two accounts
//!
//! Unlike [`zonehop_provider::clone_zone`], a record that fails to copy is
//! logged and counted and the copy goes on. Nothing is rolled back.

use zonehop_provider::{CreateRecordRequest, CreateZoneRequest, DnsProvider, plan_replay};

use crate::error::{CliError, Result};

#[derive(Debug, Clone, Copy, Default)]
pub struct CopyOptions {
    /// Print what would be created without touching the destination.
    pub dry_run: bool,
}

/// What a copy did (or would do, in a dry run).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyReport {
    /// Records created, or planned in a dry run.
    pub transferred: usize,
    pub failed: usize,
    /// SOA and apex NS records left to the destination provider.
    pub skipped: usize,
    /// Records on the destination after the copy; `None` in a dry run.
    pub destination_records: Option<usize>,
}

/// Copy `domain` from `source` to `destination`.
///
/// The source zone must exist and the destination zone must not.
pub async fn copy_zone(
    source: &dyn DnsProvider,
    destination: &dyn DnsProvider,
    domain: &str,
    options: CopyOptions,
) -> Result<CopyReport> {
    if !source.zone_exists(domain).await? {
        return Err(CliError::Precondition(format!(
            "zone {domain} does not exist on the source account ({})",
            source.id()
        )));
    }
    if destination.zone_exists(domain).await? {
        return Err(CliError::Precondition(format!(
            "zone {domain} already exists on the destination account ({})",
            destination.id()
        )));
    }

    if options.dry_run {
        tracing::info!("[dry-run] would create zone {domain} on {}", destination.id());
    } else {
        destination
            .create_zone(&CreateZoneRequest::new(domain))
            .await?;
        tracing::info!("Created zone {domain} on {}", destination.id());
    }

    let records = source.zone_transfer(domain).await?;
    let plan = plan_replay(domain, &records);
    let mut report = CopyReport {
        skipped: plan.skipped.len(),
        ..CopyReport::default()
    };
    tracing::info!(
        "Copying {} of {} records from {}",
        plan.requests.len(),
        records.len(),
        source.id()
    );

    for req in &plan.requests {
        let line = describe(req);
        if options.dry_run {
            tracing::info!("[dry-run] {line}");
            report.transferred += 1;
            continue;
        }
        match destination.create_record(domain, req).await {
            Ok(_) => {
                tracing::debug!("Created {line}");
                report.transferred += 1;
            }
            Err(e) => {
                tracing::warn!("Failed to create {line}: {e}");
                report.failed += 1;
            }
        }
    }

    if !options.dry_run {
        let after = destination.list_records(domain).await?;
        report.destination_records = Some(after.len());
    }

    Ok(report)
}

/// `name ttl TYPE [priority] value`, as printed for each copied record
fn describe(req: &CreateRecordRequest) -> String {
    let ttl = req.ttl.map_or_else(|| "-".to_string(), |t| t.to_string());
    match req.priority {
        Some(prio) => format!("{} {ttl} {} {prio} {}", req.name, req.record_type, req.value),
        None => format!("{} {ttl} {} {}", req.name, req.record_type, req.value),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use zonehop_provider::DnsRecordType;
    use zonehop_provider::test_utils::{MockProvider, record};

    fn source() -> MockProvider {
        let mut mx = record("@", DnsRecordType::Mx, "10 mx.example.com.");
        mx.ttl = 600;
        MockProvider::new("source").with_zone(
            "example.com",
            vec![
                record(
                    "@",
                    DnsRecordType::Soa,
                    "ns1.example.net. hostmaster.example.com. 1 7200 3600 1209600 3600",
                ),
                record("@", DnsRecordType::Ns, "ns1.example.net."),
                record("sub", DnsRecordType::Ns, "ns.other.net."),
                record("www", DnsRecordType::A, "192.0.2.1"),
                mx,
            ],
        )
    }

    fn mutations(provider: &MockProvider) -> Vec<String> {
        provider
            .calls()
            .into_iter()
            .filter(|c| {
                ["create_", "update_", "delete_"]
                    .iter()
                    .any(|prefix| c.starts_with(prefix))
            })
            .collect()
    }

    #[tokio::test]
    async fn copies_everything_but_soa_and_apex_ns() {
        let src = source();
        let dst = MockProvider::new("dest");

        let report = copy_zone(&src, &dst, "example.com", CopyOptions::default())
            .await
            .unwrap();

        assert_eq!(report.transferred, 3);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.failed, 0);
        assert_eq!(report.destination_records, Some(3));

        let records = dst.records("example.com");
        let mx = records
            .iter()
            .find(|r| r.record_type == DnsRecordType::Mx)
            .unwrap();
        assert_eq!(mx.priority, Some(10));
        assert_eq!(mx.value, "mx.example.com.");
        assert_eq!(mx.ttl, 600);
    }

    #[tokio::test]
    async fn dry_run_makes_no_mutations_and_reports_same_count() {
        let src = source();
        let dst = MockProvider::new("dest");

        let dry = copy_zone(&src, &dst, "example.com", CopyOptions { dry_run: true })
            .await
            .unwrap();
        assert!(mutations(&dst).is_empty(), "{:?}", dst.calls());
        assert!(!dst.has_zone("example.com"));
        assert_eq!(dry.destination_records, None);

        let live = copy_zone(&src, &dst, "example.com", CopyOptions::default())
            .await
            .unwrap();
        assert_eq!(dry.transferred, live.transferred);
    }

    #[tokio::test]
    async fn record_failures_are_counted_not_fatal() {
        let src = source();
        let dst = MockProvider::new("dest");
        dst.fail_create_record_after(1);

        let report = copy_zone(&src, &dst, "example.com", CopyOptions::default())
            .await
            .unwrap();

        assert_eq!(report.transferred, 1);
        assert_eq!(report.failed, 2);
        assert!(dst.has_zone("example.com"));
        assert_eq!(report.destination_records, Some(1));
    }

    #[tokio::test]
    async fn existing_destination_is_a_precondition_failure() {
        let src = source();
        let dst = MockProvider::new("dest").with_zone("example.com", Vec::new());

        let err = copy_zone(&src, &dst, "example.com", CopyOptions::default())
            .await
            .err();
        assert!(matches!(err, Some(CliError::Precondition(_))));
        assert!(mutations(&dst).is_empty());
    }

    #[tokio::test]
    async fn missing_source_is_a_precondition_failure() {
        let src = MockProvider::new("source");
        let dst = MockProvider::new("dest");

        let err = copy_zone(&src, &dst, "example.com", CopyOptions::default())
            .await
            .err();
        assert!(matches!(err, Some(CliError::Precondition(msg)) if msg.contains("source")));
    }
}
