//! ACME dns-01 challenge records
//!
//! `setup` publishes the TXT record and waits until the local resolver sees it.
//! Seeing it is advisory only: the CA queries other resolvers, so `setup`
//! succeeds once the record is created, whatever the poll found.

use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::TokioResolver;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::name_server::TokioConnectionProvider;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use zonehop_provider::{
    CreateRecordRequest, DnsProvider, DnsRecord, DnsRecordType, Zone, full_name_to_relative,
    normalize_domain_name, relative_to_full_name, unquote_txt,
};

use crate::error::{CliError, Result};

pub const CHALLENGE_LABEL: &str = "_acme-challenge";

/// TTL of the challenge record
pub const DEFAULT_TTL: u32 = 300;

/// `_acme-challenge.<domain>`, with a leading wildcard label dropped.
pub fn challenge_name(domain: &str) -> String {
    let domain = normalize_domain_name(domain);
    let domain = domain.strip_prefix("*.").unwrap_or(&domain);
    format!("{CHALLENGE_LABEL}.{}", domain.to_ascii_lowercase())
}

/// The longest zone that `name` is equal to or below.
pub fn find_zone<'a>(zones: &'a [Zone], name: &str) -> Option<&'a Zone> {
    let name = normalize_domain_name(name).to_ascii_lowercase();
    zones
        .iter()
        .filter(|zone| {
            let zone_name = normalize_domain_name(&zone.name).to_ascii_lowercase();
            name == zone_name || name.ends_with(&format!(".{zone_name}"))
        })
        .max_by_key(|zone| normalize_domain_name(&zone.name).len())
}

/// Name of the account zone that holds the challenge record for `domain`.
pub async fn zone_for(provider: &dyn DnsProvider, domain: &str, account: &str) -> Result<String> {
    let zones = provider.list_zones().await?;
    find_zone(&zones, &challenge_name(domain))
        .map(|zone| normalize_domain_name(&zone.name))
        .ok_or_else(|| CliError::NoMatchingZone {
            domain: domain.to_string(),
            account: account.to_string(),
        })
}

// ===== Resolution =====

/// TXT lookups against some resolver.
#[async_trait]
pub trait TxtResolver: Send + Sync {
    /// TXT strings at `name`; lookup failures count as no records.
    async fn lookup_txt(&self, name: &str) -> Vec<String>;
}

/// The host's configured resolver.
pub struct SystemResolver {
    resolver: TokioResolver,
}

impl SystemResolver {
    pub fn new() -> Self {
        let resolver = match TokioResolver::builder_tokio() {
            Ok(builder) => builder.build(),
            Err(e) => {
                tracing::warn!("Failed to load system DNS configuration, using defaults: {e}");
                TokioResolver::builder_with_config(
                    ResolverConfig::default(),
                    TokioConnectionProvider::default(),
                )
                .with_options(ResolverOpts::default())
                .build()
            }
        };
        Self { resolver }
    }
}

impl Default for SystemResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TxtResolver for SystemResolver {
    async fn lookup_txt(&self, name: &str) -> Vec<String> {
        let fqdn = format!("{name}.");
        match self.resolver.txt_lookup(fqdn.as_str()).await {
            Ok(response) => response
                .iter()
                .map(|txt| {
                    txt.iter()
                        .map(|data| String::from_utf8_lossy(data).to_string())
                        .collect::<String>()
                })
                .collect(),
            Err(e) => {
                tracing::debug!("TXT lookup for {name} failed: {e}");
                Vec::new()
            }
        }
    }
}

/// How long and how often to look for the published token.
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    pub deadline: Duration,
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            deadline: Duration::from_secs(120),
            interval: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    TimedOut,
    Cancelled,
}

/// Look up `name` until `token` shows up, the deadline passes or `cancel` fires.
pub async fn wait_for_txt(
    resolver: &dyn TxtResolver,
    name: &str,
    token: &str,
    poll: PollConfig,
    cancel: &CancellationToken,
) -> Visibility {
    let deadline = Instant::now() + poll.deadline;
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        let found = tokio::select! {
            () = cancel.cancelled() => return Visibility::Cancelled,
            values = resolver.lookup_txt(name) => values.iter().any(|v| v == token),
        };
        if found {
            tracing::info!("{name} resolves to the token (attempt {attempt})");
            return Visibility::Visible;
        }

        let now = Instant::now();
        if now >= deadline {
            return Visibility::TimedOut;
        }
        let wake = (now + poll.interval).min(deadline);
        tracing::debug!("{name} not visible yet (attempt {attempt})");
        tokio::select! {
            () = cancel.cancelled() => return Visibility::Cancelled,
            () = tokio::time::sleep_until(wake) => {}
        }
    }
}

// ===== Challenge lifecycle =====

/// One challenge: the token to publish for `domain` in account zone `zone`.
#[derive(Debug, Clone, Copy)]
pub struct Challenge<'a> {
    pub zone: &'a str,
    pub domain: &'a str,
    pub token: &'a str,
    pub ttl: u32,
}

#[derive(Debug, Clone)]
pub struct SetupReport {
    pub zone: String,
    pub record: DnsRecord,
    pub visibility: Visibility,
}

/// Create the challenge TXT record, then wait for it to resolve.
pub async fn setup(
    provider: &dyn DnsProvider,
    resolver: &dyn TxtResolver,
    challenge: Challenge<'_>,
    poll: PollConfig,
    cancel: &CancellationToken,
) -> Result<SetupReport> {
    let Challenge {
        zone,
        domain,
        token,
        ttl,
    } = challenge;
    let name = challenge_name(domain);
    let req = CreateRecordRequest::new(
        full_name_to_relative(&name, zone),
        DnsRecordType::Txt,
        token,
    )
    .with_ttl(ttl);

    let record = provider.create_record(zone, &req).await?;
    tracing::info!("Created TXT {name} in zone {zone}");

    let visibility = wait_for_txt(resolver, &name, token, poll, cancel).await;
    match visibility {
        Visibility::Visible => {}
        Visibility::TimedOut => tracing::warn!(
            "{name} not visible locally after {}s; continuing",
            poll.deadline.as_secs()
        ),
        Visibility::Cancelled => tracing::warn!("Stopped waiting for {name}"),
    }

    Ok(SetupReport {
        zone: zone.to_string(),
        record,
        visibility,
    })
}

/// Delete the challenge TXT records for `domain`, only those equal to `token` if given.
///
/// Returns how many records were deleted.
pub async fn teardown(
    provider: &dyn DnsProvider,
    zone: &str,
    domain: &str,
    token: Option<&str>,
) -> Result<usize> {
    let name = challenge_name(domain);
    let matching: Vec<DnsRecord> = provider
        .list_records(zone)
        .await?
        .into_iter()
        .filter(|r| r.record_type == DnsRecordType::Txt)
        .filter(|r| relative_to_full_name(&r.name, zone).eq_ignore_ascii_case(&name))
        .filter(|r| token.is_none_or(|t| unquote_txt(&r.value) == t))
        .collect();

    if matching.is_empty() {
        return Err(CliError::NoChallengeRecords { name });
    }

    let mut left = Vec::new();
    for record in &matching {
        if let Err(e) = provider.delete_record(zone, record).await {
            tracing::error!("Failed to delete TXT {name} {}: {e}", record.value);
            left.push(record.value.clone());
        }
    }
    let deleted = matching.len() - left.len();
    if !left.is_empty() {
        return Err(CliError::PartialTeardown {
            name,
            matched: matching.len(),
            deleted,
            left,
        });
    }

    tracing::info!("Deleted {deleted} TXT records at {name}");
    Ok(deleted)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use zonehop_provider::test_utils::{MockProvider, record};

    /// Resolver that starts answering with `values` after `misses` lookups.
    struct FakeResolver {
        values: Vec<String>,
        misses: usize,
        lookups: AtomicUsize,
        names: Mutex<Vec<String>>,
    }

    impl FakeResolver {
        fn new(values: &[&str], misses: usize) -> Self {
            Self {
                values: values.iter().map(ToString::to_string).collect(),
                misses,
                lookups: AtomicUsize::new(0),
                names: Mutex::new(Vec::new()),
            }
        }

        fn lookups(&self) -> usize {
            self.lookups.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TxtResolver for FakeResolver {
        async fn lookup_txt(&self, name: &str) -> Vec<String> {
            self.names.lock().unwrap().push(name.to_string());
            let n = self.lookups.fetch_add(1, Ordering::SeqCst);
            if n < self.misses {
                Vec::new()
            } else {
                self.values.clone()
            }
        }
    }

    fn txt(name: &str, value: &str) -> DnsRecord {
        record(name, DnsRecordType::Txt, value)
    }

    #[test]
    fn challenge_names() {
        assert_eq!(challenge_name("example.com"), "_acme-challenge.example.com");
        assert_eq!(challenge_name("*.Example.com."), "_acme-challenge.example.com");
        assert_eq!(challenge_name("a.b.example.com"), "_acme-challenge.a.b.example.com");
    }

    #[test]
    fn longest_matching_zone_wins() {
        let zones = vec![
            Zone::named("example.com"),
            Zone::named("sub.example.com"),
            Zone::named("ample.com"),
        ];
        let pick = |name: &str| find_zone(&zones, name).map(|z| z.name.clone());

        assert_eq!(
            pick("_acme-challenge.www.sub.example.com").as_deref(),
            Some("sub.example.com")
        );
        assert_eq!(
            pick("_acme-challenge.example.com").as_deref(),
            Some("example.com")
        );
        assert_eq!(pick("_acme-challenge.other.org"), None);
        assert_eq!(pick("_acme-challenge.xample.com"), None);
    }

    #[tokio::test]
    async fn zone_lookup_reports_account() {
        let p = MockProvider::new("memory").with_zone("example.com", Vec::new());
        assert_eq!(zone_for(&p, "www.example.com", "a").await.unwrap(), "example.com");
        let err = zone_for(&p, "example.org", "a").await.err();
        assert!(matches!(err, Some(CliError::NoMatchingZone { account, .. }) if account == "a"));
    }

    #[tokio::test(start_paused = true)]
    async fn setup_creates_record_before_polling() {
        let p = MockProvider::new("memory").with_zone("example.com", Vec::new());
        let resolver = FakeResolver::new(&["tok"], 2);

        let report = setup(
            &p,
            &resolver,
            Challenge {
                zone: "example.com",
                domain: "www.example.com",
                token: "tok",
                ttl: DEFAULT_TTL,
            },
            PollConfig::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(report.visibility, Visibility::Visible);
        assert_eq!(resolver.lookups(), 3);
        assert_eq!(
            resolver.names.lock().unwrap()[0],
            "_acme-challenge.www.example.com"
        );
        let records = p.records("example.com");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "_acme-challenge.www");
        assert_eq!(records[0].ttl, DEFAULT_TTL);
        assert_eq!(p.calls()[0], "create_record example.com _acme-challenge.www/TXT");
    }

    #[tokio::test(start_paused = true)]
    async fn setup_succeeds_when_token_never_resolves() {
        let p = MockProvider::new("memory").with_zone("example.com", Vec::new());
        let resolver = FakeResolver::new(&["other"], 0);
        let poll = PollConfig {
            deadline: Duration::from_secs(30),
            interval: Duration::from_secs(10),
        };

        let report = setup(
            &p,
            &resolver,
            Challenge {
                zone: "example.com",
                domain: "example.com",
                token: "tok",
                ttl: DEFAULT_TTL,
            },
            poll,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(report.visibility, Visibility::TimedOut);
        // t = 0, 10, 20, 30
        assert_eq!(resolver.lookups(), 4);
        assert_eq!(p.records("example.com").len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_poll_stops_early() {
        let resolver = FakeResolver::new(&[], 0);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let v = wait_for_txt(
            &resolver,
            "_acme-challenge.example.com",
            "tok",
            PollConfig::default(),
            &cancel,
        )
        .await;
        assert_eq!(v, Visibility::Cancelled);
    }

    #[tokio::test]
    async fn setup_fails_when_record_cannot_be_created() {
        let p = MockProvider::new("memory").with_zone("example.com", Vec::new());
        p.fail_create_record_after(0);
        let resolver = FakeResolver::new(&["tok"], 0);

        let result = setup(
            &p,
            &resolver,
            Challenge {
                zone: "example.com",
                domain: "example.com",
                token: "tok",
                ttl: DEFAULT_TTL,
            },
            PollConfig::default(),
            &CancellationToken::new(),
        )
        .await;
        assert!(matches!(result, Err(CliError::Provider(_))));
        assert_eq!(resolver.lookups(), 0);
    }

    fn challenge_zone() -> MockProvider {
        MockProvider::new("memory").with_zone(
            "example.com",
            vec![
                txt("_acme-challenge", "one"),
                txt("_acme-challenge", "two"),
                txt("@", "v=spf1 -all"),
                record("_acme-challenge", DnsRecordType::Cname, "elsewhere.example.net."),
            ],
        )
    }

    #[tokio::test]
    async fn teardown_without_token_removes_all_challenge_txt() {
        let p = challenge_zone();
        let deleted = teardown(&p, "example.com", "example.com", None).await.unwrap();
        assert_eq!(deleted, 2);

        let left = p.records("example.com");
        assert_eq!(left.len(), 2);
        assert!(
            left.iter()
                .all(|r| r.name != "_acme-challenge" || r.record_type != DnsRecordType::Txt)
        );
    }

    #[tokio::test]
    async fn teardown_with_token_removes_only_that_value() {
        let p = challenge_zone();
        let deleted = teardown(&p, "example.com", "*.example.com", Some("two"))
            .await
            .unwrap();
        assert_eq!(deleted, 1);
        assert!(p.records("example.com").iter().any(|r| r.value == "one"));
    }

    #[tokio::test]
    async fn teardown_reports_records_it_could_not_delete() {
        let p = challenge_zone();
        p.fail_delete_record("two");

        let err = teardown(&p, "example.com", "example.com", None).await.err();
        match err {
            Some(CliError::PartialTeardown {
                name,
                matched,
                deleted,
                left,
            }) => {
                assert_eq!(name, "_acme-challenge.example.com");
                assert_eq!((matched, deleted), (2, 1));
                assert_eq!(left, vec!["two"]);
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let remaining: Vec<String> = p
            .records("example.com")
            .into_iter()
            .filter(|r| r.record_type == DnsRecordType::Txt && r.name == "_acme-challenge")
            .map(|r| r.value)
            .collect();
        assert_eq!(remaining, vec!["two"]);
    }

    #[tokio::test]
    async fn teardown_fails_when_nothing_matches() {
        let p = challenge_zone();
        let err = teardown(&p, "example.com", "example.com", Some("three"))
            .await
            .err();
        assert!(matches!(err, Some(CliError::NoChallengeRecords { .. })));
        assert_eq!(p.records("example.com").len(), 4);
    }
}
