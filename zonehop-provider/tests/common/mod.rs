//! Shared helpers for the live provider tests

#![allow(dead_code)]

use std::env;
use std::sync::Arc;

use zonehop_provider::{
    CreateRecordRequest, DnsProvider, DnsRecord, DnsRecordType, ProviderCredentials,
    create_provider,
};

/// Return early when a required environment variable is missing
#[macro_export]
macro_rules! skip_if_no_credentials {
    ($($var:expr),+) => {
        $(
            if std::env::var($var).is_err() {
                eprintln!("skipping: {} is not set", $var);
                return;
            }
        )+
    };
}

/// Assert that an `Option` is `Some` and unwrap it
#[macro_export]
macro_rules! require_some {
    ($expr:expr $(,)?) => {{
        let opt = $expr;
        assert!(opt.is_some(), "expected Some(..), got None");
        let Some(val) = opt else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let opt = $expr;
        assert!(opt.is_some(), "{}", format_args!($($msg)+));
        let Some(val) = opt else {
            return;
        };
        val
    }};
}

/// Assert that a `Result` is `Ok` and unwrap it
#[macro_export]
macro_rules! require_ok {
    ($expr:expr $(,)?) => {{
        let res = $expr;
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(val) = res else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let res = $expr;
        assert!(
            res.is_ok(),
            "{}: {res:?}",
            format_args!($($msg)+)
        );
        let Ok(val) = res else {
            return;
        };
        val
    }};
}

/// Unique record name for one test run
pub fn generate_test_record_name() -> String {
    let uuid = uuid::Uuid::new_v4();
    format!("_test-{}", &uuid.to_string()[..8])
}

/// Create and update payloads per record type
pub fn test_record_requests(
    name: &str,
    record_type: DnsRecordType,
) -> (CreateRecordRequest, CreateRecordRequest) {
    let (first, second, priority) = match record_type {
        DnsRecordType::A => ("192.0.2.1", "192.0.2.2", None),
        DnsRecordType::Aaaa => ("2001:db8::1", "2001:db8::2", None),
        DnsRecordType::Cname => ("target1.example.com.", "target2.example.com.", None),
        DnsRecordType::Mx => ("mail1.example.com.", "mail2.example.com.", Some(10)),
        _ => ("test-value-1", "test-value-2", None),
    };
    let mut create = CreateRecordRequest::new(name, record_type.clone(), first).with_ttl(600);
    let mut update = CreateRecordRequest::new(name, record_type, second).with_ttl(1200);
    create.priority = priority;
    update.priority = priority.map(|p| p + 10);
    (create, update)
}

/// Provider plus the zone the live tests write to
pub struct TestContext {
    pub provider: Arc<dyn DnsProvider>,
    pub zone: String,
}

impl TestContext {
    fn new(credentials: ProviderCredentials) -> Option<Self> {
        let zone = env::var("TEST_ZONE").ok()?;
        let provider = create_provider(credentials).ok()?;
        Some(Self { provider, zone })
    }

    #[cfg(feature = "inwx")]
    pub fn inwx() -> Option<Self> {
        Self::new(ProviderCredentials::Inwx {
            username: env::var("INWX_USERNAME").ok()?,
            password: env::var("INWX_PASSWORD").ok()?,
            mfa_code: env::var("INWX_MFA_CODE").ok(),
            sandbox: env::var("INWX_SANDBOX").is_ok(),
        })
    }

    #[cfg(feature = "hetzner")]
    pub fn hetzner() -> Option<Self> {
        Self::new(ProviderCredentials::Hetzner {
            api_token: env::var("HETZNER_API_TOKEN").ok()?,
        })
    }

    #[cfg(feature = "hetznercloud")]
    pub fn hetznercloud() -> Option<Self> {
        Self::new(ProviderCredentials::Hetznercloud {
            api_token: env::var("HETZNER_CLOUD_API_TOKEN").ok()?,
        })
    }

    #[cfg(feature = "internetx")]
    pub fn internetx() -> Option<Self> {
        Self::new(ProviderCredentials::Internetx {
            username: env::var("AUTODNS_USERNAME").ok()?,
            password: env::var("AUTODNS_PASSWORD").ok()?,
            context: env::var("AUTODNS_CONTEXT").unwrap_or_else(|_| "4".to_string()),
            account_id: env::var("AUTODNS_ACCOUNT_ID").ok(),
            mfa_code: env::var("AUTODNS_MFA_CODE").ok(),
            sandbox: env::var("AUTODNS_SANDBOX").is_ok(),
            axfr_server: env::var("AUTODNS_AXFR_SERVER").ok(),
        })
    }

    #[cfg(feature = "transip")]
    pub fn transip() -> Option<Self> {
        Self::new(ProviderCredentials::Transip {
            access_token: env::var("TRANSIP_ACCESS_TOKEN").ok()?,
        })
    }

    /// Records named like `name`, for leftovers of aborted runs
    pub async fn find_records(&self, name: &str) -> Vec<DnsRecord> {
        self.provider
            .list_records(&self.zone)
            .await
            .map(|records| records.into_iter().filter(|r| r.name == name).collect())
            .unwrap_or_default()
    }

    /// Delete every record whose name starts with `_test-`
    pub async fn cleanup_all_test_records(&self) {
        if let Ok(records) = self.provider.list_records(&self.zone).await {
            for record in records {
                if record.name.starts_with("_test-") {
                    let _ = self.provider.delete_record(&self.zone, &record).await;
                }
            }
        }
    }
}

/// Basic read tests plus a create/update/delete cycle per record type
#[macro_export]
macro_rules! live_provider_tests {
    ($ctx:path, [$($var:expr),+]) => {
        #[tokio::test]
        #[ignore]
        async fn validate_credentials() {
            skip_if_no_credentials!($($var),+, "TEST_ZONE");
            let ctx = require_some!($ctx(), "failed to build test context");
            let valid = require_ok!(ctx.provider.validate_credentials().await);
            assert!(valid, "credentials should be valid");
        }

        #[tokio::test]
        #[ignore]
        async fn list_zones_contains_test_zone() {
            skip_if_no_credentials!($($var),+, "TEST_ZONE");
            let ctx = require_some!($ctx(), "failed to build test context");
            let zones = require_ok!(ctx.provider.list_zones().await);
            assert!(
                zones.iter().any(|z| z.name == ctx.zone),
                "{} missing from {} zones",
                ctx.zone,
                zones.len()
            );
            assert!(require_ok!(ctx.provider.zone_exists(&ctx.zone).await));
        }

        #[tokio::test]
        #[ignore]
        async fn list_records() {
            skip_if_no_credentials!($($var),+, "TEST_ZONE");
            let ctx = require_some!($ctx(), "failed to build test context");
            let records = require_ok!(ctx.provider.list_records(&ctx.zone).await);
            println!("{} records in {}", records.len(), ctx.zone);
        }

        #[tokio::test]
        #[ignore]
        async fn cleanup_test_records() {
            skip_if_no_credentials!($($var),+, "TEST_ZONE");
            let ctx = require_some!($ctx(), "failed to build test context");
            ctx.cleanup_all_test_records().await;
        }

        mod crud {
            use super::*;

            async fn crud_cycle(record_type: zonehop_provider::DnsRecordType) {
                let ctx = require_some!($ctx(), "failed to build test context");
                let name = common::generate_test_record_name();
                let (create, update) = common::test_record_requests(&name, record_type.clone());

                let created = require_ok!(ctx.provider.create_record(&ctx.zone, &create).await);
                let listed = ctx.find_records(&name).await;
                let current = require_some!(
                    listed.into_iter().find(|r| r.record_type == record_type),
                    "created {record_type} record not listed"
                );
                assert_eq!(current.value, created.value);

                let updated = require_ok!(
                    ctx.provider.update_record(&ctx.zone, &current, &update).await
                );
                assert_eq!(updated.value, update.value);

                let listed = ctx.find_records(&name).await;
                let current = require_some!(listed.into_iter().next(), "updated record not listed");
                require_ok!(ctx.provider.delete_record(&ctx.zone, &current).await);
                assert!(ctx.find_records(&name).await.is_empty(), "record should be gone");
            }

            #[tokio::test]
            #[ignore]
            async fn a_record() {
                skip_if_no_credentials!($($var),+, "TEST_ZONE");
                crud_cycle(zonehop_provider::DnsRecordType::A).await;
            }

            #[tokio::test]
            #[ignore]
            async fn mx_record() {
                skip_if_no_credentials!($($var),+, "TEST_ZONE");
                crud_cycle(zonehop_provider::DnsRecordType::Mx).await;
            }

            #[tokio::test]
            #[ignore]
            async fn txt_record() {
                skip_if_no_credentials!($($var),+, "TEST_ZONE");
                crud_cycle(zonehop_provider::DnsRecordType::Txt).await;
            }
        }
    };
}
