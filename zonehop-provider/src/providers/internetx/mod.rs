//! `InternetX` `AutoDNS` Provider (JSON API v1)

mod axfr;
mod error;
mod http;
mod provider;
mod types;

use std::time::Duration;

use reqwest::Client;

use crate::providers::common::create_http_client;
use crate::types::DnsRecordType;

pub(crate) const AUTODNS_API_URL: &str = "https://api.autodns.com/v1";
pub(crate) const AUTODNS_DEMO_API_URL: &str = "https://api.demo.autodns.com/v1";
/// Page size for zone searches
pub(crate) const PAGE_SIZE: u32 = 100;
/// Record TTL when none is given
pub(crate) const DEFAULT_TTL: u32 = 3600;
/// Connect and read limit for zone transfers
pub(crate) const AXFR_TIMEOUT: Duration = Duration::from_secs(30);

/// SOA timers written for zones created without explicit values
pub(crate) const SOA_REFRESH: u32 = 43_200;
pub(crate) const SOA_RETRY: u32 = 7_200;
pub(crate) const SOA_EXPIRE: u32 = 1_209_600;
pub(crate) const SOA_TTL: u32 = 86_400;

/// Record types `AutoDNS` accepts in a zone
pub(crate) const SUPPORTED_TYPES: [DnsRecordType; 13] = [
    DnsRecordType::A,
    DnsRecordType::Aaaa,
    DnsRecordType::Alias,
    DnsRecordType::Caa,
    DnsRecordType::Cname,
    DnsRecordType::Mx,
    DnsRecordType::Naptr,
    DnsRecordType::Ns,
    DnsRecordType::Ptr,
    DnsRecordType::Srv,
    DnsRecordType::Sshfp,
    DnsRecordType::Tlsa,
    DnsRecordType::Txt,
];

/// `AutoDNS` provider implementation.
///
/// Authenticates with HTTP Basic auth plus the `X-Domainrobot-Context` header. Zones
/// are addressed by origin and the virtual nameserver they live on; the latter is
/// looked up per call. Records have no ids and are matched by content.
///
/// The zone info of the JSON API omits the records `AutoDNS` derives from a zone's
/// main IP and `www` settings, so [`zone_transfer`](crate::DnsProvider::zone_transfer)
/// pulls an AXFR from the nameserver instead.
pub struct InternetxProvider {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) username: String,
    pub(crate) password: String,
    pub(crate) context: String,
    pub(crate) account_id: Option<String>,
    pub(crate) mfa_code: Option<String>,
    pub(crate) axfr_server: Option<String>,
    pub(crate) axfr_timeout: Duration,
    pub(crate) max_retries: u32,
}

/// Builder for [`InternetxProvider`].
pub struct InternetxProviderBuilder {
    username: String,
    password: String,
    context: String,
    account_id: Option<String>,
    mfa_code: Option<String>,
    axfr_server: Option<String>,
    axfr_timeout: Duration,
    base_url: String,
    max_retries: u32,
}

impl InternetxProviderBuilder {
    fn new(username: String, password: String, context: String) -> Self {
        Self {
            username,
            password,
            context,
            account_id: None,
            mfa_code: None,
            axfr_server: None,
            axfr_timeout: AXFR_TIMEOUT,
            base_url: AUTODNS_API_URL.to_string(),
            max_retries: 0,
        }
    }

    /// Account id, used to derive the system nameservers `{a,b,c,d}.ns<id>.net`.
    pub fn account_id(mut self, account_id: Option<String>) -> Self {
        self.account_id = account_id;
        self
    }

    /// One-time code sent as `X-Domainrobot-2FA-Token`.
    pub fn mfa_code(mut self, code: Option<String>) -> Self {
        self.mfa_code = code;
        self
    }

    /// Nameserver (`host` or `host:port`) that answers zone transfers for this
    /// account. Defaults to the zone's first nameserver.
    pub fn axfr_server(mut self, server: Option<String>) -> Self {
        self.axfr_server = server;
        self
    }

    /// Limit for connecting and for each read during a zone transfer (default: 30s).
    pub fn axfr_timeout(mut self, timeout: Duration) -> Self {
        self.axfr_timeout = timeout;
        self
    }

    /// Talk to the demo system instead of production.
    pub fn sandbox(mut self, sandbox: bool) -> Self {
        if sandbox {
            self.base_url = AUTODNS_DEMO_API_URL.to_string();
        }
        self
    }

    /// Override the API base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the maximum number of automatic retries for transient errors (default: 0).
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Build the [`InternetxProvider`] instance.
    pub fn build(self) -> InternetxProvider {
        InternetxProvider {
            client: create_http_client(),
            base_url: self.base_url.trim_end_matches('/').to_string(),
            username: self.username,
            password: self.password,
            context: self.context,
            account_id: self.account_id,
            mfa_code: self.mfa_code,
            axfr_server: self.axfr_server,
            axfr_timeout: self.axfr_timeout,
            max_retries: self.max_retries,
        }
    }
}

impl InternetxProvider {
    /// Creates a new `AutoDNS` provider with default settings.
    pub fn new(username: String, password: String, context: String) -> Self {
        Self::builder(username, password, context).build()
    }

    /// Returns a builder for customizing the provider configuration.
    pub fn builder(username: String, password: String, context: String) -> InternetxProviderBuilder {
        InternetxProviderBuilder::new(username, password, context)
    }
}
