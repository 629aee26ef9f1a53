//! INWX DNS Provider (domrobot XML-RPC API)

mod error;
mod http;
mod provider;
mod types;
pub(crate) mod xmlrpc;

use reqwest::Client;
use tokio::sync::Mutex;

use crate::providers::common::{build_client, http_client_builder};

/// Production domrobot endpoint.
pub(crate) const INWX_API_URL: &str = "https://api.domrobot.com/xmlrpc/";
/// OTE (test environment) domrobot endpoint.
pub(crate) const INWX_OTE_API_URL: &str = "https://api.ote.domrobot.com/xmlrpc/";
/// Page size for `nameserver.list`
pub(crate) const PAGE_LIMIT: u32 = 100;
/// TTL INWX applies when a record is created without one
pub(crate) const DEFAULT_TTL: u32 = 3600;
/// Nameservers for new zones when the request names none
pub(crate) const DEFAULT_NAMESERVERS: [&str; 3] = ["ns.inwx.de", "ns2.inwx.de", "ns3.inwx.eu"];

/// INWX DNS provider implementation.
///
/// Logs in with user name and password on first use and keeps the session cookie
/// for the lifetime of the provider. Accounts with two-factor login need the
/// current TOTP code at construction time.
///
/// # Construction
///
/// ```rust,no_run
/// use zonehop_provider::InwxProvider;
///
/// let provider = InwxProvider::builder("user".to_string(), "password".to_string())
///     .mfa_code(Some("123456".to_string()))
///     .sandbox(true)
///     .build();
/// ```
pub struct InwxProvider {
    pub(crate) client: Client,
    pub(crate) endpoint: String,
    pub(crate) username: String,
    pub(crate) password: String,
    pub(crate) mfa_code: Option<String>,
    pub(crate) max_retries: u32,
    /// Whether `account.login` has succeeded on this client's cookie jar
    pub(crate) session: Mutex<bool>,
}

/// Builder for [`InwxProvider`].
pub struct InwxProviderBuilder {
    username: String,
    password: String,
    mfa_code: Option<String>,
    sandbox: bool,
    base_url: Option<String>,
    max_retries: u32,
}

impl InwxProviderBuilder {
    fn new(username: String, password: String) -> Self {
        Self {
            username,
            password,
            mfa_code: None,
            sandbox: false,
            base_url: None,
            max_retries: 0,
        }
    }

    /// TOTP code sent with `account.unlock` when the account has two-factor login.
    pub fn mfa_code(mut self, code: Option<String>) -> Self {
        self.mfa_code = code;
        self
    }

    /// Talk to the OTE test environment instead of production.
    pub fn sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = sandbox;
        self
    }

    /// Override the endpoint URL (takes precedence over `sandbox`).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the maximum number of automatic retries for transient errors (default: 0).
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Build the [`InwxProvider`] instance.
    pub fn build(self) -> InwxProvider {
        let endpoint = self.base_url.unwrap_or_else(|| {
            if self.sandbox {
                INWX_OTE_API_URL.to_string()
            } else {
                INWX_API_URL.to_string()
            }
        });
        InwxProvider {
            client: build_client(http_client_builder().cookie_store(true)),
            endpoint,
            username: self.username,
            password: self.password,
            mfa_code: self.mfa_code,
            max_retries: self.max_retries,
            session: Mutex::new(false),
        }
    }
}

impl InwxProvider {
    /// Creates a production INWX provider without a second factor.
    pub fn new(username: String, password: String) -> Self {
        Self::builder(username, password).build()
    }

    /// Returns a builder for customizing the provider configuration.
    pub fn builder(username: String, password: String) -> InwxProviderBuilder {
        InwxProviderBuilder::new(username, password)
    }
}
