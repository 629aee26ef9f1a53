//! Hetzner DNS Console Provider (legacy `dns.hetzner.com` API)

mod error;
mod http;
mod provider;
mod types;

use reqwest::Client;

use crate::providers::common::create_http_client;

pub(crate) const HETZNER_API_BASE: &str = "https://dns.hetzner.com/api/v1";
/// Page size for zone and record listings
pub(crate) const PAGE_SIZE: u32 = 100;
/// Zone TTL Hetzner assigns when none is given
pub(crate) const DEFAULT_TTL: u32 = 86400;

/// Hetzner DNS Console provider implementation.
///
/// Authenticates with the `Auth-API-Token` header. Zones and records have
/// provider-assigned ids; zone names are resolved to ids per call.
pub struct HetznerProvider {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) api_token: String,
    pub(crate) max_retries: u32,
}

/// Builder for [`HetznerProvider`].
pub struct HetznerProviderBuilder {
    api_token: String,
    base_url: String,
    max_retries: u32,
}

impl HetznerProviderBuilder {
    fn new(api_token: String) -> Self {
        Self {
            api_token,
            base_url: HETZNER_API_BASE.to_string(),
            max_retries: 0,
        }
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

    /// Build the [`HetznerProvider`] instance.
    pub fn build(self) -> HetznerProvider {
        HetznerProvider {
            client: create_http_client(),
            base_url: self.base_url.trim_end_matches('/').to_string(),
            api_token: self.api_token,
            max_retries: self.max_retries,
        }
    }
}

impl HetznerProvider {
    /// Creates a new Hetzner DNS provider with default settings.
    pub fn new(api_token: String) -> Self {
        Self::builder(api_token).build()
    }

    /// Returns a builder for customizing the provider configuration.
    pub fn builder(api_token: String) -> HetznerProviderBuilder {
        HetznerProviderBuilder::new(api_token)
    }
}
