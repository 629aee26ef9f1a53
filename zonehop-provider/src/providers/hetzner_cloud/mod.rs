//! Hetzner Cloud DNS Provider (RRSet API)

mod error;
mod http;
mod provider;
mod types;

use reqwest::Client;

use crate::providers::common::create_http_client;

pub(crate) const HETZNER_CLOUD_API_BASE: &str = "https://api.hetzner.cloud/v1";
/// Maximum `per_page` accepted by the Cloud API
pub(crate) const PAGE_SIZE: u32 = 100;
/// Zone TTL the Cloud API assigns when none is given
pub(crate) const DEFAULT_TTL: u32 = 3600;

/// Hetzner Cloud DNS provider implementation.
///
/// Records live in RRSets keyed by `name/TYPE`; that key is used as the record id.
/// Adding or deleting one record adds or removes one value of its RRSet.
pub struct HetznerCloudProvider {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) api_token: String,
    pub(crate) max_retries: u32,
}

/// Builder for [`HetznerCloudProvider`].
pub struct HetznerCloudProviderBuilder {
    api_token: String,
    base_url: String,
    max_retries: u32,
}

impl HetznerCloudProviderBuilder {
    fn new(api_token: String) -> Self {
        Self {
            api_token,
            base_url: HETZNER_CLOUD_API_BASE.to_string(),
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

    /// Build the [`HetznerCloudProvider`] instance.
    pub fn build(self) -> HetznerCloudProvider {
        HetznerCloudProvider {
            client: create_http_client(),
            base_url: self.base_url.trim_end_matches('/').to_string(),
            api_token: self.api_token,
            max_retries: self.max_retries,
        }
    }
}

impl HetznerCloudProvider {
    /// Creates a new Hetzner Cloud DNS provider with default settings.
    pub fn new(api_token: String) -> Self {
        Self::builder(api_token).build()
    }

    /// Returns a builder for customizing the provider configuration.
    pub fn builder(api_token: String) -> HetznerCloudProviderBuilder {
        HetznerCloudProviderBuilder::new(api_token)
    }
}
