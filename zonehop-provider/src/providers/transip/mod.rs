//! `TransIP` Provider (REST API v6)

mod error;
mod http;
mod provider;
mod types;

use reqwest::Client;

use crate::providers::common::create_http_client;

pub(crate) const TRANSIP_API_BASE: &str = "https://api.transip.nl/v6";
/// Page size for domain listings
pub(crate) const PAGE_SIZE: u32 = 100;
/// Entry expiry when none is given
pub(crate) const DEFAULT_TTL: u32 = 3600;

/// `TransIP` provider implementation.
///
/// The DNS endpoint only replaces the complete entry list of a domain, so record
/// changes are read-modify-write cycles over [`ReplaceRecordSet`](crate::ReplaceRecordSet).
/// Entries have no ids. Zones are the registered domains of the account.
pub struct TransipProvider {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) access_token: String,
    pub(crate) max_retries: u32,
}

/// Builder for [`TransipProvider`].
pub struct TransipProviderBuilder {
    access_token: String,
    base_url: String,
    max_retries: u32,
}

impl TransipProviderBuilder {
    fn new(access_token: String) -> Self {
        Self {
            access_token,
            base_url: TRANSIP_API_BASE.to_string(),
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

    /// Build the [`TransipProvider`] instance.
    pub fn build(self) -> TransipProvider {
        TransipProvider {
            client: create_http_client(),
            base_url: self.base_url.trim_end_matches('/').to_string(),
            access_token: self.access_token,
            max_retries: self.max_retries,
        }
    }
}

impl TransipProvider {
    /// Creates a new `TransIP` provider with default settings.
    pub fn new(access_token: String) -> Self {
        Self::builder(access_token).build()
    }

    /// Returns a builder for customizing the provider configuration.
    pub fn builder(access_token: String) -> TransipProviderBuilder {
        TransipProviderBuilder::new(access_token)
    }
}
