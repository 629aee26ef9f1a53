//! # zonehop-provider
//!
//! DNS hosting provider clients behind one zone/record interface, plus a
//! provider-independent zone clone.
//!
//! ## Supported Providers
//!
//! | Provider | Feature Flag | Auth Method | Record identity |
//! |----------|-------------|-------------|-----------------|
//! | [INWX](https://www.inwx.de/) | `inwx` | XML-RPC session cookie, optional TOTP | record id |
//! | [Hetzner DNS](https://dns.hetzner.com/) | `hetzner` | `Auth-API-Token` header | record id |
//! | [Hetzner Cloud DNS](https://docs.hetzner.cloud/) | `hetznercloud` | Bearer token | RRSet key `name/TYPE` |
//! | [InternetX AutoDNS](https://www.internetx.com/) | `internetx` | Basic auth + context header | name/type/content |
//! | [TransIP](https://www.transip.nl/) | `transip` | Bearer token | whole record set |
//!
//! ## Feature Flags
//!
//! - **`all-providers`** *(default)*: enable all providers listed above.
//! - **`inwx`**, **`hetzner`**, **`hetznercloud`**, **`internetx`**, **`transip`**: a single provider.
//! - **`native-tls`** *(default)* / **`rustls`**: TLS backend for `reqwest`.
//! - **`test-utils`**: exports [`test_utils::MockProvider`], an in-memory provider.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use zonehop_provider::{create_provider, DnsProvider, ProviderCredentials};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = create_provider(ProviderCredentials::Hetzner {
//!         api_token: "your-token".to_string(),
//!     })?;
//!
//!     for zone in provider.list_zones().await? {
//!         println!("{}", zone.name);
//!         for record in provider.list_records(&zone.name).await? {
//!             println!("  {} {} {}", record.name, record.record_type, record.value);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Cloning a zone
//!
//! ```rust,no_run
//! # use zonehop_provider::*;
//! # async fn example(from: std::sync::Arc<dyn DnsProvider>, to: std::sync::Arc<dyn DnsProvider>) {
//! match clone_zone(from.as_ref(), "example.com", to.as_ref(), "example.com").await {
//!     Ok(report) => println!("copied {} records", report.created.len()),
//!     Err(e) => eprintln!("{e}"),
//! }
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Provider operations return [`Result<T, ProviderError>`](ProviderError). Every variant
//! names the provider; [`ProviderError::is_expected`] separates user-facing conditions
//! (missing zone, bad credentials) from faults. Nothing is retried unless a provider
//! is built with a non-zero `max_retries`.

pub mod clone;
mod error;
mod factory;
mod http_client;
mod providers;
pub mod record_set;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
mod traits;
mod types;
mod utils;
pub mod zonefile;

pub use clone::{CloneError, CloneReport, ReplayPlan, clone_zone, plan_replay};
pub use error::{ProviderError, Result};
pub use factory::{create_provider, get_all_provider_metadata};
pub use providers::common::{
    full_name_to_relative, is_apex, normalize_domain_name, relative_to_full_name, split_priority,
    unquote_txt,
};
pub use traits::{DnsProvider, ReplaceRecordSet};
pub use types::{
    BatchCreateFailure, BatchCreateResult, CreateRecordRequest, CreateZoneRequest,
    CredentialValidationError, DnsRecord, DnsRecordType, FieldType, ProviderCredentialField,
    ProviderCredentials, ProviderFeatures, ProviderLimits, ProviderMetadata, ProviderType, Zone,
    ZoneMode,
};
pub use zonefile::{ZoneFileError, parse_zone_text};

#[cfg(feature = "hetzner")]
pub use providers::{HetznerProvider, HetznerProviderBuilder};

#[cfg(feature = "hetznercloud")]
pub use providers::{HetznerCloudProvider, HetznerCloudProviderBuilder};

#[cfg(feature = "internetx")]
pub use providers::{InternetxProvider, InternetxProviderBuilder};

#[cfg(feature = "inwx")]
pub use providers::{InwxProvider, InwxProviderBuilder};

#[cfg(feature = "transip")]
pub use providers::{TransipProvider, TransipProviderBuilder};
