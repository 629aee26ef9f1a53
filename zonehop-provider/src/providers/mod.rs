//! DNS Provider implementations

/// Shared utilities used by provider implementations.
pub mod common;

#[cfg(feature = "hetzner")]
mod hetzner;
#[cfg(feature = "hetznercloud")]
mod hetzner_cloud;
#[cfg(feature = "internetx")]
mod internetx;
#[cfg(feature = "inwx")]
mod inwx;
#[cfg(feature = "transip")]
mod transip;

#[cfg(feature = "hetzner")]
pub use hetzner::{HetznerProvider, HetznerProviderBuilder};
#[cfg(feature = "hetznercloud")]
pub use hetzner_cloud::{HetznerCloudProvider, HetznerCloudProviderBuilder};
#[cfg(feature = "internetx")]
pub use internetx::{InternetxProvider, InternetxProviderBuilder};
#[cfg(feature = "inwx")]
pub use inwx::{InwxProvider, InwxProviderBuilder};
#[cfg(feature = "transip")]
pub use transip::{TransipProvider, TransipProviderBuilder};
