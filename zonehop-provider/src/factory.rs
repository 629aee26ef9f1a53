//! Provider factory functions and metadata.

use std::sync::Arc;

use crate::error::Result;
use crate::traits::DnsProvider;
use crate::types::{ProviderCredentials, ProviderMetadata};

#[cfg(feature = "hetzner")]
use crate::providers::HetznerProvider;
#[cfg(feature = "hetznercloud")]
use crate::providers::HetznerCloudProvider;
#[cfg(feature = "internetx")]
use crate::providers::InternetxProvider;
#[cfg(feature = "inwx")]
use crate::providers::InwxProvider;
#[cfg(feature = "transip")]
use crate::providers::TransipProvider;

/// Creates a [`DnsProvider`] instance from the given credentials.
///
/// The concrete provider type is determined by the [`ProviderCredentials`] variant.
/// Providers are built with default endpoints and no automatic retries; use the
/// provider builders directly to change either.
///
/// # Examples
///
/// ```rust,no_run
/// use zonehop_provider::{create_provider, ProviderCredentials};
///
/// let provider = create_provider(ProviderCredentials::Hetzner {
///     api_token: "your-token".to_string(),
/// }).unwrap();
/// ```
pub fn create_provider(credentials: ProviderCredentials) -> Result<Arc<dyn DnsProvider>> {
    match credentials {
        #[cfg(feature = "inwx")]
        ProviderCredentials::Inwx {
            username,
            password,
            mfa_code,
            sandbox,
        } => Ok(Arc::new(
            InwxProvider::builder(username, password)
                .mfa_code(mfa_code)
                .sandbox(sandbox)
                .build(),
        )),
        #[cfg(feature = "hetzner")]
        ProviderCredentials::Hetzner { api_token } => Ok(Arc::new(HetznerProvider::new(api_token))),
        #[cfg(feature = "hetznercloud")]
        ProviderCredentials::Hetznercloud { api_token } => {
            Ok(Arc::new(HetznerCloudProvider::new(api_token)))
        }
        #[cfg(feature = "internetx")]
        ProviderCredentials::Internetx {
            username,
            password,
            context,
            account_id,
            mfa_code,
            sandbox,
            axfr_server,
        } => Ok(Arc::new(
            InternetxProvider::builder(username, password, context)
                .account_id(account_id)
                .mfa_code(mfa_code)
                .sandbox(sandbox)
                .axfr_server(axfr_server)
                .build(),
        )),
        #[cfg(feature = "transip")]
        ProviderCredentials::Transip { access_token } => {
            Ok(Arc::new(TransipProvider::new(access_token)))
        }
    }
}

/// Returns metadata for all providers enabled via feature flags.
///
/// Lists every provider type together with its required and optional credential fields.
pub fn get_all_provider_metadata() -> Vec<ProviderMetadata> {
    vec![
        #[cfg(feature = "inwx")]
        InwxProvider::metadata(),
        #[cfg(feature = "hetzner")]
        HetznerProvider::metadata(),
        #[cfg(feature = "hetznercloud")]
        HetznerCloudProvider::metadata(),
        #[cfg(feature = "internetx")]
        InternetxProvider::metadata(),
        #[cfg(feature = "transip")]
        TransipProvider::metadata(),
    ]
}

#[cfg(all(test, feature = "all-providers"))]
mod tests {
    use super::*;
    use crate::types::ProviderType;

    #[test]
    fn metadata_for_every_provider() {
        let ids: Vec<ProviderType> = get_all_provider_metadata()
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(
            ids,
            vec![
                ProviderType::Inwx,
                ProviderType::Hetzner,
                ProviderType::Hetznercloud,
                ProviderType::Internetx,
                ProviderType::Transip,
            ]
        );
    }

    #[test]
    fn provider_matches_credentials() {
        let p = create_provider(ProviderCredentials::Transip {
            access_token: "tok".to_string(),
        })
        .unwrap();
        assert_eq!(p.id(), "transip");

        let p = create_provider(ProviderCredentials::Inwx {
            username: "u".to_string(),
            password: "p".to_string(),
            mfa_code: None,
            sandbox: true,
        })
        .unwrap();
        assert_eq!(p.id(), "inwx");
    }
}
