//! Accounts file
//!
//! A JSON file mapping account names to a provider and its flat credential map:
//!
//! ```json
//! {
//!   "accounts": {
//!     "inwx-main": {
//!       "provider": "inwx",
//!       "mfa": true,
//!       "credentials": { "username": "me", "password": "secret" }
//!     },
//!     "hcloud": {
//!       "provider": "hetznercloud",
//!       "credentials": { "apiToken": "..." }
//!     }
//!   }
//! }
//! ```
//!
//! Credential keys are those of [`ProviderCredentials::from_map`]. Accounts with
//! `"mfa": true` get a one-time code asked for when they are opened.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use zonehop_provider::{DnsProvider, ProviderCredentials, ProviderType, create_provider};

use crate::error::{CliError, Result};
use crate::prompt::{Prompt, ask_non_empty};

/// Environment variable naming the accounts file
pub const ACCOUNTS_ENV: &str = "ZONEHOP_ACCOUNTS";

#[derive(Debug, Clone, Deserialize)]
pub struct AccountConfig {
    pub provider: ProviderType,
    /// Ask for a one-time code before connecting.
    #[serde(default)]
    pub mfa: bool,
    #[serde(default)]
    pub credentials: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Accounts {
    #[serde(default)]
    pub accounts: BTreeMap<String, AccountConfig>,
}

/// `<config dir>/zonehop/accounts.json`
pub fn default_accounts_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("zonehop").join("accounts.json"))
}

/// Explicit path (flag or `ZONEHOP_ACCOUNTS`), else the default location.
pub fn resolve_accounts_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    explicit
        .or_else(default_accounts_path)
        .ok_or(CliError::NoAccountsFile)
}

impl Accounts {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| CliError::ReadAccounts {
            path: path.to_path_buf(),
            source,
        })?;
        let accounts: Self =
            serde_json::from_str(&text).map_err(|source| CliError::ParseAccounts {
                path: path.to_path_buf(),
                source,
            })?;
        tracing::debug!(
            "Loaded {} accounts from {}",
            accounts.accounts.len(),
            path.display()
        );
        Ok(accounts)
    }

    pub fn get(&self, name: &str) -> Result<&AccountConfig> {
        self.accounts
            .get(name)
            .ok_or_else(|| CliError::UnknownAccount(name.to_string()))
    }

    /// Build the provider of account `name`, asking for a one-time code if needed.
    pub fn connect(&self, name: &str, prompt: &mut dyn Prompt) -> Result<Arc<dyn DnsProvider>> {
        let account = self.get(name)?;
        let mfa_code = if account.mfa {
            Some(
                ask_non_empty(prompt, &format!("MFA code for {name}"))
                    .map_err(CliError::Prompt)?,
            )
        } else {
            None
        };
        let credentials = account.credentials(name, mfa_code)?;
        tracing::debug!("Opening account {name} ({})", account.provider);
        Ok(create_provider(credentials)?)
    }
}

impl AccountConfig {
    /// Typed credentials, with `mfa_code` filled in as `mfaCode`.
    pub fn credentials(&self, name: &str, mfa_code: Option<String>) -> Result<ProviderCredentials> {
        let mut map = self.credentials.clone();
        if let Some(code) = mfa_code {
            map.insert("mfaCode".to_string(), code);
        }
        ProviderCredentials::from_map(&self.provider, &map).map_err(|source| {
            CliError::Credentials {
                account: name.to_string(),
                source,
            }
        })
    }
}
