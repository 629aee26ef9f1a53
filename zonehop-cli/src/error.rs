//! Error type shared by the command line tools

use std::path::PathBuf;

use thiserror::Error;
use zonehop_provider::{CredentialValidationError, ProviderError};

/// Failures of a CLI step; each one ends the run with exit code 1.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("no accounts file: set ZONEHOP_ACCOUNTS or pass --accounts")]
    NoAccountsFile,

    #[error("cannot read accounts file {}: {source}", path.display())]
    ReadAccounts {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid accounts file {}: {source}", path.display())]
    ParseAccounts {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown account '{0}'")]
    UnknownAccount(String),

    #[error("account '{account}': {source}")]
    Credentials {
        account: String,
        #[source]
        source: CredentialValidationError,
    },

    #[error("cannot read from terminal: {0}")]
    Prompt(#[source] std::io::Error),

    #[error("{0}")]
    Precondition(String),

    #[error("no zone of account '{account}' contains {domain}")]
    NoMatchingZone { domain: String, account: String },

    #[error("no TXT record at {name} matched")]
    NoChallengeRecords { name: String },

    #[error("deleted {deleted} of {matched} TXT records at {name}, left: {}", left.join(", "))]
    PartialTeardown {
        name: String,
        matched: usize,
        deleted: usize,
        /// Values of the records that could not be deleted
        left: Vec<String>,
    },

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

pub type Result<T> = std::result::Result<T, CliError>;
