//! # zonehop-cli
//!
//! Library side of the `zone-copy` and `acme-dns01` binaries.
//!
//! - [`config`]: the accounts file naming provider credentials
//! - [`copy`]: best-effort copy of a zone between two accounts
//! - [`acme`]: dns-01 challenge TXT records, with a bounded visibility poll
//!
//! Both binaries share [`logging::init`] and the interactive [`prompt`].

pub mod acme;
pub mod config;
pub mod copy;
mod error;
pub mod logging;
pub mod prompt;

pub use error::{CliError, Result};
