//! `acme-dns01`: publish and remove ACME dns-01 challenge records.
//!
//! ```text
//! acme-dns01 --account hcloud setup example.com <token>
//! acme-dns01 --account hcloud teardown example.com [token]
//! ```
//!
//! Exit code 0 on success, 1 with a message on stderr otherwise.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use zonehop_cli::acme::{self, Challenge, PollConfig, SystemResolver, Visibility};
use zonehop_cli::config::{Accounts, resolve_accounts_path};
use zonehop_cli::logging;
use zonehop_cli::prompt::TerminalPrompt;

#[derive(Debug, Parser)]
#[command(name = "acme-dns01", version, about = "ACME dns-01 challenge records")]
struct Args {
    /// Accounts file
    #[arg(long, global = true, env = "ZONEHOP_ACCOUNTS")]
    accounts: Option<PathBuf>,

    /// Account that hosts the domain's zone
    #[arg(long, env = "ZONEHOP_ACCOUNT")]
    account: String,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create the challenge TXT record and wait for it to resolve
    Setup {
        domain: String,
        token: String,

        /// TTL of the TXT record, in seconds
        #[arg(long, default_value_t = acme::DEFAULT_TTL)]
        ttl: u32,

        /// Stop waiting for the record after this many seconds
        #[arg(long, default_value_t = 120)]
        deadline: u64,

        /// Seconds between lookups
        #[arg(long, default_value_t = 10)]
        interval: u64,
    },
    /// Delete the challenge TXT records, only those matching the token if given
    Teardown { domain: String, token: Option<String> },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(args.verbose);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("acme-dns01: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let Args {
        accounts,
        account,
        command,
        ..
    } = args;
    let path = resolve_accounts_path(accounts)?;
    let accounts = Accounts::load(&path)?;
    let provider = accounts.connect(&account, &mut TerminalPrompt)?;

    let result = match command {
        Command::Setup {
            domain,
            token,
            ttl,
            deadline,
            interval,
        } => {
            let cancel = CancellationToken::new();
            let on_ctrl_c = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    on_ctrl_c.cancel();
                }
            });

            let poll = PollConfig {
                deadline: Duration::from_secs(deadline),
                interval: Duration::from_secs(interval),
            };
            async {
                let zone = acme::zone_for(provider.as_ref(), &domain, &account).await?;
                let challenge = Challenge {
                    zone: &zone,
                    domain: &domain,
                    token: &token,
                    ttl,
                };
                let report = acme::setup(
                    provider.as_ref(),
                    &SystemResolver::new(),
                    challenge,
                    poll,
                    &cancel,
                )
                .await?;
                if report.visibility != Visibility::Visible {
                    eprintln!(
                        "acme-dns01: {} not visible locally yet",
                        acme::challenge_name(&domain)
                    );
                }
                Ok::<_, anyhow::Error>(())
            }
            .await
        }
        Command::Teardown { domain, token } => {
            async {
                let zone = acme::zone_for(provider.as_ref(), &domain, &account).await?;
                acme::teardown(provider.as_ref(), &zone, &domain, token.as_deref()).await?;
                Ok::<_, anyhow::Error>(())
            }
            .await
        }
    };

    if let Err(e) = provider.close().await {
        tracing::warn!("Closing {} session failed: {e}", provider.id());
    }
    result
}
