//! `zone-copy`: copy a DNS zone from one provider account to another.
//!
//! ```text
//! zone-copy --from inwx-main --to hcloud [--domain example.com] [--dry-run]
//! ```
//!
//! Records that fail to copy are reported but do not change the exit code.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use zonehop_cli::config::{Accounts, resolve_accounts_path};
use zonehop_cli::copy::{CopyOptions, copy_zone};
use zonehop_cli::logging;
use zonehop_cli::prompt::{TerminalPrompt, ask_non_empty};
use zonehop_provider::DnsProvider;

#[derive(Debug, Parser)]
#[command(name = "zone-copy", version, about = "Copy a DNS zone between provider accounts")]
struct Args {
    /// Accounts file
    #[arg(long, env = "ZONEHOP_ACCOUNTS")]
    accounts: Option<PathBuf>,

    /// Source account name
    #[arg(long)]
    from: String,

    /// Destination account name
    #[arg(long)]
    to: String,

    /// Zone to copy; asked for when omitted
    #[arg(long)]
    domain: Option<String>,

    /// Show the records that would be created without changing the destination
    #[arg(long)]
    dry_run: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(args.verbose);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("zone-copy: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let path = resolve_accounts_path(args.accounts)?;
    let accounts = Accounts::load(&path)?;
    let mut prompt = TerminalPrompt;

    let domain = match args.domain {
        Some(domain) => domain,
        None => ask_non_empty(&mut prompt, "Domain").context("reading domain")?,
    };

    let source = accounts.connect(&args.from, &mut prompt)?;
    let destination = accounts.connect(&args.to, &mut prompt)?;

    let result = copy_zone(
        source.as_ref(),
        destination.as_ref(),
        &domain,
        CopyOptions {
            dry_run: args.dry_run,
        },
    )
    .await;
    close(source.as_ref()).await;
    close(destination.as_ref()).await;
    let report = result?;

    if args.dry_run {
        println!(
            "{domain}: would copy {} records ({} skipped)",
            report.transferred, report.skipped
        );
    } else {
        println!(
            "{domain}: copied {} records, {} failed, {} skipped",
            report.transferred, report.failed, report.skipped
        );
        if let Some(count) = report.destination_records {
            println!("{domain}: destination now has {count} records");
        }
    }
    Ok(())
}

async fn close(provider: &dyn DnsProvider) {
    if let Err(e) = provider.close().await {
        tracing::warn!("Closing {} session failed: {e}", provider.id());
    }
}
