//! Log output for the binaries
//!
//! Everything goes to stderr so stdout stays free for results. `RUST_LOG`
//! overrides the default filter; provider crate `log` records are picked up too.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "zonehop_provider=warn,zonehop_cli=info";
const VERBOSE_FILTER: &str = "zonehop_provider=debug,zonehop_cli=debug";

pub fn init(verbose: bool) {
    let default = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let installed = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time()
                .with_target(verbose)
                .with_ansi(false),
        )
        .with(filter)
        .try_init();
    if let Err(e) = installed {
        eprintln!("logging already initialized: {e}");
    }
}
