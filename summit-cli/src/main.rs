//! Entry point for the `summit` command-line interface.
#![forbid(unsafe_code)]

use summit_cli::CliError;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[expect(clippy::print_stderr, reason = "fatal errors are reported on stderr")]
fn main() {
    init_logging();
    match summit_cli::run() {
        Ok(()) => {}
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("summit: {err}");
            std::process::exit(1);
        }
    }
}

/// Log to stderr so prompts and results on stdout stay clean.
///
/// `RUST_LOG` overrides the default `info` level; `log` records from the
/// library crates are bridged into the subscriber.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
