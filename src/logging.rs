//! Tracing subscriber setup.
//!
//! Log output goes to stderr so it never mixes with command output on
//! stdout. The level comes from `RUST_LOG`, falling back to `warn`
//! (`debug` for this crate with `--verbose`).

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub fn init(verbose: bool) {
    let default = if verbose {
        "warn,global_search=debug,global_search_core=debug"
    } else {
        "warn"
    };

    // A second call (tests, embedding) keeps the existing subscriber.
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
