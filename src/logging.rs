//! Logging bootstrap for applications embedding gates.
//!
//! Gates log through `tracing` under the `gatehouse` and `gatehouse_core`
//! targets: decisions at `debug`, redirects at `info`, selector failures at
//! `warn`. [`init_logging`] shows all of them and keeps everything else at
//! `info`.

use std::sync::Once;

use tracing_log::log::LevelFilter as LogLevelFilter;
use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVES: &str = "info,gatehouse=debug,gatehouse_core=debug";

/// [`init_logging_with`] using the gate directives
/// `info,gatehouse=debug,gatehouse_core=debug`.
pub fn init_logging() {
    init_logging_with(DEFAULT_DIRECTIVES);
}

/// Install `color-eyre`, forward `log` records and set up a compact `tracing`
/// formatter.
///
/// `RUST_LOG` wins over `default_directives` when set. Only the first call has
/// an effect, and a subscriber installed elsewhere is left in place.
pub fn init_logging_with(default_directives: &str) {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        if let Err(error) = color_eyre::install() {
            eprintln!("failed to install color-eyre: {error}");
        }

        let _ = tracing_log::LogTracer::builder()
            .with_max_level(LogLevelFilter::Debug)
            .init();

        if tracing::dispatcher::has_been_set() {
            return;
        }

        let filter = gate_filter(default_directives);
        if let Err(error) = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .compact()
            .try_init()
        {
            tracing::debug!("tracing subscriber already initialized: {error:?}");
        }
    });
}

fn gate_filter(default_directives: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directives))
        .unwrap_or_else(|error| {
            eprintln!("invalid log directives `{default_directives}`: {error}");
            EnvFilter::new(DEFAULT_DIRECTIVES)
        })
}
