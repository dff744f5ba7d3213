// Log subscriber setup. Library crates log through the `log` facade;
// tracing-subscriber's log bridge picks those records up.

use tracing_subscriber::EnvFilter;

/// Env var holding an `EnvFilter` directive, e.g. `ledgermatch_recon=debug`.
pub const LOG_ENV: &str = "LMATCH_LOG";

fn default_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Install the stderr subscriber. `LMATCH_LOG` wins over `RUST_LOG`; both
/// win over `-v`/`-vv`.
pub fn init(verbose: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    // A subscriber may already be installed; keep it
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
