//! Tracing setup for processes embedding the fetcher

use tracing_subscriber::EnvFilter;

/// Builds the log filter for a verbosity level
///
/// `RUST_LOG` wins when set. Otherwise `quiet` shows only errors and each
/// verbosity step raises this crate's level by one.
pub fn log_filter(verbose: u8, quiet: bool) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    if quiet {
        return EnvFilter::new("error");
    }

    match verbose {
        0 => EnvFilter::new("stat_scout=info,warn"),
        1 => EnvFilter::new("stat_scout=debug,info"),
        2 => EnvFilter::new("stat_scout=trace,debug"),
        _ => EnvFilter::new("trace"),
    }
}

/// Installs a global fmt subscriber
///
/// Returns false if a global subscriber was already installed; repeated calls
/// are harmless.
pub fn init_tracing(verbose: u8, quiet: bool) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose, quiet))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .try_init()
        .is_ok()
}
