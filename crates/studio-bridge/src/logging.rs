use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

const FALLBACK_LEVEL: &str = "info";

/// Logs go to stderr; stdout carries protocol messages only. `RUST_LOG`
/// overrides `log_level`.
pub fn init(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| level_filter(log_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        // Hosts usually capture our stderr into their own log.
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();
}

/// Filter for `--log-level`, falling back to `info` on a bad directive.
fn level_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_new(log_level).unwrap_or_else(|e| {
        eprintln!("invalid --log-level {log_level:?} ({e}); using {FALLBACK_LEVEL}");
        EnvFilter::new(FALLBACK_LEVEL)
    })
}
