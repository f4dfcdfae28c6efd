use clap::Parser;

use crate::config::Credentials;

#[derive(Parser, Debug, Clone)]
#[command(name = "studio-bridge")]
pub struct Args {
    /// Database URL (file:, sqlite:, a path, or :memory:).
    #[arg(long, env = "STUDIO_BRIDGE_URL")]
    pub url: Option<String>,

    /// Auth token paired with --url. Required, even for local databases.
    #[arg(long, env = "STUDIO_BRIDGE_AUTH_TOKEN", hide_env_values = true)]
    pub auth_token: Option<String>,

    /// Display name of the database (logging only).
    #[arg(long)]
    pub name: Option<String>,

    /// Logging level (stderr). Also supports RUST_LOG.
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// SQLite busy timeout.
    #[arg(long, default_value_t = 2_000)]
    pub busy_timeout_ms: u64,
}

impl Args {
    /// The credential pair, if both halves were supplied and are non-empty.
    pub fn credentials(&self) -> Option<Credentials> {
        let url = self.url.clone()?;
        let token = self.auth_token.clone()?;
        Credentials::new(url, token).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_require_both_halves() {
        let args = Args::parse_from(["studio-bridge", "--url", "file:app.db"]);
        assert!(args.credentials().is_none());

        let args = Args::parse_from(["studio-bridge", "--url", "file:app.db", "--auth-token", "t"]);
        let creds = args.credentials().expect("credentials");
        assert_eq!(creds.url(), "file:app.db");
        assert_eq!(args.busy_timeout_ms, 2_000);
    }

    #[test]
    fn empty_token_yields_no_credentials() {
        let args = Args::parse_from(["studio-bridge", "--url", "file:app.db", "--auth-token", ""]);
        assert!(args.credentials().is_none());
    }
}
