//! Server configuration, from flags or the environment

use crate::auth::codec::KEY_SIZE;
use anyhow::{bail, Result};
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "plam")]
#[command(about = "Project, income, loan and pay-out ledger API")]
pub struct Config {
    /// Address the HTTP server binds to
    #[arg(long, env = "SERVER_ADDRESS", default_value = "0.0.0.0:8080")]
    pub server_address: String,

    /// Symmetric key sealing access tokens (exactly 32 bytes)
    #[arg(long, env = "TOKEN_SYMMETRIC_KEY", hide_env_values = true)]
    pub token_symmetric_key: String,

    /// Access token lifetime in seconds
    #[arg(long, env = "ACCESS_TOKEN_DURATION_SECS", default_value = "900")]
    pub access_token_duration_secs: i64,

    /// Deadline for a single request, in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "360")]
    pub request_timeout_secs: u64,

    /// SQLite database file
    #[arg(long, env = "DATABASE_PATH", default_value = "plam.db")]
    pub database_path: String,

    /// Bootstrap admin account, created on startup when missing
    #[arg(long, env = "ADMIN_USERNAME", requires = "admin_password")]
    pub admin_username: Option<String>,

    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: Option<String>,

    #[arg(long, env = "ADMIN_EMAIL", default_value = "admin@localhost")]
    pub admin_email: String,
}

impl Config {
    /// Reject values clap cannot check on its own
    pub fn validate(&self) -> Result<()> {
        let key_len = self.token_symmetric_key.len();
        if key_len != KEY_SIZE {
            bail!(
                "TOKEN_SYMMETRIC_KEY must be exactly {} bytes, got {}",
                KEY_SIZE,
                key_len
            );
        }

        if self.access_token_duration_secs <= 0 {
            bail!(
                "ACCESS_TOKEN_DURATION_SECS must be positive, got {}",
                self.access_token_duration_secs
            );
        }

        if self.request_timeout_secs == 0 {
            bail!("REQUEST_TIMEOUT_SECS must be positive");
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }

    pub fn access_token_duration(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.access_token_duration_secs)
    }

    /// Username and password of the bootstrap admin, when both are set
    pub fn admin_credentials(&self) -> Option<(&str, &str)> {
        match (&self.admin_username, &self.admin_password) {
            (Some(username), Some(password)) => Some((username, password)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "abcdefghijklmnopqrstuvwxyz012345";

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["plam"];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_flags_and_validation() {
        let config = parse(&[
            "--token-symmetric-key",
            KEY,
            "--access-token-duration-secs",
            "60",
            "--database-path",
            "/tmp/plam-test.db",
        ]);
        assert!(config.validate().is_ok());
        assert_eq!(config.access_token_duration(), chrono::Duration::seconds(60));
        assert_eq!(config.database_path, "/tmp/plam-test.db");
        assert_eq!(config.request_timeout(), std::time::Duration::from_secs(360));
    }

    #[test]
    fn test_short_key_rejected() {
        let config = parse(&["--token-symmetric-key", "too-short"]);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("32 bytes"));
    }

    #[test]
    fn test_non_positive_duration_rejected() {
        let config = parse(&[
            "--token-symmetric-key",
            KEY,
            "--access-token-duration-secs",
            "0",
        ]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_request_timeout_rejected() {
        let config = parse(&[
            "--token-symmetric-key",
            KEY,
            "--request-timeout-secs",
            "0",
        ]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_admin_credentials_need_both_parts() {
        let config = parse(&[
            "--token-symmetric-key",
            KEY,
            "--admin-username",
            "root",
            "--admin-password",
            "rootpass",
        ]);
        assert_eq!(config.admin_credentials(), Some(("root", "rootpass")));

        let argv = ["plam", "--token-symmetric-key", KEY, "--admin-username", "root"];
        assert!(Config::try_parse_from(argv).is_err());
    }
}
