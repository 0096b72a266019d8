//! Server configuration from CLI flags and environment

use std::time::Duration;

use clap::Parser;
use psi_core::CoordinatorConfig;

/// Upload limit of the attested deployment (70 MB, ~1M digests)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 70_000_000;

/// Time allowed to receive one upload body
pub const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 60;

#[derive(Parser, Debug, Clone)]
#[command(name = "psi-server")]
#[command(about = "Rendezvous server computing the intersection of two digest lists")]
pub struct ServerConfig {
    /// Interface to bind
    #[arg(long, env = "PSI_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PSI_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Maximum request body size in bytes
    #[arg(long, env = "PSI_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,

    /// Abort an upload whose body has not fully arrived after this many
    /// seconds, releasing its slot
    #[arg(
        long,
        env = "PSI_UPLOAD_TIMEOUT_SECS",
        default_value_t = DEFAULT_UPLOAD_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub upload_timeout_secs: u64,

    /// Clear a waiting submission whose partner has not arrived after this
    /// many seconds. Unset keeps it until a partner arrives.
    #[arg(long, env = "PSI_STALE_AFTER_SECS")]
    pub stale_after_secs: Option<u64>,

    /// Do not install the Prometheus recorder
    #[arg(long)]
    pub disable_metrics: bool,
}

impl ServerConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }

    pub fn coordinator_config(&self) -> CoordinatorConfig {
        CoordinatorConfig {
            stale_after: self.stale_after_secs.map(Duration::from_secs),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            upload_timeout_secs: DEFAULT_UPLOAD_TIMEOUT_SECS,
            stale_after_secs: None,
            disable_metrics: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let config = ServerConfig::parse_from([
            "psi-server",
            "--port",
            "9090",
            "--stale-after-secs",
            "30",
        ]);
        assert_eq!(config.listen_addr(), "0.0.0.0:9090");
        assert_eq!(
            config.coordinator_config().stale_after,
            Some(Duration::from_secs(30))
        );
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(config.upload_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_upload_timeout_must_be_positive() {
        let config = ServerConfig::parse_from(["psi-server", "--upload-timeout-secs", "5"]);
        assert_eq!(config.upload_timeout(), Duration::from_secs(5));

        let zero = ServerConfig::try_parse_from(["psi-server", "--upload-timeout-secs", "0"]);
        assert!(zero.is_err());
    }

    #[test]
    fn test_default_has_no_ttl() {
        let config = ServerConfig::default();
        assert!(config.coordinator_config().stale_after.is_none());
        assert!(!config.disable_metrics);
    }
}
