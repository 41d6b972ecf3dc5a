use clap::Parser;
use std::time::Duration;

use crate::providers::propertydata::DEFAULT_ENDPOINT;

/// Runtime settings, from flags or the environment
#[derive(Debug, Clone, Parser)]
#[command(
    name = "propindex",
    version,
    about = "Sold-property search API with caching, rate limiting and synthetic fallback"
)]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "PROPINDEX_BIND", default_value = "0.0.0.0:3000")]
    pub bind: String,

    /// PropertyData credential; without it every response is synthetic
    #[arg(long, env = "PROPERTYDATA_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "PROPERTYDATA_API_URL", default_value = DEFAULT_ENDPOINT)]
    pub upstream_url: String,

    #[arg(long, default_value_t = 10)]
    pub upstream_timeout_secs: u64,

    /// Requests allowed per client address in each window
    #[arg(long, default_value_t = 10)]
    pub rate_limit: u32,

    #[arg(long, default_value_t = 60)]
    pub rate_window_secs: u64,

    /// Client addresses tracked by the rate limiter before old windows are dropped
    #[arg(long, default_value_t = 10_000)]
    pub ledger_capacity: usize,

    #[arg(long, default_value_t = 300)]
    pub cache_ttl_secs: u64,

    #[arg(long, default_value_t = 1024)]
    pub cache_capacity: usize,

    /// Records generated when serving synthetic data
    #[arg(long, default_value_t = 20)]
    pub synthetic_count: usize,

    /// Report upstream failures to the caller instead of serving synthetic data
    #[arg(long, env = "PROPINDEX_STRICT_UPSTREAM")]
    pub strict_upstream: bool,
}

impl Config {
    /// Configured credential, ignoring blank values
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    pub fn rate_window(&self) -> Duration {
        Duration::from_secs(self.rate_window_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_policy() {
        let config = Config::try_parse_from(["propindex", "--api-key", ""]).unwrap();

        assert_eq!(config.rate_limit, 10);
        assert_eq!(config.rate_window(), Duration::from_secs(60));
        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
        assert_eq!(config.upstream_timeout(), Duration::from_secs(10));
        assert_eq!(config.synthetic_count, 20);
        assert!(config.api_key().is_none());
    }

    #[test]
    fn flags_override_defaults() {
        let config = Config::try_parse_from([
            "propindex",
            "--api-key",
            " key-123 ",
            "--rate-limit",
            "3",
            "--cache-ttl-secs",
            "5",
            "--strict-upstream",
        ])
        .unwrap();

        assert_eq!(config.api_key(), Some("key-123"));
        assert_eq!(config.rate_limit, 3);
        assert_eq!(config.cache_ttl(), Duration::from_secs(5));
        assert!(config.strict_upstream);
    }
}
