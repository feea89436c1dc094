use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use clap::{Parser, ValueEnum};
use dotenvy::dotenv;
use mcstat_query::Target;

use crate::refresher::DEFAULT_INTERVAL;

/// How a scrape obtains the status it renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ScrapeMode {
    /// Render the cached status only; the refresher is the sole writer
    #[default]
    Cached,
    /// Render the cache immediately and start a refresh if none is running
    Background,
    /// Wait (bounded by the scrape wait) for a fresh acquisition before rendering
    Blocking,
}

/// Application configuration from command line flags with environment overrides
#[derive(Debug, Clone, Parser)]
#[command(
    name = "mcstat-exporter",
    version,
    about = "Get information about a Minecraft server and export it as Prometheus metrics"
)]
pub struct Config {
    /// Minecraft server hostname
    #[arg(short = 's', long, env = "MC_SERVER")]
    pub server: String,

    /// Minecraft server port
    #[arg(short = 'p', long, env = "MC_PORT", default_value_t = 25565)]
    pub port: u16,

    /// Prefix for all metric names (joined with '_')
    #[arg(short = 'x', long, env = "METRICS_PREFIX", default_value = "")]
    pub prefix: String,

    /// Port the metrics endpoint listens on
    #[arg(short = 'l', long, env = "LISTEN_PORT", default_value_t = 8008)]
    pub listen: u16,

    /// Address the metrics endpoint binds to
    #[arg(long, env = "LISTEN_ADDR", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub listen_addr: IpAddr,

    /// Seconds between background refreshes
    #[arg(long = "refresh-interval", env = "REFRESH_INTERVAL_SECS", default_value_t = DEFAULT_INTERVAL.as_secs())]
    pub refresh_interval_secs: u64,

    /// Timeout in seconds for a single query against either source
    #[arg(long = "query-timeout", env = "QUERY_TIMEOUT_SECS", default_value_t = 3)]
    pub query_timeout_secs: u64,

    /// Base URL of the fallback status API
    #[arg(long, env = "FALLBACK_API_URL", default_value = mcstat_query::fallback::DEFAULT_API_URL)]
    pub fallback_url: String,

    /// How scrapes obtain the status they render
    #[arg(long, env = "SCRAPE_MODE", value_enum, default_value_t = ScrapeMode::Cached)]
    pub scrape_mode: ScrapeMode,

    /// Longest a blocking scrape waits for a fresh status, in seconds
    #[arg(long = "scrape-wait", env = "SCRAPE_WAIT_SECS", default_value_t = 30)]
    pub scrape_wait_secs: u64,
}

impl Config {
    /// Load configuration from `.env`, the environment and the command line
    pub fn load() -> Self {
        let _ = dotenv(); //for local runs mostly
        Self::parse()
    }

    /// Surrounding whitespace is dropped from the hostname
    pub fn target(&self) -> Target {
        Target::new(self.server.trim(), self.port)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.listen_addr, self.listen)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs.max(1))
    }

    pub fn scrape_wait(&self) -> Duration {
        Duration::from_secs(self.scrape_wait_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::try_parse_from(["mcstat-exporter", "-s", "mc.example.org"]).unwrap();
        assert_eq!(config.target(), Target::new("mc.example.org", 25565));
        assert_eq!(config.prefix, "");
        assert_eq!(config.socket_addr(), "0.0.0.0:8008".parse::<SocketAddr>().unwrap());
        assert_eq!(config.refresh_interval(), DEFAULT_INTERVAL);
        assert_eq!(config.query_timeout(), Duration::from_secs(3));
        assert_eq!(config.fallback_url, "https://api.mcsrvstat.us");
        assert_eq!(config.scrape_mode, ScrapeMode::Cached);
        assert_eq!(config.scrape_wait(), Duration::from_secs(30));
    }

    #[test]
    fn test_short_flags() {
        let config = Config::try_parse_from([
            "mcstat-exporter",
            "-s",
            "play.example.net",
            "-p",
            "25566",
            "-x",
            "survival",
            "-l",
            "9100",
        ])
        .unwrap();
        assert_eq!(config.target(), Target::new("play.example.net", 25566));
        assert_eq!(config.prefix, "survival");
        assert_eq!(config.listen, 9100);
    }

    #[test]
    fn test_scrape_mode_values() {
        let config = Config::try_parse_from([
            "mcstat-exporter",
            "-s",
            "mc.example.org",
            "--scrape-mode",
            "blocking",
            "--scrape-wait",
            "5",
        ])
        .unwrap();
        assert_eq!(config.scrape_mode, ScrapeMode::Blocking);
        assert_eq!(config.scrape_wait(), Duration::from_secs(5));

        assert!(
            Config::try_parse_from(["mcstat-exporter", "-s", "x", "--scrape-mode", "sometimes"])
                .is_err()
        );
    }

    #[test]
    fn test_server_is_required() {
        // Only meaningful when MC_SERVER is not set in the test environment
        if std::env::var_os("MC_SERVER").is_none() {
            assert!(Config::try_parse_from(["mcstat-exporter"]).is_err());
        }
    }

    #[test]
    fn test_target_host_is_trimmed() {
        let config =
            Config::try_parse_from(["mcstat-exporter", "-s", " mc.example.org\t", "-p", "25570"])
                .unwrap();
        assert_eq!(config.target(), Target::new("mc.example.org", 25570));
    }

    #[test]
    fn test_zero_durations_are_clamped() {
        let config = Config::try_parse_from([
            "mcstat-exporter",
            "-s",
            "mc.example.org",
            "--refresh-interval",
            "0",
            "--query-timeout",
            "0",
        ])
        .unwrap();
        assert_eq!(config.refresh_interval(), Duration::from_secs(1));
        assert_eq!(config.query_timeout(), Duration::from_secs(1));
    }
}
