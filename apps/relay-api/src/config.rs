use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

/// Default per-subscriber queue capacity.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Default interval between keepalive comments on a stream.
pub const DEFAULT_HEARTBEAT_SECS: u64 = 15;

/// Relay API configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to.
    pub host: IpAddr,
    /// Port the HTTP server binds to.
    pub port: u16,
    /// Directory holding `index.html` and other static assets.
    pub static_dir: PathBuf,
    /// Maximum number of pending items buffered per subscriber.
    pub queue_capacity: usize,
    /// How often each stream receives a keepalive comment.
    pub heartbeat_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8000,
            static_dir: PathBuf::from("static"),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            heartbeat_interval: Duration::from_secs(DEFAULT_HEARTBEAT_SECS),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Every variable is optional; unset or unparsable values keep the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: parsed(&lookup, "HOST").unwrap_or(defaults.host),
            port: parsed(&lookup, "PORT").unwrap_or(defaults.port),
            static_dir: lookup("STATIC_DIR")
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            queue_capacity: parsed::<usize>(&lookup, "RELAY_QUEUE_CAPACITY")
                .filter(|&n| n > 0)
                .unwrap_or(defaults.queue_capacity),
            heartbeat_interval: parsed::<u64>(&lookup, "RELAY_HEARTBEAT_SECS")
                .filter(|&n| n > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.heartbeat_interval),
        }
    }
}

fn parsed<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    lookup(name).and_then(|v| v.trim().parse().ok())
}
