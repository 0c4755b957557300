use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use duel_battle::DEFAULT_COOLDOWN;

/// Per-match settings
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Cooldown applied after attack/defend, announced in ADVERSARY_DEFENDING
    pub cooldown: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cooldown: DEFAULT_COOLDOWN,
        }
    }
}

/// Command line settings for the battles server
#[derive(Debug, Clone, Parser)]
#[command(name = "duel-server")]
#[command(about = "Real-time two-player battle server")]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// Move cooldown in milliseconds
    #[arg(long, default_value_t = DEFAULT_COOLDOWN.as_millis() as u64)]
    pub cooldown_ms: u64,
}

impl ServerConfig {
    pub fn session(&self) -> SessionConfig {
        SessionConfig {
            cooldown: Duration::from_millis(self.cooldown_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::parse_from(["duel-server"]);
        assert_eq!(config.bind, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.session().cooldown, DEFAULT_COOLDOWN);
    }

    #[test]
    fn test_overrides() {
        let config =
            ServerConfig::parse_from(["duel-server", "--bind", "127.0.0.1:9000", "--cooldown-ms", "750"]);
        assert_eq!(config.bind.port(), 9000);
        assert_eq!(config.session().cooldown, Duration::from_millis(750));
    }
}
