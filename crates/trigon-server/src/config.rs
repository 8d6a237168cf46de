//! Server settings read from the environment.

use anyhow::Context;
use std::net::SocketAddr;
use std::time::Duration;
use trigon_core::RuleConfig;

/// Server settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `SERVER_ADDR`
    pub addr: SocketAddr,
    /// `TRIGON_BOT_DELAY_MS`: pause before each computer step
    pub bot_delay: Duration,
    /// `TRIGON_MAX_DICE`, `TRIGON_FEASIBILITY_TRIALS`, `TRIGON_EXTRA_TURN`
    pub rules: RuleConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            bot_delay: Duration::from_millis(400),
            rules: RuleConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = lookup("SERVER_ADDR") {
            config.addr = addr
                .parse()
                .with_context(|| format!("SERVER_ADDR is not a socket address: {addr}"))?;
        }
        if let Some(ms) = lookup("TRIGON_BOT_DELAY_MS") {
            let ms: u64 = ms.parse().context("TRIGON_BOT_DELAY_MS must be an integer")?;
            config.bot_delay = Duration::from_millis(ms);
        }
        if let Some(max) = lookup("TRIGON_MAX_DICE") {
            let max: u8 = max.parse().context("TRIGON_MAX_DICE must be an integer")?;
            config.rules.max_dice = max.clamp(1, 6);
        }
        if let Some(trials) = lookup("TRIGON_FEASIBILITY_TRIALS") {
            config.rules.feasibility_trials = trials
                .parse()
                .context("TRIGON_FEASIBILITY_TRIALS must be an integer")?;
        }
        if let Some(flag) = lookup("TRIGON_EXTRA_TURN") {
            config.rules.extra_turn_on_capture = matches!(flag.as_str(), "1" | "true" | "yes");
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_without_env() {
        let config = ServerConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.addr.port(), 8080);
        assert_eq!(config.bot_delay, Duration::from_millis(400));
        assert_eq!(config.rules, RuleConfig::default());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("SERVER_ADDR", "127.0.0.1:9000"),
            ("TRIGON_BOT_DELAY_MS", "0"),
            ("TRIGON_MAX_DICE", "9"),
            ("TRIGON_FEASIBILITY_TRIALS", "64"),
            ("TRIGON_EXTRA_TURN", "true"),
        ]
        .into_iter()
        .collect();
        let config = ServerConfig::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(config.addr.port(), 9000);
        assert_eq!(config.bot_delay, Duration::ZERO);
        assert_eq!(config.rules.max_dice, 6);
        assert_eq!(config.rules.feasibility_trials, 64);
        assert!(config.rules.extra_turn_on_capture);
    }

    #[test]
    fn test_bad_value_is_an_error() {
        let result =
            ServerConfig::from_lookup(|k| (k == "TRIGON_BOT_DELAY_MS").then(|| "soon".into()));
        assert!(result.is_err());
    }
}
