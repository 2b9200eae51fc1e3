//! Server configuration loaded from the environment.

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use chrono::TimeDelta;
use tracing::warn;

use crate::domain::sweeps::SweepSettings;

/// Configuration for the HTTP server and the sweep subsystem.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address the server binds to.
    pub bind_addr: SocketAddr,
    /// Sweep timing knobs.
    pub sweeps: SweepSettings,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            sweeps: SweepSettings::default(),
        }
    }
}

fn parsed_env<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                warn!(variable = name, value = %raw, "unparseable environment value; using default");
                default
            }
        },
        Err(_) => default,
    }
}

impl ServerConfig {
    /// Load the configuration from environment variables, falling back to
    /// defaults for anything absent or unparseable.
    ///
    /// Variables: `POLYCLINIC_BIND`, `POLYCLINIC_MISSED_GRACE_MINUTES`,
    /// `POLYCLINIC_MISSED_INTERVAL_SECS`, `POLYCLINIC_REMINDER_INTERVAL_SECS`,
    /// `POLYCLINIC_DECLARATION_INTERVAL_SECS`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let default_grace_minutes = defaults.sweeps.missed_grace.num_minutes();

        Self {
            bind_addr: parsed_env("POLYCLINIC_BIND", defaults.bind_addr),
            sweeps: SweepSettings {
                missed_grace: TimeDelta::minutes(parsed_env(
                    "POLYCLINIC_MISSED_GRACE_MINUTES",
                    default_grace_minutes,
                )),
                missed_interval: Duration::from_secs(parsed_env(
                    "POLYCLINIC_MISSED_INTERVAL_SECS",
                    defaults.sweeps.missed_interval.as_secs(),
                )),
                reminder_interval: Duration::from_secs(parsed_env(
                    "POLYCLINIC_REMINDER_INTERVAL_SECS",
                    defaults.sweeps.reminder_interval.as_secs(),
                )),
                declaration_interval: Duration::from_secs(parsed_env(
                    "POLYCLINIC_DECLARATION_INTERVAL_SECS",
                    defaults.sweeps.declaration_interval.as_secs(),
                )),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_policy() {
        let config = ServerConfig::default();
        assert_eq!(config.sweeps.missed_grace, TimeDelta::hours(2));
        assert_eq!(config.sweeps.missed_interval, Duration::from_secs(10));
        assert_eq!(config.bind_addr.port(), 8080);
    }
}
