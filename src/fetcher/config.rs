use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The verse providers this crate knows how to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    QuranCom,
    AlquranCloud,
    QuranapiIr,
}

/// One entry of the ordered provider list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderToggle {
    pub name: ProviderKind,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

/// Configuration for verse fetching
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-request timeout in seconds (default: 30)
    pub timeout_secs: u64,

    /// Full passes over all enabled providers before giving up (default: 10)
    pub max_cycles: u32,

    /// Tries per provider within one pass (default: 3)
    pub attempts_per_provider: u32,

    /// Back-off unit in milliseconds; retry n waits unit * 2^n (default: 1000)
    pub backoff_unit_ms: u64,

    /// Pause before every pass after the first, in milliseconds (default: 5000)
    pub cycle_delay_ms: u64,

    /// Providers in order of preference
    pub providers: Vec<ProviderToggle>,

    /// Translation edition requested from AlQuran.cloud (default: en.sahih)
    pub translation_edition: String,

    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_cycles: 10,
            attempts_per_provider: 3,
            backoff_unit_ms: 1000,
            cycle_delay_ms: 5000,
            providers: vec![
                ProviderToggle {
                    name: ProviderKind::QuranCom,
                    enabled: true,
                },
                ProviderToggle {
                    name: ProviderKind::AlquranCloud,
                    enabled: true,
                },
                ProviderToggle {
                    name: ProviderKind::QuranapiIr,
                    enabled: true,
                },
            ],
            translation_edition: "en.sahih".to_string(),
            user_agent: "nectar/0.1.0".to_string(),
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_cycles: self.max_cycles,
            attempts_per_provider: self.attempts_per_provider,
            backoff_unit: Duration::from_millis(self.backoff_unit_ms),
            cycle_delay: Duration::from_millis(self.cycle_delay_ms),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_cycles == 0 {
            return Err("fetch.max_cycles must be at least 1".into());
        }
        if self.attempts_per_provider == 0 {
            return Err("fetch.attempts_per_provider must be at least 1".into());
        }
        if self.timeout_secs == 0 {
            return Err("fetch.timeout_secs must be at least 1".into());
        }
        Ok(())
    }
}

/// Retry and back-off parameters of the multi-source fetcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_cycles: u32,
    pub attempts_per_provider: u32,
    pub backoff_unit: Duration,
    pub cycle_delay: Duration,
}

impl RetryPolicy {
    /// Wait before try number `attempt` (0-based). The first try never waits.
    pub fn backoff(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        self.backoff_unit
            .saturating_mul(2u32.saturating_pow(attempt))
    }

    /// A policy with no waits, for tests and one-shot tools.
    pub fn immediate(max_cycles: u32, attempts_per_provider: u32) -> Self {
        Self {
            max_cycles,
            attempts_per_provider,
            backoff_unit: Duration::ZERO,
            cycle_delay: Duration::ZERO,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        FetchConfig::default().retry_policy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = FetchConfig::default();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.max_cycles, 10);
        assert_eq!(config.attempts_per_provider, 3);
        assert_eq!(config.providers.len(), 3);
        assert_eq!(config.providers[0].name, ProviderKind::QuranCom);
        assert!(config.providers.iter().all(|p| p.enabled));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(0), Duration::ZERO);
        assert_eq!(policy.backoff(1), Duration::from_secs(2));
        assert_eq!(policy.backoff(2), Duration::from_secs(4));
        assert_eq!(policy.cycle_delay, Duration::from_secs(5));
    }

    #[test]
    fn test_immediate_policy_never_waits() {
        let policy = RetryPolicy::immediate(2, 3);
        assert_eq!(policy.backoff(2), Duration::ZERO);
        assert_eq!(policy.cycle_delay, Duration::ZERO);
    }

    #[test]
    fn test_zero_cycles_rejected() {
        let config = FetchConfig {
            max_cycles: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_provider_toggle_defaults_enabled() {
        let toggle: ProviderToggle = toml::from_str(r#"name = "quranapi_ir""#).unwrap();
        assert_eq!(toggle.name, ProviderKind::QuranapiIr);
        assert!(toggle.enabled);
    }
}
