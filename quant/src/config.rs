use serde::Deserialize;
use std::env;

use crate::render::Theme;

/// Upper bound the gateway accepts for `results_limit`.
pub const MAX_RESULTS_LIMIT: u32 = 50;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_env_opt<T: std::str::FromStr>(var: &str) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Ignoring.", val, var, e);
                None
            }
        },
        Err(_) => None,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub gateway: GatewayConfig,
    pub profile: ProfileConfig,
    pub progress: ProgressConfig,
    pub display: DisplayConfig,
    pub logging: LoggingConfig,
}

/// Remote analysis gateway connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    pub base_url: String,
    /// Timeout for the long-running profile scrape job.
    pub scrape_timeout_secs: u64,
    /// Timeout for conversational and analytical turns.
    pub chat_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileConfig {
    pub results_limit: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProgressConfig {
    pub budget_secs: u64,
    pub dots_interval_ms: u64,
    pub phrase_interval_ms: u64,
    pub countdown_interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    pub theme: Theme,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown log format: {s}")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub filter: Option<String>,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            budget_secs: 120,
            dots_interval_ms: 500,
            phrase_interval_ms: 3000,
            countdown_interval_ms: 1000,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let defaults = ProgressConfig::default();

        Self {
            gateway: GatewayConfig {
                base_url: env::var("QUANT_GATEWAY_URL")
                    .unwrap_or_else(|_| "http://localhost:10000".to_string()),
                scrape_timeout_secs: parse_env_or("QUANT_SCRAPE_TIMEOUT", 150),
                chat_timeout_secs: parse_env_or("QUANT_CHAT_TIMEOUT", 120),
            },
            profile: ProfileConfig {
                results_limit: clamp_results_limit(parse_env_or("QUANT_RESULTS_LIMIT", 25)),
            },
            progress: ProgressConfig {
                budget_secs: parse_env_or("QUANT_PROGRESS_BUDGET", defaults.budget_secs),
                ..defaults
            },
            display: DisplayConfig {
                theme: parse_env_or("QUANT_THEME", Theme::Dark),
            },
            logging: LoggingConfig {
                format: parse_env_opt("QUANT_LOG_FORMAT").unwrap_or_default(),
                filter: env::var("RUST_LOG").ok().filter(|f| !f.trim().is_empty()),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}

/// Clamp a requested post count into the range the gateway validates.
pub fn clamp_results_limit(requested: u32) -> u32 {
    if requested == 0 {
        tracing::warn!("results_limit must be at least 1, using 1");
        return 1;
    }
    if requested > MAX_RESULTS_LIMIT {
        tracing::warn!(
            "results_limit {} exceeds gateway maximum, using {}",
            requested,
            MAX_RESULTS_LIMIT
        );
        return MAX_RESULTS_LIMIT;
    }
    requested
}
