//! Process-wide configuration.
//!
//! Everything is read once at startup into an immutable [`ConciergeConfig`] and handed
//! to each component explicitly. Values come from the environment, after `.env` has been
//! loaded by the binary.

use crate::error::{ConciergeError, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_WEATHER_BASE_URL: &str = "https://api.openweathermap.org";
pub const DEFAULT_SEARCH_URL: &str = "https://lite.duckduckgo.com/lite/";

/// How the reasoning component picks tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingMode {
    /// The model chooses tools through native tool calling.
    Model,
    /// Keyword classification picks one tool, the model only composes the reply.
    Keyword,
}

impl FromStr for RoutingMode {
    type Err = ConciergeError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "model" => Ok(Self::Model),
            "keyword" => Ok(Self::Keyword),
            other => Err(ConciergeError::ConfigError(format!(
                "CONCIERGE_ROUTING must be 'model' or 'keyword', got '{}'",
                other
            ))),
        }
    }
}

/// Settings for the reasoning component.
#[derive(Debug, Clone)]
pub struct ReasoningSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: usize,
    pub timeout: Duration,
    pub routing: RoutingMode,
    pub max_tool_iterations: usize,
}

/// Settings for the weather, search, and knowledge tools.
#[derive(Debug, Clone)]
pub struct ToolSettings {
    pub knowledge_path: PathBuf,
    pub weather_api_key: Option<String>,
    pub weather_base_url: String,
    pub search_url: String,
    pub search_max_results: usize,
    pub provider_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone)]
pub struct ConciergeConfig {
    pub reasoning: ReasoningSettings,
    pub tools: ToolSettings,
    pub server: ServerSettings,
}

impl ConciergeConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Blank values count as unset. A missing `OPENAI_API_KEY` or an unparsable number
    /// is a configuration error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_key = get("OPENAI_API_KEY").ok_or_else(|| {
            ConciergeError::ConfigError("OPENAI_API_KEY is not set".to_string())
        })?;

        let routing = match get("CONCIERGE_ROUTING") {
            Some(value) => value.parse()?,
            None => RoutingMode::Model,
        };

        let max_tool_iterations: usize = parse_or(&get, "CONCIERGE_MAX_TOOL_ITERATIONS", 5)?;
        if max_tool_iterations == 0 {
            return Err(ConciergeError::ConfigError(
                "CONCIERGE_MAX_TOOL_ITERATIONS must be at least 1".to_string(),
            ));
        }

        let search_max_results: usize = parse_or(&get, "CONCIERGE_SEARCH_MAX_RESULTS", 3)?;
        if search_max_results == 0 {
            return Err(ConciergeError::ConfigError(
                "CONCIERGE_SEARCH_MAX_RESULTS must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            reasoning: ReasoningSettings {
                api_key,
                base_url: get("OPENAI_API_ENDPOINT")
                    .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
                model: get("CONCIERGE_MODEL").unwrap_or_else(|| "gpt-3.5-turbo".to_string()),
                temperature: parse_or(&get, "CONCIERGE_TEMPERATURE", 0.7)?,
                max_tokens: parse_or(&get, "CONCIERGE_MAX_TOKENS", 1024)?,
                timeout: Duration::from_secs(parse_or(
                    &get,
                    "CONCIERGE_REASONING_TIMEOUT_SECS",
                    20,
                )?),
                routing,
                max_tool_iterations,
            },
            tools: ToolSettings {
                knowledge_path: get("CONCIERGE_KNOWLEDGE_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("wine_business_info.txt")),
                weather_api_key: get("OPENWEATHER_API_KEY"),
                weather_base_url: get("OPENWEATHER_API_ENDPOINT")
                    .unwrap_or_else(|| DEFAULT_WEATHER_BASE_URL.to_string()),
                search_url: get("CONCIERGE_SEARCH_ENDPOINT")
                    .unwrap_or_else(|| DEFAULT_SEARCH_URL.to_string()),
                search_max_results,
                provider_timeout: Duration::from_secs(parse_or(
                    &get,
                    "CONCIERGE_PROVIDER_TIMEOUT_SECS",
                    8,
                )?),
            },
            server: ServerSettings {
                host: get("APP_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
                port: parse_or(&get, "APP_PORT", 8000)?,
            },
        })
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.parse().map_err(|e| {
            ConciergeError::ConfigError(format!("{} has invalid value '{}': {}", key, raw, e))
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_with_only_api_key() {
        let config = ConciergeConfig::from_lookup(lookup_from(&[("OPENAI_API_KEY", "sk-test")]))
            .unwrap();

        assert_eq!(config.reasoning.api_key, "sk-test");
        assert_eq!(config.reasoning.base_url, DEFAULT_OPENAI_BASE_URL);
        assert_eq!(config.reasoning.model, "gpt-3.5-turbo");
        assert_eq!(config.reasoning.temperature, 0.7);
        assert_eq!(config.reasoning.max_tool_iterations, 5);
        assert_eq!(config.reasoning.routing, RoutingMode::Model);
        assert_eq!(config.reasoning.timeout, Duration::from_secs(20));
        assert_eq!(config.tools.knowledge_path, PathBuf::from("wine_business_info.txt"));
        assert!(config.tools.weather_api_key.is_none());
        assert_eq!(config.tools.search_url, DEFAULT_SEARCH_URL);
        assert_eq!(config.tools.search_max_results, 3);
        assert_eq!(config.tools.provider_timeout, Duration::from_secs(8));
        assert_eq!(config.server.bind_address(), "127.0.0.1:8000");
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let err = ConciergeConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_blank_api_key_counts_as_missing() {
        let result = ConciergeConfig::from_lookup(lookup_from(&[("OPENAI_API_KEY", "   ")]));
        assert!(matches!(result, Err(ConciergeError::ConfigError(_))));
    }

    #[test]
    fn test_overrides() {
        let config = ConciergeConfig::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("CONCIERGE_MODEL", "gpt-4o-mini"),
            ("CONCIERGE_ROUTING", "Keyword"),
            ("CONCIERGE_MAX_TOOL_ITERATIONS", "3"),
            ("OPENWEATHER_API_KEY", "weather-key"),
            ("CONCIERGE_SEARCH_MAX_RESULTS", "5"),
            ("APP_HOST", "0.0.0.0"),
            ("APP_PORT", "9090"),
        ]))
        .unwrap();

        assert_eq!(config.reasoning.model, "gpt-4o-mini");
        assert_eq!(config.reasoning.routing, RoutingMode::Keyword);
        assert_eq!(config.reasoning.max_tool_iterations, 3);
        assert_eq!(config.tools.weather_api_key.as_deref(), Some("weather-key"));
        assert_eq!(config.tools.search_max_results, 5);
        assert_eq!(config.server.bind_address(), "0.0.0.0:9090");
    }

    #[test]
    fn test_invalid_number_is_config_error() {
        let err = ConciergeConfig::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("APP_PORT", "eighty"),
        ]))
        .unwrap_err();

        assert!(err.to_string().contains("APP_PORT"));
    }

    #[test]
    fn test_zero_iteration_cap_rejected() {
        let result = ConciergeConfig::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("CONCIERGE_MAX_TOOL_ITERATIONS", "0"),
        ]));
        assert!(matches!(result, Err(ConciergeError::ConfigError(_))));
    }

    #[test]
    fn test_unknown_routing_mode_rejected() {
        let result = ConciergeConfig::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("CONCIERGE_ROUTING", "telepathy"),
        ]));
        assert!(matches!(result, Err(ConciergeError::ConfigError(_))));
    }
}
