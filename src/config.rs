use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::types::InstructionProfile;
use crate::util::{is_local_endpoint_url, parse_millis};

pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_RENDER_DEBOUNCE: Duration = Duration::from_millis(100);
pub const DEFAULT_COMPILER: &str = "esbuild";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub api_url: String,
    pub temperature: f32,
    pub profile: InstructionProfile,
    pub render_debounce: Duration,
    pub compiler: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            profile: InstructionProfile::ReactTs,
            render_debounce: DEFAULT_RENDER_DEBOUNCE,
            compiler: DEFAULT_COMPILER.to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let defaults = Self::default();

        let api_key = non_blank_env("GEMINI_API_KEY").or_else(|| non_blank_env("API_KEY"));
        let api_url = non_blank_env("GEMINI_API_URL").unwrap_or(defaults.api_url);
        let model = non_blank_env("GEMINI_MODEL").unwrap_or(defaults.model);

        let temperature = match non_blank_env("NEXUS_TEMPERATURE") {
            Some(raw) => match raw.trim().parse::<f32>() {
                Ok(value) => value,
                Err(_) => bail!("Invalid NEXUS_TEMPERATURE '{raw}': expected a number"),
            },
            None => defaults.temperature,
        };

        let profile = match non_blank_env("NEXUS_CONTENT_KIND") {
            Some(raw) => match InstructionProfile::parse(&raw) {
                Some(profile) => profile,
                None => bail!(
                    "Invalid NEXUS_CONTENT_KIND '{raw}': expected react, html, css or a profile name"
                ),
            },
            None => defaults.profile,
        };

        let render_debounce = match non_blank_env("NEXUS_RENDER_DEBOUNCE_MS") {
            Some(raw) => match parse_millis(&raw) {
                Some(value) => value,
                None => bail!("Invalid NEXUS_RENDER_DEBOUNCE_MS '{raw}': expected milliseconds"),
            },
            None => defaults.render_debounce,
        };

        let compiler = non_blank_env("NEXUS_COMPILER").unwrap_or(defaults.compiler);

        Ok(Self {
            api_key,
            model,
            api_url,
            temperature,
            profile,
            render_debounce,
            compiler,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            bail!(
                "Invalid GEMINI_API_URL '{}': expected http:// or https:// URL",
                self.api_url
            );
        }

        if !self.is_local_endpoint() && self.api_key.is_none() {
            bail!(
                "GEMINI_API_KEY must be set for non-local endpoints (url: '{}')",
                self.api_url
            );
        }

        if self.model.trim().is_empty() {
            bail!("GEMINI_MODEL must not be empty");
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            bail!(
                "Invalid NEXUS_TEMPERATURE {}: expected a value between 0.0 and 2.0",
                self.temperature
            );
        }

        Ok(())
    }

    pub fn is_local_endpoint(&self) -> bool {
        is_local_endpoint_url(&self.api_url)
    }
}

fn non_blank_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENV_VARS: [&str; 8] = [
        "GEMINI_API_KEY",
        "API_KEY",
        "GEMINI_API_URL",
        "GEMINI_MODEL",
        "NEXUS_TEMPERATURE",
        "NEXUS_CONTENT_KIND",
        "NEXUS_RENDER_DEBOUNCE_MS",
        "NEXUS_COMPILER",
    ];

    fn clear_env() {
        for name in ENV_VARS {
            std::env::remove_var(name);
        }
    }

    #[test]
    fn test_load_uses_defaults_and_falls_back_to_api_key() {
        let _env_lock = crate::test_support::ENV_LOCK.blocking_lock();
        clear_env();
        std::env::set_var("API_KEY", "fallback-key");
        std::env::set_var("GEMINI_API_KEY", "   ");

        let config = Config::load().expect("config should load");
        assert_eq!(config.api_key.as_deref(), Some("fallback-key"));
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.profile, InstructionProfile::ReactTs);
        assert_eq!(config.render_debounce, DEFAULT_RENDER_DEBOUNCE);
        clear_env();
    }

    #[test]
    fn test_load_reads_overrides() {
        let _env_lock = crate::test_support::ENV_LOCK.blocking_lock();
        clear_env();
        std::env::set_var("GEMINI_API_KEY", "key");
        std::env::set_var("NEXUS_CONTENT_KIND", "html");
        std::env::set_var("NEXUS_RENDER_DEBOUNCE_MS", "40");
        std::env::set_var("NEXUS_TEMPERATURE", "0.5");

        let config = Config::load().expect("config should load");
        assert_eq!(config.profile, InstructionProfile::HtmlTailwind);
        assert_eq!(config.render_debounce, Duration::from_millis(40));
        assert!((config.temperature - 0.5).abs() < f32::EPSILON);
        clear_env();
    }

    #[test]
    fn test_load_rejects_unknown_content_kind() {
        let _env_lock = crate::test_support::ENV_LOCK.blocking_lock();
        clear_env();
        std::env::set_var("NEXUS_CONTENT_KIND", "svelte");
        assert!(Config::load().is_err());
        clear_env();
    }

    #[test]
    fn test_validate_rejects_out_of_range_temperature() {
        let config = Config {
            api_key: Some("key".to_string()),
            temperature: 3.5,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
