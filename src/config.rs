use serde::Deserialize;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Taste graph API key
    pub taste_graph_api_key: String,

    /// Taste graph API base URL
    #[serde(default = "default_taste_graph_api_url")]
    pub taste_graph_api_url: String,

    /// Generative text API key
    pub generator_api_key: String,

    /// Generative text API base URL
    #[serde(default = "default_generator_api_url")]
    pub generator_api_url: String,

    /// Generative model name
    #[serde(default = "default_generator_model")]
    pub generator_model: String,

    /// Upper bound in seconds for every outbound call
    #[serde(default = "default_upstream_timeout_secs")]
    pub upstream_timeout_secs: u64,

    /// Maximum number of in-flight upstream calls per fan-out
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Popularity floor applied to combined recommendation fetches
    #[serde(default = "default_min_popularity")]
    pub min_popularity: f64,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_taste_graph_api_url() -> String {
    "https://hackathon.api.qloo.com".to_string()
}

fn default_generator_api_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_generator_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_upstream_timeout_secs() -> u64 {
    10
}

fn default_max_concurrency() -> usize {
    8
}

fn default_min_popularity() -> f64 {
    0.80
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        Ok(config.normalized())
    }

    /// Clamps out-of-range values into their usable ranges
    pub fn normalized(mut self) -> Self {
        self.upstream_timeout_secs = self.upstream_timeout_secs.max(1);
        self.max_concurrency = self.max_concurrency.max(1);
        self.min_popularity = if self.min_popularity.is_finite() {
            self.min_popularity.clamp(0.0, 1.0)
        } else {
            default_min_popularity()
        };
        self
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            max_concurrency: self.max_concurrency,
            min_popularity: self.min_popularity,
        }
    }
}

/// The subset of configuration the pipeline components are built with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineSettings {
    pub max_concurrency: usize,
    pub min_popularity: f64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            min_popularity: default_min_popularity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            taste_graph_api_key: "tg".to_string(),
            taste_graph_api_url: default_taste_graph_api_url(),
            generator_api_key: "gen".to_string(),
            generator_api_url: default_generator_api_url(),
            generator_model: default_generator_model(),
            upstream_timeout_secs: 10,
            max_concurrency: 8,
            min_popularity: 0.8,
            host: default_host(),
            port: default_port(),
        }
    }

    #[test]
    fn test_normalized_clamps_ranges() {
        let config = Config {
            upstream_timeout_secs: 0,
            max_concurrency: 0,
            min_popularity: 1.7,
            ..base_config()
        }
        .normalized();

        assert_eq!(config.upstream_timeout_secs, 1);
        assert_eq!(config.max_concurrency, 1);
        assert_eq!(config.min_popularity, 1.0);
    }

    #[test]
    fn test_normalized_replaces_nan_popularity() {
        let config = Config {
            min_popularity: f64::NAN,
            ..base_config()
        }
        .normalized();

        assert_eq!(config.min_popularity, 0.80);
    }

    #[test]
    fn test_pipeline_settings_from_config() {
        let settings = base_config().pipeline_settings();
        assert_eq!(settings.max_concurrency, 8);
        assert_eq!(settings.min_popularity, 0.8);
    }
}
