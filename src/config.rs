use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// PostgreSQL connection URL. The in-memory store is used when unset.
    #[serde(default)]
    pub database_url: Option<String>,

    /// Maximum number of pooled PostgreSQL connections
    #[serde(default = "default_database_max_connections")]
    pub database_max_connections: u32,

    /// Redis connection URL. When set, the trained model is kept in Redis
    /// instead of `model_path`.
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Directory the exporter writes its CSV and JSON files into
    #[serde(default = "default_ml_data_dir")]
    pub ml_data_dir: PathBuf,

    /// File holding the serialized trained model
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_database_max_connections() -> u32 {
    5
}

fn default_ml_data_dir() -> PathBuf {
    PathBuf::from("ml_data")
}

fn default_model_path() -> PathBuf {
    PathBuf::from("trained_model.json")
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8001
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from an explicit set of key/value pairs
    pub fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter::<_, Config>(vars)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Socket address the HTTP server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_apply_when_unset() {
        let config = Config::from_vars(Vec::new()).unwrap();
        assert_eq!(config.database_url, None);
        assert_eq!(config.redis_url, None);
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.ml_data_dir, PathBuf::from("ml_data"));
        assert_eq!(config.model_path, PathBuf::from("trained_model.json"));
        assert_eq!(config.bind_address(), "0.0.0.0:8001");
    }

    #[test]
    fn test_overrides_from_environment() {
        let config = Config::from_vars(vars(&[
            ("DATABASE_URL", "postgres://localhost/rides"),
            ("REDIS_URL", "redis://localhost:6379"),
            ("ML_DATA_DIR", "/tmp/ml"),
            ("PORT", "9000"),
        ]))
        .unwrap();

        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/rides")
        );
        assert_eq!(config.redis_url.as_deref(), Some("redis://localhost:6379"));
        assert_eq!(config.ml_data_dir, PathBuf::from("/tmp/ml"));
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let result = Config::from_vars(vars(&[("PORT", "not-a-port")]));
        assert!(result.is_err());
    }
}
