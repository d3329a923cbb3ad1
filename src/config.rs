// Configuration loaded from environment variables (and `.env`, if present).

use std::env;

const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,https://orbis.place";

#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g. "0.0.0.0:3000")
    pub bind_address: String,

    /// SQLite database URL; the file is created if missing
    pub database_url: String,

    /// HS256 secret shared with the auth service
    pub jwt_secret: String,

    /// Origins allowed to call the API from a browser
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let jwt_secret = lookup("AUTH_JWT_SECRET")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("AUTH_JWT_SECRET"))?;

        Ok(Self {
            bind_address: lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".into()),
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://data/orbis.db".into()),
            jwt_secret,
            cors_origins: parse_origins(
                &lookup("CORS_ORIGINS").unwrap_or_else(|| DEFAULT_CORS_ORIGINS.into()),
            ),
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().trim_end_matches('/').to_string())
        .filter(|origin| !origin.is_empty())
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_secret_is_required() {
        assert!(matches!(
            load(&[]),
            Err(ConfigError::Missing("AUTH_JWT_SECRET"))
        ));
        assert!(load(&[("AUTH_JWT_SECRET", "  ")]).is_err());
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("AUTH_JWT_SECRET", "s")]).unwrap();

        assert_eq!(config.bind_address, "0.0.0.0:3000");
        assert_eq!(config.database_url, "sqlite://data/orbis.db");
        assert_eq!(
            config.cors_origins,
            vec!["http://localhost:3000", "https://orbis.place"]
        );
    }

    #[test]
    fn test_cors_origins_are_trimmed() {
        let config = load(&[
            ("AUTH_JWT_SECRET", "s"),
            ("CORS_ORIGINS", " https://a.example/ , ,https://b.example"),
        ])
        .unwrap();

        assert_eq!(
            config.cors_origins,
            vec!["https://a.example", "https://b.example"]
        );
    }
}
