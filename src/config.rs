use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let host = std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = std::env::var("APP_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(8080);
        // No fallback secret: a well-known default would make every deployment's
        // tokens forgeable.
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "recipebook".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "recipebook-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24),
        };
        Ok(Self {
            database_url,
            host,
            port,
            jwt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Touches process-global env, so everything lives in one test.
    #[test]
    fn from_env_defaults_and_requires_secret() {
        for var in ["JWT_SECRET", "JWT_ISSUER", "JWT_TTL_MINUTES", "APP_HOST", "APP_PORT"] {
            std::env::remove_var(var);
        }
        std::env::set_var("DATABASE_URL", "postgres://postgres@localhost/recipebook");
        assert!(AppConfig::from_env().is_err());

        std::env::set_var("JWT_SECRET", "dev-secret");
        let config = AppConfig::from_env().expect("config should load");
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.jwt.ttl_minutes, 60 * 24);
        assert_eq!(config.jwt.issuer, "recipebook");
    }
}
