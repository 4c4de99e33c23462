/// Runtime configuration
///
/// Everything comes from the environment; a `.env` file is honored in
/// development. `DATABASE_URL` and `SESSION_SECRET` are required, the rest
/// have workable local defaults.
use std::env;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Address the listener binds to (`API_HOST`, default 0.0.0.0)
    pub host: String,

    /// Port the listener binds to (`API_PORT`, default 8080)
    pub port: u16,

    /// PostgreSQL connection string (`DATABASE_URL`)
    pub database_url: String,

    /// Pool ceiling (`DATABASE_MAX_CONNECTIONS`, default 10)
    pub database_max_connections: u32,

    /// HS256 signing key for session tokens (`SESSION_SECRET`); 32 bytes
    /// minimum, e.g. `openssl rand -hex 32`
    pub session_secret: String,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Config {
    /// Reads the configuration from the environment
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let session_secret = env::var("SESSION_SECRET")
            .map_err(|_| anyhow::anyhow!("SESSION_SECRET environment variable is required"))?;
        if session_secret.len() < 32 {
            anyhow::bail!("SESSION_SECRET must be at least 32 characters long");
        }

        Ok(Self {
            host: env_or("API_HOST", "0.0.0.0"),
            port: env_or("API_PORT", "8080").parse()?,
            database_url,
            database_max_connections: env_or("DATABASE_MAX_CONNECTIONS", "10").parse()?,
            session_secret,
        })
    }

    /// host:port for the TCP listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_address() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 9090,
            database_url: "postgresql://localhost/worklane".to_string(),
            database_max_connections: 5,
            session_secret: "0123456789abcdef0123456789abcdef".to_string(),
        };

        assert_eq!(config.bind_address(), "127.0.0.1:9090");
    }
}
