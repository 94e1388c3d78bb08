//! Pool de PostgreSQL
//!
//! Tamaño y tiempos de espera del pool de sqlx. `EnvironmentConfig::database`
//! lo construye a partir de `DATABASE_URL` y `DATABASE_MAX_CONNECTIONS`.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: 2,
            acquire_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(300),
            max_lifetime: Duration::from_secs(1800),
        }
    }

    /// Límite superior del pool; el mínimo nunca lo supera
    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections.max(1);
        self.min_connections = self.min_connections.min(self.max_connections);
        self
    }

    pub async fn create_pool(&self) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.acquire_timeout)
            .idle_timeout(self.idle_timeout)
            .max_lifetime(self.max_lifetime)
            .connect(&self.url)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_bounds() {
        let config = DatabaseConfig::new("postgres://localhost/freight").with_max_connections(1);
        assert_eq!(config.max_connections, 1);
        assert_eq!(config.min_connections, 1);

        let config = DatabaseConfig::new("postgres://localhost/freight").with_max_connections(0);
        assert_eq!(config.max_connections, 1);
    }
}
