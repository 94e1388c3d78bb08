//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno. Los valores obligatorios
//! ausentes o mal formados devuelven `ConfigError` y detienen el arranque.

use std::collections::HashMap;
use std::env;
use std::str::FromStr;
use thiserror::Error;

use super::database::{DatabaseConfig, DEFAULT_MAX_CONNECTIONS};

pub const DEFAULT_RATE_TABLE_PATH: &str = "resources/pricing_rate_table.json";
pub const DEFAULT_TOSS_CONFIRM_URL: &str = "https://api.tosspayments.com/v1/payments/confirm";
pub const DEFAULT_ODCLOUD_BASE_URL: &str = "https://api.odcloud.kr/api/nts-businessman/v1";
pub const DEFAULT_ADVISORY_BASE_URL: &str = "https://api.deepseek.com";
pub const DEFAULT_ADVISORY_MODEL: &str = "deepseek-chat";

/// Errores de configuración
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Backend de persistencia
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(other.to_string()),
        }
    }
}

/// Credenciales del procesador de pagos
#[derive(Debug, Clone, Default)]
pub struct PaymentConfig {
    pub secret_key: Option<String>,
    pub client_key: Option<String>,
    pub confirm_url: String,
}

/// Validador de registro mercantil
#[derive(Debug, Clone, Default)]
pub struct BusinessRegistryConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

/// Generador de texto de asesoramiento
#[derive(Debug, Clone, Default)]
pub struct AdvisoryConfig {
    pub enabled: bool,
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

/// Cuenta de administrador creada al arrancar si no existe
#[derive(Debug, Clone, PartialEq)]
pub struct AdminAccount {
    pub email: String,
    pub password: String,
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub host: String,
    pub port: u16,
    pub storage: StorageBackend,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    /// Segundos
    pub jwt_expiration: u64,
    pub bcrypt_cost: u32,
    pub cors_origins: Vec<String>,
    pub log_level: String,
    pub rate_table_path: String,
    pub payment: PaymentConfig,
    pub business_registry: BusinessRegistryConfig,
    pub advisory: AdvisoryConfig,
    pub admin: Option<AdminAccount>,
}

impl EnvironmentConfig {
    /// Leer la configuración del proceso
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Leer la configuración de un mapa (tests)
    pub fn from_map(values: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| values.get(key).cloned())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let storage = match get("STORAGE_BACKEND") {
            Some(value) => value.parse().map_err(|value| ConfigError::Invalid {
                key: "STORAGE_BACKEND",
                value,
            })?,
            None => StorageBackend::Postgres,
        };

        let database_url = get("DATABASE_URL");
        if storage == StorageBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        Ok(Self {
            environment: get("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or("PORT", get("PORT"), 3000)?,
            storage,
            database_url,
            database_max_connections: parse_or(
                "DATABASE_MAX_CONNECTIONS",
                get("DATABASE_MAX_CONNECTIONS"),
                DEFAULT_MAX_CONNECTIONS,
            )?,
            jwt_secret: get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?,
            jwt_expiration: parse_or("JWT_EXPIRATION", get("JWT_EXPIRATION"), 86_400)?,
            bcrypt_cost: parse_or("BCRYPT_COST", get("BCRYPT_COST"), bcrypt::DEFAULT_COST)?,
            cors_origins: get("CORS_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            rate_table_path: get("RATE_TABLE_PATH")
                .unwrap_or_else(|| DEFAULT_RATE_TABLE_PATH.to_string()),
            payment: PaymentConfig {
                secret_key: get("TOSS_SECRET_KEY"),
                client_key: get("TOSS_CLIENT_KEY"),
                confirm_url: get("TOSS_CONFIRM_URL")
                    .unwrap_or_else(|| DEFAULT_TOSS_CONFIRM_URL.to_string()),
            },
            business_registry: BusinessRegistryConfig {
                base_url: get("ODCLOUD_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_ODCLOUD_BASE_URL.to_string()),
                api_key: get("ODCLOUD_API_KEY"),
            },
            advisory: AdvisoryConfig {
                enabled: parse_or("ADVISORY_ENABLED", get("ADVISORY_ENABLED"), false)?,
                api_key: get("ADVISORY_API_KEY"),
                base_url: get("ADVISORY_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_ADVISORY_BASE_URL.to_string()),
                model: get("ADVISORY_MODEL").unwrap_or_else(|| DEFAULT_ADVISORY_MODEL.to_string()),
            },
            admin: match (get("ADMIN_EMAIL"), get("ADMIN_PASSWORD")) {
                (Some(email), Some(password)) => Some(AdminAccount { email, password }),
                _ => None,
            },
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la dirección del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Configuración del pool si el backend es PostgreSQL
    pub fn database(&self) -> Option<DatabaseConfig> {
        match self.storage {
            StorageBackend::Postgres => self
                .database_url
                .as_deref()
                .map(|url| DatabaseConfig::new(url).with_max_connections(self.database_max_connections)),
            StorageBackend::Memory => None,
        }
    }
}

fn parse_or<T: FromStr>(key: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError> {
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_memory_backend_with_defaults() {
        let config = EnvironmentConfig::from_map(&values(&[
            ("STORAGE_BACKEND", "memory"),
            ("JWT_SECRET", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.port, 3000);
        assert_eq!(config.rate_table_path, DEFAULT_RATE_TABLE_PATH);
        assert!(!config.advisory.enabled);
        assert!(config.database().is_none());
        assert!(config.is_development());
    }

    #[test]
    fn test_postgres_requires_database_url() {
        let result = EnvironmentConfig::from_map(&values(&[("JWT_SECRET", "secret")]));
        assert_eq!(result.unwrap_err(), ConfigError::Missing("DATABASE_URL"));
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        let result = EnvironmentConfig::from_map(&values(&[
            ("STORAGE_BACKEND", "memory"),
            ("JWT_SECRET", "secret"),
            ("PORT", "eighty"),
        ]));
        assert!(matches!(result, Err(ConfigError::Invalid { key: "PORT", .. })));
    }

    #[test]
    fn test_cors_origins_are_split() {
        let config = EnvironmentConfig::from_map(&values(&[
            ("STORAGE_BACKEND", "memory"),
            ("JWT_SECRET", "secret"),
            ("CORS_ORIGINS", "http://a.test, http://b.test,"),
        ]))
        .unwrap();
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
    }
}
