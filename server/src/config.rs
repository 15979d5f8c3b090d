// server/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
  Development,
  Production,
}

impl FromStr for AppEnv {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "development" | "dev" => Ok(Self::Development),
      "production" | "prod" => Ok(Self::Production),
      other => Err(AppError::Config(format!(
        "Invalid APP_ENV '{}': expected development or production",
        other
      ))),
    }
  }
}

impl AppEnv {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Development => "development",
      Self::Production => "production",
    }
  }
}

/// Where the catalog, carts and orders live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
  Postgres,
  Memory,
}

impl FromStr for StorageBackend {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "postgres" | "postgresql" => Ok(Self::Postgres),
      "memory" => Ok(Self::Memory),
      other => Err(AppError::Config(format!(
        "Invalid STORAGE_BACKEND '{}': expected postgres or memory",
        other
      ))),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Pretty,
  Json,
}

impl FromStr for LogFormat {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "pretty" | "text" => Ok(Self::Pretty),
      "json" => Ok(Self::Json),
      other => Err(AppError::Config(format!(
        "Invalid LOG_FORMAT '{}': expected pretty or json",
        other
      ))),
    }
  }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub app_env: AppEnv,
  pub storage_backend: StorageBackend,
  /// Required when `storage_backend` is `Postgres`.
  pub database_url: Option<String>,
  pub database_max_connections: u32,
  pub run_migrations: bool,
  pub seed_db: bool,
  pub log_format: LogFormat,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 8080,
      app_env: AppEnv::Development,
      storage_backend: StorageBackend::Postgres,
      database_url: None,
      database_max_connections: 10,
      run_migrations: true,
      seed_db: false,
      log_format: LogFormat::Pretty,
    }
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the config from an arbitrary variable source. Unset variables
  /// take their defaults; set but unparsable ones are configuration errors.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let defaults = Self::default();
    let get_env = |var_name: &str| lookup(var_name).filter(|v| !v.trim().is_empty());

    let parse_bool = |var_name: &str, default: bool| -> Result<bool> {
      match get_env(var_name) {
        None => Ok(default),
        Some(raw) => raw
          .trim()
          .to_ascii_lowercase()
          .parse::<bool>()
          .map_err(|e| AppError::Config(format!("Invalid {} value: {}", var_name, e))),
      }
    };

    let server_host = get_env("SERVER_HOST").unwrap_or(defaults.server_host);
    let server_port = match get_env("SERVER_PORT") {
      Some(raw) => raw
        .trim()
        .parse::<u16>()
        .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?,
      None => defaults.server_port,
    };
    let app_env = match get_env("APP_ENV") {
      Some(raw) => raw.parse()?,
      None => defaults.app_env,
    };
    let storage_backend = match get_env("STORAGE_BACKEND") {
      Some(raw) => raw.parse()?,
      None => defaults.storage_backend,
    };
    let database_url = get_env("DATABASE_URL");
    if storage_backend == StorageBackend::Postgres && database_url.is_none() {
      return Err(AppError::Config(
        "Missing environment variable 'DATABASE_URL' (required for the postgres storage backend)".to_string(),
      ));
    }
    let database_max_connections = match get_env("DATABASE_MAX_CONNECTIONS") {
      Some(raw) => raw
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| AppError::Config(format!("Invalid DATABASE_MAX_CONNECTIONS: '{}'", raw)))?,
      None => defaults.database_max_connections,
    };
    let run_migrations = parse_bool("RUN_MIGRATIONS", defaults.run_migrations)?;
    let seed_db = parse_bool("SEED_DB", defaults.seed_db)?;
    let log_format = match get_env("LOG_FORMAT") {
      Some(raw) => raw.parse()?,
      None => defaults.log_format,
    };

    Ok(Self {
      server_host,
      server_port,
      app_env,
      storage_backend,
      database_url,
      database_max_connections,
      run_migrations,
      seed_db,
      log_format,
    })
  }

  pub fn is_production(&self) -> bool {
    self.app_env == AppEnv::Production
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig> {
    let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    AppConfig::from_lookup(|name| vars.get(name).cloned())
  }

  #[test]
  fn memory_backend_needs_no_database() {
    let config = config_from(&[("STORAGE_BACKEND", "memory")]).unwrap();
    assert_eq!(config.storage_backend, StorageBackend::Memory);
    assert_eq!(config.bind_address(), "127.0.0.1:8080");
    assert_eq!(config.database_max_connections, 10);
    assert!(config.run_migrations);
    assert!(!config.seed_db);
    assert!(!config.is_production());
  }

  #[test]
  fn postgres_requires_database_url() {
    let err = config_from(&[]).unwrap_err();
    assert!(matches!(err, AppError::Config(_)));

    let config = config_from(&[("DATABASE_URL", "postgres://localhost/shop")]).unwrap();
    assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/shop"));
  }

  #[test]
  fn explicit_values_override_defaults() {
    let config = config_from(&[
      ("STORAGE_BACKEND", "memory"),
      ("SERVER_HOST", "0.0.0.0"),
      ("SERVER_PORT", "3001"),
      ("APP_ENV", "production"),
      ("SEED_DB", "TRUE"),
      ("RUN_MIGRATIONS", "false"),
      ("LOG_FORMAT", "json"),
    ])
    .unwrap();
    assert_eq!(config.bind_address(), "0.0.0.0:3001");
    assert!(config.is_production());
    assert!(config.seed_db);
    assert!(!config.run_migrations);
    assert_eq!(config.log_format, LogFormat::Json);
  }

  #[test]
  fn invalid_values_are_config_errors() {
    for vars in [
      [("STORAGE_BACKEND", "memory"), ("SERVER_PORT", "eighty")],
      [("STORAGE_BACKEND", "memory"), ("APP_ENV", "staging")],
      [("STORAGE_BACKEND", "memory"), ("SEED_DB", "maybe")],
      [("STORAGE_BACKEND", "memory"), ("DATABASE_MAX_CONNECTIONS", "0")],
      [("STORAGE_BACKEND", "sqlite"), ("LOG_FORMAT", "json")],
    ] {
      assert!(matches!(config_from(&vars), Err(AppError::Config(_))), "{:?}", vars);
    }
  }
}
