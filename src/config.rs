//! Configuración central de la aplicación.
//! Carga variables de entorno (.env) y expone una estructura inmutable
//! (`CONFIG`) con los parámetros por defecto de los routers.
//!
//! Variables reconocidas (todas opcionales):
//! - `ROUTEFLOW_MAX_CONCURRENCY`, `ROUTEFLOW_DELAY_ERRORS`,
//!   `ROUTEFLOW_TIMEOUT_MS` (0 = sin timeout), `ROUTEFLOW_DETAILED_ERRORS`,
//!   `ROUTEFLOW_MERGE_VARIABLES`
//! - `ROUTEFLOW_BATCH_SIZE`, `ROUTEFLOW_REJECT_MAP_PAYLOADS`,
//!   `ROUTEFLOW_COUNTER_VARIABLE`, `ROUTEFLOW_ROOT_MESSAGE_VARIABLE`
use std::env;
use std::str::FromStr;
use std::time::Duration;

use log::warn;
use once_cell::sync::Lazy;
use route_engine::{ForeachConfig, ForkJoinConfig};
use serde::Serialize;

use crate::errors::core_error::CoreError;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenvy::dotenv(); // ignora error si no existe .env
});

/// Configuración global de la aplicación.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppConfig {
    pub fork_join: ForkJoinSettings,
    pub foreach: ForeachSettings,
}

/// Parámetros por defecto del fork-join.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForkJoinSettings {
    pub max_concurrency: usize,
    pub delay_errors: bool,
    /// Plazo por rama en milisegundos; `None` sin plazo.
    pub timeout_ms: Option<u64>,
    pub detailed_errors: bool,
    pub merge_variables: bool,
}

/// Parámetros por defecto del foreach.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForeachSettings {
    pub batch_size: usize,
    pub reject_map_payloads: bool,
    pub counter_variable: String,
    pub root_message_variable: String,
}

/// Instancia global perezosa; si el entorno es inválido se registra el
/// problema y se usan los valores por defecto.
pub static CONFIG: Lazy<AppConfig> = Lazy::new(|| {
    AppConfig::from_env().unwrap_or_else(|e| {
                             warn!("config:fallback reason={e}");
                             AppConfig::default()
                         })
});

impl AppConfig {
    pub fn from_env() -> Result<Self, CoreError> {
        Lazy::force(&DOTENV_LOADED);
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Construye la configuración a partir de una función de búsqueda de
    /// variables (permite probar sin tocar el entorno del proceso).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CoreError> {
        let defaults = Self::default();
        let timeout_ms: u64 = parse(&lookup, "ROUTEFLOW_TIMEOUT_MS", 0)?;
        let fork_join = ForkJoinSettings { max_concurrency: parse(&lookup,
                                                                  "ROUTEFLOW_MAX_CONCURRENCY",
                                                                  defaults.fork_join.max_concurrency)?,
                                           delay_errors: parse(&lookup, "ROUTEFLOW_DELAY_ERRORS", defaults.fork_join.delay_errors)?,
                                           timeout_ms: (timeout_ms > 0).then_some(timeout_ms),
                                           detailed_errors: parse(&lookup,
                                                                  "ROUTEFLOW_DETAILED_ERRORS",
                                                                  defaults.fork_join.detailed_errors)?,
                                           merge_variables: parse(&lookup,
                                                                  "ROUTEFLOW_MERGE_VARIABLES",
                                                                  defaults.fork_join.merge_variables)? };
        let foreach = ForeachSettings { batch_size: parse(&lookup, "ROUTEFLOW_BATCH_SIZE", defaults.foreach.batch_size)?,
                                        reject_map_payloads: parse(&lookup,
                                                                   "ROUTEFLOW_REJECT_MAP_PAYLOADS",
                                                                   defaults.foreach.reject_map_payloads)?,
                                        counter_variable: lookup("ROUTEFLOW_COUNTER_VARIABLE").unwrap_or(defaults.foreach
                                                                                                         .counter_variable),
                                        root_message_variable: lookup("ROUTEFLOW_ROOT_MESSAGE_VARIABLE").unwrap_or(defaults.foreach
                                                                                                                   .root_message_variable) };

        if fork_join.max_concurrency == 0 {
            return Err(CoreError::Config("ROUTEFLOW_MAX_CONCURRENCY debe ser mayor que 0".into()));
        }
        if foreach.batch_size == 0 {
            return Err(CoreError::Config("ROUTEFLOW_BATCH_SIZE debe ser mayor que 0".into()));
        }
        Ok(Self { fork_join, foreach })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let fork_join = ForkJoinConfig::default();
        let foreach = ForeachConfig::default();
        Self { fork_join: ForkJoinSettings { max_concurrency: fork_join.max_concurrency,
                                             delay_errors: fork_join.delay_errors,
                                             timeout_ms: fork_join.timeout.map(|t| t.as_millis() as u64),
                                             detailed_errors: fork_join.detailed_errors,
                                             merge_variables: fork_join.merge_variables },
               foreach: ForeachSettings { batch_size: foreach.batch_size,
                                          reject_map_payloads: foreach.reject_map_payloads,
                                          counter_variable: foreach.counter_variable_name,
                                          root_message_variable: foreach.root_message_variable_name } }
    }
}

impl From<&ForkJoinSettings> for ForkJoinConfig {
    fn from(settings: &ForkJoinSettings) -> Self {
        Self { max_concurrency: settings.max_concurrency,
               delay_errors: settings.delay_errors,
               timeout: settings.timeout_ms.map(Duration::from_millis),
               detailed_errors: settings.detailed_errors,
               merge_variables: settings.merge_variables,
               ..ForkJoinConfig::default() }
    }
}

impl From<&ForeachSettings> for ForeachConfig {
    fn from(settings: &ForeachSettings) -> Self {
        Self { batch_size: settings.batch_size,
               reject_map_payloads: settings.reject_map_payloads,
               counter_variable_name: settings.counter_variable.clone(),
               root_message_variable_name: settings.root_message_variable.clone(),
               ..ForeachConfig::default() }
    }
}

fn parse<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T, CoreError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim()
                        .parse()
                        .map_err(|_| CoreError::Config(format!("{key}: valor inválido '{raw}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.foreach.counter_variable, "counter");
        assert_eq!(cfg.fork_join.timeout_ms, None);
    }

    #[test]
    fn values_are_parsed_and_converted() {
        let cfg = AppConfig::from_lookup(lookup(&[("ROUTEFLOW_MAX_CONCURRENCY", "4"),
                                                  ("ROUTEFLOW_DELAY_ERRORS", "false"),
                                                  ("ROUTEFLOW_TIMEOUT_MS", "250"),
                                                  ("ROUTEFLOW_BATCH_SIZE", "3"),
                                                  ("ROUTEFLOW_COUNTER_VARIABLE", "idx")])).unwrap();
        let fj = ForkJoinConfig::from(&cfg.fork_join);
        assert_eq!(fj.max_concurrency, 4);
        assert!(!fj.delay_errors);
        assert_eq!(fj.timeout, Some(Duration::from_millis(250)));
        let fe = ForeachConfig::from(&cfg.foreach);
        assert_eq!(fe.batch_size, 3);
        assert_eq!(fe.counter_variable_name, "idx");
    }

    #[test]
    fn invalid_values_are_config_errors() {
        let err = AppConfig::from_lookup(lookup(&[("ROUTEFLOW_DELAY_ERRORS", "quizás")])).unwrap_err();
        assert_eq!(err.to_string(), "Error de configuración: ROUTEFLOW_DELAY_ERRORS: valor inválido 'quizás'");
        assert!(AppConfig::from_lookup(lookup(&[("ROUTEFLOW_BATCH_SIZE", "0")])).is_err());
    }
}
