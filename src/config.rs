use std::{env, path::PathBuf};

use crate::controller::FallbackScoping;

/// AppConfig
///
/// Immutable runtime configuration, loaded once at startup and shared through
/// the application state.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Selects the log format and how strict loading is.
    pub env: Env,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
    // Root directory the template engine loads views from.
    pub views_dir: PathBuf,
    // Whether application-controller filters honour skip/only rules.
    pub fallback_scoping: FallbackScoping,
    // Pretty-print JSON responses.
    pub pretty_json: bool,
}

/// Env
///
/// Runtime context: local development or production.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Test-friendly configuration that needs no environment variables.
    fn default() -> Self {
        Self {
            env: Env::Local,
            bind_addr: "127.0.0.1:3000".to_string(),
            views_dir: PathBuf::from("views"),
            fallback_scoping: FallbackScoping::Unscoped,
            pretty_json: false,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables.
    ///
    /// # Panics
    /// Panics in production when `VIEWS_DIR` is not set, so the server never
    /// starts rendering from a directory nobody chose.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let views_dir = match env {
            Env::Production => {
                env::var("VIEWS_DIR").expect("FATAL: VIEWS_DIR must be set in production.")
            }
            Env::Local => env::var("VIEWS_DIR").unwrap_or_else(|_| "views".to_string()),
        };

        let fallback_scoping = match env::var("FILTER_FALLBACK_SCOPING").as_deref() {
            Ok("scoped") => FallbackScoping::Scoped,
            _ => FallbackScoping::Unscoped,
        };

        let pretty_json = matches!(env::var("PRETTY_JSON").as_deref(), Ok("true") | Ok("1"));

        Self {
            env,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            views_dir: PathBuf::from(views_dir),
            fallback_scoping,
            pretty_json,
        }
    }
}
