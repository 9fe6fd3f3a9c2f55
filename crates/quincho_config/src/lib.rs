// --- File: crates/quincho_config/src/lib.rs ---
//! Layered configuration loading for the Quincho backend.
//!
//! Configuration is read from an optional `config/default` file, an
//! optional `config/{RUN_ENV}` overlay, and `QUINCHO__*` environment
//! variables (double-underscore separated), in that order of precedence.

use std::str::FromStr;
use std::sync::Once;

use chrono_tz::Tz;
use config::{Config, ConfigError, Environment, File};

pub mod models;
pub use models::*;

static DOTENV: Once = Once::new();

/// Load `.env` once per process; later calls are no-ops.
pub fn ensure_dotenv_loaded() {
    DOTENV.call_once(|| {
        let _ = dotenv::dotenv();
    });
}

/// Loads the application configuration.
///
/// Dependent crates call this without needing to know where the values
/// come from.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let run_env = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".to_string());

    Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{run_env}")).required(false))
        .add_source(Environment::with_prefix("QUINCHO").separator("__"))
        .build()?
        .try_deserialize()
}

/// The facility's IANA time zone, falling back to America/Asuncion when the
/// configured name does not parse.
pub fn facility_time_zone(config: &AppConfig) -> Tz {
    Tz::from_str(&config.quincho.time_zone).unwrap_or(Tz::America__Asuncion)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quincho_defaults_cover_the_operating_window() {
        let quincho = QuinchoConfig::default();
        assert_eq!(quincho.open_time, "08:00");
        assert_eq!(quincho.close_time, "22:00");
        assert_eq!(quincho.time_zone, "America/Asuncion");
    }

    #[test]
    fn unknown_time_zone_falls_back() {
        let config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            quincho: QuinchoConfig {
                time_zone: "Not/AZone".to_string(),
                ..QuinchoConfig::default()
            },
            use_email: false,
            email: None,
            auth: None,
            store: None,
        };
        assert_eq!(facility_time_zone(&config), Tz::America__Asuncion);
    }
}
