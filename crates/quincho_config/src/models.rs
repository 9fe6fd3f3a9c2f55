// --- File: crates/quincho_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

// --- Facility Config ---
// Operating window and time zone of the quincho. Times are HH:MM strings
// parsed by the booking crate; the window is 08:00-22:00 unless overridden.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct QuinchoConfig {
    #[serde(default = "default_open_time")]
    pub open_time: String,
    #[serde(default = "default_close_time")]
    pub close_time: String,
    /// IANA time zone the facility's wall clock lives in.
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
}

fn default_open_time() -> String {
    "08:00".to_string()
}

fn default_close_time() -> String {
    "22:00".to_string()
}

fn default_time_zone() -> String {
    "America/Asuncion".to_string()
}

impl Default for QuinchoConfig {
    fn default() -> Self {
        QuinchoConfig {
            open_time: default_open_time(),
            close_time: default_close_time(),
            time_zone: default_time_zone(),
        }
    }
}

// --- Email Config ---
// Endpoint of the external send-email function. API key loaded via
// QUINCHO__EMAIL__API_KEY.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EmailConfig {
    pub function_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Administrator inbox that receives new-reservation notices.
    #[serde(default)]
    pub admin_recipient: Option<String>,
}

// --- Auth Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AdminAccount {
    pub email: String,
    /// Hex-encoded SHA-256 digest of the password.
    pub password_sha256: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuthConfig {
    /// Secret used to derive session tokens. Loaded via
    /// QUINCHO__AUTH__SESSION_SECRET in deployments.
    pub session_secret: String,
    #[serde(default)]
    pub admins: Vec<AdminAccount>,
}

// --- Store Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StoreConfig {
    /// Bounded retries for the initial data load before giving up.
    #[serde(default = "default_load_retries")]
    pub load_retries: u32,
}

fn default_load_retries() -> u32 {
    3
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            load_retries: default_load_retries(),
        }
    }
}

// --- Unified App Configuration ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    #[serde(default)]
    pub quincho: QuinchoConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_email: bool,

    // --- Optional Feature Configurations ---
    #[serde(default)]
    pub email: Option<EmailConfig>,
    #[serde(default)]
    pub auth: Option<AuthConfig>,
    #[serde(default)]
    pub store: Option<StoreConfig>,
}
