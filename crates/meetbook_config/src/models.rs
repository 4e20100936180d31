// --- File: crates/meetbook_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

// --- Database Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String, // e.g. sqlite://data/meetbook.db, via MEETBOOK__DATABASE__URL
}

// --- Google Calendar Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct GcalConfig {
    /// Service-account key used for owners that have no delegated access token.
    pub key_path: Option<String>,
    /// Calendar used when an owner's credential names none.
    pub calendar_id: Option<String>,
    /// Upper bound for a single Google API call, in seconds.
    pub event_timeout_secs: Option<u64>,
}

/// What availability does when an owner's calendar cannot be read.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CalendarFailurePolicy {
    /// Treat the calendar as empty (logged at warn level).
    #[default]
    AssumeFree,
    /// Mark every candidate slot as owner-busy.
    BlockAll,
    /// Fail the availability request.
    Fail,
}

// --- Scheduling Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SchedulingConfig {
    /// IANA zone in which business hours are interpreted.
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
    /// Distance between candidate slot starts, in minutes.
    #[serde(default = "default_slot_step_minutes")]
    pub slot_step_minutes: u32,
    /// Longest availability window a caller may request.
    #[serde(default = "default_max_window_days")]
    pub max_window_days: u32,
    /// Timeout for each calendar provider call, in seconds.
    #[serde(default = "default_calendar_timeout_secs")]
    pub calendar_timeout_secs: u64,
    #[serde(default)]
    pub calendar_failure_policy: CalendarFailurePolicy,
}

fn default_time_zone() -> String {
    "Asia/Tokyo".to_string()
}

fn default_slot_step_minutes() -> u32 {
    30
}

fn default_max_window_days() -> u32 {
    31
}

fn default_calendar_timeout_secs() -> u64 {
    10
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            time_zone: default_time_zone(),
            slot_step_minutes: default_slot_step_minutes(),
            max_window_days: default_max_window_days(),
            calendar_timeout_secs: default_calendar_timeout_secs(),
            calendar_failure_policy: CalendarFailurePolicy::default(),
        }
    }
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    #[serde(default)]
    pub log_level: Option<String>,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_gcal: bool,

    // --- Optional Feature Configurations ---
    #[serde(default)]
    pub database: Option<DatabaseConfig>, // absent => in-memory storage
    #[serde(default)]
    pub gcal: Option<GcalConfig>,
    #[serde(default)]
    pub scheduling: SchedulingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8086,
            },
            log_level: None,
            use_gcal: false,
            database: None,
            gcal: None,
            scheduling: SchedulingConfig::default(),
        }
    }
}
