use std::path::PathBuf;

use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::conflict::ConflictScope;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub remote: RemoteConfig,
    pub network: NetworkConfig,
    pub calendar: CalendarConfig,
    pub slots: SlotsConfig,
    pub booking: BookingConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DatabaseConfig {
    /// PostgreSQL URL. When unset the remote store is used instead.
    pub url: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RemoteConfig {
    /// Base URL of the remote document store, e.g. "https://store.example.com/v1"
    pub base_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NetworkConfig {
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default)]
pub struct CalendarConfig {
    /// Offset of the civil timezone from UTC, in minutes east.
    pub utc_offset_minutes: i32,
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct SlotsConfig {
    pub step_minutes: i32,
}

impl Default for SlotsConfig {
    fn default() -> Self {
        Self { step_minutes: 30 }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default)]
pub struct BookingConfig {
    pub conflict_scope: ConflictScope,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        // Load .env file (silently ignore if not present - production uses env vars directly)
        let _ = dotenvy::dotenv();

        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("court-planner");

        let builder = Config::builder()
            // 1. Load default values
            // Database (DATABASE_URL is optional; the remote store is the alternative)
            .set_default("database.url", std::env::var("DATABASE_URL").ok())?
            // Remote store
            .set_default("remote.base_url", None::<String>)?
            // Network
            .set_default("network.request_timeout_secs", 30)?
            .set_default("network.connect_timeout_secs", 10)?
            // Calendar
            .set_default("calendar.utc_offset_minutes", 0)?
            // Slots
            .set_default("slots.step_minutes", 30)?
            // Booking
            .set_default("booking.conflict_scope", "weekday")?

            // 2. Load from local config file (optional, lowest priority)
            .add_source(File::from(PathBuf::from("config.toml")).required(false))

            // 3. Load from user config directory (optional, overrides local)
            .add_source(File::from(config_dir.join("config.toml")).required(false))

            // 4. Load from Environment variables (COURTS__BOOKING__CONFLICT_SCOPE=date)
            .add_source(Environment::with_prefix("COURTS").separator("__"));

        let s = builder.build()?;
        Ok(s.try_deserialize()?)
    }
}
