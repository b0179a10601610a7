// Start-up configuration, read once from the environment (after `.env`).

use chrono::NaiveDate;
use chrono_tz::Tz;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

use crate::core::homepage::HomepageSettings;

pub const DEFAULT_KEY_FILE: &str = "secrets.json";
pub const DEFAULT_SPREADSHEET: &str = "OurLoveMoney";
pub const DEFAULT_ANNIVERSARY: &str = "2025-09-17";
pub const DEFAULT_TIMEZONE: &str = "Asia/Taipei";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing DISCORD_TOKEN environment variable! Create a .env file with your bot token.")]
    MissingToken,

    #[error("ANNIVERSARY_START must look like 2025-09-17 (got '{0}')")]
    InvalidAnniversary(String),

    #[error("HOME_TIMEZONE is not an IANA timezone name (got '{0}')")]
    InvalidTimezone(String),
}

pub struct AppConfig {
    pub discord_token: String,
    /// Raw `HOMEPAGE_SECRETS` document, if injected.
    pub secrets: Option<String>,
    pub key_file: PathBuf,
    pub homepage: HomepageSettings,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `load` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or_default = |key: &str, default: &str| {
            var(key).unwrap_or_else(|| {
                info!("{key} not set, using default: {default}");
                default.to_string()
            })
        };

        let discord_token = var("DISCORD_TOKEN").ok_or(ConfigError::MissingToken)?;

        let secrets = var("HOMEPAGE_SECRETS");
        if secrets.is_none() {
            info!("HOMEPAGE_SECRETS not set, the key file is the only credential source");
        }

        let drive_folder_id = var("DRIVE_FOLDER_ID");
        if drive_folder_id.is_none() {
            warn!("DRIVE_FOLDER_ID not set, photo uploads are disabled (links still work)");
        }

        let anniversary = or_default("ANNIVERSARY_START", DEFAULT_ANNIVERSARY);
        let anniversary_start = NaiveDate::parse_from_str(anniversary.trim(), "%Y-%m-%d")
            .map_err(|_| ConfigError::InvalidAnniversary(anniversary.clone()))?;

        let timezone_name = or_default("HOME_TIMEZONE", DEFAULT_TIMEZONE);
        let timezone: Tz = timezone_name
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidTimezone(timezone_name.clone()))?;

        Ok(Self {
            discord_token,
            secrets,
            key_file: PathBuf::from(or_default("GOOGLE_KEY_FILE", DEFAULT_KEY_FILE)),
            homepage: HomepageSettings {
                spreadsheet: or_default("SPREADSHEET_NAME", DEFAULT_SPREADSHEET),
                drive_folder_id,
                anniversary_start,
                timezone,
            },
        })
    }
}
