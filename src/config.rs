use crate::components::caldav::CalDavClient;
use crate::components::ics::{IcsEncoder, LineEnding, DEFAULT_PRODUCT_ID};
use crate::error::{env_error, AppResult, Error};
use crate::settings::{FileSettingsStore, Settings, SettingsProvider};
use crate::utils::time::parse_timezone;
use chrono_tz::Tz;
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;

/// Default location of the persisted connection settings
pub const DEFAULT_SETTINGS_PATH: &str = "config/settings.toml";

/// Main configuration structure for the application
#[derive(Debug, Clone)]
pub struct Config {
    /// IANA timezone for date-times written without an offset
    pub timezone: String,
    /// TOML file holding the connection settings
    pub settings_path: PathBuf,
    /// Line terminator of encoded calendars
    pub line_ending: LineEnding,
    /// PRODID written into encoded calendars
    pub product_id: String,
    /// Connection settings given through the environment; these win over the file
    pub env_settings: Option<Settings>,
}

impl Config {
    /// Load configuration from the environment and an optional `.env` file
    pub fn load() -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let timezone = lookup("PAGECAL_TIMEZONE").unwrap_or_else(|| String::from("UTC"));
        // Fail early on a bad zone rather than on first use
        parse_timezone(&timezone)?;

        let settings_path = lookup("PAGECAL_SETTINGS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_PATH));

        let line_ending = match lookup("PAGECAL_LINE_ENDING") {
            Some(value) => value.parse::<LineEnding>()?,
            None => LineEnding::default(),
        };

        let product_id =
            lookup("PAGECAL_PRODUCT_ID").unwrap_or_else(|| String::from(DEFAULT_PRODUCT_ID));

        let env_settings = match lookup("CALDAV_URL") {
            Some(server_url) => Some(Settings {
                server_url,
                username: lookup("CALDAV_USERNAME").ok_or_else(|| env_error("CALDAV_USERNAME"))?,
                password: lookup("CALDAV_PASSWORD").ok_or_else(|| env_error("CALDAV_PASSWORD"))?,
            }),
            None => None,
        };

        Ok(Config {
            timezone,
            settings_path,
            line_ending,
            product_id,
            env_settings,
        })
    }

    /// The configured timezone
    pub fn tz(&self) -> AppResult<Tz> {
        parse_timezone(&self.timezone)
    }

    /// Store backing the persisted settings
    pub fn settings_store(&self) -> FileSettingsStore {
        FileSettingsStore::new(&self.settings_path)
    }

    /// Effective settings: environment first, then the settings file
    pub fn resolve_settings(&self, provider: &dyn SettingsProvider) -> AppResult<Settings> {
        self.env_settings
            .clone()
            .or_else(|| provider.get())
            .ok_or(Error::SettingsMissing)
    }

    /// Encoder matching this configuration
    pub fn encoder(&self) -> AppResult<IcsEncoder> {
        Ok(IcsEncoder::new(
            self.product_id.clone(),
            self.line_ending,
            self.tz()?,
        ))
    }

    /// Calendar client matching this configuration
    pub fn caldav_client(&self) -> AppResult<CalDavClient> {
        Ok(CalDavClient::new(self.encoder()?))
    }
}
