use miette::Diagnostic;
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(code(pagecal::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(pagecal::config))]
    Config(String),

    #[error("Settings are not configured")]
    #[diagnostic(
        code(pagecal::settings_missing),
        help("run `pagecal configure <url> <username> <password>` or set CALDAV_URL")
    )]
    SettingsMissing,

    #[error("Invalid date value: {0}")]
    #[diagnostic(code(pagecal::invalid_date))]
    InvalidDate(String),

    #[error("Invalid event: {0}")]
    #[diagnostic(code(pagecal::invalid_event))]
    InvalidEvent(String),

    #[error("Page error: {0}")]
    #[diagnostic(code(pagecal::page))]
    Page(String),

    /// The calendar server answered with a non-success status
    #[error("Calendar server rejected the event: HTTP {status} {status_text}")]
    #[diagnostic(code(pagecal::protocol))]
    Protocol { status: u16, status_text: String },

    #[error(transparent)]
    #[diagnostic(code(pagecal::network))]
    Network(#[from] reqwest::Error),

    #[error(transparent)]
    #[diagnostic(code(pagecal::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(pagecal::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(pagecal::other))]
    Other(String),
}

// Implement From for TOML serialization errors
impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

// Implement From for TOML deserialization errors
impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type AppResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create page errors
pub fn page_error(message: &str) -> Error {
    Error::Page(message.to_string())
}

/// Helper to create event validation errors
pub fn invalid_event(message: &str) -> Error {
    Error::InvalidEvent(message.to_string())
}
