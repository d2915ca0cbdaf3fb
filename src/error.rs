//! Error types for the organizer core and the YouTube client

/// Result type for organizer core operations
pub type Result<T> = std::result::Result<T, OrganizerError>;

/// Error types for snapshot validation, rule loading and configuration
#[derive(thiserror::Error, Debug)]
pub enum OrganizerError {
    #[error("{entity} '{id}' is missing required field '{field}'")]
    MissingField {
        entity: &'static str,
        id: String,
        field: &'static str,
    },

    #[error("Invalid category rule: {0}")]
    InvalidRule(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Errors surfaced by the YouTube Data API client
#[derive(thiserror::Error, Debug)]
pub enum YouTubeError {
    #[error("No access token configured (set PLAYLIST_ORGANIZER_ACCESS_TOKEN or youtube.access_token)")]
    MissingAccessToken,

    #[error("YouTube API quota exceeded, retry after the daily quota resets: {0}")]
    QuotaExceeded(String),

    #[error("YouTube API request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
