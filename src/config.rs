use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::OrganizerError;
use crate::model::PrivacyStatus;

/// Configuration for the playlist organizer
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Analysis and planning thresholds
    pub planner: PlannerConfig,

    /// Category rule source
    pub rules: RulesConfig,

    /// YouTube Data API settings
    pub youtube: YouTubeConfig,

    /// Output and logging settings
    pub output: OutputConfig,
}

/// Options recognised by the analyzer and planner
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlannerConfig {
    /// Playlists with more videos than this are flagged as oversized
    pub max_videos_per_playlist: usize,

    /// Trim, lowercase and collapse whitespace before comparing titles
    pub duplicate_title_normalization: bool,

    /// Propose deletion of empty playlists
    pub auto_delete_empty_playlists: bool,

    /// A video's top category must score above this to count
    pub classification_min_score: f64,

    /// Propose renaming category playlists to the rule's suggested name
    pub suggest_renames: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_videos_per_playlist: 100,
            duplicate_title_normalization: true,
            auto_delete_empty_playlists: false,
            classification_min_score: 0.05,
            suggest_renames: false,
        }
    }
}

impl PlannerConfig {
    pub fn validate(&self) -> std::result::Result<(), OrganizerError> {
        if self.max_videos_per_playlist == 0 {
            return Err(OrganizerError::InvalidConfig(
                "max_videos_per_playlist must be greater than 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.classification_min_score) {
            return Err(OrganizerError::InvalidConfig(format!(
                "classification_min_score must lie in [0, 1], got {}",
                self.classification_min_score
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RulesConfig {
    /// TOML file with `[[category]]` tables; built-in rules when unset
    pub rules_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YouTubeConfig {
    /// Base URL of the Data API
    pub api_base: String,

    /// OAuth2 bearer token issued outside this tool
    pub access_token: Option<String>,

    /// Items requested per page (the API caps this at 50)
    pub page_size: u32,

    /// Pause between paged requests (milliseconds)
    pub request_delay_ms: u64,

    /// Request timeout in seconds
    pub timeout_seconds: u64,

    /// Look up video durations while exporting
    pub fetch_durations: bool,

    /// Privacy of playlists created while applying a plan
    pub new_playlist_privacy: PrivacyStatus,
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            api_base: "https://www.googleapis.com/youtube/v3".to_string(),
            access_token: None,
            page_size: 50,
            request_delay_ms: 100,
            timeout_seconds: 30,
            fetch_durations: true,
            new_playlist_privacy: PrivacyStatus::Private,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Snapshot backup written by `export`
    pub snapshot_file: PathBuf,

    /// Analysis report written by `analyze`
    pub report_file: PathBuf,

    /// Plan document written by `plan`
    pub plan_file: PathBuf,

    /// Log level
    pub log_level: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            snapshot_file: PathBuf::from("playlists_backup.json"),
            report_file: PathBuf::from("analysis_report.json"),
            plan_file: PathBuf::from("reorganization_plan.json"),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the first config file found, then apply
    /// environment overrides
    pub fn load() -> Result<Self> {
        let mut config_paths = vec![
            PathBuf::from("playlist-organizer.toml"),
            PathBuf::from("config/playlist-organizer.toml"),
        ];
        if let Ok(home) = std::env::var("HOME") {
            config_paths.push(
                PathBuf::from(home).join(".config/playlist-organizer/config.toml"),
            );
        }

        for path in &config_paths {
            if !path.exists() {
                continue;
            }
            match Self::from_file(path) {
                Ok(config) => {
                    tracing::info!("📄 Loaded configuration from: {}", path.display());
                    return Ok(config.with_env_overrides());
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config file {}: {}", path.display(), e);
                }
            }
        }

        Err(anyhow!("No configuration file found"))
    }

    /// Load configuration from a specific TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config_str = std::fs::read_to_string(path.as_ref())?;
        let config: Config = toml::from_str(&config_str)?;
        Ok(config)
    }

    /// Defaults plus environment overrides
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Override settings with environment variables
    pub fn with_env_overrides(mut self) -> Self {
        let token = std::env::var("PLAYLIST_ORGANIZER_ACCESS_TOKEN")
            .or_else(|_| std::env::var("YOUTUBE_ACCESS_TOKEN"));
        if let Ok(token) = token {
            if !token.trim().is_empty() {
                self.youtube.access_token = Some(token.trim().to_string());
            }
        }

        if let Ok(max) = std::env::var("PLAYLIST_ORGANIZER_MAX_VIDEOS") {
            match max.parse() {
                Ok(max) => self.planner.max_videos_per_playlist = max,
                Err(_) => tracing::warn!("Ignoring invalid PLAYLIST_ORGANIZER_MAX_VIDEOS: {}", max),
            }
        }

        if let Ok(flag) = std::env::var("PLAYLIST_ORGANIZER_AUTO_DELETE") {
            self.planner.auto_delete_empty_playlists =
                matches!(flag.to_lowercase().as_str(), "1" | "true" | "yes");
        }

        if let Ok(log_level) = std::env::var("PLAYLIST_ORGANIZER_LOG_LEVEL") {
            self.output.log_level = log_level;
        }

        self
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path.as_ref().display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.planner.validate()?;

        if self.youtube.page_size == 0 || self.youtube.page_size > 50 {
            return Err(anyhow!("youtube.page_size must be between 1 and 50"));
        }

        if self.youtube.timeout_seconds == 0 {
            return Err(anyhow!("youtube.timeout_seconds must be greater than 0"));
        }

        if let Some(ref rules_file) = self.rules.rules_file {
            if !rules_file.exists() {
                return Err(anyhow!("Rules file not found: {}", rules_file.display()));
            }
        }

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Playlist Organizer Configuration:\n\
            - Max videos per playlist: {}\n\
            - Title normalization: {}\n\
            - Auto-delete empty playlists: {}\n\
            - Minimum classification score: {}\n\
            - Rename suggestions: {}\n\
            - Rules file: {}\n\
            - Access token: {}",
            self.planner.max_videos_per_playlist,
            self.planner.duplicate_title_normalization,
            self.planner.auto_delete_empty_playlists,
            self.planner.classification_min_score,
            self.planner.suggest_renames,
            self.rules
                .rules_file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "built-in".to_string()),
            if self.youtube.access_token.is_some() { "set" } else { "not set" },
        )
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_max_videos(mut self, max: usize) -> Self {
        self.config.planner.max_videos_per_playlist = max;
        self
    }

    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.config.planner.classification_min_score = min_score;
        self
    }

    pub fn auto_delete_empty(mut self, enable: bool) -> Self {
        self.config.planner.auto_delete_empty_playlists = enable;
        self
    }

    pub fn normalize_titles(mut self, enable: bool) -> Self {
        self.config.planner.duplicate_title_normalization = enable;
        self
    }

    pub fn suggest_renames(mut self, enable: bool) -> Self {
        self.config.planner.suggest_renames = enable;
        self
    }

    pub fn with_rules_file(mut self, path: PathBuf) -> Self {
        self.config.rules.rules_file = Some(path);
        self
    }

    pub fn with_access_token(mut self, token: String) -> Self {
        self.config.youtube.access_token = Some(token);
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.planner.max_videos_per_playlist, 100);
        assert!(config.planner.duplicate_title_normalization);
        assert!(!config.planner.auto_delete_empty_playlists);
        assert_eq!(config.youtube.page_size, 50);
    }

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .with_max_videos(20)
            .with_min_score(0.2)
            .auto_delete_empty(true)
            .build();

        assert_eq!(config.planner.max_videos_per_playlist, 20);
        assert_eq!(config.planner.classification_min_score, 0.2);
        assert!(config.planner.auto_delete_empty_playlists);
    }

    #[test]
    fn test_config_validation() {
        assert!(Config::default().validate().is_ok());

        let bad_score = ConfigBuilder::new().with_min_score(1.5).build();
        assert!(bad_score.validate().is_err());

        let bad_max = ConfigBuilder::new().with_max_videos(0).build();
        assert!(bad_max.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [planner]
            max_videos_per_playlist = 25
            auto_delete_empty_playlists = true
            "#,
        )
        .unwrap();

        assert_eq!(config.planner.max_videos_per_playlist, 25);
        assert!(config.planner.auto_delete_empty_playlists);
        assert!(config.planner.duplicate_title_normalization);
        assert_eq!(config.output.plan_file, PathBuf::from("reorganization_plan.json"));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = ConfigBuilder::new().suggest_renames(true).build();

        config.save(&path).unwrap();
        let reloaded = Config::from_file(&path).unwrap();
        assert!(reloaded.planner.suggest_renames);
        assert_eq!(reloaded.planner, config.planner);
    }
}
