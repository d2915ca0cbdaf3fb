//! Playlist and video snapshot structures

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{OrganizerError, Result};

/// Playlist visibility on the remote service
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyStatus {
    Public,
    #[default]
    Private,
    Unlisted,
}

impl PrivacyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrivacyStatus::Public => "public",
            PrivacyStatus::Private => "private",
            PrivacyStatus::Unlisted => "unlisted",
        }
    }
}

impl std::str::FromStr for PrivacyStatus {
    type Err = OrganizerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "public" => Ok(PrivacyStatus::Public),
            "private" => Ok(PrivacyStatus::Private),
            "unlisted" => Ok(PrivacyStatus::Unlisted),
            other => Err(OrganizerError::InvalidConfig(format!(
                "unknown privacy status '{}'",
                other
            ))),
        }
    }
}

/// A single video as it appears inside a playlist
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoRef {
    /// Remote video identifier
    pub video_id: String,

    /// Identifier of the playlist item wrapping this video (needed for removal)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playlist_item_id: Option<String>,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub channel_title: String,

    /// Duration in seconds, when it was fetched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u64>,

    /// Zero-based position within the playlist
    #[serde(default)]
    pub position: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,
}

impl VideoRef {
    /// Create a video reference with just the fields the planner reads
    pub fn new(video_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            playlist_item_id: None,
            title: title.into(),
            description: String::new(),
            channel_title: String::new(),
            duration_seconds: None,
            position: 0,
            added_at: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_position(mut self, position: u32) -> Self {
        self.position = position;
        self
    }

    pub fn with_playlist_item_id(mut self, item_id: impl Into<String>) -> Self {
        self.playlist_item_id = Some(item_id.into());
        self
    }

    /// Get formatted duration string
    pub fn duration_formatted(&self) -> String {
        match self.duration_seconds {
            Some(total) => {
                let hours = total / 3600;
                let minutes = (total % 3600) / 60;
                let seconds = total % 60;
                if hours > 0 {
                    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
                } else {
                    format!("{:02}:{:02}", minutes, seconds)
                }
            }
            None => "--:--".to_string(),
        }
    }
}

/// Point-in-time copy of a playlist and its videos
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaylistSnapshot {
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub privacy_status: PrivacyStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// Item count as reported by the remote service (may lag `videos`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_count: Option<u32>,

    /// Videos in remote order
    #[serde(default)]
    pub videos: Vec<VideoRef>,
}

impl PlaylistSnapshot {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            privacy_status: PrivacyStatus::default(),
            created_at: None,
            video_count: None,
            videos: Vec::new(),
        }
    }

    pub fn with_videos(mut self, videos: Vec<VideoRef>) -> Self {
        self.videos = videos;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn len(&self) -> usize {
        self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }

    /// Check that every identifier the planner relies on is present
    pub fn validate(&self, index: usize) -> Result<()> {
        if self.id.trim().is_empty() {
            let label = if self.title.trim().is_empty() {
                format!("#{}", index)
            } else {
                self.title.clone()
            };
            return Err(OrganizerError::MissingField {
                entity: "playlist",
                id: label,
                field: "id",
            });
        }

        for (i, video) in self.videos.iter().enumerate() {
            if video.video_id.trim().is_empty() {
                return Err(OrganizerError::MissingField {
                    entity: "video",
                    id: format!("{}[{}]", self.id, i),
                    field: "video_id",
                });
            }
        }

        Ok(())
    }
}

/// Validate a whole snapshot set, stopping at the first malformed entry
pub fn validate_snapshots(playlists: &[PlaylistSnapshot]) -> Result<()> {
    playlists
        .iter()
        .enumerate()
        .try_for_each(|(i, playlist)| playlist.validate(i))
}

/// Backup document written by `export` and read by `analyze`/`plan`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotExport {
    /// Older backups carry a naive local timestamp; those are read as UTC
    #[serde(deserialize_with = "deserialize_export_date")]
    pub export_date: DateTime<Utc>,
    pub total_playlists: usize,
    pub playlists: Vec<PlaylistSnapshot>,
}

impl SnapshotExport {
    pub fn new(playlists: Vec<PlaylistSnapshot>) -> Self {
        Self {
            export_date: Utc::now(),
            total_playlists: playlists.len(),
            playlists,
        }
    }

    pub fn total_videos(&self) -> usize {
        self.playlists.iter().map(|p| p.videos.len()).sum()
    }
}

fn deserialize_export_date<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(timestamp.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}

/// Normalize a title for comparison: trim, lowercase, collapse internal whitespace
pub fn normalize_title(title: &str) -> String {
    title
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
