//! Wire types for the YouTube Data API v3 resources this tool touches

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{PlaylistSnapshot, PrivacyStatus, VideoRef};

/// Generic paged list response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    /// Token for the pageToken parameter of the next request
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: String,
    pub snippet: PlaylistSnippet,
    pub status: Option<PlaylistStatus>,
    pub content_details: Option<PlaylistContentDetails>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistSnippet {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistStatus {
    pub privacy_status: PrivacyStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistContentDetails {
    pub item_count: u32,
}

impl Playlist {
    /// Convert to a snapshot without videos; items are fetched separately
    pub fn into_snapshot(self) -> PlaylistSnapshot {
        PlaylistSnapshot {
            id: self.id,
            title: self.snippet.title,
            description: self.snippet.description,
            privacy_status: self.status.map(|s| s.privacy_status).unwrap_or_default(),
            created_at: self.snippet.published_at,
            video_count: self.content_details.map(|c| c.item_count),
            videos: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItem {
    pub id: String,
    pub snippet: PlaylistItemSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemSnippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub position: u32,
    pub published_at: Option<DateTime<Utc>>,
    /// Channel that owns the playlist
    #[serde(default)]
    pub channel_title: String,
    /// Channel that uploaded the video; absent for deleted or private videos
    pub video_owner_channel_title: Option<String>,
    pub resource_id: ResourceId,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId {
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
}

impl PlaylistItem {
    /// Convert to a video reference; items without a video id are dropped
    pub fn into_video_ref(self) -> Option<VideoRef> {
        let snippet = self.snippet;
        let video_id = snippet.resource_id.video_id?;
        Some(VideoRef {
            video_id,
            playlist_item_id: Some(self.id),
            title: snippet.title,
            description: snippet.description,
            channel_title: snippet
                .video_owner_channel_title
                .unwrap_or(snippet.channel_title),
            duration_seconds: None,
            position: snippet.position,
            added_at: snippet.published_at,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: String,
    pub content_details: Option<VideoContentDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoContentDetails {
    /// ISO 8601 duration, e.g. `PT1H2M3S`
    pub duration: String,
}

/// Body for `playlists.insert`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistInsertRequest {
    pub snippet: PlaylistSnippet,
    pub status: PlaylistStatus,
}

/// Body for `playlists.update`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistUpdateRequest {
    pub id: String,
    pub snippet: PlaylistSnippet,
}

/// Body for `playlistItems.insert`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemInsertRequest {
    pub snippet: PlaylistItemInsertSnippet,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemInsertSnippet {
    pub playlist_id: String,
    pub resource_id: ResourceId,
}

/// Response of insert calls; only the new id is needed
#[derive(Debug, Deserialize)]
pub struct InsertedResource {
    pub id: String,
}

/// Parse an ISO 8601 duration (`P[nW][nD][T[nH][nM][nS]]`) into seconds
///
/// Year and month designators are rejected because their length in seconds
/// is ambiguous; the API never uses them for video durations.
pub fn parse_iso8601_duration(value: &str) -> Option<u64> {
    let rest = value.strip_prefix('P')?;
    let (date_part, time_part) = match rest.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (rest, None),
    };

    let mut total = 0u64;
    let mut number = String::new();

    for c in date_part.chars() {
        if c.is_ascii_digit() {
            number.push(c);
            continue;
        }
        let n: u64 = number.parse().ok()?;
        number.clear();
        let seconds = match c {
            'W' => n.checked_mul(7 * 86_400)?,
            'D' => n.checked_mul(86_400)?,
            _ => return None,
        };
        total = total.checked_add(seconds)?;
    }

    if let Some(time_part) = time_part {
        if time_part.is_empty() {
            return None;
        }
        for c in time_part.chars() {
            if c.is_ascii_digit() || c == '.' {
                number.push(c);
                continue;
            }
            let n: f64 = number.parse().ok()?;
            number.clear();
            let seconds = match c {
                'H' => n * 3600.0,
                'M' => n * 60.0,
                'S' => n,
                _ => return None,
            };
            if !seconds.is_finite() || seconds >= u64::MAX as f64 {
                return None;
            }
            total = total.checked_add(seconds as u64)?;
        }
    }

    if !number.is_empty() {
        return None;
    }

    Some(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_durations() {
        assert_eq!(parse_iso8601_duration("PT1H2M3S"), Some(3723));
        assert_eq!(parse_iso8601_duration("PT45S"), Some(45));
        assert_eq!(parse_iso8601_duration("PT10M"), Some(600));
        assert_eq!(parse_iso8601_duration("P1DT1S"), Some(86_401));
        assert_eq!(parse_iso8601_duration("P0D"), Some(0));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_iso8601_duration(""), None);
        assert_eq!(parse_iso8601_duration("1H"), None);
        assert_eq!(parse_iso8601_duration("PT"), None);
        assert_eq!(parse_iso8601_duration("PT5"), None);
        assert_eq!(parse_iso8601_duration("P1Y"), None);
    }

    #[test]
    fn test_parse_rejects_overflow() {
        assert_eq!(parse_iso8601_duration("P99999999999999999999D"), None);
        assert_eq!(parse_iso8601_duration("P40000000000000W"), None);
        assert_eq!(parse_iso8601_duration("P213503982334601DT8H"), None);
        assert_eq!(parse_iso8601_duration(&format!("PT{}H", "9".repeat(400))), None);
        assert_eq!(parse_iso8601_duration("P2WT1S"), Some(2 * 7 * 86_400 + 1));
    }

    #[test]
    fn test_playlist_item_conversion() {
        let json = r#"{
            "id": "item-1",
            "snippet": {
                "title": "Lofi beats",
                "description": "chill",
                "position": 3,
                "publishedAt": "2024-05-01T12:00:00Z",
                "channelTitle": "Me",
                "videoOwnerChannelTitle": "Lofi Girl",
                "resourceId": {"kind": "youtube#video", "videoId": "abc123"}
            }
        }"#;

        let item: PlaylistItem = serde_json::from_str(json).unwrap();
        let video = item.into_video_ref().unwrap();
        assert_eq!(video.video_id, "abc123");
        assert_eq!(video.playlist_item_id.as_deref(), Some("item-1"));
        assert_eq!(video.channel_title, "Lofi Girl");
        assert_eq!(video.position, 3);
    }

    #[test]
    fn test_playlist_conversion() {
        let json = r#"{
            "items": [{
                "id": "PL1",
                "snippet": {"title": "Mix", "publishedAt": "2024-01-01T00:00:00Z"},
                "status": {"privacyStatus": "public"},
                "contentDetails": {"itemCount": 12}
            }],
            "nextPageToken": "CAUQAA"
        }"#;

        let page: ListResponse<Playlist> = serde_json::from_str(json).unwrap();
        assert_eq!(page.next_page_token.as_deref(), Some("CAUQAA"));
        let snapshot = page.items.into_iter().next().unwrap().into_snapshot();
        assert_eq!(snapshot.privacy_status, PrivacyStatus::Public);
        assert_eq!(snapshot.video_count, Some(12));
        assert!(snapshot.videos.is_empty());
    }
}
