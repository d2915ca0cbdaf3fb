//! YouTube Data API v3 client for playlist reads and edits

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use super::types::{
    parse_iso8601_duration, InsertedResource, ListResponse, Playlist, PlaylistInsertRequest,
    PlaylistItem, PlaylistItemInsertRequest, PlaylistItemInsertSnippet, PlaylistSnippet,
    PlaylistStatus, PlaylistUpdateRequest, ResourceId, Video,
};
use crate::config::YouTubeConfig;
use crate::error::YouTubeError;
use crate::model::{PlaylistSnapshot, PrivacyStatus, SnapshotExport, VideoRef};

pub type YouTubeResult<T> = std::result::Result<T, YouTubeError>;

/// The videos.list endpoint accepts at most this many ids per call
const MAX_IDS_PER_REQUEST: usize = 50;

/// Client for the playlist endpoints of the YouTube Data API.
///
/// Authentication is a bearer access token obtained elsewhere; this client
/// never runs an OAuth flow and never retries. Errors, including quota
/// exhaustion, are returned to the caller as-is.
#[derive(Debug, Clone)]
pub struct YouTubeClient {
    config: YouTubeConfig,
    access_token: String,
    client: reqwest::Client,
}

impl YouTubeClient {
    pub fn new(config: YouTubeConfig) -> YouTubeResult<Self> {
        let access_token = config
            .access_token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or(YouTubeError::MissingAccessToken)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            config,
            access_token,
            client,
        })
    }

    fn url(&self, resource: &str) -> String {
        format!("{}/{}", self.config.api_base.trim_end_matches('/'), resource)
    }

    /// Makes an authenticated request and maps non-success statuses to errors
    #[instrument(skip(self, query, body), level = tracing::Level::TRACE)]
    async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        resource: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> YouTubeResult<reqwest::Response> {
        let mut request = self
            .client
            .request(method.clone(), self.url(resource))
            .bearer_auth(&self.access_token)
            .query(query);

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());

        if status == StatusCode::FORBIDDEN && message.contains("quotaExceeded") {
            warn!("YouTube API quota exhausted during {} {}", method, resource);
            return Err(YouTubeError::QuotaExceeded(message));
        }

        Err(YouTubeError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        resource: &str,
        query: &[(&str, String)],
    ) -> YouTubeResult<T> {
        let response = self.request::<()>(Method::GET, resource, query, None).await?;
        Ok(response.json().await?)
    }

    /// Follows `nextPageToken` until the listing is exhausted
    async fn list_all<T: DeserializeOwned>(
        &self,
        resource: &str,
        params: &[(&str, String)],
    ) -> YouTubeResult<Vec<T>> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = params.to_vec();
            query.push(("maxResults", self.config.page_size.to_string()));
            if let Some(token) = page_token.take() {
                query.push(("pageToken", token));
            }

            let page: ListResponse<T> = self.get_json(resource, &query).await?;
            items.extend(page.items);

            match page.next_page_token {
                Some(token) => {
                    page_token = Some(token);
                    tokio::time::sleep(Duration::from_millis(self.config.request_delay_ms)).await;
                }
                None => break,
            }
        }

        Ok(items)
    }

    /// All playlists owned by the authenticated user, without their videos
    pub async fn list_my_playlists(&self) -> YouTubeResult<Vec<PlaylistSnapshot>> {
        let params = [
            ("part", "snippet,contentDetails,status".to_string()),
            ("mine", "true".to_string()),
        ];
        let playlists: Vec<Playlist> = self.list_all("playlists", &params).await?;
        info!("✅ Fetched {} playlists", playlists.len());
        Ok(playlists.into_iter().map(Playlist::into_snapshot).collect())
    }

    /// One playlist by id, without its videos
    pub async fn get_playlist(&self, playlist_id: &str) -> YouTubeResult<Option<PlaylistSnapshot>> {
        let query = [
            ("part", "snippet,contentDetails,status".to_string()),
            ("id", playlist_id.to_string()),
        ];
        let page: ListResponse<Playlist> = self.get_json("playlists", &query).await?;
        Ok(page.items.into_iter().next().map(Playlist::into_snapshot))
    }

    /// Videos in a playlist, in playlist order
    pub async fn list_playlist_items(&self, playlist_id: &str) -> YouTubeResult<Vec<VideoRef>> {
        let params = [
            ("part", "snippet".to_string()),
            ("playlistId", playlist_id.to_string()),
        ];
        let items: Vec<PlaylistItem> = self.list_all("playlistItems", &params).await?;
        let mut videos: Vec<VideoRef> = items
            .into_iter()
            .filter_map(PlaylistItem::into_video_ref)
            .collect();
        videos.sort_by_key(|v| v.position);
        debug!(playlist_id, count = videos.len(), "fetched playlist items");
        Ok(videos)
    }

    /// Durations in seconds for the given video ids; unknown ids are omitted
    pub async fn video_durations(&self, video_ids: &[String]) -> YouTubeResult<HashMap<String, u64>> {
        let mut durations = HashMap::new();

        for chunk in video_ids.chunks(MAX_IDS_PER_REQUEST) {
            let query = [
                ("part", "contentDetails".to_string()),
                ("id", chunk.join(",")),
            ];
            let page: ListResponse<Video> = self.get_json("videos", &query).await?;
            for video in page.items {
                let parsed = video
                    .content_details
                    .as_ref()
                    .and_then(|d| parse_iso8601_duration(&d.duration));
                match parsed {
                    Some(seconds) => {
                        durations.insert(video.id, seconds);
                    }
                    None => debug!(video_id = %video.id, "no usable duration"),
                }
            }
        }

        Ok(durations)
    }

    /// Fetch every playlist with its videos as a snapshot export
    pub async fn fetch_snapshot(&self) -> YouTubeResult<SnapshotExport> {
        let mut playlists = self.list_my_playlists().await?;

        for playlist in &mut playlists {
            playlist.videos = self.list_playlist_items(&playlist.id).await?;
            info!("📥 Exported playlist: {} ({} videos)", playlist.title, playlist.videos.len());
        }

        if self.config.fetch_durations {
            let mut ids: Vec<String> = playlists
                .iter()
                .flat_map(|p| p.videos.iter().map(|v| v.video_id.clone()))
                .collect();
            ids.sort();
            ids.dedup();

            let durations = self.video_durations(&ids).await?;
            for video in playlists.iter_mut().flat_map(|p| p.videos.iter_mut()) {
                video.duration_seconds = durations.get(&video.video_id).copied();
            }
        }

        Ok(SnapshotExport::new(playlists))
    }

    pub async fn create_playlist(
        &self,
        title: &str,
        description: &str,
        privacy: PrivacyStatus,
    ) -> YouTubeResult<String> {
        let body = PlaylistInsertRequest {
            snippet: PlaylistSnippet {
                title: title.to_string(),
                description: description.to_string(),
                published_at: None,
            },
            status: PlaylistStatus {
                privacy_status: privacy,
            },
        };
        let query = [("part", "snippet,status".to_string())];
        let response = self
            .request(Method::POST, "playlists", &query, Some(&body))
            .await?;
        let created: InsertedResource = response.json().await?;
        info!("✅ Created playlist: {} (ID: {})", title, created.id);
        Ok(created.id)
    }

    /// Replace a playlist's title; the description must be resent or it is cleared
    pub async fn update_playlist_title(
        &self,
        playlist_id: &str,
        title: &str,
        description: &str,
    ) -> YouTubeResult<()> {
        let body = PlaylistUpdateRequest {
            id: playlist_id.to_string(),
            snippet: PlaylistSnippet {
                title: title.to_string(),
                description: description.to_string(),
                published_at: None,
            },
        };
        let query = [("part", "snippet".to_string())];
        self.request(Method::PUT, "playlists", &query, Some(&body))
            .await?;
        info!("✏️ Renamed playlist {} to {}", playlist_id, title);
        Ok(())
    }

    pub async fn delete_playlist(&self, playlist_id: &str) -> YouTubeResult<()> {
        let query = [("id", playlist_id.to_string())];
        self.request::<()>(Method::DELETE, "playlists", &query, None)
            .await?;
        info!("🗑️ Deleted playlist (ID: {})", playlist_id);
        Ok(())
    }

    /// Append a video to a playlist, returning the new playlist item id
    pub async fn insert_playlist_item(&self, playlist_id: &str, video_id: &str) -> YouTubeResult<String> {
        let body = PlaylistItemInsertRequest {
            snippet: PlaylistItemInsertSnippet {
                playlist_id: playlist_id.to_string(),
                resource_id: ResourceId {
                    kind: "youtube#video".to_string(),
                    video_id: Some(video_id.to_string()),
                },
            },
        };
        let query = [("part", "snippet".to_string())];
        let response = self
            .request(Method::POST, "playlistItems", &query, Some(&body))
            .await?;
        let inserted: InsertedResource = response.json().await?;
        debug!(playlist_id, video_id, "inserted playlist item");
        Ok(inserted.id)
    }

    pub async fn delete_playlist_item(&self, playlist_item_id: &str) -> YouTubeResult<()> {
        let query = [("id", playlist_item_id.to_string())];
        self.request::<()>(Method::DELETE, "playlistItems", &query, None)
            .await?;
        debug!(playlist_item_id, "deleted playlist item");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_access_token() {
        let config = YouTubeConfig::default();
        assert!(matches!(
            YouTubeClient::new(config),
            Err(YouTubeError::MissingAccessToken)
        ));

        let blank = YouTubeConfig {
            access_token: Some("   ".to_string()),
            ..YouTubeConfig::default()
        };
        assert!(YouTubeClient::new(blank).is_err());
    }

    #[test]
    fn test_url_joins_base() {
        let config = YouTubeConfig {
            api_base: "http://localhost:8080/youtube/v3/".to_string(),
            access_token: Some("token".to_string()),
            ..YouTubeConfig::default()
        };
        let client = YouTubeClient::new(config).unwrap();
        assert_eq!(client.url("playlists"), "http://localhost:8080/youtube/v3/playlists");
    }
}
