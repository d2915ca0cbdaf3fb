use anyhow::{Context, Result};
use async_trait::async_trait;

use super::client::YouTubeClient;
use crate::executor::PlaylistService;
use crate::model::{PlaylistSnapshot, PrivacyStatus, VideoRef};

#[async_trait]
impl PlaylistService for YouTubeClient {
    async fn list_playlists(&self) -> Result<Vec<PlaylistSnapshot>> {
        Ok(self.list_my_playlists().await?)
    }

    async fn list_items(&self, playlist_id: &str) -> Result<Vec<VideoRef>> {
        Ok(self.list_playlist_items(playlist_id).await?)
    }

    async fn create_playlist(
        &self,
        title: &str,
        description: &str,
        privacy: PrivacyStatus,
    ) -> Result<String> {
        Ok(YouTubeClient::create_playlist(self, title, description, privacy).await?)
    }

    async fn rename_playlist(&self, playlist_id: &str, title: &str) -> Result<()> {
        let current = self
            .get_playlist(playlist_id)
            .await?
            .with_context(|| format!("playlist {} not found", playlist_id))?;
        self.update_playlist_title(playlist_id, title, &current.description)
            .await?;
        Ok(())
    }

    async fn delete_playlist(&self, playlist_id: &str) -> Result<()> {
        Ok(YouTubeClient::delete_playlist(self, playlist_id).await?)
    }

    async fn add_video(&self, playlist_id: &str, video_id: &str) -> Result<String> {
        Ok(self.insert_playlist_item(playlist_id, video_id).await?)
    }

    async fn remove_item(&self, playlist_item_id: &str) -> Result<()> {
        Ok(self.delete_playlist_item(playlist_item_id).await?)
    }
}
