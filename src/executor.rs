//! Applies a reviewed reorganization plan to the remote service
//!
//! Actions run strictly in plan order. Each action re-checks its
//! preconditions against the live playlist set first, so re-running a
//! partially applied plan skips what is already done instead of failing.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

use crate::model::{PlaylistSnapshot, PrivacyStatus, VideoRef};
use crate::planner::{Action, MoveTarget, PlannedAction, ReorganizationPlan};

/// Remote playlist operations the executor needs
#[async_trait]
pub trait PlaylistService: Send + Sync {
    /// Playlists of the account; videos need not be filled in
    async fn list_playlists(&self) -> Result<Vec<PlaylistSnapshot>>;
    async fn list_items(&self, playlist_id: &str) -> Result<Vec<VideoRef>>;
    async fn create_playlist(
        &self,
        title: &str,
        description: &str,
        privacy: PrivacyStatus,
    ) -> Result<String>;
    async fn rename_playlist(&self, playlist_id: &str, title: &str) -> Result<()>;
    async fn delete_playlist(&self, playlist_id: &str) -> Result<()>;
    /// Append a video, returning the new playlist item id
    async fn add_video(&self, playlist_id: &str, video_id: &str) -> Result<String>;
    async fn remove_item(&self, playlist_item_id: &str) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct ExecutionOptions {
    /// Evaluate every action against live state without mutating anything
    pub dry_run: bool,

    /// Privacy of playlists created for new categories
    pub new_playlist_privacy: PrivacyStatus,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            dry_run: true,
            new_playlist_privacy: PrivacyStatus::Private,
        }
    }
}

/// What happened to one planned action
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ActionStatus {
    Applied,
    /// Would have been applied; nothing was changed
    DryRun,
    Skipped { reason: String },
    Declined,
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionOutcome {
    /// Position of the action in the plan
    pub index: usize,
    pub kind: String,
    #[serde(flatten)]
    pub status: ActionStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExecutionReport {
    pub dry_run: bool,
    pub outcomes: Vec<ActionOutcome>,
    pub applied: usize,
    pub skipped: usize,
    pub declined: usize,
    pub failed: usize,
}

impl ExecutionReport {
    fn record(&mut self, outcome: ActionOutcome) {
        match outcome.status {
            ActionStatus::Applied | ActionStatus::DryRun => self.applied += 1,
            ActionStatus::Skipped { .. } => self.skipped += 1,
            ActionStatus::Declined => self.declined += 1,
            ActionStatus::Failed { .. } => self.failed += 1,
        }
        self.outcomes.push(outcome);
    }

    /// Generate a summary string
    pub fn summary(&self) -> String {
        format!(
            "Execution{}:\n\
            - Applied: {}\n\
            - Skipped: {}\n\
            - Declined: {}\n\
            - Failed: {}",
            if self.dry_run { " (dry run)" } else { "" },
            self.applied,
            self.skipped,
            self.declined,
            self.failed
        )
    }
}

enum Step {
    Done,
    Skip(String),
}

fn skip(reason: impl Into<String>) -> Result<Step> {
    Ok(Step::Skip(reason.into()))
}

/// Applies plans through a [`PlaylistService`]
pub struct PlanExecutor<'a, S: PlaylistService + ?Sized> {
    service: &'a S,
    options: ExecutionOptions,
    /// Playlists known to exist remotely, id -> title
    live: HashMap<String, String>,
    /// Playlist ids created for categories during this run
    created: HashMap<String, String>,
    /// Merged-away playlist -> playlist it was merged into
    redirects: HashMap<String, String>,
    /// Lazily fetched playlist contents, kept in sync with our own edits
    contents: HashMap<String, Vec<VideoRef>>,
}

impl<'a, S: PlaylistService + ?Sized> PlanExecutor<'a, S> {
    pub fn new(service: &'a S, options: ExecutionOptions) -> Self {
        Self {
            service,
            options,
            live: HashMap::new(),
            created: HashMap::new(),
            redirects: HashMap::new(),
            contents: HashMap::new(),
        }
    }

    /// Apply every action in order; `approve` is asked before each one
    pub async fn execute<F>(&mut self, plan: &ReorganizationPlan, mut approve: F) -> Result<ExecutionReport>
    where
        F: FnMut(&PlannedAction) -> bool,
    {
        self.live = self
            .service
            .list_playlists()
            .await?
            .into_iter()
            .map(|p| (p.id, p.title))
            .collect();
        info!(
            "🚀 Applying {} actions against {} playlists{}",
            plan.actions.len(),
            self.live.len(),
            if self.options.dry_run { " (dry run)" } else { "" }
        );

        let mut report = ExecutionReport {
            dry_run: self.options.dry_run,
            ..ExecutionReport::default()
        };

        for (index, planned) in plan.actions.iter().enumerate() {
            let kind = planned.action.kind().to_string();

            let status = if !approve(planned) {
                ActionStatus::Declined
            } else {
                match self.apply(&planned.action).await {
                    Ok(Step::Done) if self.options.dry_run => ActionStatus::DryRun,
                    Ok(Step::Done) => ActionStatus::Applied,
                    Ok(Step::Skip(reason)) => ActionStatus::Skipped { reason },
                    Err(e) => ActionStatus::Failed {
                        error: format!("{:#}", e),
                    },
                }
            };

            match &status {
                ActionStatus::Applied | ActionStatus::DryRun => {
                    info!("✅ [{}] {}: {}", index + 1, kind, planned.rationale)
                }
                ActionStatus::Skipped { reason } => info!("⏭️ [{}] {} skipped: {}", index + 1, kind, reason),
                ActionStatus::Declined => info!("🚫 [{}] {} declined", index + 1, kind),
                ActionStatus::Failed { error } => warn!("❌ [{}] {} failed: {}", index + 1, kind, error),
            }

            report.record(ActionOutcome {
                index,
                kind,
                status,
            });
        }

        Ok(report)
    }

    fn resolve(&self, playlist_id: &str) -> String {
        let mut current = playlist_id;
        while let Some(next) = self.redirects.get(current) {
            current = next;
        }
        current.to_string()
    }

    async fn apply(&mut self, action: &Action) -> Result<Step> {
        match action {
            Action::MergePlaylists {
                playlist_ids,
                target_playlist_id,
            } => self.merge(playlist_ids, target_playlist_id).await,
            Action::DeleteEmptyPlaylist { playlist_id } => self.delete_empty(playlist_id).await,
            Action::RenamePlaylist {
                playlist_id,
                new_title,
                ..
            } => self.rename(playlist_id, new_title).await,
            Action::CreateCategoryPlaylist { category, title, .. } => {
                self.create(category, title).await
            }
            Action::MoveVideo {
                video_id,
                from_playlist_id,
                to,
                ..
            } => self.move_video(video_id, from_playlist_id, to).await,
        }
    }

    async fn merge(&mut self, playlist_ids: &[String], target_playlist_id: &str) -> Result<Step> {
        let target = self.resolve(target_playlist_id);
        if !self.live.contains_key(&target) {
            return skip("target playlist no longer exists");
        }

        let mut sources: Vec<String> = Vec::new();
        for id in playlist_ids {
            let id = self.resolve(id);
            if id != target && self.live.contains_key(&id) && !sources.contains(&id) {
                sources.push(id);
            }
        }
        if sources.is_empty() {
            return skip("fewer than two of the playlists still exist");
        }

        let mut in_target: HashSet<String> = self
            .items(&target)
            .await?
            .iter()
            .map(|v| v.video_id.clone())
            .collect();

        for source in sources {
            let videos = self.items(&source).await?.to_vec();
            for video in videos {
                if in_target.insert(video.video_id.clone()) {
                    self.add(&target, &video.video_id).await?;
                }
            }
            self.delete(&source).await?;
            self.redirects.insert(source, target.clone());
        }

        Ok(Step::Done)
    }

    async fn delete_empty(&mut self, playlist_id: &str) -> Result<Step> {
        if !self.live.contains_key(playlist_id) {
            return skip("playlist no longer exists");
        }
        if !self.items(playlist_id).await?.is_empty() {
            return skip("playlist is no longer empty");
        }
        self.delete(playlist_id).await?;
        Ok(Step::Done)
    }

    async fn rename(&mut self, playlist_id: &str, new_title: &str) -> Result<Step> {
        let playlist_id = self.resolve(playlist_id);
        if !self.live.contains_key(&playlist_id) {
            return skip("playlist no longer exists");
        }
        if !self.options.dry_run {
            self.service.rename_playlist(&playlist_id, new_title).await?;
        }
        self.live.insert(playlist_id, new_title.to_string());
        Ok(Step::Done)
    }

    async fn create(&mut self, category: &str, title: &str) -> Result<Step> {
        if self.created.contains_key(category) {
            return skip(format!("a playlist for {} was already created", category));
        }
        let existing = self
            .live
            .iter()
            .filter(|(_, live_title)| live_title.as_str() == title)
            .map(|(id, _)| id.clone())
            .min();
        if let Some(existing) = existing {
            self.created.insert(category.to_string(), existing);
            return skip(format!("playlist '{}' already exists", title));
        }

        let playlist_id = if self.options.dry_run {
            format!("dry-run:{}", category)
        } else {
            self.service
                .create_playlist(title, "", self.options.new_playlist_privacy)
                .await?
        };

        self.live.insert(playlist_id.clone(), title.to_string());
        self.contents.insert(playlist_id.clone(), Vec::new());
        self.created.insert(category.to_string(), playlist_id);
        Ok(Step::Done)
    }

    async fn move_video(&mut self, video_id: &str, from_playlist_id: &str, to: &MoveTarget) -> Result<Step> {
        let target = match to {
            MoveTarget::ExistingPlaylist { playlist_id } => self.resolve(playlist_id),
            MoveTarget::NewCategory { category } => match self.created.get(category) {
                Some(id) => id.clone(),
                None => return skip(format!("no playlist was created for {}", category)),
            },
        };
        if !self.live.contains_key(&target) {
            return skip("target playlist no longer exists");
        }

        let from = self.resolve(from_playlist_id);
        if !self.live.contains_key(&from) {
            return skip("source playlist no longer exists");
        }
        if from == target {
            return skip("video is already in the target playlist");
        }

        let item_id = match self.items(&from).await?.iter().find(|v| v.video_id == video_id) {
            None => return skip("video is no longer in the source playlist"),
            Some(video) => match &video.playlist_item_id {
                Some(item_id) => item_id.clone(),
                None => return Err(anyhow!("no playlist item id for video {} in {}", video_id, from)),
            },
        };

        let already_there = self.items(&target).await?.iter().any(|v| v.video_id == video_id);
        if !already_there {
            self.add(&target, video_id).await?;
        }
        self.remove(&from, &item_id).await?;
        Ok(Step::Done)
    }

    async fn items(&mut self, playlist_id: &str) -> Result<&[VideoRef]> {
        if !self.contents.contains_key(playlist_id) {
            let videos = self.service.list_items(playlist_id).await?;
            debug!(playlist_id, count = videos.len(), "loaded playlist contents");
            self.contents.insert(playlist_id.to_string(), videos);
        }
        Ok(self
            .contents
            .get(playlist_id)
            .map(Vec::as_slice)
            .unwrap_or_default())
    }

    async fn add(&mut self, playlist_id: &str, video_id: &str) -> Result<()> {
        let item_id = if self.options.dry_run {
            format!("dry-run:{}:{}", playlist_id, video_id)
        } else {
            self.service.add_video(playlist_id, video_id).await?
        };

        self.contents
            .entry(playlist_id.to_string())
            .or_default()
            .push(VideoRef::new(video_id, "").with_playlist_item_id(item_id));
        Ok(())
    }

    async fn remove(&mut self, playlist_id: &str, playlist_item_id: &str) -> Result<()> {
        if !self.options.dry_run {
            self.service.remove_item(playlist_item_id).await?;
        }
        if let Some(videos) = self.contents.get_mut(playlist_id) {
            videos.retain(|v| v.playlist_item_id.as_deref() != Some(playlist_item_id));
        }
        Ok(())
    }

    async fn delete(&mut self, playlist_id: &str) -> Result<()> {
        if !self.options.dry_run {
            self.service.delete_playlist(playlist_id).await?;
        }
        self.live.remove(playlist_id);
        self.contents.remove(playlist_id);
        Ok(())
    }
}
