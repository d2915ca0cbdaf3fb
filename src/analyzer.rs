//! Structural analysis of a playlist snapshot set

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::config::PlannerConfig;
use crate::model::{normalize_title, PlaylistSnapshot};

/// Playlists that share a title after normalization
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DuplicateGroup {
    pub normalized_title: String,
    pub playlist_ids: Vec<String>,
}

/// Findings about the playlist set as a whole
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalysisReport {
    pub total_playlists: usize,
    pub total_videos: usize,
    pub empty_playlists: BTreeSet<String>,
    pub oversized_playlists: BTreeSet<String>,
    pub duplicate_groups: Vec<DuplicateGroup>,
    pub suggestions: Vec<String>,
}

impl AnalysisReport {
    pub fn is_empty(&self, playlist_id: &str) -> bool {
        self.empty_playlists.contains(playlist_id)
    }

    pub fn is_oversized(&self, playlist_id: &str) -> bool {
        self.oversized_playlists.contains(playlist_id)
    }

    /// Generate a summary string
    pub fn summary(&self) -> String {
        let mut out = format!(
            "Playlist Analysis:\n\
            - Playlists: {}\n\
            - Videos: {}\n\
            - Empty playlists: {}\n\
            - Oversized playlists: {}\n\
            - Duplicate title groups: {}",
            self.total_playlists,
            self.total_videos,
            self.empty_playlists.len(),
            self.oversized_playlists.len(),
            self.duplicate_groups.len()
        );

        for suggestion in &self.suggestions {
            out.push_str("\n  • ");
            out.push_str(suggestion);
        }

        out
    }
}

/// Detects empty, oversized and duplicate playlists
#[derive(Debug, Clone)]
pub struct PlaylistAnalyzer<'a> {
    config: &'a PlannerConfig,
}

impl<'a> PlaylistAnalyzer<'a> {
    pub fn new(config: &'a PlannerConfig) -> Self {
        Self { config }
    }

    /// Key used to decide whether two titles collide
    pub fn title_key(&self, title: &str) -> String {
        if self.config.duplicate_title_normalization {
            normalize_title(title)
        } else {
            title.to_string()
        }
    }

    pub fn analyze(&self, playlists: &[PlaylistSnapshot]) -> AnalysisReport {
        let max = self.config.max_videos_per_playlist;

        let empty_playlists: BTreeSet<String> = playlists
            .iter()
            .filter(|p| p.videos.is_empty())
            .map(|p| p.id.clone())
            .collect();

        let oversized_playlists: BTreeSet<String> = playlists
            .iter()
            .filter(|p| p.videos.len() > max)
            .map(|p| p.id.clone())
            .collect();

        // Grouping by key makes the relation transitive for free
        let mut by_title: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for playlist in playlists {
            by_title
                .entry(self.title_key(&playlist.title))
                .or_default()
                .insert(playlist.id.clone());
        }

        let duplicate_groups: Vec<DuplicateGroup> = by_title
            .into_iter()
            .filter(|(_, ids)| ids.len() > 1)
            .map(|(normalized_title, ids)| DuplicateGroup {
                normalized_title,
                playlist_ids: ids.into_iter().collect(),
            })
            .collect();

        let mut suggestions = Vec::new();
        if !empty_playlists.is_empty() {
            suggestions.push(format!(
                "Found {} empty playlists, consider deleting them",
                empty_playlists.len()
            ));
        }
        if !oversized_playlists.is_empty() {
            suggestions.push(format!(
                "Found {} playlists with more than {} videos, consider splitting them",
                oversized_playlists.len(),
                max
            ));
        }
        if !duplicate_groups.is_empty() {
            suggestions.push(format!(
                "Found {} groups of playlists with duplicate titles, consider merging them",
                duplicate_groups.len()
            ));
        }

        debug!(
            empty = empty_playlists.len(),
            oversized = oversized_playlists.len(),
            duplicates = duplicate_groups.len(),
            "analyzed {} playlists",
            playlists.len()
        );

        AnalysisReport {
            total_playlists: playlists.len(),
            total_videos: playlists.iter().map(|p| p.videos.len()).sum(),
            empty_playlists,
            oversized_playlists,
            duplicate_groups,
            suggestions,
        }
    }
}
