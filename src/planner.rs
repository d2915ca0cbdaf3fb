//! Reorganization planning
//!
//! Turns a snapshot set, its analysis report and a rule set into an ordered
//! list of proposed actions. Planning is pure: identical inputs always give
//! an identical plan, so a plan can be previewed, exported and reviewed
//! before anything touches the remote service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::debug;

use crate::analyzer::AnalysisReport;
use crate::classifier::{ClassificationResult, Classifier};
use crate::config::PlannerConfig;
use crate::model::{normalize_title, PlaylistSnapshot};
use crate::rules::CategoryRules;

/// Merges are driven by exact normalized-title equality
pub const MERGE_CONFIDENCE: f64 = 0.95;
pub const DELETE_CONFIDENCE: f64 = 1.0;
pub const RENAME_CONFIDENCE: f64 = 0.6;

/// Where a moved video should end up
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MoveTarget {
    /// A playlist that already represents the category
    ExistingPlaylist { playlist_id: String },
    /// The playlist proposed by a `CreateCategoryPlaylist` action
    NewCategory { category: String },
}

/// A single proposed change
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    MergePlaylists {
        playlist_ids: Vec<String>,
        target_playlist_id: String,
    },
    DeleteEmptyPlaylist {
        playlist_id: String,
    },
    RenamePlaylist {
        playlist_id: String,
        current_title: String,
        new_title: String,
        category: String,
    },
    CreateCategoryPlaylist {
        category: String,
        title: String,
        initial_video_ids: Vec<String>,
    },
    MoveVideo {
        video_id: String,
        from_playlist_id: String,
        to: MoveTarget,
        category: String,
    },
}

impl Action {
    /// Execution phase; lower phases run first
    pub fn phase(&self) -> u8 {
        match self {
            Action::MergePlaylists { .. } => 0,
            Action::DeleteEmptyPlaylist { .. } => 1,
            Action::RenamePlaylist { .. } => 2,
            Action::CreateCategoryPlaylist { .. } => 3,
            Action::MoveVideo { .. } => 4,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Action::MergePlaylists { .. } => "merge_playlists",
            Action::DeleteEmptyPlaylist { .. } => "delete_empty_playlist",
            Action::RenamePlaylist { .. } => "rename_playlist",
            Action::CreateCategoryPlaylist { .. } => "create_category_playlist",
            Action::MoveVideo { .. } => "move_video",
        }
    }

    /// Whether applying the action removes data from the remote service
    pub fn is_destructive(&self) -> bool {
        matches!(
            self,
            Action::MergePlaylists { .. } | Action::DeleteEmptyPlaylist { .. }
        )
    }

    fn sort_key(&self) -> (&str, &str) {
        match self {
            Action::MergePlaylists {
                target_playlist_id, ..
            } => (target_playlist_id.as_str(), ""),
            Action::DeleteEmptyPlaylist { playlist_id } => (playlist_id.as_str(), ""),
            Action::RenamePlaylist { playlist_id, .. } => (playlist_id.as_str(), ""),
            Action::CreateCategoryPlaylist { category, .. } => (category.as_str(), ""),
            Action::MoveVideo {
                video_id,
                from_playlist_id,
                ..
            } => (video_id.as_str(), from_playlist_id.as_str()),
        }
    }
}

/// An action with its confidence and a human-readable reason
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlannedAction {
    pub action: Action,
    pub confidence: f64,
    pub rationale: String,
}

/// Ordered set of proposed actions plus the classifications behind them
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ReorganizationPlan {
    pub actions: Vec<PlannedAction>,
    pub classifications: Vec<ClassificationResult>,
}

impl ReorganizationPlan {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn count(&self, kind: &str) -> usize {
        self.actions.iter().filter(|a| a.action.kind() == kind).count()
    }

    /// Generate a summary string
    pub fn summary(&self) -> String {
        let mut out = format!(
            "Reorganization Plan:\n\
            - Merges: {}\n\
            - Deletions: {}\n\
            - Renames: {}\n\
            - New category playlists: {}\n\
            - Video moves: {}",
            self.count("merge_playlists"),
            self.count("delete_empty_playlist"),
            self.count("rename_playlist"),
            self.count("create_category_playlist"),
            self.count("move_video"),
        );

        for (i, planned) in self.actions.iter().enumerate() {
            out.push_str(&format!(
                "\n  {:>3}. [{:.2}] {}: {}",
                i + 1,
                planned.confidence,
                planned.action.kind(),
                planned.rationale
            ));
        }

        out
    }
}

/// Exported plan file: the plan, the report it was built from, and when
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanDocument {
    pub generated_at: DateTime<Utc>,
    pub report: AnalysisReport,
    pub plan: ReorganizationPlan,
}

impl PlanDocument {
    pub fn new(report: AnalysisReport, plan: ReorganizationPlan) -> Self {
        Self {
            generated_at: Utc::now(),
            report,
            plan,
        }
    }
}

/// Builds reorganization plans from analyzed snapshots
#[derive(Debug, Clone)]
pub struct ReorganizationPlanner<'a> {
    rules: &'a CategoryRules,
    config: &'a PlannerConfig,
}

impl<'a> ReorganizationPlanner<'a> {
    pub fn new(rules: &'a CategoryRules, config: &'a PlannerConfig) -> Self {
        Self { rules, config }
    }

    /// Category a playlist stands for, judged by its title alone
    ///
    /// A playlist represents a category when its normalized title equals
    /// the category's suggested name or contains one of the category name's
    /// words. The first matching rule wins.
    pub fn infer_category(&self, title: &str) -> Option<&'a str> {
        let key = normalize_title(title);
        if key.is_empty() {
            return None;
        }
        let words: HashSet<&str> = key.split(' ').collect();

        self.rules
            .iter()
            .find(|rule| {
                let by_suggested = rule
                    .suggested_name
                    .as_deref()
                    .map(|s| normalize_title(s) == key)
                    .unwrap_or(false);
                by_suggested || rule.name_words().iter().any(|w| words.contains(w.as_str()))
            })
            .map(|rule| rule.name.as_str())
    }

    pub fn plan(&self, playlists: &[PlaylistSnapshot], report: &AnalysisReport) -> ReorganizationPlan {
        let classifier = Classifier::new(self.rules, self.config.classification_min_score);

        let mut classifications: BTreeMap<&str, ClassificationResult> = BTreeMap::new();
        for video in playlists.iter().flat_map(|p| p.videos.iter()) {
            classifications
                .entry(video.video_id.as_str())
                .or_insert_with(|| classifier.classify(video));
        }

        let by_id: HashMap<&str, &PlaylistSnapshot> =
            playlists.iter().map(|p| (p.id.as_str(), p)).collect();
        let inferred: Vec<Option<&str>> = playlists
            .iter()
            .map(|p| self.infer_category(&p.title))
            .collect();

        // One representative playlist per category: most videos, then smallest id.
        // Playlists this plan deletes cannot receive moves.
        let deleting_empty = self.config.auto_delete_empty_playlists;
        let mut representatives: BTreeMap<&str, &PlaylistSnapshot> = BTreeMap::new();
        for (playlist, category) in playlists.iter().zip(&inferred) {
            let Some(category) = category else { continue };
            if deleting_empty && report.is_empty(&playlist.id) {
                continue;
            }
            representatives
                .entry(*category)
                .and_modify(|current| {
                    if prefer(playlist, *current) {
                        *current = playlist;
                    }
                })
                .or_insert(playlist);
        }

        let mut actions = Vec::new();

        for group in &report.duplicate_groups {
            let target = group
                .playlist_ids
                .iter()
                .filter_map(|id| by_id.get(id.as_str()).copied())
                .reduce(|best, p| if prefer(p, best) { p } else { best });
            let Some(target) = target else { continue };

            actions.push(PlannedAction {
                action: Action::MergePlaylists {
                    playlist_ids: group.playlist_ids.clone(),
                    target_playlist_id: target.id.clone(),
                },
                confidence: MERGE_CONFIDENCE,
                rationale: format!(
                    "{} playlists share the title '{}'; merge into '{}'",
                    group.playlist_ids.len(),
                    group.normalized_title,
                    target.title
                ),
            });
        }

        if self.config.auto_delete_empty_playlists {
            for playlist_id in &report.empty_playlists {
                let title = by_id
                    .get(playlist_id.as_str())
                    .map(|p| p.title.as_str())
                    .unwrap_or_default();
                actions.push(PlannedAction {
                    action: Action::DeleteEmptyPlaylist {
                        playlist_id: playlist_id.clone(),
                    },
                    confidence: DELETE_CONFIDENCE,
                    rationale: format!("Playlist '{}' has no videos", title),
                });
            }
        }

        if self.config.suggest_renames {
            for (category, playlist) in &representatives {
                let Some(rule) = self.rules.get(category) else { continue };
                let Some(new_title) = rule.suggested_name.as_ref() else { continue };
                if &playlist.title == new_title {
                    continue;
                }
                actions.push(PlannedAction {
                    action: Action::RenamePlaylist {
                        playlist_id: playlist.id.clone(),
                        current_title: playlist.title.clone(),
                        new_title: new_title.clone(),
                        category: category.to_string(),
                    },
                    confidence: RENAME_CONFIDENCE,
                    rationale: format!(
                        "'{}' holds {} content; rename to '{}'",
                        playlist.title, category, new_title
                    ),
                });
            }
        }

        // Videos per primary category, with the best score seen
        let mut by_category: BTreeMap<&str, (BTreeSet<&str>, f64)> = BTreeMap::new();
        for result in classifications.values().filter(|c| !c.is_uncategorized()) {
            let entry = by_category
                .entry(result.category.as_str())
                .or_insert_with(|| (BTreeSet::new(), 0.0));
            entry.0.insert(result.video_id.as_str());
            entry.1 = entry.1.max(result.score);
        }

        for (category, (video_ids, best_score)) in &by_category {
            if representatives.contains_key(category) {
                continue;
            }
            let title = self
                .rules
                .get(category)
                .map(|r| r.playlist_title().to_string())
                .unwrap_or_else(|| category.to_string());
            actions.push(PlannedAction {
                action: Action::CreateCategoryPlaylist {
                    category: category.to_string(),
                    title: title.clone(),
                    initial_video_ids: video_ids.iter().map(|id| id.to_string()).collect(),
                },
                confidence: *best_score,
                rationale: format!(
                    "{} videos match {} and no playlist covers it; create '{}'",
                    video_ids.len(),
                    category,
                    title
                ),
            });
        }

        let mut seen_moves: HashSet<(&str, &str)> = HashSet::new();
        for (playlist, current) in playlists.iter().zip(&inferred) {
            for video in &playlist.videos {
                let Some(result) = classifications.get(video.video_id.as_str()) else {
                    continue;
                };
                if result.is_uncategorized() || Some(result.category.as_str()) == *current {
                    continue;
                }
                if !seen_moves.insert((video.video_id.as_str(), playlist.id.as_str())) {
                    continue;
                }

                let (to, destination) = match representatives.get(result.category.as_str()) {
                    Some(target) => (
                        MoveTarget::ExistingPlaylist {
                            playlist_id: target.id.clone(),
                        },
                        target.title.clone(),
                    ),
                    None => (
                        MoveTarget::NewCategory {
                            category: result.category.clone(),
                        },
                        format!("new {} playlist", result.category),
                    ),
                };

                actions.push(PlannedAction {
                    action: Action::MoveVideo {
                        video_id: video.video_id.clone(),
                        from_playlist_id: playlist.id.clone(),
                        to,
                        category: result.category.clone(),
                    },
                    confidence: result.score,
                    rationale: format!(
                        "'{}' matches {} (score {:.2}); move from '{}' to {}",
                        video.title, result.category, result.score, playlist.title, destination
                    ),
                });
            }
        }

        actions.sort_by(|a, b| {
            a.action
                .phase()
                .cmp(&b.action.phase())
                .then_with(|| b.confidence.total_cmp(&a.confidence))
                .then_with(|| a.action.sort_key().cmp(&b.action.sort_key()))
        });

        debug!(
            actions = actions.len(),
            videos = classifications.len(),
            "built reorganization plan"
        );

        ReorganizationPlan {
            actions,
            classifications: classifications.into_values().collect(),
        }
    }
}

/// True when `candidate` should win over `current` as a target playlist
fn prefer(candidate: &PlaylistSnapshot, current: &PlaylistSnapshot) -> bool {
    candidate
        .videos
        .len()
        .cmp(&current.videos.len())
        .then_with(|| current.id.cmp(&candidate.id))
        .is_gt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::PlaylistAnalyzer;
    use crate::model::VideoRef;
    use crate::rules::CategoryRule;

    fn rules() -> CategoryRules {
        CategoryRules::new(vec![
            CategoryRule::new("music", &["guitar", "song"]).with_suggested_name("🎵 Music"),
            CategoryRule::new("education", &["tutorial", "education"]),
        ])
        .unwrap()
    }

    fn run(playlists: &[PlaylistSnapshot], rules: &CategoryRules, config: &PlannerConfig) -> ReorganizationPlan {
        let report = PlaylistAnalyzer::new(config).analyze(playlists);
        ReorganizationPlanner::new(rules, config).plan(playlists, &report)
    }

    #[test]
    fn test_deleted_empty_playlist_is_not_a_move_target() {
        let rules = CategoryRules::new(vec![CategoryRule::new("music", &["guitar"])]).unwrap();
        let config = PlannerConfig {
            auto_delete_empty_playlists: true,
            ..PlannerConfig::default()
        };
        let playlists = vec![
            PlaylistSnapshot::new("PL_M", "Music"),
            PlaylistSnapshot::new("PL_W", "Watch later")
                .with_videos(vec![VideoRef::new("v1", "guitar solo")]),
        ];

        let plan = run(&playlists, &rules, &config);
        let kinds: Vec<&str> = plan.actions.iter().map(|a| a.action.kind()).collect();
        assert_eq!(kinds, vec!["delete_empty_playlist", "create_category_playlist", "move_video"]);

        match &plan.actions[2].action {
            Action::MoveVideo { to, .. } => assert_eq!(
                to,
                &MoveTarget::NewCategory {
                    category: "music".to_string()
                }
            ),
            other => panic!("expected a move, got {:?}", other),
        }

        // Without deletion the empty playlist still represents the category
        let plan = run(&playlists, &rules, &PlannerConfig::default());
        assert_eq!(plan.count("create_category_playlist"), 0);
        assert!(plan.actions.iter().any(|a| matches!(
            &a.action,
            Action::MoveVideo { to: MoveTarget::ExistingPlaylist { playlist_id }, .. } if playlist_id == "PL_M"
        )));
    }

    #[test]
    fn test_infer_category_by_title() {
        let rules = rules();
        let config = PlannerConfig::default();
        let planner = ReorganizationPlanner::new(&rules, &config);

        assert_eq!(planner.infer_category("My Music Mix"), Some("music"));
        assert_eq!(planner.infer_category("🎵  MUSIC"), Some("music"));
        assert_eq!(planner.infer_category("Musical theatre"), None);
        assert_eq!(planner.infer_category("Education stuff"), Some("education"));
        assert_eq!(planner.infer_category("Watch later"), None);
        assert_eq!(planner.infer_category(""), None);
    }

    #[test]
    fn test_moves_into_existing_category_playlist() {
        let rules = rules();
        let config = PlannerConfig::default();
        let playlists = vec![
            PlaylistSnapshot::new("music", "Music")
                .with_videos(vec![VideoRef::new("v1", "a song")]),
            PlaylistSnapshot::new("misc", "Watch later").with_videos(vec![
                VideoRef::new("v2", "guitar song"),
                VideoRef::new("v3", "nothing here").with_position(1),
            ]),
        ];

        let plan = run(&playlists, &rules, &config);
        let moves: Vec<&Action> = plan
            .actions
            .iter()
            .map(|a| &a.action)
            .filter(|a| matches!(a, Action::MoveVideo { .. }))
            .collect();

        assert_eq!(
            moves,
            vec![&Action::MoveVideo {
                video_id: "v2".to_string(),
                from_playlist_id: "misc".to_string(),
                to: MoveTarget::ExistingPlaylist {
                    playlist_id: "music".to_string()
                },
                category: "music".to_string(),
            }]
        );
        assert_eq!(plan.count("create_category_playlist"), 0);
        assert_eq!(plan.classifications.len(), 3);
    }

    #[test]
    fn test_creates_missing_category_playlist() {
        let rules = rules();
        let config = PlannerConfig::default();
        let playlists = vec![PlaylistSnapshot::new("misc", "Watch later").with_videos(vec![
            VideoRef::new("v2", "guitar"),
            VideoRef::new("v1", "song and guitar").with_position(1),
        ])];

        let plan = run(&playlists, &rules, &config);
        assert_eq!(
            plan.actions[0].action,
            Action::CreateCategoryPlaylist {
                category: "music".to_string(),
                title: "🎵 Music".to_string(),
                initial_video_ids: vec!["v1".to_string(), "v2".to_string()],
            }
        );
        assert_eq!(plan.actions[0].confidence, 1.0);

        // moves follow, highest confidence first
        assert_eq!(plan.actions.len(), 3);
        assert!(matches!(&plan.actions[1].action, Action::MoveVideo { video_id, .. } if video_id == "v1"));
        assert!(matches!(&plan.actions[2].action, Action::MoveVideo { video_id, to: MoveTarget::NewCategory { .. }, .. } if video_id == "v2"));
    }

    #[test]
    fn test_phase_order() {
        let rules = rules();
        let config = PlannerConfig {
            auto_delete_empty_playlists: true,
            suggest_renames: true,
            ..PlannerConfig::default()
        };
        let playlists = vec![
            PlaylistSnapshot::new("m1", "Music").with_videos(vec![VideoRef::new("v1", "song")]),
            PlaylistSnapshot::new("m2", "music"),
            PlaylistSnapshot::new("e", "Empty one"),
            PlaylistSnapshot::new("w", "Watch later")
                .with_videos(vec![VideoRef::new("v2", "tutorial")]),
        ];

        let plan = run(&playlists, &rules, &config);
        let kinds: Vec<&str> = plan.actions.iter().map(|a| a.action.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                "merge_playlists",
                "delete_empty_playlist",
                "delete_empty_playlist",
                "rename_playlist",
                "create_category_playlist",
                "move_video",
            ]
        );

        assert_eq!(
            plan.actions[0].action,
            Action::MergePlaylists {
                playlist_ids: vec!["m1".to_string(), "m2".to_string()],
                target_playlist_id: "m1".to_string(),
            }
        );
    }

    #[test]
    fn test_no_deletions_by_default() {
        let rules = rules();
        let config = PlannerConfig::default();
        let playlists = vec![
            PlaylistSnapshot::new("a", "One"),
            PlaylistSnapshot::new("b", "Two"),
            PlaylistSnapshot::new("c", "Three"),
        ];

        let plan = run(&playlists, &rules, &config);
        assert_eq!(plan.count("delete_empty_playlist"), 0);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_empty_rules_only_structural_actions() {
        let rules = CategoryRules::empty();
        let config = PlannerConfig::default();
        let playlists = vec![
            PlaylistSnapshot::new("a", "Guitar")
                .with_videos(vec![VideoRef::new("v1", "guitar song tutorial")]),
            PlaylistSnapshot::new("b", "guitar"),
        ];

        let plan = run(&playlists, &rules, &config);
        let kinds: Vec<&str> = plan.actions.iter().map(|a| a.action.kind()).collect();
        assert_eq!(kinds, vec!["merge_playlists"]);
        assert!(plan.classifications.iter().all(|c| c.is_uncategorized()));
    }

    #[test]
    fn test_plan_summary_lists_actions() {
        let rules = rules();
        let config = PlannerConfig::default();
        let playlists = vec![
            PlaylistSnapshot::new("p1", "Music Mix"),
            PlaylistSnapshot::new("p2", "music  mix"),
        ];

        let plan = run(&playlists, &rules, &config);
        let summary = plan.summary();
        assert!(summary.contains("Merges: 1"));
        assert!(summary.contains("[0.95] merge_playlists"));
    }
}
