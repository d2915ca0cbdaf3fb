/// Playlist Organizer
///
/// Analyzes exported YouTube playlist snapshots, classifies videos into
/// keyword categories and proposes an ordered, reviewable reorganization
/// plan. Applying a plan is a separate step that goes through the
/// `PlaylistService` seam.

pub mod analyzer;
pub mod classifier;
pub mod config;
pub mod error;
pub mod executor;
pub mod model;
pub mod organizer;
pub mod planner;
pub mod rules;
pub mod store;
pub mod youtube;

// Re-export main types for easy access
pub use crate::analyzer::{AnalysisReport, DuplicateGroup, PlaylistAnalyzer};
pub use crate::classifier::{CategoryMatch, ClassificationResult, Classifier};
pub use crate::config::{Config, ConfigBuilder, PlannerConfig};
pub use crate::error::{OrganizerError, Result, YouTubeError};
pub use crate::executor::{ExecutionOptions, ExecutionReport, PlanExecutor, PlaylistService};
pub use crate::model::{PlaylistSnapshot, PrivacyStatus, SnapshotExport, VideoRef};
pub use crate::organizer::Organizer;
pub use crate::planner::{Action, MoveTarget, PlanDocument, PlannedAction, ReorganizationPlan, ReorganizationPlanner};
pub use crate::rules::{CategoryRule, CategoryRules, UNCATEGORIZED};
pub use crate::youtube::YouTubeClient;
