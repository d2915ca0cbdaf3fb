use tracing::info;

use crate::analyzer::{AnalysisReport, PlaylistAnalyzer};
use crate::classifier::{ClassificationResult, Classifier};
use crate::config::{Config, PlannerConfig};
use crate::error::{OrganizerError, Result};
use crate::model::{validate_snapshots, PlaylistSnapshot, VideoRef};
use crate::planner::{ReorganizationPlan, ReorganizationPlanner};
use crate::rules::CategoryRules;

/// Entry point tying analysis, classification and planning together
#[derive(Debug, Clone)]
pub struct Organizer {
    rules: CategoryRules,
    config: PlannerConfig,
}

impl Organizer {
    pub fn new(rules: CategoryRules, config: PlannerConfig) -> Self {
        Self { rules, config }
    }

    /// Build from a full configuration, loading the rules file when one is set
    pub async fn from_config(config: &Config) -> Result<Self> {
        let rules = match config.rules.rules_file {
            Some(ref path) if path.exists() => CategoryRules::from_file(path).await?,
            Some(ref path) => {
                return Err(OrganizerError::InvalidConfig(format!(
                    "Rules file not found: {}",
                    path.display()
                )))
            }
            None => CategoryRules::default(),
        };

        let stats = rules.stats();
        info!(
            "📚 Category rules: {} categories, {} keywords",
            stats.total_categories, stats.total_keywords
        );

        Ok(Self::new(rules, config.planner.clone()))
    }

    pub fn rules(&self) -> &CategoryRules {
        &self.rules
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn classify(&self, video: &VideoRef) -> ClassificationResult {
        Classifier::new(&self.rules, self.config.classification_min_score).classify(video)
    }

    /// Validate the snapshots and produce the analysis report
    pub fn analyze(&self, playlists: &[PlaylistSnapshot]) -> Result<AnalysisReport> {
        self.config.validate()?;
        validate_snapshots(playlists)?;

        let report = PlaylistAnalyzer::new(&self.config).analyze(playlists);
        info!(
            "🔍 Analyzed {} playlists: {} empty, {} oversized, {} duplicate groups",
            report.total_playlists,
            report.empty_playlists.len(),
            report.oversized_playlists.len(),
            report.duplicate_groups.len()
        );
        Ok(report)
    }

    /// Analyze, then derive the reorganization plan from the report
    pub fn plan(&self, playlists: &[PlaylistSnapshot]) -> Result<(AnalysisReport, ReorganizationPlan)> {
        let report = self.analyze(playlists)?;
        let plan = ReorganizationPlanner::new(&self.rules, &self.config).plan(playlists, &report);
        info!("📋 Planned {} actions", plan.actions.len());
        Ok((report, plan))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBuilder;

    fn organizer() -> Organizer {
        Organizer::new(CategoryRules::default(), PlannerConfig::default())
    }

    #[test]
    fn test_plan_rejects_missing_ids() {
        let playlists = vec![PlaylistSnapshot::new("", "Mix")];
        let err = organizer().plan(&playlists).unwrap_err();
        assert!(matches!(err, OrganizerError::MissingField { field: "id", .. }));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = PlannerConfig {
            max_videos_per_playlist: 0,
            ..PlannerConfig::default()
        };
        let organizer = Organizer::new(CategoryRules::default(), config);
        assert!(matches!(
            organizer.analyze(&[]),
            Err(OrganizerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_empty_input_gives_empty_plan() {
        let (report, plan) = organizer().plan(&[]).unwrap();
        assert_eq!(report.total_playlists, 0);
        assert!(plan.is_empty());
    }

    #[tokio::test]
    async fn test_missing_rules_file_is_rejected_consistently() {
        let config = ConfigBuilder::new()
            .with_rules_file("does/not/exist.toml".into())
            .build();

        assert!(config.validate().is_err());
        assert!(matches!(
            Organizer::from_config(&config).await,
            Err(OrganizerError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn test_from_config_uses_builtin_rules_by_default() {
        let organizer = Organizer::from_config(&Config::default()).await.unwrap();
        assert_eq!(organizer.rules(), &CategoryRules::default());
    }

    #[tokio::test]
    async fn test_from_config_reads_rules_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.toml");
        tokio::fs::write(
            &path,
            "[[category]]\nname = \"Cooking\"\nkeywords = [\"recipe\"]\n",
        )
        .await
        .unwrap();

        let config = ConfigBuilder::new().with_rules_file(path).build();
        let organizer = Organizer::from_config(&config).await.unwrap();
        assert_eq!(organizer.rules().len(), 1);

        let result = organizer.classify(&VideoRef::new("v1", "Easy recipe"));
        assert_eq!(result.category, "Cooking");
    }
}
