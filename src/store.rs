//! JSON persistence for snapshots, reports and plans

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

use crate::analyzer::AnalysisReport;
use crate::model::{validate_snapshots, SnapshotExport};
use crate::planner::PlanDocument;

/// Write any serializable value as pretty JSON, creating parent directories
pub async fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    let json_content = serde_json::to_string_pretty(value)?;
    fs::write(path, json_content)
        .await
        .with_context(|| format!("write {}", path.display()))?;

    debug!("💾 Wrote {}", path.display());
    Ok(())
}

/// Read a JSON file into any deserializable value
pub async fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("read {}", path.display()))?;
    let value = serde_json::from_str(&content)
        .with_context(|| format!("parse {}", path.display()))?;
    Ok(value)
}

/// Load a snapshot backup and check it is fit for planning
pub async fn load_snapshot(path: &Path) -> Result<SnapshotExport> {
    let export: SnapshotExport = load_json(path).await?;
    validate_snapshots(&export.playlists)
        .with_context(|| format!("invalid snapshot {}", path.display()))?;

    info!(
        "✅ Loaded {} playlists ({} videos) from {}",
        export.playlists.len(),
        export.total_videos(),
        path.display()
    );
    Ok(export)
}

pub async fn save_snapshot(path: &Path, export: &SnapshotExport) -> Result<()> {
    save_json(path, export).await?;
    info!(
        "✅ Playlist data exported to {} ({} playlists)",
        path.display(),
        export.total_playlists
    );
    Ok(())
}

pub async fn load_report(path: &Path) -> Result<AnalysisReport> {
    let report: AnalysisReport = load_json(path).await?;
    debug!("Loaded report for {} playlists", report.total_playlists);
    Ok(report)
}

pub async fn load_plan(path: &Path) -> Result<PlanDocument> {
    let document: PlanDocument = load_json(path).await?;
    info!(
        "📋 Loaded plan with {} actions from {}",
        document.plan.actions.len(),
        path.display()
    );
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PlaylistSnapshot, VideoRef};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_snapshot_roundtrip_creates_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/backup.json");

        let export = SnapshotExport::new(vec![PlaylistSnapshot::new("PL1", "Mix")
            .with_videos(vec![VideoRef::new("v1", "song").with_playlist_item_id("item1")])]);
        save_snapshot(&path, &export).await.unwrap();

        let loaded = load_snapshot(&path).await.unwrap();
        assert_eq!(loaded.playlists, export.playlists);
        assert_eq!(loaded.total_playlists, 1);
    }

    #[tokio::test]
    async fn test_load_snapshot_rejects_malformed() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.json");
        fs::write(
            &path,
            r#"{"export_date":"2025-01-01T00:00:00Z","total_playlists":1,
               "playlists":[{"id":"PL1","videos":[{"video_id":""}]}]}"#,
        )
        .await
        .unwrap();

        let err = load_snapshot(&path).await.unwrap_err();
        assert!(format!("{:#}", err).contains("PL1[0]"));
    }

    #[tokio::test]
    async fn test_report_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("report.json");

        let playlists = vec![PlaylistSnapshot::new("PL1", "Mix"), PlaylistSnapshot::new("PL2", "mix")];
        let report = crate::analyzer::PlaylistAnalyzer::new(&Default::default()).analyze(&playlists);
        save_json(&path, &report).await.unwrap();

        assert_eq!(load_report(&path).await.unwrap(), report);
    }

    #[tokio::test]
    async fn test_missing_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        assert!(load_snapshot(&temp_dir.path().join("nope.json")).await.is_err());
    }
}
