use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use playlist_organizer::executor::{ExecutionOptions, PlanExecutor};
use playlist_organizer::planner::{PlanDocument, PlannedAction};
use playlist_organizer::{store, Config, Organizer, YouTubeClient};

#[derive(Parser)]
#[command(name = "playlist-organizer")]
#[command(version, about = "Analyze and reorganize YouTube playlists")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (otherwise the standard locations are searched)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the playlists of the authenticated account
    List,
    /// Export every playlist with its videos to a snapshot backup
    Export {
        /// Snapshot file to write
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Report empty, oversized and duplicate playlists in a snapshot
    Analyze {
        /// Snapshot backup to analyze
        #[arg(short, long)]
        snapshot: Option<PathBuf>,
        /// Report file to write
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Build a reorganization plan from a snapshot
    Plan {
        /// Snapshot backup to plan from
        #[arg(short, long)]
        snapshot: Option<PathBuf>,
        /// Category rules TOML file
        #[arg(short, long)]
        rules: Option<PathBuf>,
        /// Plan file to write
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Propose deleting empty playlists
        #[arg(long)]
        auto_delete_empty: bool,
        /// Flag playlists with more videos than this
        #[arg(long)]
        max_videos: Option<usize>,
        /// Minimum score for a video's top category
        #[arg(long)]
        min_score: Option<f64>,
        /// Propose renaming category playlists to their suggested names
        #[arg(long)]
        suggest_renames: bool,
    },
    /// Apply a reviewed plan to the account
    Apply {
        /// Plan file produced by `plan`
        #[arg(short, long)]
        plan: Option<PathBuf>,
        /// Check every action against the account without changing anything
        #[arg(long)]
        dry_run: bool,
        /// Do not ask before destructive actions
        #[arg(short, long)]
        yes: bool,
    },
    /// Show the active category rules
    Rules {
        /// Write the rules to this TOML file as a starting point
        #[arg(long)]
        init: Option<PathBuf>,
    },
    /// Write a default configuration file
    InitConfig {
        #[arg(default_value = "playlist-organizer.toml")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = match cli.config {
        Some(ref path) => Config::from_file(path)
            .map(Config::with_env_overrides)
            .with_context(|| format!("load config {}", path.display())),
        None => Config::load(),
    };

    let level = match (&loaded, cli.verbose) {
        (_, true) => "debug".to_string(),
        (Ok(config), false) => config.output.log_level.clone(),
        (Err(_), false) => Config::from_env().output.log_level,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("playlist_organizer={},warn", level)));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = match loaded {
        Ok(config) => config,
        Err(e) if cli.config.is_some() => return Err(e),
        Err(e) => {
            debug!("Using default configuration: {}", e);
            Config::from_env()
        }
    };
    debug!("{}", config.summary());

    match cli.command {
        Commands::List => {
            let client = YouTubeClient::new(config.youtube.clone())?;
            let playlists = client.list_my_playlists().await?;

            if playlists.is_empty() {
                info!("📭 No playlists found");
                return Ok(());
            }

            info!("📚 Found {} playlists:", playlists.len());
            for playlist in playlists {
                info!(
                    "  {} - {} videos, {} ({})",
                    playlist.title,
                    playlist.video_count.unwrap_or(0),
                    playlist.privacy_status.as_str(),
                    playlist.id
                );
            }
        }

        Commands::Export { output } => {
            let output = output.unwrap_or_else(|| config.output.snapshot_file.clone());
            let client = YouTubeClient::new(config.youtube.clone())?;

            info!("🚀 Exporting playlists...");
            let export = client.fetch_snapshot().await?;
            store::save_snapshot(&output, &export).await?;
            info!("📊 {} playlists, {} videos", export.total_playlists, export.total_videos());
        }

        Commands::Analyze { snapshot, output } => {
            let snapshot = snapshot.unwrap_or_else(|| config.output.snapshot_file.clone());
            let output = output.unwrap_or_else(|| config.output.report_file.clone());

            let export = store::load_snapshot(&snapshot).await?;
            let organizer = Organizer::from_config(&config).await?;
            let report = organizer.analyze(&export.playlists)?;

            store::save_json(&output, &report).await?;
            println!("{}", report.summary());
            info!("✅ Analysis report saved to {}", output.display());
        }

        Commands::Plan {
            snapshot,
            rules,
            output,
            auto_delete_empty,
            max_videos,
            min_score,
            suggest_renames,
        } => {
            if rules.is_some() {
                config.rules.rules_file = rules;
            }
            if auto_delete_empty {
                config.planner.auto_delete_empty_playlists = true;
            }
            if let Some(max_videos) = max_videos {
                config.planner.max_videos_per_playlist = max_videos;
            }
            if let Some(min_score) = min_score {
                config.planner.classification_min_score = min_score;
            }
            if suggest_renames {
                config.planner.suggest_renames = true;
            }
            config.validate()?;

            let snapshot = snapshot.unwrap_or_else(|| config.output.snapshot_file.clone());
            let output = output.unwrap_or_else(|| config.output.plan_file.clone());

            let export = store::load_snapshot(&snapshot).await?;
            let organizer = Organizer::from_config(&config).await?;
            let (report, plan) = organizer.plan(&export.playlists)?;

            println!("{}", report.summary());
            println!("{}", plan.summary());

            let document = PlanDocument::new(report, plan);
            store::save_json(&output, &document).await?;
            info!("✅ Plan saved to {}; review it, then run `apply`", output.display());
        }

        Commands::Apply { plan, dry_run, yes } => {
            let plan_path = plan.unwrap_or_else(|| config.output.plan_file.clone());
            let document = store::load_plan(&plan_path).await?;

            if document.plan.is_empty() {
                info!("📭 Plan has no actions");
                return Ok(());
            }

            let client = YouTubeClient::new(config.youtube.clone())?;
            let options = ExecutionOptions {
                dry_run,
                new_playlist_privacy: config.youtube.new_playlist_privacy,
            };

            let mut executor = PlanExecutor::new(&client, options);
            let report = executor
                .execute(&document.plan, |planned| {
                    yes || dry_run || !planned.action.is_destructive() || confirm(planned)
                })
                .await?;

            println!("{}", report.summary());
            if report.failed > 0 {
                warn!("⚠️ {} actions failed; re-running the plan skips what was applied", report.failed);
            }
        }

        Commands::Rules { init } => {
            let organizer = Organizer::from_config(&config).await?;
            let rules = organizer.rules();

            match init {
                Some(path) => {
                    tokio::fs::write(&path, rules.to_toml_string()?).await?;
                    info!("💾 Wrote {} category rules to {}", rules.len(), path.display());
                }
                None => {
                    println!("{}", rules.stats().summary());
                    for rule in rules {
                        println!("{} -> {}", rule.name, rule.playlist_title());
                        println!("    {}", rule.keywords.join(", "));
                    }
                }
            }
        }

        Commands::InitConfig { path } => {
            if path.exists() {
                anyhow::bail!("{} already exists", path.display());
            }
            Config::default().save(&path)?;
        }
    }

    Ok(())
}

/// Ask on the terminal before a destructive action
fn confirm(planned: &PlannedAction) -> bool {
    print!("{} [{}] apply? [y/N] ", planned.rationale, planned.action.kind());
    if std::io::stdout().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    match std::io::stdin().read_line(&mut answer) {
        Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}
