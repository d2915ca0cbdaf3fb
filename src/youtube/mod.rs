/// YouTube Data API v3 access
///
/// Reads playlists and their items into snapshots and performs the remote
/// edits a reviewed plan asks for.

pub mod client;
pub mod service;
pub mod types;

pub use client::{YouTubeClient, YouTubeResult};
pub use types::parse_iso8601_duration;
