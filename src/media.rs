//! Video download via an external extractor. The embedded players are
//! streaming-only; `yt-dlp` knows how to turn a player page into an mp4.

use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{Error, Result};

/// Seam for the media-extraction subsystem: fetch `player_url` and write
/// an mp4 at `dest`, or fail. Tests substitute an in-memory fake.
#[async_trait]
pub trait MediaExtractor {
    async fn download(&self, player_url: &str, dest: &Path) -> Result<()>;
}

/// Shells out to `yt-dlp`. One invocation per video, run to completion
/// before the pipeline moves on.
pub struct YtDlp {
    program: String,
}

impl Default for YtDlp {
    fn default() -> Self {
        YtDlp {
            program: "yt-dlp".to_string(),
        }
    }
}

#[async_trait]
impl MediaExtractor for YtDlp {
    async fn download(&self, player_url: &str, dest: &Path) -> Result<()> {
        let status = Command::new(&self.program)
            .arg("--quiet")
            .args(["-f", "mp4"])
            .arg("-o")
            .arg(dest)
            .arg(player_url)
            .status()
            .await
            .map_err(|e| Error::MediaExtraction {
                url: player_url.to_string(),
                reason: format!("could not run {}: {}", self.program, e),
            })?;

        if !status.success() {
            return Err(Error::MediaExtraction {
                url: player_url.to_string(),
                reason: format!("{} exited with {}", self.program, status),
            });
        }
        Ok(())
    }
}
