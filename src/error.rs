use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure taxonomy for the download pipeline. Each variant maps to the
/// smallest unit that can continue without the failed piece: cookie and
/// client errors abort the run, markup and fetch errors abort one course
/// or lesson, media errors skip one video.
#[derive(Debug, Error)]
pub enum Error {
    #[error("could not load cookies from {path}: {reason}")]
    CookieLoad { path: PathBuf, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("not signed into course (via cookies)")]
    NotAuthenticated,

    #[error("unexpected page format: {0} (has the frontend been reworked?)")]
    UnexpectedMarkup(&'static str),

    #[error("request for {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("fetching {url} returned {status}")]
    Fetch { url: String, status: StatusCode },

    #[error("media extraction failed for {url}: {reason}")]
    MediaExtraction { url: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
