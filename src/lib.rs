//! teachable-dl - course archiver for Teachable-style schools
//!
//! Crawls an authenticated course site with cookies exported from a
//! browser, rebuilds the course → sections → lessons tree, and writes
//! each lesson to disk as self-contained HTML with its embedded videos
//! re-hosted as local mp4 files.
//!
//! # Modules
//!
//! - `session`: cookie import and HTTP fetching
//! - `parser`: course homepage → typed course tree
//! - `transform`: lesson markup rewriting and video extraction
//! - `materialize`: on-disk directory layout
//! - `pipeline`: per-course orchestration with failure isolation

pub mod error;
pub mod materialize;
pub mod media;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod session;
pub mod transform;
