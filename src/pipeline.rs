//! Sequential download pipeline with failure isolation at course and
//! lesson level: a failed lesson never takes out its siblings, a failed
//! course never takes out the run.

use std::path::PathBuf;

use scraper::Html;
use tracing::{error, info, warn};

use crate::error::{Error, Result};
use crate::materialize;
use crate::media::MediaExtractor;
use crate::model::{course_root_url, Lesson};
use crate::parser;
use crate::session::Fetch;
use crate::transform;

/// Everything the pipeline needs, constructed once at startup and passed
/// explicitly. No ambient state.
pub struct RunContext {
    pub session: Box<dyn Fetch>,
    pub extractor: Box<dyn MediaExtractor>,
    pub out_root: PathBuf,
}

pub struct RunStats {
    pub courses: usize,
    pub ok: usize,
    pub failed: usize,
}

/// Attempt every requested course. Per-course failures are logged with
/// their cause and counted, never propagated.
pub async fn run(ctx: &RunContext, course_urls: &[String]) -> RunStats {
    let mut stats = RunStats {
        courses: course_urls.len(),
        ok: 0,
        failed: 0,
    };
    for url in course_urls {
        match download_course(ctx, url).await {
            Ok(()) => stats.ok += 1,
            Err(e) => {
                stats.failed += 1;
                error!("failed to download course materials at {}: {}", url, e);
            }
        }
    }
    stats
}

async fn download_course(ctx: &RunContext, course_url: &str) -> Result<()> {
    info!("fetching course {}", course_url);
    let body = ctx.session.fetch(course_url).await?;
    let course = parser::parse_course(&Html::parse_document(&body))?;
    if course.sections.is_empty() {
        return Err(Error::UnexpectedMarkup("no sections could be parsed"));
    }

    let root_url = course_root_url(course_url);
    let course_dir = materialize::course_dir(&ctx.out_root, &course);
    materialize::ensure_dir(&course_dir)?;

    for (i, section) in course.sections.iter().enumerate() {
        let section_dir = materialize::indexed_dir(&course_dir, i, &section.title);
        materialize::ensure_dir(&section_dir)?;

        for (j, lesson) in section.lessons.iter().enumerate() {
            let lesson_dir = materialize::indexed_dir(&section_dir, j, &lesson.title);
            materialize::ensure_dir(&lesson_dir)?;

            if let Err(e) = download_lesson(ctx, lesson, root_url, &lesson_dir).await {
                warn!("failed to download lesson {}: {}", lesson.title, e);
            }
        }
    }
    Ok(())
}

async fn download_lesson(
    ctx: &RunContext,
    lesson: &Lesson,
    root_url: &str,
    lesson_dir: &std::path::Path,
) -> Result<()> {
    let url = lesson.resolve_url(root_url);
    info!("fetching lesson {}", lesson.title);
    let body = ctx.session.fetch(&url).await?;
    let html =
        transform::transform_lesson(&body, &lesson.title, lesson_dir, ctx.extractor.as_ref())
            .await?;
    materialize::write_lesson_html(lesson_dir, &lesson.title, &html)?;
    Ok(())
}
