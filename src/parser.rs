//! Course homepage parsing. The markup dialect is fixed but unversioned,
//! so missing sub-structures below the course level are logged and
//! skipped rather than treated as fatal; only a missing sidebar or a
//! total absence of sections fails the whole course.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use slug::slugify;
use tracing::warn;

use crate::error::{Error, Result};
use crate::model::{Course, Lesson, Section};

static SIDEBAR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.course-sidebar").unwrap());
static COURSE_TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h2").unwrap());
static SECTION: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".course-section").unwrap());
static SECTION_TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.section-title").unwrap());
static LESSON_ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a.item").unwrap());
static LESSON_NAME: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.lecture-name").unwrap());

/// Extract the course tree from a fetched homepage. Sections and lessons
/// come back in document order; sections that fail to parse are dropped.
/// An empty section list is returned as-is — the caller decides whether
/// that fails the course.
pub fn parse_course(doc: &Html) -> Result<Course> {
    // The sidebar only renders for a signed-in viewer.
    let sidebar = doc
        .select(&SIDEBAR)
        .next()
        .ok_or(Error::NotAuthenticated)?;
    let title = sidebar
        .select(&COURSE_TITLE)
        .next()
        .map(element_slug)
        .ok_or(Error::UnexpectedMarkup("course title heading missing"))?;

    let section_elements: Vec<ElementRef> = doc.select(&SECTION).collect();
    if section_elements.is_empty() {
        return Err(Error::UnexpectedMarkup("no course sections found"));
    }

    let mut sections = Vec::new();
    for element in section_elements {
        match parse_section(element) {
            Some(section) if !section.lessons.is_empty() => sections.push(section),
            Some(section) => warn!("section {:?} has no parsable lessons, skipping", section.title),
            None => warn!("failed to scrape a section, skipping"),
        }
    }

    Ok(Course { title, sections })
}

fn parse_section(element: ElementRef) -> Option<Section> {
    let title = match element.select(&SECTION_TITLE).next() {
        Some(el) => element_slug(el),
        None => {
            warn!("section title not found");
            return None;
        }
    };

    let mut lessons = Vec::new();
    for anchor in element.select(&LESSON_ANCHOR) {
        match parse_lesson(anchor) {
            Some(lesson) => lessons.push(lesson),
            None => warn!("failed to scrape a lesson in section {:?}, skipping", title),
        }
    }
    Some(Section { title, lessons })
}

fn parse_lesson(anchor: ElementRef) -> Option<Lesson> {
    let title = anchor.select(&LESSON_NAME).next().map(element_slug)?;
    let rel_link = anchor.value().attr("href")?.to_string();
    Some(Lesson { title, rel_link })
}

fn element_slug(element: ElementRef) -> String {
    slugify(element.text().collect::<String>().trim())
}
