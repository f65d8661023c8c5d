//! Typed course tree produced by the parser and consumed by the
//! materializer. Titles are already slugified, so they are safe to use
//! directly as directory and file names.

#[derive(Debug, Clone)]
pub struct Course {
    pub title: String,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone)]
pub struct Section {
    pub title: String,
    pub lessons: Vec<Lesson>,
}

#[derive(Debug, Clone)]
pub struct Lesson {
    pub title: String,
    pub rel_link: String,
}

impl Lesson {
    /// Lesson links in the sidebar are host-relative.
    pub fn resolve_url(&self, root_url: &str) -> String {
        format!("{}{}", root_url, self.rel_link)
    }
}

/// One embedded player inside a lesson document, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoEmbed {
    pub index: usize,
    pub extractor_id: String,
}

/// The site root, against which lesson links resolve. Course URLs look
/// like `https://school.example.com/courses/enrolled/12345`.
pub fn course_root_url(course_url: &str) -> &str {
    course_url
        .split_once("/courses")
        .map(|(root, _)| root)
        .unwrap_or(course_url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_url_strips_course_path() {
        assert_eq!(
            course_root_url("https://acme.example.com/courses/enrolled/42"),
            "https://acme.example.com"
        );
    }

    #[test]
    fn root_url_without_courses_segment_is_unchanged() {
        assert_eq!(
            course_root_url("https://acme.example.com"),
            "https://acme.example.com"
        );
    }

    #[test]
    fn lesson_url_joins_root_and_link() {
        let lesson = Lesson {
            title: "intro".into(),
            rel_link: "/courses/42/lectures/7".into(),
        };
        assert_eq!(
            lesson.resolve_url("https://acme.example.com"),
            "https://acme.example.com/courses/42/lectures/7"
        );
    }
}
