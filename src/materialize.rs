//! On-disk layout: `root/{course}/{i}_{section}/{j}_{lesson}/` with the
//! sanitized lesson HTML (and its videos) inside each lesson directory.
//! Directory creation is idempotent so interrupted runs can be rerun.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::model::Course;

pub fn course_dir(root: &Path, course: &Course) -> PathBuf {
    root.join(&course.title)
}

/// Child directories carry a zero-based index prefix so tree order
/// survives on disk.
pub fn indexed_dir(parent: &Path, index: usize, slug: &str) -> PathBuf {
    parent.join(format!("{}_{}", index, slug))
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)?;
    Ok(())
}

pub fn write_lesson_html(lesson_dir: &Path, title: &str, html: &str) -> Result<PathBuf> {
    let path = lesson_dir.join(format!("{}.html", title));
    fs::write(&path, html)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Lesson, Section};

    fn course() -> Course {
        let lesson = |t: &str| Lesson {
            title: t.to_string(),
            rel_link: format!("/courses/1/lectures/{}", t),
        };
        Course {
            title: "woodworking".into(),
            sections: vec![
                Section {
                    title: "basics".into(),
                    lessons: vec![lesson("welcome"), lesson("tools")],
                },
                Section {
                    title: "joinery".into(),
                    lessons: vec![lesson("dovetails")],
                },
            ],
        }
    }

    #[test]
    fn layout_matches_tree_order() {
        let tmp = tempfile::tempdir().unwrap();
        let course = course();
        let root = course_dir(tmp.path(), &course);

        for (i, section) in course.sections.iter().enumerate() {
            let section_dir = indexed_dir(&root, i, &section.title);
            for (j, lesson) in section.lessons.iter().enumerate() {
                let lesson_dir = indexed_dir(&section_dir, j, &lesson.title);
                ensure_dir(&lesson_dir).unwrap();
                write_lesson_html(&lesson_dir, &lesson.title, "<p>hi</p>").unwrap();
            }
        }

        assert!(tmp.path().join("woodworking/0_basics/0_welcome/welcome.html").is_file());
        assert!(tmp.path().join("woodworking/0_basics/1_tools/tools.html").is_file());
        assert!(tmp.path().join("woodworking/1_joinery/0_dovetails/dovetails.html").is_file());

        let sections: Vec<_> = fs::read_dir(&root).unwrap().collect();
        assert_eq!(sections.len(), 2);
    }

    #[test]
    fn existing_directories_are_reused() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = indexed_dir(tmp.path(), 0, "repeat");
        ensure_dir(&dir).unwrap();
        ensure_dir(&dir).unwrap();
        assert!(dir.is_dir());
    }
}
