//! Lesson document rewriting: streaming-player embeds become plain local
//! `<video>` references, the comments region is stripped, lazy-loaded
//! images are fixed up, and the lecture content region is extracted as
//! the document to persist.
//!
//! `rewrite_lesson` is a pure function over the fetched markup; the
//! async `transform_lesson` wrapper runs the planned video downloads
//! through the media extractor afterwards.

use std::path::Path;
use std::sync::LazyLock;

use ego_tree::NodeId;
use html5ever::tendril::StrTendril;
use html5ever::{LocalName, Namespace, QualName};
use scraper::node::Node;
use scraper::{Html, Selector};
use tracing::warn;

use crate::error::{Error, Result};
use crate::media::MediaExtractor;
use crate::model::VideoEmbed;

/// Keeps videos and images inside the render area of the saved page.
pub const RESPONSIVE_STYLE: &str = "max-width: 75%; margin: 0px auto; display: block;";

const WISTIA_EMBED_BASE: &str = "http://fast.wistia.net/embed/iframe/";

static VIDEO_BLOCK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".lecture-attachment-type-video").unwrap());
static WISTIA_PLAYER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.attachment-wistia-player").unwrap());
static COMMENTS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.comments").unwrap());
static IMAGE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());
static LECTURE_CONTENT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.lecture-content").unwrap());

/// One video download queued up by the rewrite.
#[derive(Debug, Clone)]
pub struct PlannedVideo {
    pub embed: VideoEmbed,
    pub filename: String,
    pub player_url: String,
}

pub fn video_filename(title: &str, index: usize) -> String {
    format!("{}_{}.mp4", title, index)
}

/// Rewrite a fetched lesson page and return the sanitized lecture
/// content plus the videos to download alongside it. Fails only when
/// the lecture content region itself is missing; a broken embed is
/// logged and its download skipped.
pub fn rewrite_lesson(body: &str, title: &str) -> Result<(String, Vec<PlannedVideo>)> {
    let mut doc = Html::parse_document(body);

    // Read pass: locate embeds and their player ids before mutating.
    let embeds: Vec<(NodeId, usize, Option<String>)> = doc
        .select(&VIDEO_BLOCK)
        .enumerate()
        .map(|(index, block)| {
            let extractor_id = block
                .select(&WISTIA_PLAYER)
                .next()
                .and_then(|player| player.value().attr("data-wistia-id"))
                .map(str::to_string);
            (block.id(), index, extractor_id)
        })
        .collect();

    let mut planned = Vec::new();
    for (node_id, index, extractor_id) in embeds {
        let filename = video_filename(title, index);
        if let Some(mut block) = doc.tree.get_mut(node_id) {
            block.insert_before(video_node(&filename));
            block.detach();
        }
        match extractor_id {
            Some(id) => planned.push(PlannedVideo {
                player_url: format!("{}{}", WISTIA_EMBED_BASE, id),
                embed: VideoEmbed {
                    index,
                    extractor_id: id,
                },
                filename,
            }),
            None => warn!(
                "no player id on video {} of lesson {:?}, skipping its download",
                index, title
            ),
        }
    }

    // Comments carry other students' data and break portability.
    if let Some(node_id) = doc.select(&COMMENTS).next().map(|el| el.id()) {
        if let Some(mut comments) = doc.tree.get_mut(node_id) {
            comments.detach();
        }
    }

    fix_images(&mut doc);

    let content = doc
        .select(&LECTURE_CONTENT)
        .next()
        .ok_or(Error::UnexpectedMarkup("lecture content region missing"))?;
    Ok((content.html(), planned))
}

/// Rewrite the lesson and download each planned video into `out_dir`.
/// A failed download is logged and skipped; the sanitized document is
/// still returned so the lesson HTML can be written.
pub async fn transform_lesson(
    body: &str,
    title: &str,
    out_dir: &Path,
    extractor: &dyn MediaExtractor,
) -> Result<String> {
    let (html, videos) = rewrite_lesson(body, title)?;
    for video in &videos {
        let dest = out_dir.join(&video.filename);
        if let Err(e) = extractor.download(&video.player_url, &dest).await {
            warn!("could not download {}: {}", video.filename, e);
        }
    }
    Ok(html)
}

/// Constrain every image to the render area and defeat lazy-loading
/// shims. The style directive is appended to whatever is already there;
/// the first non-canonical attribute whose name contains "src" wins,
/// and a canonical `src` earlier in the attribute list stops the scan
/// (the host markup relies on this order).
fn fix_images(doc: &mut Html) {
    let image_ids: Vec<NodeId> = doc.select(&IMAGE).map(|el| el.id()).collect();
    for node_id in image_ids {
        let Some(mut node) = doc.tree.get_mut(node_id) else {
            continue;
        };
        let Node::Element(element) = node.value() else {
            continue;
        };

        let style = attr_name("style");
        let existing = element
            .attrs
            .get(&style)
            .map(|v| v.to_string())
            .unwrap_or_default();
        let combined = format!("{}{}", existing, RESPONSIVE_STYLE);
        element.attrs.insert(style, StrTendril::from(combined.as_str()));

        let mut promoted = None;
        for (name, value) in element.attrs.iter() {
            let local: &str = &name.local;
            if local == "src" {
                break;
            }
            if local.contains("src") {
                promoted = Some(value.clone());
                break;
            }
        }
        if let Some(value) = promoted {
            element.attrs.insert(attr_name("src"), value);
        }
    }
}

/// Build the replacement `<video>` element by parsing a fragment, which
/// sidesteps constructing html5ever element internals by hand.
fn video_node(filename: &str) -> Node {
    static VIDEO: LazyLock<Selector> = LazyLock::new(|| Selector::parse("video").unwrap());
    let fragment = Html::parse_fragment(&format!(
        r#"<video src="{}" type="video/mp4" autoplay="" preload="auto" controls="" style="{}"></video>"#,
        filename, RESPONSIVE_STYLE
    ));
    let element = fragment
        .select(&VIDEO)
        .next()
        .expect("fragment always contains the video element");
    Node::Element(element.value().clone())
}

// Plain attributes carry the empty namespace.
fn attr_name(local: &str) -> QualName {
    QualName::new(None, Namespace::from(""), LocalName::from(local))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lesson_fixture() -> String {
        std::fs::read_to_string("tests/fixtures/lesson.html").unwrap()
    }

    fn select_all<'a>(doc: &'a Html, selector: &str) -> Vec<scraper::ElementRef<'a>> {
        let sel = Selector::parse(selector).unwrap();
        doc.select(&sel).collect::<Vec<_>>()
    }

    #[test]
    fn embeds_become_local_video_references_in_order() {
        let (html, planned) = rewrite_lesson(&lesson_fixture(), "welcome").unwrap();
        let doc = Html::parse_fragment(&html);

        let videos = select_all(&doc, "video");
        assert_eq!(videos.len(), 2);
        assert_eq!(videos[0].value().attr("src"), Some("welcome_0.mp4"));
        assert_eq!(videos[1].value().attr("src"), Some("welcome_1.mp4"));
        assert_eq!(videos[0].value().attr("style"), Some(RESPONSIVE_STYLE));
        assert_eq!(videos[0].value().attr("controls"), Some(""));

        assert!(select_all(&doc, ".lecture-attachment-type-video").is_empty());

        assert_eq!(planned.len(), 2);
        assert_eq!(planned[0].embed.extractor_id, "abc123");
        assert_eq!(planned[1].embed.extractor_id, "def456");
        assert_eq!(
            planned[0].player_url,
            "http://fast.wistia.net/embed/iframe/abc123"
        );
        assert_eq!(planned[1].filename, "welcome_1.mp4");
    }

    #[test]
    fn comments_region_is_removed() {
        let (html, _) = rewrite_lesson(&lesson_fixture(), "welcome").unwrap();
        let doc = Html::parse_fragment(&html);
        assert!(select_all(&doc, "div.comments").is_empty());
    }

    #[test]
    fn image_style_is_appended_and_lazy_src_promoted() {
        let html = r#"
            <div class="lecture-content">
              <img style="color:red;" data-src="foo.png">
            </div>
        "#;
        let (out, _) = rewrite_lesson(html, "x").unwrap();
        let doc = Html::parse_fragment(&out);
        let img = select_all(&doc, "img")[0];
        assert_eq!(
            img.value().attr("style"),
            Some("color:red;max-width: 75%; margin: 0px auto; display: block;")
        );
        assert_eq!(img.value().attr("src"), Some("foo.png"));
    }

    #[test]
    fn canonical_src_stops_the_attribute_scan() {
        let html = r#"
            <div class="lecture-content">
              <img src="real.png" data-src="lazy.png">
            </div>
        "#;
        let (out, _) = rewrite_lesson(html, "x").unwrap();
        let doc = Html::parse_fragment(&out);
        let img = select_all(&doc, "img")[0];
        assert_eq!(img.value().attr("src"), Some("real.png"));
    }

    #[test]
    fn image_without_style_gets_the_directive() {
        let html = r#"<div class="lecture-content"><img data-src="a.png"></div>"#;
        let (out, _) = rewrite_lesson(html, "x").unwrap();
        let doc = Html::parse_fragment(&out);
        let img = select_all(&doc, "img")[0];
        assert_eq!(img.value().attr("style"), Some(RESPONSIVE_STYLE));
    }

    #[test]
    fn embed_without_player_id_is_replaced_but_not_planned() {
        let html = r#"
            <div class="lecture-content">
              <div class="lecture-attachment-type-video"><p>broken embed</p></div>
            </div>
        "#;
        let (out, planned) = rewrite_lesson(html, "x").unwrap();
        let doc = Html::parse_fragment(&out);
        assert_eq!(select_all(&doc, "video").len(), 1);
        assert!(select_all(&doc, ".lecture-attachment-type-video").is_empty());
        assert!(planned.is_empty());
    }

    #[test]
    fn missing_content_region_fails_the_lesson() {
        let err = rewrite_lesson("<div><p>nothing here</p></div>", "x").unwrap_err();
        assert!(matches!(err, Error::UnexpectedMarkup(_)));
    }
}
