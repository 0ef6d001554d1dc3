//! Post body rendering: markdown to HTML, then an allowlist sanitizer.
//!
//! Raw HTML written inside markdown passes through the renderer untouched,
//! so the sanitizer is what keeps scripts and event handlers out of pages.

use std::sync::LazyLock;

use ammonia::Builder;
use pulldown_cmark::{html, Options, Parser};

/// User-generated-content allowlist plus embedded media players.
static SANITIZER: LazyLock<Builder<'static>> = LazyLock::new(|| {
    let mut builder = Builder::default();
    builder
        .add_tags(&["video", "audio", "source"])
        .add_tag_attributes("video", &["controls", "src"])
        .add_tag_attributes("audio", &["controls", "src"])
        .add_tag_attributes("source", &["src", "type"])
        .link_rel(Some("nofollow noopener noreferrer"));
    builder
});

fn markdown_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH
}

pub fn format_post_body(raw: &str) -> String {
    let mut unsafe_html = String::with_capacity(raw.len() * 3 / 2);
    html::push_html(&mut unsafe_html, Parser::new_ext(raw, markdown_options()));

    SANITIZER.clean(&unsafe_html).to_string().trim_end().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_blank_bodies_render_nothing() {
        assert_eq!(format_post_body(""), "");
        assert_eq!(format_post_body(" \n\n"), "");
    }

    #[test]
    fn single_line_is_one_paragraph() {
        assert_eq!(format_post_body("hello world"), "<p>hello world</p>");
    }

    #[test]
    fn markdown_renders_emphasis_links_and_lists() {
        let html = format_post_body(
            "**bold** and [link](http://example.com)\n\n- item one\n- item two",
        );
        assert!(html.contains("<strong>bold</strong>"));
        assert!(html.contains("href=\"http://example.com\""));
        assert!(html.contains("rel=\"nofollow noopener noreferrer\""));
        assert!(html.contains("<li>item one</li>"));
        assert!(html.contains("<li>item two</li>"));
    }

    #[test]
    fn blank_lines_split_paragraphs() {
        let html = format_post_body("one\r\n\r\n\nthree");
        assert_eq!(html, "<p>one</p>\n<p>three</p>");
    }

    #[test]
    fn script_is_stripped_while_markdown_survives() {
        let html = format_post_body("**bold** <script>alert('x')</script> & done");
        assert!(html.contains("<strong>bold</strong>"));
        assert!(!html.contains("<script"));
        assert!(!html.contains("alert"));
        assert!(html.contains("&amp; done"));
    }

    #[test]
    fn event_handlers_and_javascript_urls_are_removed() {
        let html = format_post_body(
            "<img src=\"x.png\" onerror=\"alert(1)\">\n\n[click](javascript:alert(2))",
        );
        assert!(!html.contains("onerror"));
        assert!(!html.contains("javascript:"));
    }

    #[test]
    fn quote_lines_become_blockquotes() {
        let html = format_post_body("> you said <this>\n\nI disagree");
        assert!(html.starts_with("<blockquote>"));
        assert!(!html.contains("<this>"));
        assert!(html.ends_with("<p>I disagree</p>"));
    }

    #[test]
    fn media_players_keep_their_controls() {
        let html = format_post_body(
            "<video controls src=\"clip.webm\" onplay=\"steal()\"><source src=\"clip.mp4\" type=\"video/mp4\"></video>",
        );
        assert!(html.contains("<video"));
        assert!(html.contains("controls"));
        assert!(html.contains("<source src=\"clip.mp4\" type=\"video/mp4\">"));
        assert!(!html.contains("onplay"));
    }
}
