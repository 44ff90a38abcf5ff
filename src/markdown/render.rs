//! Markdown to HTML rendering.
//!
//! # Responsibilities
//! - Define the `Renderer` seam the rewrite pipeline depends on
//! - Provide the default comrak-based renderer
//!
//! # Design Decisions
//! - GFM extensions on: tables, strikethrough, autolinks, task lists, footnotes
//! - Headings get automatic ids
//! - Code fences are highlighted by syntect with CSS classes, never inline styles
//! - Raw HTML passes through unsanitized

use comrak::plugins::syntect::{SyntectAdapter, SyntectAdapterBuilder};
use comrak::{markdown_to_html_with_plugins, Options, Plugins};
use thiserror::Error;

/// Error reported by a renderer.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The captured body was not valid UTF-8.
    #[error("markdown body is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// The renderer refused the input.
    #[error("renderer rejected input: {0}")]
    Rejected(String),
}

/// Converts markdown text into an HTML fragment.
pub trait Renderer: Send + Sync {
    fn render(&self, markdown: &str) -> Result<String, RenderError>;
}

/// Default renderer backed by comrak and syntect.
pub struct ComrakRenderer {
    highlighter: SyntectAdapter,
}

impl ComrakRenderer {
    /// Build the renderer. Loading the syntax set is not free; share one
    /// instance behind an `Arc`.
    pub fn new() -> Self {
        Self {
            highlighter: SyntectAdapterBuilder::new().css().build(),
        }
    }
}

impl Default for ComrakRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ComrakRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComrakRenderer").finish_non_exhaustive()
    }
}

impl Renderer for ComrakRenderer {
    fn render(&self, markdown: &str) -> Result<String, RenderError> {
        let mut options = Options::default();
        options.extension.strikethrough = true;
        options.extension.table = true;
        options.extension.autolink = true;
        options.extension.tasklist = true;
        options.extension.footnotes = true;
        options.extension.header_ids = Some(String::new());
        options.render.unsafe_ = true;

        let mut plugins = Plugins::default();
        plugins.render.codefence_syntax_highlighter = Some(&self.highlighter);

        Ok(markdown_to_html_with_plugins(markdown, &options, &plugins))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(md: &str) -> String {
        ComrakRenderer::new().render(md).unwrap()
    }

    #[test]
    fn test_heading_gets_anchor_id() {
        let html = render("# Hello World\n");
        assert!(html.contains("id=\"hello-world\""));
        assert!(html.contains("Hello World"));
    }

    #[test]
    fn test_gfm_extensions() {
        let html = render("| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~\n\nhttps://example.com\n");
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>gone</del>"));
        assert!(html.contains("<a href=\"https://example.com\">"));
    }

    #[test]
    fn test_task_list_and_footnote() {
        let html = render("- [x] done\n- [ ] todo\n\nNote[^1].\n\n[^1]: The footnote.\n");
        assert!(html.contains("type=\"checkbox\""));
        assert!(html.contains("checked"));
        assert!(html.contains("The footnote."));
        assert!(html.contains("footnote"));
    }

    #[test]
    fn test_code_block_uses_css_classes() {
        let html = render("```rust\nfn main() {}\n```\n");
        assert!(html.contains("<pre"));
        assert!(html.contains("class=\""));
        assert!(!html.contains("style=\""));
    }

    #[test]
    fn test_raw_html_passes_through() {
        let html = render("<div class=\"note\">raw</div>\n");
        assert!(html.contains("<div class=\"note\">raw</div>"));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(render(""), "");
    }
}
