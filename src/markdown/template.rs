//! Page templates.
//!
//! # Responsibilities
//! - Ship the built-in templates keyed by selector name
//! - Resolve a selector to a template string (built-in, file, identity)
//! - Substitute the title and body markers
//!
//! # Design Decisions
//! - Resolution never fails; misses fall back to the identity template
//! - Files are re-read on every resolution, nothing is cached

use std::path::{Component, Path};

/// Marker replaced with the page title.
pub const TITLE_MARKER: &str = "{{.Title}}";

/// Marker replaced with the rendered body.
pub const BODY_MARKER: &str = "{{.Body}}";

/// Template emitting the rendered body with no wrapping.
pub const IDENTITY_TEMPLATE: &str = "{{.Body}}";

/// Default selector when none is configured.
pub const DEFAULT_SELECTOR: &str = "simple";

const SIMPLE: &str = r#"<!DOCTYPE html>
<html>
	<head>
		<title>{{.Title}}</title>
		<meta charset="utf-8">
	</head>
	<body>
		{{.Body}}
	</body>
</html>
"#;

const GITHUB: &str = r#"<!DOCTYPE html>
<html>
	<head>
		<title>{{.Title}}</title>
		<meta charset="utf-8">
		<meta name="viewport" content="width=device-width, initial-scale=1">
		<style>
			body { margin: 0 auto; max-width: 46em; padding: 2em 1em; line-height: 1.6;
				font-family: -apple-system, "Segoe UI", Helvetica, Arial, sans-serif; color: #24292f; }
			pre { padding: 1em; overflow: auto; background: #f6f8fa; border-radius: 6px; }
			code { font-family: ui-monospace, SFMono-Regular, Menlo, monospace; }
			table { border-collapse: collapse; }
			th, td { border: 1px solid #d0d7de; padding: 6px 13px; }
			a.anchor { float: left; margin-left: -1em; }
		</style>
	</head>
	<body>
		<article>
		{{.Body}}
		</article>
	</body>
</html>
"#;

/// Look up a built-in template by name.
pub fn builtin(name: &str) -> Option<&'static str> {
    match name {
        "simple" => Some(SIMPLE),
        "github" => Some(GITHUB),
        _ => None,
    }
}

/// Resolve `selector` to a template string.
///
/// Built-ins win; otherwise `selector` is read as a path under `base_dir`.
/// A selector leaving `base_dir` (absolute, or with `..`), an unreadable
/// file or an empty file yields [`IDENTITY_TEMPLATE`].
pub async fn resolve(selector: &str, base_dir: &Path) -> String {
    if let Some(tmpl) = builtin(selector) {
        return tmpl.to_string();
    }

    let relative = Path::new(selector);
    let contained = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if !contained {
        tracing::warn!(selector = %selector, "Template path escapes the working directory, using identity template");
        return IDENTITY_TEMPLATE.to_string();
    }

    let path = base_dir.join(relative);
    match tokio::fs::read_to_string(&path).await {
        Ok(tmpl) if !tmpl.is_empty() => tmpl,
        Ok(_) => {
            tracing::debug!(path = %path.display(), "Template file is empty, using identity template");
            IDENTITY_TEMPLATE.to_string()
        }
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Template not found, using identity template");
            IDENTITY_TEMPLATE.to_string()
        }
    }
}

/// Substitute the first title marker, then the first body marker.
///
/// Missing markers are left alone.
pub fn fill(template: &str, title: &str, body: &str) -> String {
    let mut html = String::with_capacity(template.len() + title.len() + body.len());
    match template.split_once(TITLE_MARKER) {
        Some((head, tail)) => {
            html.push_str(head);
            html.push_str(title);
            html.push_str(tail);
        }
        None => html.push_str(template),
    }

    match html.find(BODY_MARKER) {
        Some(at) => {
            html.replace_range(at..at + BODY_MARKER.len(), body);
            html
        }
        None => html,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_builtin_simple_has_both_regions() {
        let tmpl = resolve("simple", Path::new(".")).await;
        assert!(tmpl.contains("<title>{{.Title}}</title>"));
        assert!(tmpl.contains(BODY_MARKER));
    }

    #[tokio::test]
    async fn test_unknown_selector_falls_back_to_identity() {
        let dir = tempfile::tempdir().unwrap();
        let tmpl = resolve("nonexistent-xyz", dir.path()).await;
        assert_eq!(tmpl, IDENTITY_TEMPLATE);
    }

    #[tokio::test]
    async fn test_file_template_and_idempotence() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("page.html"), "<h1>{{.Title}}</h1>{{.Body}}").unwrap();

        let first = resolve("page.html", dir.path()).await;
        let second = resolve("page.html", dir.path()).await;
        assert_eq!(first, "<h1>{{.Title}}</h1>{{.Body}}");
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_empty_file_falls_back_to_identity() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("empty.html"), "").unwrap();
        assert_eq!(resolve("empty.html", dir.path()).await, IDENTITY_TEMPLATE);
    }

    #[tokio::test]
    async fn test_selector_cannot_leave_base_dir() {
        let outer = tempfile::tempdir().unwrap();
        let secret = outer.path().join("secret.html");
        std::fs::write(&secret, "secret {{.Body}}").unwrap();
        let base = outer.path().join("site");
        std::fs::create_dir(&base).unwrap();
        std::fs::write(base.join("ok.html"), "ok {{.Body}}").unwrap();

        let absolute = secret.to_str().unwrap();
        assert_eq!(resolve(absolute, &base).await, IDENTITY_TEMPLATE);
        assert_eq!(resolve("../secret.html", &base).await, IDENTITY_TEMPLATE);
        assert_eq!(resolve("./ok.html", &base).await, "ok {{.Body}}");
    }

    #[tokio::test]
    async fn test_file_is_reread() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, "v1 {{.Body}}").unwrap();
        assert_eq!(resolve("page.html", dir.path()).await, "v1 {{.Body}}");
        std::fs::write(&path, "v2 {{.Body}}").unwrap();
        assert_eq!(resolve("page.html", dir.path()).await, "v2 {{.Body}}");
    }

    #[test]
    fn test_fill_replaces_first_occurrence_only() {
        let html = fill("{{.Title}}|{{.Title}}|{{.Body}}|{{.Body}}", "T", "B");
        assert_eq!(html, "T|{{.Title}}|B|{{.Body}}");
    }

    #[test]
    fn test_fill_missing_markers() {
        assert_eq!(fill("static", "T", "B"), "static");
        assert_eq!(fill(IDENTITY_TEMPLATE, "T", "<p>x</p>"), "<p>x</p>");
    }

    #[test]
    fn test_substitution_is_sequential() {
        // Title first, then the first body marker in the result.
        let html = fill("<title>{{.Title}}</title>{{.Body}}", "{{.Body}}", "B");
        assert_eq!(html, "<title>B</title>{{.Body}}");

        let html = fill("{{.Title}} {{.Body}}", "T", "{{.Title}}");
        assert_eq!(html, "T {{.Title}}");
    }
}
