//! Dev-only hot reload: swap the live document body for the body of a freshly
//! rendered page, then re-bind and announce completion.
//!
//! Head content (scripts, styles) is never touched.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static BODY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<body\b[^>]*>(.*)</body\s*>").expect("body pattern is valid")
});
static HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<head\b[^>]*>(.*)</head\s*>").expect("head pattern is valid")
});

#[derive(Debug, Error)]
pub enum HmrError {
    #[error("Reloaded document has no <body> element")]
    MissingBody,
}

/// The live document the bridge reloads into.
pub trait DocumentHost: Send {
    fn head(&self) -> &str;
    fn body(&self) -> &str;
    fn replace_body(&mut self, markup: &str);
    /// Re-scan the (new) body and set up reactive bindings again.
    fn reinitialize_bindings(&mut self);
    fn dispatch_event(&mut self, name: &str);
}

/// Inner markup of the `<body>` element of a full HTML document.
pub fn extract_body(html: &str) -> Result<String, HmrError> {
    capture_inner(&BODY, html).ok_or(HmrError::MissingBody)
}

fn capture_inner(element: &Regex, html: &str) -> Option<String> {
    element
        .captures(html)
        .and_then(|captures| captures.get(1))
        .map(|inner| inner.as_str().to_string())
}

/// Swaps the body of `document` for the body of `html`.
///
/// On error the document is left untouched and no event fires.
pub fn reload(
    document: &mut dyn DocumentHost,
    html: &str,
    completion_event: &str,
) -> Result<(), HmrError> {
    let body = extract_body(html)?;
    document.replace_body(&body);
    document.reinitialize_bindings();
    document.dispatch_event(completion_event);
    tracing::debug!(
        body_len = body.len(),
        event = completion_event,
        "document body reloaded"
    );
    Ok(())
}

/// Document held in memory. Records re-binds and dispatched events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryDocument {
    head: String,
    body: String,
    rebinds: usize,
    events: Vec<String>,
}

impl InMemoryDocument {
    pub fn new(head: &str, body: &str) -> Self {
        Self {
            head: head.to_string(),
            body: body.to_string(),
            ..Self::default()
        }
    }

    /// Builds a document from full HTML. A missing `<head>` leaves it empty.
    pub fn from_html(html: &str) -> Result<Self, HmrError> {
        let head = capture_inner(&HEAD, html).unwrap_or_default();
        let body = extract_body(html)?;
        Ok(Self::new(&head, &body))
    }

    pub fn rebinds(&self) -> usize {
        self.rebinds
    }

    pub fn events(&self) -> &[String] {
        &self.events
    }
}

impl DocumentHost for InMemoryDocument {
    fn head(&self) -> &str {
        &self.head
    }

    fn body(&self) -> &str {
        &self.body
    }

    fn replace_body(&mut self, markup: &str) {
        self.body = markup.to_string();
    }

    fn reinitialize_bindings(&mut self) {
        self.rebinds += 1;
    }

    fn dispatch_event(&mut self, name: &str) {
        self.events.push(name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!doctype html>
<html>
  <HEAD><script src="/app.js"></script></HEAD>
  <body class="app">
    <div x-data="counter">2</div>
  </body>
</html>"#;

    #[test]
    fn extracts_body_across_lines_and_case() {
        let body = extract_body(PAGE).expect("body");
        assert!(body.contains(r#"<div x-data="counter">2</div>"#));
        assert!(!body.contains("<body"));
    }

    #[test]
    fn repeated_reloads_reuse_the_element_patterns() {
        let mut document = InMemoryDocument::from_html(PAGE).expect("document");
        for n in 0..50 {
            let html = format!("<html><body><p>{n}</p></body></html>");
            reload(&mut document, &html, "hmr:complete").expect("reload");
        }

        assert_eq!(document.body(), "<p>49</p>");
        assert_eq!(document.rebinds(), 50);
        assert_eq!(document.head(), r#"<script src="/app.js"></script>"#);
    }

    #[test]
    fn missing_head_leaves_it_empty() {
        let document = InMemoryDocument::from_html("<body>b</body>").expect("document");
        assert_eq!(document.head(), "");
        assert_eq!(document.body(), "b");
    }

    #[test]
    fn missing_body_is_an_error() {
        assert!(matches!(
            extract_body("<html><head></head></html>"),
            Err(HmrError::MissingBody)
        ));
    }

    #[test]
    fn reload_swaps_body_only() {
        let mut document = InMemoryDocument::from_html(PAGE).expect("document");
        let head = document.head().to_string();

        reload(
            &mut document,
            "<html><head><style></style></head><body><p>new</p></body></html>",
            "hmr:complete",
        )
        .expect("reload");

        assert_eq!(document.body(), "<p>new</p>");
        assert_eq!(document.head(), head);
        assert_eq!(document.rebinds(), 1);
        assert_eq!(document.events(), ["hmr:complete".to_string()]);
    }

    #[test]
    fn failed_reload_leaves_document_untouched() {
        let mut document = InMemoryDocument::new("<title>t</title>", "<p>old</p>");
        let before = document.clone();

        assert!(reload(&mut document, "<p>fragment</p>", "hmr:complete").is_err());
        assert_eq!(document, before);
    }
}
