//! Response body classification
//!
//! Upstreams sometimes answer a missing model with a 404 HTML page, so the
//! status code alone is not enough to decide whether a body is usable.

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Html,
    Json,
    Other,
}

fn starts_with_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack
        .get(..needle.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(needle))
}

pub fn is_html(body: &str) -> bool {
    let trimmed = body.trim_start();
    starts_with_ignore_case(trimmed, "<!DOCTYPE") || starts_with_ignore_case(trimmed, "<html")
}

/// A JSON content type wins; otherwise a non-HTML body that opens with
/// `{` or `[` counts as JSON.
pub fn classify(content_type: &str, body: &str) -> BodyKind {
    let html = is_html(body);
    let trimmed = body.trim_start();

    if content_type.contains("application/json")
        || (!html && (trimmed.starts_with('{') || trimmed.starts_with('[')))
    {
        BodyKind::Json
    } else if html {
        BodyKind::Html
    } else {
        BodyKind::Other
    }
}

/// First `max` characters, for logs and diagnostics.
pub fn snippet(body: &str, max: usize) -> String {
    body.chars().take(max).collect()
}

/// `error.message` from a Google-style error envelope.
pub fn error_message(value: &Value) -> Option<&str> {
    value.get("error")?.get("message")?.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_html_pages() {
        assert_eq!(classify("text/html", "<!DOCTYPE html><html>404</html>"), BodyKind::Html);
        assert_eq!(classify("", "\n  <html><body>Not Found</body></html>"), BodyKind::Html);
        assert_eq!(classify("text/html", "<!doctype html>"), BodyKind::Html);
    }

    #[test]
    fn test_json_by_header_or_shape() {
        assert_eq!(classify("application/json; charset=UTF-8", "{}"), BodyKind::Json);
        assert_eq!(classify("text/plain", "  {\"name\":\"op\"}"), BodyKind::Json);
        assert_eq!(classify("", "[1,2]"), BodyKind::Json);
        // header says JSON even if the body is junk; parsing decides later
        assert_eq!(classify("application/json", "<!DOCTYPE html>"), BodyKind::Json);
    }

    #[test]
    fn test_other() {
        assert_eq!(classify("text/plain", "Service Unavailable"), BodyKind::Other);
        assert_eq!(classify("", ""), BodyKind::Other);
    }

    #[test]
    fn test_snippet_is_char_safe() {
        assert_eq!(snippet("₦₦₦₦", 2), "₦₦");
        assert_eq!(snippet("ok", 200), "ok");
    }

    #[test]
    fn test_error_message() {
        let body = json!({"error": {"code": 404, "message": "Model not found"}});
        assert_eq!(error_message(&body), Some("Model not found"));
        assert_eq!(error_message(&json!({"error": "flat"})), None);
    }
}
