//! Backend HTML error page parsing.
//!
//! When an engine rejects a query it answers with an HTML document instead
//! of JSON. The message sits in an element whose `class` or `id` contains
//! the word `error`; when the rejected token was a field or table name, the
//! page also lists valid options, either as `<li>` items of an `options`
//! element or as a trailing `Options: a, b, c` clause in the message.
//!
//! This is marker matching on a page layout, not a stable contract.

use std::sync::LazyLock;

use nxql_core::ErrorDetail;
use regex::Regex;

// ============================================================================
// Regex Patterns
// ============================================================================

/// Opening tag of a candidate message element.
static OPEN_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(p|div|span|pre|h1|h2|h3)\b([^>]*)>").expect("Invalid regex")
});

/// `class`/`id` attribute containing the word `error`.
static ERROR_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(?:class|id)\s*=\s*["'][^"']*\berror\b[^"']*["']"#)
        .expect("Invalid regex")
});

/// Element whose `class`/`id` contains `option` or `options`.
static OPTIONS_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)<(?:ul|ol|div)\b[^>]*\b(?:class|id)\s*=\s*["'][^"']*\boptions?\b[^"']*["'][^>]*>(.*?)</(?:ul|ol|div)\s*>"#,
    )
    .expect("Invalid regex")
});

static LIST_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<li\b[^>]*>(.*?)</li\s*>").expect("Invalid regex"));

/// Trailing option list inside the message text.
static INLINE_OPTIONS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\b(?:options|possible values|valid fields|valid values)\s*:\s*(.+)$")
        .expect("Invalid regex")
});

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("Invalid regex"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid regex"));

// ============================================================================
// Parsing
// ============================================================================

/// Returns true if the body starts with an HTML document marker.
pub fn is_html(body: &str) -> bool {
    let head: String = body
        .trim_start_matches('\u{feff}')
        .trim_start()
        .chars()
        .take(16)
        .collect();
    let lower = head.to_ascii_lowercase();
    lower.starts_with("<!doctype html") || lower.starts_with("<html")
}

/// Extracts the error detail from an HTML error page.
///
/// Returns `None` when no error element is present.
pub fn parse_error_page(html: &str) -> Option<ErrorDetail> {
    let message = OPEN_TAG_RE
        .captures_iter(html)
        .filter(|caps| ERROR_ATTR_RE.is_match(&caps[2]))
        .find_map(|caps| {
            let whole = caps.get(0)?;
            let inner = element_inner(html, whole.end(), &caps[1]);
            Some(element_text(inner)).filter(|text| !text.is_empty())
        })?;

    let mut options = list_options(html);
    if options.is_empty() {
        options = inline_options(&message);
    }

    Some(ErrorDetail { message, options })
}

/// Content from `start` up to the closing tag of `tag` (or end of input).
fn element_inner<'a>(html: &'a str, start: usize, tag: &str) -> &'a str {
    let closing = format!("</{}", tag.to_ascii_lowercase());
    // ASCII lowercasing keeps byte offsets intact.
    let end = html[start..]
        .to_ascii_lowercase()
        .find(&closing)
        .map_or(html.len(), |offset| start + offset);
    &html[start..end]
}

fn list_options(html: &str) -> Vec<String> {
    let Some(block) = OPTIONS_BLOCK_RE.captures(html) else {
        return Vec::new();
    };

    LIST_ITEM_RE
        .captures_iter(&block[1])
        .map(|caps| element_text(&caps[1]))
        .filter(|item| !item.is_empty())
        .collect()
}

fn inline_options(message: &str) -> Vec<String> {
    let Some(caps) = INLINE_OPTIONS_RE.captures(message) else {
        return Vec::new();
    };

    caps[1]
        .trim_end_matches('.')
        .split([',', ';'])
        .map(|item| item.trim().trim_matches(['\'', '"', '`']).trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Strips tags, decodes entities and collapses whitespace.
fn element_text(fragment: &str) -> String {
    let without_tags = TAG_RE.replace_all(fragment, " ");
    let decoded = decode_entities(&without_tags);
    WHITESPACE_RE.replace_all(decoded.trim(), " ").into_owned()
}

fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let decoded = tail
            .find(';')
            .filter(|end| *end <= 10)
            .and_then(|end| decode_entity(&tail[1..end]).map(|c| (c, end)));

        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                name.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST_PAGE: &str = r#"<!DOCTYPE html>
<html>
  <head><title>Query error</title></head>
  <body>
    <h1>Error</h1>
    <p class="error-message">Unknown field &quot;nxql_field_catalog_probe&quot; for table device</p>
    <ul class="options">
      <li>name</li>
      <li>platform</li>
      <li>last_seen</li>
    </ul>
  </body>
</html>"#;

    #[test]
    fn test_detects_html_markers() {
        assert!(is_html("<!DOCTYPE html><html></html>"));
        assert!(is_html("  \n<HTML><body>x</body></HTML>"));
        assert!(is_html("\u{feff}<!doctype html>"));
        assert!(!is_html(r#"[{"name":"a"}]"#));
        assert!(!is_html("<?xml version=\"1.0\"?>"));
        assert!(!is_html(""));
    }

    #[test]
    fn test_parses_message_and_list_options() {
        let detail = parse_error_page(LIST_PAGE).unwrap();
        assert_eq!(
            detail.message,
            "Unknown field \"nxql_field_catalog_probe\" for table device"
        );
        assert_eq!(detail.options, vec!["name", "platform", "last_seen"]);
    }

    #[test]
    fn test_parses_inline_options() {
        let page = r#"<html><body><div id="error">
            Error at line 1: field 'x' does not exist. Options: name, platform, last_seen.
        </div></body></html>"#;
        let detail = parse_error_page(page).unwrap();
        assert!(detail.message.starts_with("Error at line 1"));
        assert_eq!(detail.options, vec!["name", "platform", "last_seen"]);
    }

    #[test]
    fn test_message_without_options() {
        let page = r#"<html><body><span class="error">Syntax error near &lt;from&gt;</span></body></html>"#;
        let detail = parse_error_page(page).unwrap();
        assert_eq!(detail.message, "Syntax error near <from>");
        assert!(detail.options.is_empty());
    }

    #[test]
    fn test_error_element_nested_in_container() {
        let page = r#"<html><body><div class="content"><p>Intro</p><p class="error">Bad query</p></div></body></html>"#;
        let detail = parse_error_page(page).unwrap();
        assert_eq!(detail.message, "Bad query");
    }

    #[test]
    fn test_page_without_error_element() {
        let page = "<html><body><h1>Welcome</h1><p>Please log in</p></body></html>";
        assert!(parse_error_page(page).is_none());
    }

    #[test]
    fn test_error_word_must_be_whole() {
        let page = r#"<html><body><p class="terrorist-free">nope</p></body></html>"#;
        assert!(parse_error_page(page).is_none());
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("a &amp; b &#39;c&#x27; &unknown; &"), "a & b 'c' &unknown; &");
    }
}
