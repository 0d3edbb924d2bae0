//! Editable-root marker handling.
//!
//! The rendering host only accepts input when the document root carries
//! `contenteditable="true"` on its `<body>` open tag. Markup delivered for
//! display is patched to carry the marker there; markup whose body already
//! has it passes through untouched. Markers on nested elements or in text do
//! not count.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

/// Attribute that makes the document root user-editable.
pub const EDITABLE_ROOT_MARKER: &str = r#"contenteditable="true""#;

static MARKER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\bcontenteditable\s*=\s*["']?true\b"#).unwrap());

static ROOT_MARKER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<body\b[^>]*\scontenteditable\s*=\s*["']?true\b"#).unwrap()
});

static BODY_OPEN_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<body\b").unwrap());

/// Returns true if the `<body>` open tag of `html` carries the marker.
///
/// # Examples
///
/// ```
/// use notepad_core::markup::has_editable_root;
///
/// assert!(has_editable_root(r#"<body contenteditable="true"></body>"#));
/// assert!(has_editable_root("<BODY class='doc' CONTENTEDITABLE='true'>x</BODY>"));
/// assert!(!has_editable_root("<div contenteditable='true'>x</div>"));
/// assert!(!has_editable_root("<p>set contenteditable=true</p>"));
/// assert!(!has_editable_root(r#"<body contenteditable="false"></body>"#));
/// ```
pub fn has_editable_root(html: &str) -> bool {
    ROOT_MARKER_REGEX.is_match(html)
}

/// Counts `contenteditable="true"` occurrences anywhere in `html`.
pub fn marker_count(html: &str) -> usize {
    MARKER_REGEX.find_iter(html).count()
}

/// Makes sure `html` carries the editable-root marker.
///
/// If the markup has a `<body>` element the marker is added as its first
/// attribute, otherwise the whole markup is wrapped in an editable body.
///
/// # Examples
///
/// ```
/// use notepad_core::markup::ensure_editable_root;
///
/// assert_eq!(
///     ensure_editable_root("<p>hello</p>"),
///     r#"<body contenteditable="true"><p>hello</p></body>"#
/// );
/// assert_eq!(
///     ensure_editable_root("<html><body class=\"doc\"><p>a</p></body></html>"),
///     r#"<html><body contenteditable="true" class="doc"><p>a</p></body></html>"#
/// );
/// ```
pub fn ensure_editable_root(html: &str) -> Cow<'_, str> {
    if has_editable_root(html) {
        return Cow::Borrowed(html);
    }

    if let Some(body) = BODY_OPEN_REGEX.find(html) {
        let mut patched = String::with_capacity(html.len() + EDITABLE_ROOT_MARKER.len() + 1);
        patched.push_str(&html[..body.end()]);
        patched.push(' ');
        patched.push_str(EDITABLE_ROOT_MARKER);
        patched.push_str(&html[body.end()..]);
        tracing::debug!("Injected editable-root marker into existing <body>");
        return Cow::Owned(patched);
    }

    tracing::debug!("Wrapped markup in editable <body>");
    Cow::Owned(format!("<body {EDITABLE_ROOT_MARKER}>{html}</body>"))
}
