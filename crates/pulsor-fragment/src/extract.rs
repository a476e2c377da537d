//! Pulling usable markup out of fetched files.

const TEMPLATE_OPEN: &str = "<template>";
const TEMPLATE_CLOSE: &str = "</template>";

/// Check if the text is a whole HTML document rather than a fragment.
///
/// Servers often answer unknown paths with their index page, which must
/// not be mistaken for a fragment.
#[must_use]
pub fn is_full_document(text: &str) -> bool {
    text.contains("<!DOCTYPE html>") || text.contains("<html")
}

/// Body of the first `<template>...</template>` block, if any.
#[must_use]
pub fn template_body(text: &str) -> Option<&str> {
    let start = text.find(TEMPLATE_OPEN)? + TEMPLATE_OPEN.len();
    let len = text[start..].find(TEMPLATE_CLOSE)?;
    Some(&text[start..start + len])
}

/// Extract a fragment: the template body if there is one, otherwise the
/// whole text. Full documents and blank results yield `None`.
#[must_use]
pub fn extract_fragment(text: &str) -> Option<&str> {
    if is_full_document(text) {
        return None;
    }
    let body = template_body(text).unwrap_or(text);
    non_blank(body)
}

/// Extract a template: only a non-blank template body counts.
#[must_use]
pub fn extract_template(text: &str) -> Option<&str> {
    template_body(text).and_then(non_blank)
}

/// File name for a template: `template.<name>.html`, with any `.html`
/// already in the name dropped.
#[must_use]
pub fn template_file_name(name: &str) -> String {
    let stem = strip_html_ci(&format!("template.{name}"));
    format!("{stem}.html")
}

fn non_blank(text: &str) -> Option<&str> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

fn strip_html_ci(text: &str) -> String {
    const NEEDLE: &[u8] = b".html";
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes.len() - i >= NEEDLE.len() && bytes[i..i + NEEDLE.len()].eq_ignore_ascii_case(NEEDLE) {
            i += NEEDLE.len();
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    // Only ASCII runs were removed, so the rest is still valid UTF-8
    String::from_utf8(out).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_with_template() {
        let text = "<!-- card -->\n<template><div class=\"card\"></div></template>\n<style></style>";
        assert_eq!(extract_fragment(text), Some("<div class=\"card\"></div>"));
    }

    #[test]
    fn test_fragment_without_template() {
        assert_eq!(extract_fragment("<p>plain</p>"), Some("<p>plain</p>"));
    }

    #[test]
    fn test_fragment_rejects_documents() {
        assert_eq!(extract_fragment("<!DOCTYPE html><html><body></body></html>"), None);
        assert_eq!(extract_fragment("<html lang=\"en\"></html>"), None);
    }

    #[test]
    fn test_fragment_blank() {
        assert_eq!(extract_fragment(""), None);
        assert_eq!(extract_fragment("  \n "), None);
        assert_eq!(extract_fragment("<template>   </template>"), None);
    }

    #[test]
    fn test_first_template_wins() {
        let text = "<template>one</template><template>two</template>";
        assert_eq!(template_body(text), Some("one"));
        assert_eq!(template_body("<template>unterminated"), None);
    }

    #[test]
    fn test_template_requires_block() {
        assert_eq!(extract_template("<p>no block</p>"), None);
        assert_eq!(extract_template("<template>\n</template>"), None);
        assert_eq!(extract_template("<template><nav></nav></template>"), Some("<nav></nav>"));
    }

    #[test]
    fn test_template_file_name() {
        assert_eq!(template_file_name("sidebar"), "template.sidebar.html");
        assert_eq!(template_file_name("sidebar.html"), "template.sidebar.html");
        assert_eq!(template_file_name("sidebar.HTML"), "template.sidebar.html");
        assert_eq!(template_file_name("a.html.b"), "template.a.b.html");
    }
}
