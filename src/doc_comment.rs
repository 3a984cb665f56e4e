//! Doc comment extraction and the summary/description split.

use crate::attributes::{AttrValue, AttributeArgs};
use syn::Attribute;

/// Title used when a declaration carries no doc comment.
pub const NO_SUMMARY: &str = "No summary";
/// Description used when a declaration carries no doc comment.
pub const NO_DESCRIPTION: &str = "No description";

const PARAGRAPH_START: &str = "<p>";
const PARAGRAPH_END: &str = "</p>";

/// Summary and optional description derived from a doc comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocText {
    pub summary: String,
    pub description: Option<String>,
    /// `true` for the stand-in used when there was no doc comment at all.
    pub placeholder: bool,
}

impl DocText {
    /// The stand-in for declarations without a doc comment.
    pub fn placeholder() -> Self {
        Self {
            summary: NO_SUMMARY.to_string(),
            description: Some(NO_DESCRIPTION.to_string()),
            placeholder: true,
        }
    }
}

/// Collects the doc comment of a declaration into a single line of text.
///
/// Lines of one paragraph are joined with a space and blank lines become a `<p>` marker,
/// so Markdown paragraphs and HTML paragraphs split the same way. Everything from the first
/// Markdown heading on (`# Examples`, `# Errors`, ...) is left out.
///
/// Returns `None` when there is no doc comment or it is blank.
pub fn doc_comment(attrs: &[Attribute]) -> Option<String> {
    let mut lines = Vec::new();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("doc")) {
        if let Some(AttrValue::Str(text)) = AttributeArgs::from_attribute(attr)
            .entries
            .first()
            .map(|entry| &entry.value)
        {
            // only `/** */` blocks span several lines
            let block = text.contains('\n');
            lines.extend(text.lines().map(|line| clean_line(line, block)));
        }
    }

    let mut paragraphs: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in &lines {
        if is_heading(line) {
            break;
        }
        if line.is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join(" "));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join(" "));
    }

    let text = paragraphs.join(PARAGRAPH_START);
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Trims a doc line, dropping the leading `*` of block doc comments.
fn clean_line(line: &str, block: bool) -> String {
    let trimmed = line.trim();
    match trimmed.strip_prefix('*') {
        Some(rest) if block && !rest.starts_with('*') => rest.trim().to_string(),
        _ => trimmed.to_string(),
    }
}

/// A Markdown heading such as `# Examples`.
fn is_heading(line: &str) -> bool {
    let rest = line.trim_start_matches('#');
    rest.len() < line.len() && (rest.is_empty() || rest.starts_with(' '))
}

/// Splits doc text at paragraph markers into summary and description.
///
/// Only the first two segments matter: the summary is everything before the first `<p>`,
/// the description everything between the first and the second one.
pub fn split(text: &str) -> DocText {
    let mut parts = text.split(PARAGRAPH_START);
    let summary = parts.next().unwrap_or_default().trim().to_string();
    let description = parts.next().and_then(|raw| {
        let mut description = raw.trim();
        if let Some(stripped) = description.strip_suffix(PARAGRAPH_START) {
            description = stripped.trim_end();
        }
        if let Some(stripped) = description.strip_suffix(PARAGRAPH_END) {
            description = stripped.trim_end();
        }
        if description.is_empty() {
            None
        } else {
            Some(description.to_string())
        }
    });

    DocText {
        summary,
        description,
        placeholder: false,
    }
}
