//! The `#[schema(...)]` attribute as an editable list of entries.

use crate::attributes::AttributeArgs;
use crate::rewrite::LineIndex;
use syn::Attribute;

/// Name of the attribute written by the enricher.
pub const SCHEMA_ANNOTATION: &str = "schema";

pub const DESCRIPTION_KEY: &str = "description";
pub const TITLE_KEY: &str = "title";
pub const REQUIRED_KEY: &str = "required";
pub const MIN_LENGTH_KEY: &str = "min_length";
pub const MAX_LENGTH_KEY: &str = "max_length";
pub const MINIMUM_KEY: &str = "minimum";
pub const MAXIMUM_KEY: &str = "maximum";

/// Value of a schema entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaValue {
    /// String literal content, already escaped
    Str(String),
    Bool(bool),
    Int(i64),
    /// An entry kept as written in the source
    Raw(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PatchEntry {
    key: Option<String>,
    value: SchemaValue,
}

impl PatchEntry {
    fn render(&self) -> String {
        let value = match &self.value {
            SchemaValue::Raw(text) => return text.clone(),
            SchemaValue::Str(text) => format!("\"{}\"", text),
            SchemaValue::Bool(value) => value.to_string(),
            SchemaValue::Int(value) => value.to_string(),
        };
        match &self.key {
            Some(key) => format!("{} = {}", key, value),
            None => value,
        }
    }
}

/// Ordered entries of a schema attribute.
///
/// Entries the enricher doesn't know are kept verbatim in their original position; known
/// keys are replaced in place or appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationPatch {
    path: String,
    entries: Vec<PatchEntry>,
}

impl Default for AnnotationPatch {
    fn default() -> Self {
        Self {
            path: SCHEMA_ANNOTATION.to_string(),
            entries: Vec::new(),
        }
    }
}

impl AnnotationPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads an existing attribute, keeping the source text of every entry.
    pub fn from_existing(attr: &Attribute, index: &LineIndex) -> Self {
        let path = attr
            .path()
            .segments
            .iter()
            .map(|segment| segment.ident.to_string())
            .collect::<Vec<_>>()
            .join("::");
        let path = if attr.path().leading_colon.is_some() {
            format!("::{}", path)
        } else {
            path
        };

        let entries = AttributeArgs::from_attribute(attr)
            .entries
            .into_iter()
            .filter_map(|entry| {
                let text = index.tokens_text(&entry.tokens)?;
                Some(PatchEntry {
                    key: entry.key,
                    value: SchemaValue::Raw(text.to_string()),
                })
            })
            .collect();

        Self { path, entries }
    }

    /// Sets `key`, replacing an existing entry in place or appending a new one.
    pub fn set(&mut self, key: &str, value: SchemaValue) {
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.key.as_deref() == Some(key))
        {
            Some(entry) => entry.value = value,
            None => self.entries.push(PatchEntry {
                key: Some(key.to_string()),
                value,
            }),
        }
    }

    pub fn get(&self, key: &str) -> Option<&SchemaValue> {
        self.entries
            .iter()
            .find(|entry| entry.key.as_deref() == Some(key))
            .map(|entry| &entry.value)
    }

    /// The attribute as source text, e.g. `#[schema(description = "..", title = "..")]`.
    pub fn render(&self) -> String {
        let entries = self
            .entries
            .iter()
            .map(PatchEntry::render)
            .collect::<Vec<_>>()
            .join(", ");
        format!("#[{}({})]", self.path, entries)
    }
}

/// Escapes free text for a string literal of the attribute.
///
/// Backslashes are doubled, the text is trimmed, line breaks become spaces, angle brackets
/// become HTML entities, quotes are escaped and whitespace runs collapse to one space.
pub fn escape(text: &str) -> String {
    let escaped = text
        .replace('\\', "\\\\")
        .trim()
        .replace('\n', " ")
        .replace('\r', "")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "\\\"");
    escaped.split_whitespace().collect::<Vec<_>>().join(" ")
}
