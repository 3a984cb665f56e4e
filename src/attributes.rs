//! Typed introspection of outer attributes.
//!
//! Attributes are matched by the last segment of their path, so `#[not_null]` and
//! `#[validation::not_null]` are the same marker. Their arguments are split at top-level
//! commas into [`AttrEntry`] values carrying a small tagged value
//! (boolean | integer | string | nested list | flag) plus the raw tokens of the entry.

use proc_macro2::{Delimiter, TokenStream, TokenTree};
use quote::ToTokens;
use syn::{Attribute, Meta};

/// The value part of a single attribute argument.
#[derive(Debug, Clone)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Str(String),
    /// `key(...)`
    Nested(AttributeArgs),
    /// A bare identifier such as `nullable` or `required`.
    Flag,
    /// Anything else; only the raw tokens are available.
    Tokens,
}

/// One comma-separated argument of an attribute.
#[derive(Debug, Clone)]
pub struct AttrEntry {
    /// `Some` for `key = value`, `key(...)` and bare identifiers.
    pub key: Option<String>,
    pub value: AttrValue,
    /// Tokens of the whole entry.
    pub tokens: TokenStream,
}

/// Parsed argument list of an attribute.
#[derive(Debug, Clone, Default)]
pub struct AttributeArgs {
    pub entries: Vec<AttrEntry>,
}

/// Returns the last segment of the attribute path.
pub fn attribute_name(attr: &Attribute) -> Option<String> {
    attr.path().segments.last().map(|s| s.ident.to_string())
}

/// Finds the first attribute whose last path segment equals `name`.
pub fn find_attribute<'a>(attrs: &'a [Attribute], name: &str) -> Option<&'a Attribute> {
    attrs
        .iter()
        .find(|attr| attribute_name(attr).as_deref() == Some(name))
}

/// Iterates over all attributes whose last path segment equals `name`.
pub fn find_attributes<'a>(
    attrs: &'a [Attribute],
    name: &'a str,
) -> impl Iterator<Item = &'a Attribute> + 'a {
    attrs
        .iter()
        .filter(move |attr| attribute_name(attr).as_deref() == Some(name))
}

impl AttributeArgs {
    /// Parses the arguments of `attr`.
    ///
    /// `#[name]` yields no entries, `#[name(...)]` one entry per top-level comma separated
    /// argument and `#[name = value]` a single positional entry.
    pub fn from_attribute(attr: &Attribute) -> Self {
        match &attr.meta {
            Meta::Path(_) => Self::default(),
            Meta::List(list) => Self::from_tokens(list.tokens.clone()),
            Meta::NameValue(name_value) => {
                let tokens = name_value.value.to_token_stream();
                let chunk: Vec<TokenTree> = tokens.clone().into_iter().collect();
                Self {
                    entries: vec![AttrEntry {
                        key: None,
                        value: value_from_tokens(&chunk),
                        tokens,
                    }],
                }
            }
        }
    }

    /// Parses a comma separated argument list.
    pub fn from_tokens(tokens: TokenStream) -> Self {
        let entries = split_top_level(tokens)
            .into_iter()
            .filter(|chunk| !chunk.is_empty())
            .map(|chunk| entry_from_chunk(&chunk))
            .collect();
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value of the first entry named `key`.
    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.entries
            .iter()
            .find(|entry| entry.key.as_deref() == Some(key))
            .map(|entry| &entry.value)
    }

    pub fn int(&self, key: &str) -> Option<i64> {
        match self.get(key) {
            Some(AttrValue::Int(value)) => Some(*value),
            _ => None,
        }
    }

    /// Boolean value of `key`. A bare `key` flag counts as `true`.
    pub fn bool(&self, key: &str) -> Option<bool> {
        match self.get(key) {
            Some(AttrValue::Bool(value)) => Some(*value),
            Some(AttrValue::Flag) => Some(true),
            _ => None,
        }
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some(AttrValue::Str(value)) => Some(value),
            _ => None,
        }
    }

    pub fn nested(&self, key: &str) -> Option<&AttributeArgs> {
        match self.get(key) {
            Some(AttrValue::Nested(args)) => Some(args),
            _ => None,
        }
    }

    pub fn has_flag(&self, key: &str) -> bool {
        matches!(self.get(key), Some(AttrValue::Flag))
    }

    /// The integer of a single-argument marker: `#[min(5)]`, `#[min = 5]` or
    /// `#[min(value = 5)]`.
    pub fn single_int(&self) -> Option<i64> {
        let positional = self.entries.iter().find_map(|entry| match (&entry.key, &entry.value) {
            (None, AttrValue::Int(value)) => Some(*value),
            _ => None,
        });
        positional.or_else(|| self.int("value"))
    }

    /// Whether any entry names `ident`, either as a bare identifier or as the last segment
    /// of a path (`Embeddable`, `orm::Embeddable`).
    pub fn mentions(&self, ident: &str) -> bool {
        self.entries.iter().any(|entry| {
            entry.key.as_deref() == Some(ident)
                || entry
                    .tokens
                    .clone()
                    .into_iter()
                    .filter_map(|tt| match tt {
                        TokenTree::Ident(i) => Some(i.to_string()),
                        _ => None,
                    })
                    .last()
                    .is_some_and(|last| last == ident)
        })
    }
}

/// Splits a token stream at commas that are neither nested inside a group nor inside
/// generic arguments (`HashMap<String, u32>`).
fn split_top_level(tokens: TokenStream) -> Vec<Vec<TokenTree>> {
    let mut chunks = vec![Vec::new()];
    let mut angle_depth = 0usize;
    let mut previous_punct = None;

    for tt in tokens {
        let mut punct = None;
        if let TokenTree::Punct(p) = &tt {
            punct = Some(p.as_char());
            match p.as_char() {
                ',' if angle_depth == 0 => {
                    chunks.push(Vec::new());
                    previous_punct = None;
                    continue;
                }
                '<' => angle_depth += 1,
                // `->` and `=>` are not closing brackets
                '>' if !matches!(previous_punct, Some('-') | Some('=')) => {
                    angle_depth = angle_depth.saturating_sub(1)
                }
                _ => {}
            }
        }
        previous_punct = punct;
        if let Some(current) = chunks.last_mut() {
            current.push(tt);
        }
    }
    chunks
}

fn entry_from_chunk(chunk: &[TokenTree]) -> AttrEntry {
    let tokens: TokenStream = chunk.iter().cloned().collect();

    match chunk {
        [TokenTree::Ident(key), TokenTree::Punct(eq), rest @ ..]
            if eq.as_char() == '=' && !rest.is_empty() =>
        {
            AttrEntry {
                key: Some(key.to_string()),
                value: value_from_tokens(rest),
                tokens,
            }
        }
        [TokenTree::Ident(key), TokenTree::Group(group)]
            if group.delimiter() == Delimiter::Parenthesis =>
        {
            AttrEntry {
                key: Some(key.to_string()),
                value: AttrValue::Nested(AttributeArgs::from_tokens(group.stream())),
                tokens,
            }
        }
        [TokenTree::Ident(ident)] if ident != "true" && ident != "false" => AttrEntry {
            key: Some(ident.to_string()),
            value: AttrValue::Flag,
            tokens,
        },
        _ => AttrEntry {
            key: None,
            value: value_from_tokens(chunk),
            tokens,
        },
    }
}

fn value_from_tokens(tokens: &[TokenTree]) -> AttrValue {
    match tokens {
        [TokenTree::Ident(ident)] if ident == "true" => AttrValue::Bool(true),
        [TokenTree::Ident(ident)] if ident == "false" => AttrValue::Bool(false),
        [TokenTree::Literal(literal)] => match syn::Lit::new(literal.clone()) {
            syn::Lit::Str(s) => AttrValue::Str(s.value()),
            syn::Lit::Int(i) => i
                .base10_parse::<i64>()
                .map(AttrValue::Int)
                .unwrap_or(AttrValue::Tokens),
            syn::Lit::Bool(b) => AttrValue::Bool(b.value),
            _ => AttrValue::Tokens,
        },
        [TokenTree::Punct(minus), TokenTree::Literal(literal)] if minus.as_char() == '-' => {
            match syn::Lit::new(literal.clone()) {
                syn::Lit::Int(i) => i
                    .base10_parse::<i64>()
                    .map(|value| AttrValue::Int(-value))
                    .unwrap_or(AttrValue::Tokens),
                _ => AttrValue::Tokens,
            }
        }
        // Doc attributes and macro-expanded values arrive wrapped in an invisible group.
        [TokenTree::Group(group)] if group.delimiter() == Delimiter::None => {
            let inner: Vec<TokenTree> = group.stream().into_iter().collect();
            value_from_tokens(&inner)
        }
        _ => AttrValue::Tokens,
    }
}
