//! Description catalogue.
//!
//! A YAML or JSON file supplying doc text for declarations without a doc comment. Keys are
//! `{prefix}{type}` for types and `{prefix}{type}.{member}` for fields and getters, with the
//! type name in snake case:
//!
//! ```yaml
//! prefix: api
//! descriptions:
//!   api.user: A user being able to log in.
//!   api.user.username: The username.<p>Unique across all users.
//! ```
//!
//! A flat map of keys to texts is accepted as well.

use crate::error::{Error, Result};
use convert_case::{Case, Casing};
use log::{debug, info};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CatalogueFile {
    Structured {
        #[serde(default)]
        prefix: Option<String>,
        descriptions: BTreeMap<String, String>,
    },
    Flat(BTreeMap<String, String>),
}

/// Texts keyed by declaration.
#[derive(Debug, Default, Clone)]
pub struct DescriptionCatalogue {
    prefix: String,
    entries: BTreeMap<String, String>,
}

impl DescriptionCatalogue {
    /// Loads a catalogue file. JSON is read from `.json` files, YAML from everything else.
    ///
    /// # Arguments
    ///
    /// * `path` - The catalogue file
    /// * `prefix` - Key prefix overriding the one in the file
    ///
    /// # Errors
    ///
    /// Returns [`Error::IoError`] when the file can't be read and [`Error::CatalogueError`]
    /// when it has neither accepted shape.
    pub fn load(path: &Path, prefix: Option<&str>) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let file: CatalogueFile = if is_json {
            serde_json::from_str(&content).map_err(|e| Error::CatalogueError {
                file: path.to_path_buf(),
                message: e.to_string(),
            })?
        } else {
            serde_yaml::from_str(&content).map_err(|e| Error::CatalogueError {
                file: path.to_path_buf(),
                message: e.to_string(),
            })?
        };

        let (file_prefix, entries) = match file {
            CatalogueFile::Structured {
                prefix,
                descriptions,
            } => (prefix, descriptions),
            CatalogueFile::Flat(entries) => (None, entries),
        };
        let prefix = prefix.map(str::to_string).or(file_prefix);

        info!(
            "Loaded {} descriptions from {}",
            entries.len(),
            path.display()
        );
        Ok(Self::new(prefix.as_deref(), entries))
    }

    pub fn new(prefix: Option<&str>, entries: BTreeMap<String, String>) -> Self {
        let prefix = match prefix.map(str::trim) {
            Some(prefix) if !prefix.is_empty() && !prefix.ends_with('.') => format!("{}.", prefix),
            Some(prefix) => prefix.to_string(),
            None => String::new(),
        };
        Self { prefix, entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Text for the struct `type_name`.
    pub fn type_description(&self, type_name: &str) -> Option<&str> {
        let key = format!("{}{}", self.prefix, type_name.to_case(Case::Snake));
        self.lookup(&key)
    }

    /// Text for the field or getter property `member` of the struct `type_name`.
    pub fn member_description(&self, type_name: &str, member: &str) -> Option<&str> {
        let key = format!(
            "{}{}.{}",
            self.prefix,
            type_name.to_case(Case::Snake),
            member
        );
        self.lookup(&key)
    }

    fn lookup(&self, key: &str) -> Option<&str> {
        let found = self.entries.get(key).map(String::as_str);
        if found.is_some() {
            debug!("Using catalogue description '{}'", key);
        }
        found
    }
}
