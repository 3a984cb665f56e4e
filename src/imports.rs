use log::debug;
use std::collections::HashMap;
use syn::{Item, UseTree};

/// Import table of a single source file.
///
/// Maps every name brought into scope by a `use` item to the full path it refers to, e.g.
/// `use crate::model::{address::Address, tag::Tag as Label};` yields
/// `Address -> [crate, model, address, Address]` and `Label -> [crate, model, tag, Tag]`.
/// Glob imports are ignored.
#[derive(Debug, Default)]
pub struct ImportTable {
    imports: HashMap<String, Vec<String>>,
}

impl ImportTable {
    /// Builds the import table from the top-level `use` items of a file.
    pub fn from_items(items: &[Item]) -> Self {
        let mut table = Self::default();
        for item in items {
            if let Item::Use(use_item) = item {
                table.collect_use_tree(&use_item.tree, &mut Vec::new());
            }
        }
        debug!("Collected {} imports", table.imports.len());
        table
    }

    /// Full path of an imported name.
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.imports.get(name).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.imports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
    }

    /// Recursively walks a use tree
    fn collect_use_tree(&mut self, tree: &UseTree, prefix: &mut Vec<String>) {
        match tree {
            UseTree::Path(path) => {
                prefix.push(path.ident.to_string());
                self.collect_use_tree(&path.tree, prefix);
                prefix.pop();
            }
            UseTree::Group(group) => {
                for item in &group.items {
                    self.collect_use_tree(item, prefix);
                }
            }
            UseTree::Name(name) => {
                let ident = name.ident.to_string();
                // `use crate::model::{self}` imports the module itself
                if ident == "self" {
                    if let Some(module) = prefix.last().cloned() {
                        self.imports.insert(module, prefix.clone());
                    }
                    return;
                }
                let mut full = prefix.clone();
                full.push(ident.clone());
                self.imports.insert(ident, full);
            }
            UseTree::Rename(rename) => {
                let mut full = prefix.clone();
                full.push(rename.ident.to_string());
                self.imports.insert(rename.rename.to_string(), full);
            }
            UseTree::Glob(_) => {
                // Glob imports can't be resolved without reading the target module
            }
        }
    }
}
