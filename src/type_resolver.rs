use crate::attributes::{find_attribute, find_attributes, AttributeArgs};
use crate::error::{Error, Result};
use crate::imports::ImportTable;
use crate::parser::{AstParser, ParsedFile};
use convert_case::{Case, Casing};
use log::{debug, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use syn::Item;

/// Attribute marking a struct as an embeddable value type.
pub const EMBEDDABLE_ATTRIBUTE: &str = "embeddable";
/// Derive name marking a struct as an embeddable value type.
pub const EMBEDDABLE_DERIVE: &str = "Embeddable";

/// What a type name resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    /// A plain struct, i.e. another entity
    Struct,
    /// A struct inlined into its owner (`#[embeddable]`)
    Embeddable,
    /// An enum
    Enum,
    /// Type alias, trait, union, ...
    Other,
}

/// Looks up the declaration behind a type path.
///
/// The classifier only depends on this trait; [`TypeResolver`] is the file-system backed
/// implementation.
pub trait TypeLookup {
    fn lookup(&mut self, path: &syn::Path) -> Result<DeclarationKind>;
}

/// Type resolver for a single source file.
///
/// Resolution is best-effort, driven by the file's own declarations, its `use` items and
/// the usual module layout (`a/b.rs`, `a/b/mod.rs`). Unimported names fall back to a sibling
/// file named after the type. Referenced files are parsed at most once per resolver; the
/// resolver itself lives for one file pass.
pub struct TypeResolver {
    /// The file whose references are resolved
    file: PathBuf,
    /// The crate's `src` directory used for `crate::` paths
    crate_src: PathBuf,
    /// The file's imports
    imports: ImportTable,
    /// Types declared in the file itself, per inline module path (`[]` is the file level)
    local: HashMap<Vec<String>, HashMap<String, DeclarationKind>>,
    /// Inline module whose declarations are being resolved
    scope: Vec<String>,
    /// Declarations of already parsed referenced files
    type_cache: HashMap<PathBuf, HashMap<String, DeclarationKind>>,
}

impl TypeResolver {
    /// Create a resolver for `parsed`, a file below `source_root`
    pub fn for_file(parsed: &ParsedFile, source_root: &Path) -> Self {
        let crate_src = find_crate_src(&parsed.path, source_root);
        debug!(
            "Initializing TypeResolver for {} (crate src: {})",
            parsed.path.display(),
            crate_src.display()
        );
        Self {
            file: parsed.path.clone(),
            crate_src,
            imports: ImportTable::from_items(&parsed.syntax_tree.items),
            local: inline_module_kinds(&parsed.syntax_tree.items),
            scope: Vec::new(),
            type_cache: HashMap::new(),
        }
    }

    /// Resolve the following lookups from inside the inline module `module` of the file.
    pub fn enter_module(&mut self, module: &[String]) {
        self.scope = module.to_vec();
    }

    /// Declaration of a single-segment name in the current inline module or an enclosing one.
    fn local_kind(&self, type_name: &str) -> Option<DeclarationKind> {
        (0..=self.scope.len())
            .rev()
            .find_map(|depth| self.local.get(&self.scope[..depth])?.get(type_name).copied())
    }

    /// Declaration of `modules::type_name` when `modules` names an inline module of the file.
    fn inline_kind(&self, modules: &[String], type_name: &str) -> Option<DeclarationKind> {
        let mut module = self.scope.clone();
        for (i, segment) in modules.iter().enumerate() {
            match segment.as_str() {
                "self" if i == 0 => {}
                "super" => {
                    module.pop()?;
                }
                "crate" | "self" => return None,
                _ => module.push(segment.clone()),
            }
        }
        self.local.get(&module)?.get(type_name).copied()
    }

    /// Candidate files for a path given as module segments plus type name.
    fn qualified_candidates(&self, modules: &[String], type_name: &str) -> Vec<PathBuf> {
        let (base, rest) = match modules.first().map(String::as_str) {
            Some("crate") => (self.crate_src.clone(), &modules[1..]),
            Some("self") => (module_dir(&self.file), &modules[1..]),
            Some("super") => {
                let mut dir = module_dir(&self.file);
                let supers = modules.iter().take_while(|s| *s == "super").count();
                for _ in 0..supers {
                    if let Some(parent) = dir.parent() {
                        dir = parent.to_path_buf();
                    }
                }
                (dir, &modules[supers..])
            }
            _ => (self.crate_src.clone(), modules),
        };
        module_files(&base, rest, type_name)
    }

    /// Candidate files for an unimported name: the sibling module named after the type.
    fn sibling_candidates(&self, type_name: &str) -> Vec<PathBuf> {
        let dir = self.file.parent().unwrap_or_else(|| Path::new("."));
        let module = type_name.to_case(Case::Snake);
        vec![
            dir.join(format!("{}.rs", module)),
            dir.join(&module).join("mod.rs"),
        ]
    }

    /// Declarations of `path`, parsing it on first use
    fn declarations_in(&mut self, path: &Path) -> Result<&HashMap<String, DeclarationKind>> {
        if !self.type_cache.contains_key(path) {
            let parsed = AstParser::parse_file(path)?;
            let kinds = declaration_kinds(&parsed.syntax_tree.items);
            self.type_cache.insert(path.to_path_buf(), kinds);
        }
        self.type_cache
            .get(path)
            .ok_or_else(|| Error::unresolved(path.display().to_string(), &self.file, "cache miss"))
    }

    /// Search the candidate files in order for `type_name`.
    fn search(&mut self, type_name: &str, candidates: Vec<PathBuf>) -> Result<DeclarationKind> {
        let mut existing = Vec::new();
        for candidate in candidates.iter().filter(|c| c.is_file()) {
            existing.push(candidate.display().to_string());
            if let Some(kind) = self.declarations_in(candidate)?.get(type_name) {
                debug!(
                    "Resolved {} to {:?} in {}",
                    type_name,
                    kind,
                    candidate.display()
                );
                return Ok(*kind);
            }
        }

        let message = if existing.is_empty() {
            format!(
                "no source file found, looked for {}",
                candidates
                    .iter()
                    .map(|c| c.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        } else {
            format!("type is not declared in {}", existing.join(", "))
        };
        warn!("Could not resolve type {}: {}", type_name, message);
        Err(Error::unresolved(type_name, &self.file, message))
    }
}

impl TypeLookup for TypeResolver {
    fn lookup(&mut self, path: &syn::Path) -> Result<DeclarationKind> {
        let segments: Vec<String> = path.segments.iter().map(|s| s.ident.to_string()).collect();
        let Some((type_name, modules)) = segments.split_last() else {
            return Err(Error::unresolved("<empty path>", &self.file, "empty type path"));
        };
        debug!("Resolving type: {}", segments.join("::"));

        if modules.is_empty() {
            if let Some(kind) = self.local_kind(type_name) {
                return Ok(kind);
            }
            if let Some(full) = self.imports.get(type_name).map(<[String]>::to_vec) {
                if let Some((declared_name, import_modules)) = full.split_last() {
                    let candidates = self.qualified_candidates(import_modules, declared_name);
                    return self.search(declared_name, candidates);
                }
            }
            let candidates = self.sibling_candidates(type_name);
            return self.search(type_name, candidates);
        }

        if let Some(kind) = self.inline_kind(modules, type_name) {
            return Ok(kind);
        }

        // `model::Address` where `model` itself was imported
        let mut modules = modules.to_vec();
        let first = modules[0].as_str();
        if !matches!(first, "crate" | "self" | "super") {
            if let Some(full) = self.imports.get(first) {
                let mut expanded = full.to_vec();
                expanded.extend(modules.drain(1..));
                modules = expanded;
            }
        }
        let candidates = self.qualified_candidates(&modules, type_name);
        self.search(type_name, candidates)
    }
}

/// Kinds of the types declared at the top level of a file.
pub fn declaration_kinds(items: &[Item]) -> HashMap<String, DeclarationKind> {
    let mut kinds = HashMap::new();
    for item in items {
        match item {
            Item::Struct(item_struct) => {
                let kind = if is_embeddable(&item_struct.attrs) {
                    DeclarationKind::Embeddable
                } else {
                    DeclarationKind::Struct
                };
                kinds.insert(item_struct.ident.to_string(), kind);
            }
            Item::Enum(item_enum) => {
                kinds.insert(item_enum.ident.to_string(), DeclarationKind::Enum);
            }
            Item::Type(item_type) => {
                kinds.insert(item_type.ident.to_string(), DeclarationKind::Other);
            }
            Item::Trait(item_trait) => {
                kinds.insert(item_trait.ident.to_string(), DeclarationKind::Other);
            }
            Item::Union(item_union) => {
                kinds.insert(item_union.ident.to_string(), DeclarationKind::Other);
            }
            _ => {}
        }
    }
    kinds
}

/// Kinds of the types declared in a file and in each of its inline modules.
fn inline_module_kinds(items: &[Item]) -> HashMap<Vec<String>, HashMap<String, DeclarationKind>> {
    fn collect(
        module: Vec<String>,
        items: &[Item],
        tables: &mut HashMap<Vec<String>, HashMap<String, DeclarationKind>>,
    ) {
        for item in items {
            if let Item::Mod(item_mod) = item {
                if let Some((_, content)) = &item_mod.content {
                    let mut child = module.clone();
                    child.push(item_mod.ident.to_string());
                    collect(child, content, tables);
                }
            }
        }
        tables.insert(module, declaration_kinds(items));
    }

    let mut tables = HashMap::new();
    collect(Vec::new(), items, &mut tables);
    tables
}

/// `#[embeddable]` or `#[derive(Embeddable)]`
pub fn is_embeddable(attrs: &[syn::Attribute]) -> bool {
    find_attribute(attrs, EMBEDDABLE_ATTRIBUTE).is_some()
        || find_attributes(attrs, "derive")
            .any(|attr| AttributeArgs::from_attribute(attr).mentions(EMBEDDABLE_DERIVE))
}

/// Directory holding the child modules of the module defined by `file`.
fn module_dir(file: &Path) -> PathBuf {
    let parent = file.parent().unwrap_or_else(|| Path::new("."));
    match file.file_stem().and_then(|s| s.to_str()) {
        Some("mod") | Some("lib") | Some("main") | None => parent.to_path_buf(),
        Some(stem) => parent.join(stem),
    }
}

/// Files that may declare `type_name` inside the module `base` + `rest`.
fn module_files(base: &Path, rest: &[String], type_name: &str) -> Vec<PathBuf> {
    let type_module = format!("{}.rs", type_name.to_case(Case::Snake));
    match rest.split_last() {
        None => vec![
            base.join("mod.rs"),
            base.with_extension("rs"),
            base.join("lib.rs"),
            base.join("main.rs"),
            base.join(&type_module),
        ],
        Some((last, parents)) => {
            let dir = parents.iter().fold(base.to_path_buf(), |dir, s| dir.join(s));
            vec![
                dir.join(format!("{}.rs", last)),
                dir.join(last).join("mod.rs"),
                dir.join(last).join(&type_module),
            ]
        }
    }
}

/// The `src` directory of the crate owning `file`: next to the nearest `Cargo.toml`.
fn find_crate_src(file: &Path, source_root: &Path) -> PathBuf {
    file.ancestors()
        .skip(1)
        .find(|dir| dir.join("Cargo.toml").is_file())
        .map(|dir| dir.join("src"))
        .unwrap_or_else(|| source_root.to_path_buf())
}
