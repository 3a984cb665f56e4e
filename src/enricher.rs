//! The enrichment driver.
//!
//! Walks the source tree and, per file, adds or updates the schema attribute of every struct,
//! its named fields and its getters. Files are rewritten by splicing text, so only the
//! patched attributes change.

use crate::annotation::{AnnotationPatch, SCHEMA_ANNOTATION};
use crate::attributes::{find_attribute, find_attributes, AttributeArgs};
use crate::classifier::{is_length_like, Classifier};
use crate::constraints::{self, ConstraintRecord};
use crate::descriptions::DescriptionCatalogue;
use crate::doc_comment::{doc_comment, split, DocText};
use crate::error::{Error, Result};
use crate::narrator::{narrate, Narration};
use crate::parser::AstParser;
use crate::rewrite::{apply_edits, head_span, LineIndex, SourceEdit};
use crate::scanner::FileScanner;
use crate::type_resolver::TypeResolver;
use anyhow::Context;
use convert_case::{Case, Casing};
use log::{debug, info, warn};
use proc_macro2::TokenStream;
use quote::ToTokens;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use syn::visit::{self, Visit};
use syn::{
    Attribute, Fields, FnArg, ImplItem, ImplItemFn, ItemFn, ItemImpl, ItemMod, ItemStruct,
    ReturnType, Type,
};

const BYTE_ORDER_MARK: &str = "\u{feff}";
const SERDE_ATTRIBUTE: &str = "serde";

/// Behaviour switches of a run.
#[derive(Debug, Default)]
pub struct EnricherOptions {
    /// Glob patterns of files to enrich; empty selects every file
    pub includes: Vec<String>,
    /// Glob patterns of files and directories to skip
    pub excludes: Vec<String>,
    /// Describe associations as links (URIs) instead of embedded values
    pub hateoas: bool,
    /// Fallback texts for declarations without doc comments
    pub descriptions: Option<DescriptionCatalogue>,
}

/// Counters of a finished run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EnrichSummary {
    pub files_scanned: usize,
    pub files_rewritten: usize,
    pub declarations_enriched: usize,
    pub warnings: Vec<String>,
}

/// Outcome of a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub declarations: usize,
    pub rewritten: bool,
}

/// Rewrites the Rust files below a source root.
///
/// # Example
///
/// ```no_run
/// use schema_enricher::enricher::{Enricher, EnricherOptions};
/// use std::path::PathBuf;
///
/// let enricher = Enricher::new(PathBuf::from("./src"), EnricherOptions::default());
/// let summary = enricher.enrich().unwrap();
/// println!("Rewrote {} files", summary.files_rewritten);
/// ```
pub struct Enricher {
    source_root: PathBuf,
    options: EnricherOptions,
}

impl Enricher {
    pub fn new(source_root: PathBuf, options: EnricherOptions) -> Self {
        Self {
            source_root,
            options,
        }
    }

    /// Enriches every selected file.
    ///
    /// Files are processed one after the other and written back before the next one is
    /// read. The first failing file aborts the run; files written before stay written.
    ///
    /// # Errors
    ///
    /// Returns an error if the source root can't be walked, a pattern is invalid, or a file
    /// can't be read, parsed, resolved or written.
    pub fn enrich(&self) -> anyhow::Result<EnrichSummary> {
        let scanner = FileScanner::new(self.source_root.clone())
            .with_includes(&self.options.includes)?
            .with_excludes(&self.options.excludes)?;
        let scan_result = scanner.scan()?;
        info!("Found {} Rust files", scan_result.rust_files.len());

        let mut summary = EnrichSummary {
            warnings: scan_result.warnings,
            ..Default::default()
        };

        for path in &scan_result.rust_files {
            let original = match fs::read_to_string(path) {
                Ok(original) => original,
                Err(e) => {
                    // unreadable files are skipped like inaccessible walk entries
                    let warning = format!("Failed to read {}: {}", path.display(), e);
                    warn!("{}", warning);
                    summary.warnings.push(warning);
                    continue;
                }
            };
            let outcome = self
                .rewrite(path, &original)
                .with_context(|| format!("Failed to enrich {}", path.display()))?;
            summary.files_scanned += 1;
            summary.declarations_enriched += outcome.declarations;
            if outcome.rewritten {
                summary.files_rewritten += 1;
            }
        }

        info!(
            "Enriched {} declarations, rewrote {} of {} files",
            summary.declarations_enriched, summary.files_rewritten, summary.files_scanned
        );
        Ok(summary)
    }

    /// Enriches a single file, writing it back only when its text changed.
    pub fn enrich_file(&self, path: &Path) -> Result<FileOutcome> {
        let original = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        self.rewrite(path, &original)
    }

    fn rewrite(&self, path: &Path, original: &str) -> Result<FileOutcome> {
        let (enriched, declarations) = self.enrich_source(path, original)?;

        let rewritten = enriched != original;
        if rewritten {
            fs::write(path, &enriched).map_err(|e| Error::io(path, e))?;
            info!("Rewrote {} ({} declarations)", path.display(), declarations);
        } else {
            debug!("{} is up to date", path.display());
        }

        Ok(FileOutcome {
            declarations,
            rewritten,
        })
    }

    /// Enriches source text that belongs to `path`.
    ///
    /// `path` locates the file in the source tree for resolving the types it references.
    ///
    /// # Returns
    ///
    /// The new source text and the number of enriched declarations.
    pub fn enrich_source(&self, path: &Path, source: &str) -> Result<(String, usize)> {
        let parsed = AstParser::parse_source(path, source.to_string())?;
        let mut resolver = TypeResolver::for_file(&parsed, &self.source_root);
        let index = LineIndex::new(&parsed.source);

        let mut collector = DeclarationCollector::default();
        collector.visit_file(&parsed.syntax_tree);
        collector.finish();

        let mut pass = FilePass {
            options: &self.options,
            index: &index,
            edits: Vec::new(),
            declarations: 0,
        };
        for scope in &collector.scopes {
            resolver.enter_module(&scope.module);
            for item in &scope.structs {
                pass.enrich_struct(item, &scope.impls, &mut resolver)?;
            }
        }

        let declarations = pass.declarations;
        let mut output = apply_edits(&parsed.source, pass.edits);
        if parsed.has_bom {
            output.insert_str(0, BYTE_ORDER_MARK);
        }
        Ok((output, declarations))
    }
}

/// Structs and inherent impls of one module.
#[derive(Default)]
struct Scope<'ast> {
    /// Path of the inline module, empty for the file itself
    module: Vec<String>,
    structs: Vec<&'ast ItemStruct>,
    impls: Vec<&'ast ItemImpl>,
}

/// Collects structs and impls per module, including inline `mod` blocks.
struct DeclarationCollector<'ast> {
    scopes: Vec<Scope<'ast>>,
    stack: Vec<Scope<'ast>>,
}

impl Default for DeclarationCollector<'_> {
    fn default() -> Self {
        Self {
            scopes: Vec::new(),
            stack: vec![Scope::default()],
        }
    }
}

impl DeclarationCollector<'_> {
    fn finish(&mut self) {
        while let Some(scope) = self.stack.pop() {
            self.scopes.push(scope);
        }
    }
}

impl<'ast> Visit<'ast> for DeclarationCollector<'ast> {
    fn visit_item_mod(&mut self, node: &'ast ItemMod) {
        let mut module = self
            .stack
            .last()
            .map(|scope| scope.module.clone())
            .unwrap_or_default();
        module.push(node.ident.to_string());
        self.stack.push(Scope {
            module,
            ..Default::default()
        });
        visit::visit_item_mod(self, node);
        if let Some(scope) = self.stack.pop() {
            self.scopes.push(scope);
        }
    }

    fn visit_item_struct(&mut self, node: &'ast ItemStruct) {
        if let Some(scope) = self.stack.last_mut() {
            scope.structs.push(node);
        }
    }

    fn visit_item_impl(&mut self, node: &'ast ItemImpl) {
        if node.trait_.is_some() {
            return;
        }
        if let Some(scope) = self.stack.last_mut() {
            scope.impls.push(node);
        }
    }

    // items local to function bodies are not part of the model
    fn visit_item_fn(&mut self, _node: &'ast ItemFn) {}
}

/// Edits collected while enriching one file.
struct FilePass<'a> {
    options: &'a EnricherOptions,
    index: &'a LineIndex<'a>,
    edits: Vec<SourceEdit>,
    declarations: usize,
}

/// A field or getter.
struct Member<'a> {
    /// Property name
    name: String,
    ty: &'a Type,
    attrs: &'a [Attribute],
    tokens: TokenStream,
}

impl FilePass<'_> {
    fn enrich_struct(
        &mut self,
        item: &ItemStruct,
        impls: &[&ItemImpl],
        resolver: &mut TypeResolver,
    ) -> Result<()> {
        let type_name = item.ident.to_string();
        debug!("Enriching struct {}", type_name);

        let catalogue_text = self
            .options
            .descriptions
            .as_ref()
            .and_then(|catalogue| catalogue.type_description(&type_name));
        let doc = doc_text(&item.attrs, catalogue_text);
        self.patch(&item.attrs, item.to_token_stream(), |existing| {
            crate::synthesizer::synthesize(existing, &doc, None, None, false)
        });

        let field_names: HashSet<String> = match &item.fields {
            Fields::Named(named) => named
                .named
                .iter()
                .filter_map(|f| f.ident.as_ref().map(|i| i.to_string()))
                .collect(),
            _ => HashSet::new(),
        };

        let mut members: Vec<Member> = Vec::new();
        if let Fields::Named(named) = &item.fields {
            for field in &named.named {
                if let Some(ident) = &field.ident {
                    members.push(Member {
                        name: ident.to_string(),
                        ty: &field.ty,
                        attrs: &field.attrs,
                        tokens: field.to_token_stream(),
                    });
                }
            }
        }
        for imp in impls.iter().filter(|imp| implements(imp, &type_name)) {
            for impl_item in &imp.items {
                if let ImplItem::Fn(method) = impl_item {
                    if let Some((name, ty)) = getter_property(method, &field_names) {
                        members.push(Member {
                            name,
                            ty,
                            attrs: &method.attrs,
                            tokens: method.to_token_stream(),
                        });
                    }
                }
            }
        }

        let generic_params: Vec<String> = item
            .generics
            .type_params()
            .map(|p| p.ident.to_string())
            .collect();
        let rename_all = serde_string(&item.attrs, "rename_all");

        for member in members {
            let catalogue_text = self
                .options
                .descriptions
                .as_ref()
                .and_then(|catalogue| catalogue.member_description(&type_name, &member.name));
            let doc = doc_text(member.attrs, catalogue_text);
            let constraints = constraints::extract(member.attrs);

            let narration = if self.options.hateoas {
                let classification =
                    Classifier::new(&mut *resolver, generic_params.clone()).classify(member.ty)?;
                classification.is_association().then(|| {
                    let link = link_name(&member.name, member.attrs, rename_all.as_deref());
                    narrate(&link, classification.is_plural(), &doc.summary)
                })
            } else {
                None
            };

            self.enrich_member(&member, &doc, &constraints, narration.as_ref());
        }
        Ok(())
    }

    fn enrich_member(
        &mut self,
        member: &Member,
        doc: &DocText,
        constraints: &ConstraintRecord,
        narration: Option<&Narration>,
    ) {
        debug!("Enriching member {}", member.name);
        let length_like = is_length_like(member.ty);
        self.patch(member.attrs, member.tokens.clone(), |existing| {
            crate::synthesizer::synthesize(existing, doc, Some(constraints), narration, length_like)
        });
    }

    /// Replaces the declaration's schema attribute or inserts one above the declaration.
    fn patch(
        &mut self,
        attrs: &[Attribute],
        tokens: TokenStream,
        build: impl FnOnce(Option<AnnotationPatch>) -> AnnotationPatch,
    ) {
        match find_attribute(attrs, SCHEMA_ANNOTATION) {
            Some(attr) => {
                let patch = build(Some(AnnotationPatch::from_existing(attr, self.index)));
                let range = self.index.attribute_range(attr);
                self.edits.push(SourceEdit::replace(range, patch.render()));
            }
            None => {
                let Some(head) = head_span(tokens) else {
                    warn!("Declaration without tokens skipped");
                    return;
                };
                let patch = build(None);
                let offset = self.index.offset(head.start());
                let indent = self.index.indentation(offset);
                let newline = self.index.line_ending(offset);
                self.edits.push(SourceEdit::insert(
                    offset,
                    format!("{}{}{}", patch.render(), newline, indent),
                ));
            }
        }
        self.declarations += 1;
    }
}

/// The doc comment, else the catalogue text, else the placeholder.
fn doc_text(attrs: &[Attribute], catalogue_text: Option<&str>) -> DocText {
    doc_comment(attrs)
        .or_else(|| catalogue_text.map(str::to_string))
        .map(|text| split(&text))
        .unwrap_or_else(DocText::placeholder)
}

fn implements(imp: &ItemImpl, type_name: &str) -> bool {
    match imp.self_ty.as_ref() {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == type_name),
        _ => false,
    }
}

/// Property name and type of a getter: `get_x(&self) -> T` or `is_x(&self) -> bool`, where
/// `x` is not a field.
fn getter_property<'a>(
    method: &'a ImplItemFn,
    field_names: &HashSet<String>,
) -> Option<(String, &'a Type)> {
    let sig = &method.sig;
    if sig.inputs.len() != 1 || !matches!(sig.inputs.first(), Some(FnArg::Receiver(_))) {
        return None;
    }
    let ReturnType::Type(_, ty) = &sig.output else {
        return None;
    };

    let name = sig.ident.to_string();
    let property = if let Some(property) = name.strip_prefix("get_") {
        property
    } else if let Some(property) = name.strip_prefix("is_") {
        let returns_bool = matches!(ty.as_ref(), Type::Path(p) if p.path.is_ident("bool"));
        if !returns_bool {
            return None;
        }
        property
    } else {
        return None;
    };

    if property.is_empty() || field_names.contains(property) {
        return None;
    }
    Some((property.to_string(), ty.as_ref()))
}

/// A string argument of the `serde` attributes, e.g. `rename`.
fn serde_string(attrs: &[Attribute], key: &str) -> Option<String> {
    find_attributes(attrs, SERDE_ATTRIBUTE)
        .map(AttributeArgs::from_attribute)
        .find_map(|args| args.str(key).map(str::to_string))
}

/// Name of the property as clients see it.
fn link_name(name: &str, attrs: &[Attribute], rename_all: Option<&str>) -> String {
    if let Some(renamed) = serde_string(attrs, "rename") {
        return renamed;
    }
    match rename_all {
        Some("lowercase") => name.to_lowercase(),
        Some("UPPERCASE") => name.to_uppercase(),
        Some("PascalCase") => name.to_case(Case::Pascal),
        Some("camelCase") => name.to_case(Case::Camel),
        Some("snake_case") => name.to_case(Case::Snake),
        Some("SCREAMING_SNAKE_CASE") => name.to_case(Case::Snake).to_uppercase(),
        Some("kebab-case") => name.to_case(Case::Kebab),
        Some("SCREAMING-KEBAB-CASE") => name.to_case(Case::Kebab).to_uppercase(),
        _ => name.to_string(),
    }
}
