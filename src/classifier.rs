//! Type classification of properties.
//!
//! Decides whether a declared type is rendered as a plain value or as a link to another
//! resource. Classification is driven by simple-name matching plus a single level of
//! resolution: the declared type itself, or the element type of an array or collection,
//! is looked up, but never the fields of what it resolves to.

use crate::error::Result;
use crate::type_resolver::{DeclarationKind, TypeLookup};
use log::debug;
use syn::{GenericArgument, PathArguments, Type};

/// Language primitives. Arrays of these are plain scalars (blobs).
const LANGUAGE_PRIMITIVES: &[&str] = &[
    "bool", "char", "str", "u8", "u16", "u32", "u64", "u128", "usize", "i8", "i16", "i32",
    "i64", "i128", "isize", "f32", "f64",
];

/// Scalar, date, numeric, binary and map types rendered inline without resolution.
const SIMPLE_TYPES: &[&str] = &[
    "String",
    "OsString",
    "PathBuf",
    "Decimal",
    "BigDecimal",
    "BigInt",
    "BigUint",
    "Uuid",
    "Ulid",
    "Url",
    "DateTime",
    "NaiveDate",
    "NaiveDateTime",
    "NaiveTime",
    "Date",
    "Time",
    "OffsetDateTime",
    "PrimitiveDateTime",
    "Timestamp",
    "Duration",
    "SystemTime",
    "Instant",
    "Utc",
    "Bytes",
    "ByteBuf",
    "Blob",
    "Value",
    "Map",
    "HashMap",
    "BTreeMap",
    "IndexMap",
    "NonZeroU8",
    "NonZeroU16",
    "NonZeroU32",
    "NonZeroU64",
    "NonZeroUsize",
    "NonZeroI32",
    "NonZeroI64",
];

/// Collection containers, recognized by simple name.
const COLLECTION_TYPES: &[&str] = &[
    "Vec",
    "VecDeque",
    "LinkedList",
    "HashSet",
    "BTreeSet",
    "BinaryHeap",
    "IndexSet",
];

/// Wrappers that don't change how a value is rendered.
const TRANSPARENT_WRAPPERS: &[&str] = &["Option", "Box", "Rc", "Arc", "Cow"];

/// Suffixes of type names whose constraints are lengths rather than ranges.
const LENGTH_TYPE_SUFFIXES: &[&str] = &["String", "str", "Blob", "Bytes"];

/// How a property is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeClassification {
    Primitive,
    Enum,
    Embedded,
    Collection(Box<TypeClassification>),
    Array(Box<TypeClassification>),
    /// A reference to another entity
    Association,
}

impl TypeClassification {
    /// Whether the property links to other resources, directly or as elements.
    pub fn is_association(&self) -> bool {
        match self {
            TypeClassification::Association => true,
            TypeClassification::Collection(inner) | TypeClassification::Array(inner) => {
                **inner == TypeClassification::Association
            }
            _ => false,
        }
    }

    /// Whether the property holds several values.
    pub fn is_plural(&self) -> bool {
        matches!(
            self,
            TypeClassification::Collection(_) | TypeClassification::Array(_)
        )
    }

    fn is_inline(&self) -> bool {
        matches!(
            self,
            TypeClassification::Primitive | TypeClassification::Enum | TypeClassification::Embedded
        )
    }
}

/// Type classifier.
///
/// `generic_params` are the type parameters of the enclosing struct; they can't be resolved
/// and are treated as plain values.
pub struct Classifier<'a> {
    resolver: &'a mut dyn TypeLookup,
    generic_params: Vec<String>,
}

impl<'a> Classifier<'a> {
    pub fn new(resolver: &'a mut dyn TypeLookup, generic_params: Vec<String>) -> Self {
        Self {
            resolver,
            generic_params,
        }
    }

    /// Classify a declared type.
    ///
    /// # Errors
    ///
    /// Fails when a referenced type can't be resolved.
    pub fn classify(&mut self, ty: &Type) -> Result<TypeClassification> {
        let ty = peel(ty);
        let classification = match ty {
            Type::Array(array) => self.classify_sequence(&array.elem, true)?,
            Type::Slice(slice) => self.classify_sequence(&slice.elem, true)?,
            Type::Path(type_path) if type_path.qself.is_none() => {
                let Some(segment) = type_path.path.segments.last() else {
                    return Ok(TypeClassification::Primitive);
                };
                let name = segment.ident.to_string();

                if COLLECTION_TYPES.contains(&name.as_str()) {
                    match first_type_argument(&segment.arguments) {
                        Some(elem) if name == "Vec" && is_named(elem, "u8") => {
                            TypeClassification::Primitive
                        }
                        Some(elem) => {
                            self.classify_sequence(elem, false)?
                        }
                        None => TypeClassification::Collection(Box::new(
                            TypeClassification::Primitive,
                        )),
                    }
                } else {
                    self.classify_named(&type_path.path, &name)?
                }
            }
            // tuples, function pointers, trait objects, ...
            _ => TypeClassification::Primitive,
        };
        debug!("Classified {} as {:?}", type_name(ty), classification);
        Ok(classification)
    }

    /// Arrays of language primitives are blobs; other sequences keep their element
    /// classification unless the elements are associations.
    fn classify_sequence(&mut self, elem: &Type, array: bool) -> Result<TypeClassification> {
        let elem = peel(elem);
        if array && is_language_primitive(elem) {
            return Ok(TypeClassification::Primitive);
        }

        let inner = match elem {
            Type::Path(type_path) if type_path.qself.is_none() => {
                match type_path.path.segments.last() {
                    Some(segment) => {
                        let name = segment.ident.to_string();
                        if COLLECTION_TYPES.contains(&name.as_str()) {
                            // nested collections are not resolved any further
                            TypeClassification::Association
                        } else {
                            self.classify_named(&type_path.path, &name)?
                        }
                    }
                    None => TypeClassification::Primitive,
                }
            }
            Type::Array(_) | Type::Slice(_) => TypeClassification::Association,
            _ => TypeClassification::Primitive,
        };

        let inner = if inner.is_inline() {
            Box::new(inner)
        } else {
            Box::new(TypeClassification::Association)
        };
        Ok(if array {
            TypeClassification::Array(inner)
        } else {
            TypeClassification::Collection(inner)
        })
    }

    fn classify_named(&mut self, path: &syn::Path, name: &str) -> Result<TypeClassification> {
        if LANGUAGE_PRIMITIVES.contains(&name)
            || SIMPLE_TYPES.contains(&name)
            || self.generic_params.iter().any(|p| p == name)
        {
            return Ok(TypeClassification::Primitive);
        }
        if name == "Self" {
            return Ok(TypeClassification::Association);
        }

        Ok(match self.resolver.lookup(path)? {
            DeclarationKind::Enum => TypeClassification::Enum,
            DeclarationKind::Embeddable => TypeClassification::Embedded,
            DeclarationKind::Struct | DeclarationKind::Other => TypeClassification::Association,
        })
    }
}

/// Whether constraints on `ty` describe lengths: strings, blobs and arrays.
pub fn is_length_like(ty: &Type) -> bool {
    match peel(ty) {
        Type::Array(_) | Type::Slice(_) => true,
        Type::Path(type_path) => match type_path.path.segments.last() {
            Some(segment) => {
                let name = segment.ident.to_string();
                if name == "Vec" {
                    return first_type_argument(&segment.arguments)
                        .is_some_and(|elem| is_named(elem, "u8"));
                }
                LENGTH_TYPE_SUFFIXES
                    .iter()
                    .any(|suffix| name.ends_with(suffix))
            }
            None => false,
        },
        _ => false,
    }
}

/// Strips references, parentheses and transparent wrappers.
fn peel(ty: &Type) -> &Type {
    match ty {
        Type::Reference(reference) => peel(&reference.elem),
        Type::Paren(paren) => peel(&paren.elem),
        Type::Group(group) => peel(&group.elem),
        Type::Path(type_path) if type_path.qself.is_none() => {
            let Some(segment) = type_path.path.segments.last() else {
                return ty;
            };
            if !TRANSPARENT_WRAPPERS.contains(&segment.ident.to_string().as_str()) {
                return ty;
            }
            match last_type_argument(&segment.arguments) {
                Some(inner) => peel(inner),
                None => ty,
            }
        }
        _ => ty,
    }
}

fn first_type_argument(arguments: &PathArguments) -> Option<&Type> {
    match arguments {
        PathArguments::AngleBracketed(args) => args.args.iter().find_map(|arg| match arg {
            GenericArgument::Type(ty) => Some(ty),
            _ => None,
        }),
        _ => None,
    }
}

/// `Cow<'a, str>` carries its type after the lifetime
fn last_type_argument(arguments: &PathArguments) -> Option<&Type> {
    match arguments {
        PathArguments::AngleBracketed(args) => args
            .args
            .iter()
            .filter_map(|arg| match arg {
                GenericArgument::Type(ty) => Some(ty),
                _ => None,
            })
            .last(),
        _ => None,
    }
}

fn is_named(ty: &Type, name: &str) -> bool {
    match peel(ty) {
        Type::Path(type_path) => type_path.path.is_ident(name),
        _ => false,
    }
}

fn is_language_primitive(ty: &Type) -> bool {
    match ty {
        Type::Path(type_path) => type_path
            .path
            .get_ident()
            .is_some_and(|ident| LANGUAGE_PRIMITIVES.contains(&ident.to_string().as_str())),
        _ => false,
    }
}

fn type_name(ty: &Type) -> String {
    match ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .iter()
            .map(|s| s.ident.to_string())
            .collect::<Vec<_>>()
            .join("::"),
        Type::Array(_) => "[array]".to_string(),
        Type::Slice(_) => "[slice]".to_string(),
        _ => "<type>".to_string(),
    }
}
