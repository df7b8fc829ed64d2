//! Named type descriptors, registered in code or loaded from JSON documents.
//!
//! A catalog document looks like:
//!
//! ```json
//! { "types": [
//!     { "name": "Person", "kind": "structured", "description": "A person",
//!       "members": [
//!         { "name": "name", "type": "String" },
//!         { "name": "tags", "type": "List", "type_args": ["String"] }
//!       ] }
//! ] }
//! ```
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;

use crate::descriptor::{Reflect, Shape, TypeDescriptor};
use crate::error::CatalogError;

const STRING_ALIASES: &[&str] = &["string", "String", "str", "char"];
const INTEGER_ALIASES: &[&str] = &[
    "integer", "int", "long", "short", "byte", "i8", "i16", "i32", "i64", "i128", "isize", "u8",
    "u16", "u32", "u64", "u128", "usize",
];
const NUMBER_ALIASES: &[&str] = &["number", "float", "double", "f32", "f64"];
const BOOLEAN_ALIASES: &[&str] = &["boolean", "bool"];
const COLLECTION_ALIASES: &[&str] = &["list", "List", "set", "Set", "Vec"];

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Lookup of type descriptors by name.
pub trait TypeCatalog {
    fn lookup(&self, name: &str) -> Option<&TypeDescriptor>;
}

/// A catalog with nothing in it; enough for purely native derivations.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyCatalog;

/// Descriptor table keyed by type name, in registration order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    types: IndexMap<String, TypeDescriptor>,
}

/// On-disk shape of a catalog file.
#[derive(Debug, Deserialize)]
pub struct CatalogDocument {
    pub types: Vec<TypeDescriptor>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl TypeCatalog for EmptyCatalog {
    fn lookup(&self, _name: &str) -> Option<&TypeDescriptor> {
        None
    }
}

impl TypeCatalog for Catalog {
    fn lookup(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog pre-populated with primitive and collection aliases.
    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();
        let groups: [(&[&str], fn() -> Shape); 5] = [
            (STRING_ALIASES, || Shape::String),
            (INTEGER_ALIASES, || Shape::Integer),
            (NUMBER_ALIASES, || Shape::Number),
            (BOOLEAN_ALIASES, || Shape::Boolean),
            (COLLECTION_ALIASES, || Shape::Collection),
        ];
        for (aliases, shape) in groups {
            for alias in aliases {
                catalog.insert(TypeDescriptor::new(*alias, shape()));
            }
        }
        catalog
    }

    /// Register a descriptor, returning the one it replaced.
    pub fn insert(&mut self, descriptor: TypeDescriptor) -> Option<TypeDescriptor> {
        self.types.insert(descriptor.name.clone(), descriptor)
    }

    pub fn register<T: Reflect + ?Sized>(&mut self) -> Option<TypeDescriptor> {
        self.insert(T::descriptor())
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Merge a parsed document. A name defined twice in the same document is an
    /// error; redefining a name from an earlier document replaces it.
    pub fn extend_from_document(
        &mut self,
        document: CatalogDocument,
        origin: &str,
    ) -> Result<usize, CatalogError> {
        let mut seen = HashSet::new();
        for descriptor in &document.types {
            if !seen.insert(descriptor.name.as_str()) {
                return Err(CatalogError::DuplicateType {
                    name: descriptor.name.clone(),
                    origin: origin.to_string(),
                });
            }
        }
        let count = document.types.len();
        for descriptor in document.types {
            let name = descriptor.name.clone();
            if self.insert(descriptor).is_some() {
                tracing::warn!(type_name = %name, origin, "catalog entry redefined");
            }
        }
        tracing::debug!(origin, count, "loaded catalog document");
        Ok(count)
    }

    pub fn load_str(&mut self, source: &str, origin: &str) -> Result<usize, CatalogError> {
        let document = crate::path_de::from_str_with_path::<CatalogDocument>(source, origin)?;
        self.extend_from_document(document, origin)
    }

    pub fn load_file(&mut self, path: &Path) -> Result<usize, CatalogError> {
        let source = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_str(&source, &path.to_string_lossy())
    }

    /// Load every file named by `patterns`: literal paths or glob patterns.
    pub fn load_patterns<I>(&mut self, patterns: I) -> Result<usize, CatalogError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut total = 0;
        for path in resolve_file_path_patterns(patterns)? {
            total += self.load_file(&path)?;
        }
        Ok(total)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>, CatalogError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let entries = glob::glob(pattern).map_err(|e| CatalogError::Pattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })?;
            let before = out.len();
            for entry in entries {
                let path = entry.map_err(|e| CatalogError::Io {
                    path: e.path().to_path_buf(),
                    source: e.into_error(),
                })?;
                out.push(path);
            }
            if out.len() == before {
                return Err(CatalogError::NoMatches(pattern.to_string()));
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
