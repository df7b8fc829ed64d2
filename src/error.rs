use std::path::PathBuf;

/// Failures while turning a type descriptor into a schema tree.
#[derive(Debug, thiserror::Error)]
pub enum DeriveError {
    #[error("type `{0}` is not registered in the catalog")]
    UnknownType(String),

    /// A list/set whose generic arguments do not name exactly one element type.
    #[error("collection `{type_name}` needs exactly one element type, found {arity}")]
    UnresolvedElementType { type_name: String, arity: usize },

    #[error("recursive type: {}", .chain.join(" -> "))]
    RecursiveType { chain: Vec<String> },

    #[error("schema nesting exceeded the limit of {limit} levels at `{type_name}`")]
    DepthExceeded { type_name: String, limit: usize },
}

/// Failures while loading catalog documents.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog ({origin}) at JSON path {json_path}: {message}")]
    Parse {
        origin: String,
        json_path: String,
        message: String,
    },

    #[error("type `{name}` is defined twice in {origin}")]
    DuplicateType { name: String, origin: String },

    #[error("invalid input pattern `{pattern}`: {message}")]
    Pattern { pattern: String, message: String },

    #[error("glob pattern matched no files: {0}")]
    NoMatches(String),
}
