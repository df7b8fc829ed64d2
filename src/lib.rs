//! Derive JSON-Schema descriptions from type metadata.
//!
//! Types describe themselves through [`Reflect`] (native Rust types) or a
//! [`TypeCatalog`] (descriptor tables loaded at runtime). [`Deriver`] turns a
//! type into a [`Schema`] tree and [`render`] turns that tree into an ordered
//! `serde_json::Map` following JSON-Schema key conventions.
pub mod catalog;
pub mod derive;
pub mod descriptor;
pub mod error;
pub mod render;
pub mod schema;
pub mod tool;

mod path_de;

pub use catalog::{Catalog, CatalogDocument, EmptyCatalog, TypeCatalog};
pub use derive::{
    derive_object_schema, derive_schema, object_schema_for, schema_for, DeriveOptions, Deriver,
    DEFAULT_MAX_DEPTH,
};
pub use descriptor::{Member, Reflect, Shape, TypeDescriptor, TypeKey, TypeRef};
pub use error::{CatalogError, DeriveError};
pub use render::{render, render_object, render_properties, render_value};
pub use schema::{ObjectSchema, Schema};
pub use tool::ToolSpecification;
