//! Schema engine: definition language, validation, and derivation.
//!
//! A schema definition enters as text, is validated against the platform
//! conventions, and is derived into the variants the rest of the pipeline
//! consumes (see [`types::DerivedSchemas`]).

pub mod derive;
pub mod loader;
pub mod types;
pub mod validation;

pub use derive::{base_schema, derive, print_schema, ORIGIN_TYPE};
pub use loader::{load, load_from_store, persist, DEFAULT_SCHEMA, SCHEMA_DOCUMENT_ID};
pub use types::{
    DerivedSchemas, FieldDeclaration, ObjectTypeDeclaration, Schema, SchemaDefinition,
    SchemaError, TypeDeclaration, ValidatedSchema, OOI_UNION,
};

#[cfg(test)]
mod tests;
