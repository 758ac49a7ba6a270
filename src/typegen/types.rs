//! Runtime record-type descriptors.

use std::collections::BTreeMap;

use crate::model::IdentityError;

/// Errors raised during record-type generation or payload parsing. Fatal for
/// the payload (or schema) at hand only.
#[derive(Debug, thiserror::Error)]
pub enum TypeGenError {
    #[error("unknown object_type discriminator [object_type={0}]")]
    UnknownObjectType(String),

    #[error("payload has no object_type discriminator")]
    MissingDiscriminator,

    #[error("entity payload must be a JSON object")]
    InvalidPayload,

    #[error("field type cannot be resolved [type={type_name}, field={field}, referenced={referenced}]")]
    UnresolvableFieldType {
        type_name: String,
        field: String,
        referenced: String,
    },

    #[error("payload is missing a declared field [type={type_name}, field={field}]")]
    MissingField { type_name: String, field: String },

    #[error("field value does not match its declared type [type={type_name}, field={field}, expected={expected}]")]
    InvalidValue {
        type_name: String,
        field: String,
        expected: String,
    },

    #[error(transparent)]
    Identity(#[from] IdentityError),
}

/// Result alias for type generation.
pub type Result<T> = std::result::Result<T, TypeGenError>;

/// Resolved kind of a single field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    String,
    Int,
    Float,
    Boolean,
    Id,
    /// Closed set of named values.
    Enum { name: String, values: Vec<String> },
    /// Reference to another entity type, by name. By-name references keep
    /// self-referential graphs finite.
    Entity(String),
    /// Tagged variant over entity member types.
    Union { name: String, members: Vec<String> },
}

impl FieldKind {
    pub fn describe(&self) -> String {
        match self {
            FieldKind::String => "String".to_string(),
            FieldKind::Int => "Int".to_string(),
            FieldKind::Float => "Float".to_string(),
            FieldKind::Boolean => "Boolean".to_string(),
            FieldKind::Id => "ID".to_string(),
            FieldKind::Enum { name, .. } => name.clone(),
            FieldKind::Entity(name) => name.clone(),
            FieldKind::Union { name, .. } => name.clone(),
        }
    }

    pub fn is_entity(&self) -> bool {
        matches!(self, FieldKind::Entity(_))
    }
}

/// Field shape: kind plus multiplicity.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldType {
    pub kind: FieldKind,
    pub list: bool,
}

/// Runtime shape of one entity type.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordType {
    pub name: String,
    pub fields: BTreeMap<String, FieldType>,
    /// Natural-key attribute names, in declaration order.
    pub natural_key: Vec<String>,
    /// Human-readable format template.
    pub format: String,
}
