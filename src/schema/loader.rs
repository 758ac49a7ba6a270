//! Schema loading and persistence.
//!
//! The active schema definition lives in the backing store under a fixed
//! document id; when that document is absent the bundled default definition
//! takes over. Any other store failure on the fetch is fatal.

use chrono::Utc;
use log::info;

use crate::error::OoiGraphError;
use crate::store::{Document, DocumentStore, StoreSession, DOCUMENT_ID_FIELD};

use super::types::{Result, SchemaDefinition, SchemaError, TypeDeclaration, ValidatedSchema};
use super::{derive::base_schema, validation};

/// Store document id under which the schema definition is persisted.
pub const SCHEMA_DOCUMENT_ID: &str = "schema";

/// Field of the schema document holding the definition text.
pub const SCHEMA_FIELD: &str = "schema";

/// Bundled default schema definition, used when no persisted copy exists.
pub const DEFAULT_SCHEMA: &str = include_str!("default_schema.json");

/// Parse and validate a schema definition text, merging it onto the base
/// schema. A brand-new `ValidatedSchema` is produced every time; nothing is
/// mutated in place.
pub fn load(definition: &str) -> Result<ValidatedSchema> {
    let parsed = SchemaDefinition::parse(definition)?;
    validation::validate(&parsed)?;

    let mut schema = base_schema();
    for declaration in parsed.types {
        schema.insert(declaration);
    }
    check_references(&schema)?;

    Ok(ValidatedSchema {
        schema,
        definition: definition.to_string(),
    })
}

/// Every field type and union member must name a declared type or a builtin
/// scalar. Caught here rather than at generation time so a dangling name
/// rejects the definition as a whole.
fn check_references(schema: &super::types::Schema) -> Result<()> {
    for object_type in schema.object_types() {
        for (field_name, field) in &object_type.fields {
            let known = super::types::BUILTIN_SCALARS.contains(&field.type_name.as_str())
                || schema.contains(&field.type_name);
            if !known {
                return Err(SchemaError::Validation(format!(
                    "Field references an undeclared type [type={}, field={}, referenced={}]",
                    object_type.name, field_name, field.type_name
                )));
            }
        }
    }
    for union in schema.unions() {
        for member in &union.members {
            match schema.get(member) {
                Some(TypeDeclaration::Type(_)) => {}
                _ => {
                    return Err(SchemaError::Validation(format!(
                        "Union members must be object types [type={}, member={}]",
                        union.name, member
                    )))
                }
            }
        }
    }
    Ok(())
}

/// Load the schema definition from the store, falling back to the bundled
/// default when no persisted copy exists.
pub fn load_from_store(
    store: &dyn DocumentStore,
    document_id: &str,
) -> std::result::Result<ValidatedSchema, OoiGraphError> {
    match store.get_document(document_id) {
        Ok(versioned) => {
            let definition = versioned
                .document
                .get(SCHEMA_FIELD)
                .and_then(|v| v.as_str())
                .ok_or_else(|| {
                    SchemaError::Parse(format!(
                        "persisted schema document has no '{}' field",
                        SCHEMA_FIELD
                    ))
                })?;
            Ok(load(definition)?)
        }
        Err(err) if err.is_not_found() => {
            info!(
                "no schema found in store [id={}], using bundled default",
                document_id
            );
            Ok(load(DEFAULT_SCHEMA)?)
        }
        Err(err) => Err(err.into()),
    }
}

/// Persist a schema definition text to the store.
pub fn persist(
    store: &dyn DocumentStore,
    document_id: &str,
    validated: &ValidatedSchema,
) -> std::result::Result<(), OoiGraphError> {
    let mut document = Document::new();
    document.insert(
        DOCUMENT_ID_FIELD.to_string(),
        serde_json::Value::String(document_id.to_string()),
    );
    document.insert(
        SCHEMA_FIELD.to_string(),
        serde_json::Value::String(validated.definition.clone()),
    );

    let mut session = StoreSession::new(store);
    session.put(document, Utc::now())?;
    session.commit()?;
    Ok(())
}
