//! Platform validation rules for schema definitions.
//!
//! Every rule produces a distinct, stable error message keyed by the
//! offending type name; a single violation rejects the whole definition.

use once_cell::sync::Lazy;
use regex::Regex;

use super::types::{
    ObjectTypeDeclaration, Result, SchemaDefinition, SchemaError, TypeDeclaration,
    BASE_INTERFACE, OOI_INTERFACE, RESERVED_TYPE_NAMES, UNION_PREFIX,
};

static PASCAL_CASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[A-Z][a-z0-9]*)+$").unwrap());

/// Validate a parsed schema definition against the platform conventions.
pub fn validate(definition: &SchemaDefinition) -> Result<()> {
    let mut seen = std::collections::BTreeSet::new();

    for declaration in &definition.types {
        let name = declaration.name();

        validate_kind(declaration)?;
        validate_name(name)?;

        if !seen.insert(name.to_string()) {
            return Err(SchemaError::Validation(format!(
                "Type is declared more than once [type={}]",
                name
            )));
        }

        match declaration {
            TypeDeclaration::Type(object_type) => validate_object_type(object_type)?,
            TypeDeclaration::Union(union) => {
                if !union.name.starts_with(UNION_PREFIX) {
                    return Err(SchemaError::Validation(format!(
                        "Self-defined unions must start with a {} [type={}]",
                        UNION_PREFIX, union.name
                    )));
                }
            }
            _ => {}
        }
    }

    Ok(())
}

/// The schema language is restricted to Type, Enum, Union, and Interface.
fn validate_kind(declaration: &TypeDeclaration) -> Result<()> {
    match declaration {
        TypeDeclaration::Scalar(scalar) => Err(SchemaError::Validation(format!(
            "A schema may only define a Type, Enum, Union, or Interface, not Scalar [type={}]",
            scalar.name
        ))),
        TypeDeclaration::Directive(directive) => Err(SchemaError::Validation(format!(
            "A schema may only define a Type, Enum, Union, or Interface, not Directive [directive={}]",
            directive.name
        ))),
        TypeDeclaration::Input(input) => Err(SchemaError::Validation(format!(
            "A schema may only define a Type, Enum, Union, or Interface, not Input [type={}]",
            input.name
        ))),
        _ => Ok(()),
    }
}

fn validate_name(name: &str) -> Result<()> {
    if RESERVED_TYPE_NAMES.contains(&name) {
        return Err(SchemaError::Validation(format!(
            "Use of reserved type name is not allowed [type={}]",
            name
        )));
    }
    if !PASCAL_CASE.is_match(name) {
        return Err(SchemaError::Validation(format!(
            "Object types must follow PascalCase conventions [type={}]",
            name
        )));
    }
    Ok(())
}

fn validate_object_type(object_type: &ObjectTypeDeclaration) -> Result<()> {
    let has_base = object_type.interfaces.iter().any(|i| i == BASE_INTERFACE);
    let has_ooi = object_type.interfaces.iter().any(|i| i == OOI_INTERFACE);

    let missing = match (has_base, has_ooi) {
        (true, true) => None,
        (false, true) => Some("missing BaseObject"),
        (true, false) => Some("missing OOI"),
        (false, false) => Some("missing both"),
    };
    if let Some(missing) = missing {
        return Err(SchemaError::Validation(format!(
            "An object must inherit both BaseObject and OOI ({}) [type={}]",
            missing, object_type.name
        )));
    }

    for attr in &object_type.natural_key {
        if !object_type.fields.contains_key(attr) {
            return Err(SchemaError::Validation(format!(
                "Natural keys must be defined as fields [type={}, natural_key={}]",
                object_type.name, attr
            )));
        }
    }

    Ok(())
}
