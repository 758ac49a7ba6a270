//! Identity computation: content-addressed primary keys and display labels.

use std::collections::BTreeMap;

use xxhash_rust::xxh3::xxh3_128;

use super::PropertyValue;

/// Errors raised while computing an entity's derived attributes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    /// A natural-key attribute has no value on the instance.
    #[error("missing natural key attribute [type={object_type}, attribute={attribute}]")]
    MissingNaturalKey {
        object_type: String,
        attribute: String,
    },

    /// The format template names a field that does not flatten to a value.
    #[error("format template placeholder has no value [type={object_type}, placeholder={placeholder}]")]
    MissingPlaceholder {
        object_type: String,
        placeholder: String,
    },
}

/// Compute the content-addressed primary key.
///
/// The hash input is `object_type` followed by the natural-key attribute
/// values in sorted attribute-name order, so field declaration order never
/// matters. Parts are joined with `|` before hashing so adjacent values
/// cannot alias each other.
pub fn compute_primary_key(
    object_type: &str,
    properties: &BTreeMap<String, PropertyValue>,
    natural_key_attrs: &[String],
) -> Result<String, IdentityError> {
    let mut attrs: Vec<&String> = natural_key_attrs.iter().collect();
    attrs.sort();

    let mut parts = vec![object_type.to_string()];
    for attr in attrs {
        let value = properties
            .get(attr)
            .ok_or_else(|| IdentityError::MissingNaturalKey {
                object_type: object_type.to_string(),
                attribute: attr.clone(),
            })?;
        parts.push(value.key_part());
    }

    let digest = xxh3_128(parts.join("|").as_bytes());
    Ok(hex::encode(digest.to_be_bytes()))
}

/// Render the human-readable label from a `{field}` format template.
///
/// Nested entity fields are flattened into `parent_field` keys; a nested
/// entity itself substitutes as its primary key.
pub fn render_human_readable(
    object_type: &str,
    properties: &BTreeMap<String, PropertyValue>,
    format: &str,
) -> Result<String, IdentityError> {
    let flattened = flatten_properties(properties);

    let mut out = String::with_capacity(format.len());
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        if c != '{' {
            out.push(c);
            continue;
        }
        let mut placeholder = String::new();
        for p in chars.by_ref() {
            if p == '}' {
                break;
            }
            placeholder.push(p);
        }
        let value = flattened
            .get(placeholder.as_str())
            .ok_or_else(|| IdentityError::MissingPlaceholder {
                object_type: object_type.to_string(),
                placeholder: placeholder.clone(),
            })?;
        out.push_str(value);
    }
    Ok(out)
}

/// Flatten a property map into string values keyed by `_`-joined paths.
pub fn flatten_properties(properties: &BTreeMap<String, PropertyValue>) -> BTreeMap<String, String> {
    let mut flattened = BTreeMap::new();
    for (name, value) in properties {
        flatten_into(&mut flattened, name, value);
    }
    flattened
}

fn flatten_into(out: &mut BTreeMap<String, String>, key: &str, value: &PropertyValue) {
    match value {
        PropertyValue::Entity(entity) => {
            // The entity field itself renders as its primary key.
            out.insert(key.to_string(), entity.primary_key.clone());
            for (name, nested) in entity.properties() {
                flatten_into(out, &format!("{}_{}", key, name), nested);
            }
        }
        PropertyValue::List(items) => {
            out.insert(key.to_string(), value.key_part());
            for (index, item) in items.iter().enumerate() {
                flatten_into(out, &format!("{}_{}", key, index), item);
            }
        }
        other => {
            out.insert(key.to_string(), other.key_part());
        }
    }
}
