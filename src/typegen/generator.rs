//! Descriptor generation and payload parsing.

use std::collections::BTreeMap;

use log::debug;
use serde_json::Value;

use crate::model::{Entity, PropertyValue, RESERVED_FIELDS};
use crate::schema::{Schema, TypeDeclaration};

use super::types::{FieldKind, FieldType, RecordType, Result, TypeGenError};

/// Registry of generated record types for one schema version, keyed by type
/// name. Built once per derived schema; immutable afterwards.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    records: BTreeMap<String, RecordType>,
}

/// Generate one record type per entity type in the schema. Memoized by type
/// name: entity fields hold name references, so recursive and
/// self-referential entity graphs terminate.
pub fn generate(schema: &Schema) -> Result<TypeRegistry> {
    let mut records = BTreeMap::new();

    for object_type in schema.object_types() {
        if records.contains_key(&object_type.name) {
            continue;
        }
        debug!("generating record type [type={}]", object_type.name);

        let mut fields = BTreeMap::new();
        for (field_name, field) in &object_type.fields {
            let kind = resolve_kind(schema, &object_type.name, field_name, &field.type_name)?;
            fields.insert(
                field_name.clone(),
                FieldType {
                    kind,
                    list: field.list,
                },
            );
        }

        records.insert(
            object_type.name.clone(),
            RecordType {
                name: object_type.name.clone(),
                fields,
                natural_key: object_type.natural_key.clone(),
                format: object_type.format.clone(),
            },
        );
    }

    Ok(TypeRegistry { records })
}

fn resolve_kind(
    schema: &Schema,
    type_name: &str,
    field: &str,
    referenced: &str,
) -> Result<FieldKind> {
    match referenced {
        "String" => return Ok(FieldKind::String),
        "Int" => return Ok(FieldKind::Int),
        "Float" => return Ok(FieldKind::Float),
        "Boolean" => return Ok(FieldKind::Boolean),
        "ID" => return Ok(FieldKind::Id),
        _ => {}
    }

    match schema.get(referenced) {
        Some(TypeDeclaration::Enum(decl)) => Ok(FieldKind::Enum {
            name: decl.name.clone(),
            values: decl.values.clone(),
        }),
        Some(TypeDeclaration::Type(decl)) => Ok(FieldKind::Entity(decl.name.clone())),
        Some(TypeDeclaration::Union(decl)) => Ok(FieldKind::Union {
            name: decl.name.clone(),
            members: decl.members.clone(),
        }),
        _ => Err(TypeGenError::UnresolvableFieldType {
            type_name: type_name.to_string(),
            field: field.to_string(),
            referenced: referenced.to_string(),
        }),
    }
}

impl TypeRegistry {
    pub fn get(&self, type_name: &str) -> Option<&RecordType> {
        self.records.get(type_name)
    }

    pub fn record_types(&self) -> impl Iterator<Item = &RecordType> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Parse a raw payload into an entity, dispatching on its `object_type`
    /// discriminator and recursing into nested payload values. Identity
    /// attributes are always computed; any `primary_key` or `human_readable`
    /// in the payload is ignored.
    pub fn parse(&self, payload: &Value) -> Result<Entity> {
        let map = payload.as_object().ok_or(TypeGenError::InvalidPayload)?;
        let object_type = map
            .get("object_type")
            .and_then(|v| v.as_str())
            .ok_or(TypeGenError::MissingDiscriminator)?;
        let record = self
            .records
            .get(object_type)
            .ok_or_else(|| TypeGenError::UnknownObjectType(object_type.to_string()))?;

        let mut properties = BTreeMap::new();
        for (field_name, field_type) in &record.fields {
            let value = map
                .get(field_name)
                .ok_or_else(|| TypeGenError::MissingField {
                    type_name: record.name.clone(),
                    field: field_name.clone(),
                })?;
            properties.insert(
                field_name.clone(),
                self.convert(record, field_name, field_type, value)?,
            );
        }

        for key in map.keys() {
            if !record.fields.contains_key(key) && !RESERVED_FIELDS.contains(&key.as_str()) {
                debug!(
                    "ignoring undeclared payload field [type={}, field={}]",
                    record.name, key
                );
            }
        }

        Ok(Entity::new(
            &record.name,
            properties,
            &record.natural_key,
            &record.format,
        )?)
    }

    fn convert(
        &self,
        record: &RecordType,
        field: &str,
        field_type: &FieldType,
        value: &Value,
    ) -> Result<PropertyValue> {
        if field_type.list {
            let items = value.as_array().ok_or_else(|| invalid(record, field, "list"))?;
            let scalar = FieldType {
                kind: field_type.kind.clone(),
                list: false,
            };
            let converted = items
                .iter()
                .map(|item| self.convert(record, field, &scalar, item))
                .collect::<Result<Vec<_>>>()?;
            return Ok(PropertyValue::List(converted));
        }

        match &field_type.kind {
            FieldKind::String | FieldKind::Id => value
                .as_str()
                .map(|s| PropertyValue::String(s.to_string()))
                .ok_or_else(|| invalid(record, field, &field_type.kind.describe())),
            FieldKind::Int => value
                .as_i64()
                .map(PropertyValue::Int)
                .ok_or_else(|| invalid(record, field, "Int")),
            FieldKind::Float => value
                .as_f64()
                .map(PropertyValue::Float)
                .ok_or_else(|| invalid(record, field, "Float")),
            FieldKind::Boolean => value
                .as_bool()
                .map(PropertyValue::Bool)
                .ok_or_else(|| invalid(record, field, "Boolean")),
            FieldKind::Enum { name, values } => {
                let member = value
                    .as_str()
                    .filter(|s| values.iter().any(|v| v == s))
                    .ok_or_else(|| invalid(record, field, name))?;
                Ok(PropertyValue::Enum(member.to_string()))
            }
            FieldKind::Entity(expected) => {
                let nested = self.parse(value)?;
                if nested.object_type != *expected {
                    return Err(invalid(record, field, expected));
                }
                Ok(PropertyValue::Entity(Box::new(nested)))
            }
            FieldKind::Union { name, members } => {
                let nested = self.parse(value)?;
                if !members.contains(&nested.object_type) {
                    return Err(invalid(record, field, name));
                }
                Ok(PropertyValue::Entity(Box::new(nested)))
            }
        }
    }
}

fn invalid(record: &RecordType, field: &str, expected: &str) -> TypeGenError {
    TypeGenError::InvalidValue {
        type_name: record.name.clone(),
        field: field.to_string(),
        expected: expected.to_string(),
    }
}
