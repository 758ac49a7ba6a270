//! Object repository: maps entity graphs onto the document store.
//!
//! Entities are flattened into prefixed documents (`<Type>/<field>`) so that
//! every type shares one store keyspace without field collisions; entity
//! values are persisted as links (primary keys), never embedded.

use std::sync::Arc;

use chrono::Utc;
use log::debug;
use serde_json::Value;

use crate::error::OoiGraphError;
use crate::model::{Entity, PropertyValue};
use crate::store::{Document, DocumentStore, StoreError, StoreSession, DOCUMENT_ID_FIELD};
use crate::typegen::{TypeGenError, TypeRegistry};

/// Repository bound to one store handle and one generated type registry.
pub struct ObjectRepository {
    store: Arc<dyn DocumentStore>,
    registry: Arc<TypeRegistry>,
}

impl ObjectRepository {
    pub fn new(store: Arc<dyn DocumentStore>, registry: Arc<TypeRegistry>) -> Self {
        Self { store, registry }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// Serialize an entity to a flat store document. Every field is renamed
    /// `<ObjectType>/<field>` except the reserved attributes; entity values
    /// are replaced by the referenced entity's primary key.
    pub fn serialize(entity: &Entity) -> Document {
        let mut document = Document::new();

        for (name, value) in entity.properties() {
            document.insert(
                format!("{}/{}", entity.object_type, name),
                property_to_json(value),
            );
        }

        document.insert(
            "object_type".to_string(),
            Value::String(entity.object_type.clone()),
        );
        document.insert(
            "primary_key".to_string(),
            Value::String(entity.primary_key.clone()),
        );
        document.insert(
            "human_readable".to_string(),
            Value::String(entity.human_readable.clone()),
        );
        document.insert(
            DOCUMENT_ID_FIELD.to_string(),
            Value::String(entity.primary_key.clone()),
        );

        document
    }

    /// Inverse of [`serialize`]: strip the per-type prefix from prefixed
    /// fields, keep reserved fields as-is, drop the store identifier.
    pub fn deserialize(document: &Document) -> Value {
        let mut raw = serde_json::Map::new();
        for (key, value) in document {
            if key == DOCUMENT_ID_FIELD {
                continue;
            }
            match key.split_once('/') {
                Some((_, field)) => raw.insert(field.to_string(), value.clone()),
                None => raw.insert(key.clone(), value.clone()),
            };
        }
        Value::Object(raw)
    }

    /// Persist an entity and everything nested inside it as one atomic
    /// transaction, every document tagged with the same valid-time.
    pub fn save(&self, entity: &Entity) -> Result<(), StoreError> {
        let valid_time = Utc::now();
        let mut session = StoreSession::new(self.store.as_ref());

        let mut count = 0;
        for member in entity.sub_objects() {
            session.put(Self::serialize(member), valid_time)?;
            count += 1;
        }
        session.commit()?;

        debug!(
            "saved entity graph [root={}, documents={}]",
            entity.primary_key, count
        );
        Ok(())
    }

    /// Fetch one document and deserialize it, without rehydration.
    pub fn fetch(&self, primary_key: &str) -> Result<Value, StoreError> {
        let versioned = self.store.get_document(primary_key)?;
        Ok(Self::deserialize(&versioned.document))
    }

    /// Fetch a document by primary key, rehydrating every field that is both
    /// a natural-key attribute and an entity-typed (foreign key) field. This
    /// restores enough of the natural-key chain for identity recomputation
    /// and display without loading the full graph.
    pub fn get(&self, primary_key: &str) -> Result<Value, OoiGraphError> {
        let mut raw = match self.fetch(primary_key)? {
            Value::Object(map) => map,
            _ => return Err(TypeGenError::InvalidPayload.into()),
        };

        let object_type = raw
            .get("object_type")
            .and_then(|v| v.as_str())
            .ok_or(TypeGenError::MissingDiscriminator)?
            .to_string();
        let record = self
            .registry
            .get(&object_type)
            .ok_or_else(|| TypeGenError::UnknownObjectType(object_type.clone()))?;

        for attr in &record.natural_key {
            let is_foreign_key = record
                .fields
                .get(attr)
                .map(|f| !f.list && f.kind.is_entity())
                .unwrap_or(false);
            if !is_foreign_key {
                continue;
            }
            let foreign_key = match raw.get(attr) {
                Some(Value::String(key)) => key.clone(),
                _ => continue,
            };
            let nested = self.get(&foreign_key)?;
            raw.insert(attr.clone(), nested);
        }

        Ok(Value::Object(raw))
    }
}

fn property_to_json(value: &PropertyValue) -> Value {
    match value {
        PropertyValue::String(s) => Value::String(s.clone()),
        PropertyValue::Int(i) => Value::from(*i),
        PropertyValue::Float(f) => Value::from(*f),
        PropertyValue::Bool(b) => Value::Bool(*b),
        PropertyValue::Enum(value) => Value::String(value.clone()),
        // Link, not embed.
        PropertyValue::Entity(entity) => Value::String(entity.primary_key.clone()),
        PropertyValue::List(items) => Value::Array(items.iter().map(property_to_json).collect()),
    }
}
