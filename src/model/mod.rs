//! Runtime entity model.
//!
//! An [`Entity`] is one Object of Interest: a typed, content-addressed record
//! produced by parsing a raw payload against the active schema. Identity
//! (`primary_key`) and the display label (`human_readable`) are always
//! computed at construction time, never accepted from the outside.

mod identity;

use std::collections::BTreeMap;
use std::collections::HashSet;

pub use identity::{flatten_properties, IdentityError};

/// Field names that every entity carries and that never count as user fields.
pub const RESERVED_FIELDS: [&str; 3] = ["object_type", "primary_key", "human_readable"];

/// A single property value on an entity instance.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// An enum member, reduced to its underlying value.
    Enum(String),
    /// A nested entity instance (in-memory composition).
    Entity(Box<Entity>),
    List(Vec<PropertyValue>),
}

impl PropertyValue {
    /// Natural string form, as used in natural-key computation.
    ///
    /// Nested entities contribute their own primary key, not their content.
    pub fn key_part(&self) -> String {
        match self {
            PropertyValue::String(s) => s.clone(),
            PropertyValue::Int(i) => i.to_string(),
            PropertyValue::Float(f) => f.to_string(),
            PropertyValue::Bool(b) => b.to_string(),
            PropertyValue::Enum(value) => value.clone(),
            PropertyValue::Entity(entity) => entity.primary_key.clone(),
            PropertyValue::List(items) => items
                .iter()
                .map(PropertyValue::key_part)
                .collect::<Vec<_>>()
                .join("|"),
        }
    }
}

/// One Object of Interest instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub object_type: String,
    /// Content hash over the natural-key values. Computed, stable.
    pub primary_key: String,
    /// Display label rendered from the type's format template. Computed.
    pub human_readable: String,
    properties: BTreeMap<String, PropertyValue>,
}

impl Entity {
    /// Construct an entity, computing its primary key first and its
    /// human-readable label second (nested entities already carry their keys).
    pub fn new(
        object_type: &str,
        properties: BTreeMap<String, PropertyValue>,
        natural_key_attrs: &[String],
        format: &str,
    ) -> Result<Self, IdentityError> {
        let primary_key = identity::compute_primary_key(object_type, &properties, natural_key_attrs)?;
        let human_readable = identity::render_human_readable(object_type, &properties, format)?;

        Ok(Self {
            object_type: object_type.to_string(),
            primary_key,
            human_readable,
            properties,
        })
    }

    pub fn get(&self, field: &str) -> Option<&PropertyValue> {
        self.properties.get(field)
    }

    pub fn properties(&self) -> &BTreeMap<String, PropertyValue> {
        &self.properties
    }

    /// Depth-first traversal of the entity graph: every entity nested inside
    /// this one, children before their parent, the instance itself last.
    /// Cycle safe and restartable; drives atomic multi-entity persistence.
    pub fn sub_objects(&self) -> SubObjects<'_> {
        SubObjects {
            stack: vec![Frame::Enter(self)],
            visited: HashSet::new(),
        }
    }
}

enum Frame<'a> {
    Enter(&'a Entity),
    Exit(&'a Entity),
}

/// Lazy post-order iterator over an entity graph. See [`Entity::sub_objects`].
pub struct SubObjects<'a> {
    stack: Vec<Frame<'a>>,
    visited: HashSet<&'a str>,
}

impl<'a> Iterator for SubObjects<'a> {
    type Item = &'a Entity;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(frame) = self.stack.pop() {
            match frame {
                Frame::Enter(entity) => {
                    if !self.visited.insert(entity.primary_key.as_str()) {
                        continue;
                    }
                    self.stack.push(Frame::Exit(entity));
                    // Pushed after Exit so children are yielded first.
                    for value in entity.properties.values() {
                        push_children(&mut self.stack, value);
                    }
                }
                Frame::Exit(entity) => return Some(entity),
            }
        }
        None
    }
}

fn push_children<'a>(stack: &mut Vec<Frame<'a>>, value: &'a PropertyValue) {
    match value {
        PropertyValue::Entity(child) => stack.push(Frame::Enter(child)),
        PropertyValue::List(items) => {
            for item in items {
                push_children(stack, item);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests;
