//! Resolver bridge: maps hydrated-schema fields to store lookups.
//!
//! Binding walks the hydrated schema once and registers a closure per
//! resolvable field, keyed by `(type name, field name)`. Root query fields
//! become store queries, forward relations become fetches of the linked
//! primary key, and backlink fields become reverse queries over the
//! prefixed forward field.

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;
use serde_json::Value;

use crate::repository::ObjectRepository;
use crate::schema::{Schema, TypeDeclaration, OOI_UNION};
use crate::store::{Document, QueryPattern, StoreError};

/// Errors raised while resolving a schema field against the store.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("no resolver registered [type={type_name}, field={field}]")]
    UnknownField { type_name: String, field: String },

    #[error("relation field requires a parent document [field={field}]")]
    MissingParent { field: String },

    #[error("parent document carries no usable link value [field={field}]")]
    InvalidLink { field: String },

    #[error("document has no object_type discriminator")]
    MissingObjectType,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result alias for resolver operations.
pub type Result<T> = std::result::Result<T, ResolveError>;

/// A bound field resolver. Root query resolvers ignore the parent document;
/// relation resolvers require it.
pub type ResolverFn = Box<dyn Fn(Option<&Document>) -> Result<Value> + Send + Sync>;

/// Dispatch table from `(type name, field name)` to a bound resolver.
pub struct ResolverBridge {
    resolvers: HashMap<(String, String), ResolverFn>,
}

impl ResolverBridge {
    /// Bind every resolvable field of the hydrated schema to the repository.
    pub fn bind(hydrated: &Schema, repository: Arc<ObjectRepository>) -> Self {
        let mut resolvers: HashMap<(String, String), ResolverFn> = HashMap::new();

        if let Some(TypeDeclaration::Type(query)) = hydrated.get("Query") {
            for (field_name, field) in &query.fields {
                let resolver = if field.type_name == OOI_UNION {
                    all_entities_resolver(&repository)
                } else {
                    by_type_resolver(&repository, &field.type_name)
                };
                resolvers.insert(("Query".to_string(), field_name.clone()), resolver);
            }
        }

        for object_type in hydrated.object_types() {
            for (field_name, field) in &object_type.fields {
                if field.backlink {
                    continue;
                }
                let is_relation = matches!(
                    hydrated.get(&field.type_name),
                    Some(TypeDeclaration::Type(_)) | Some(TypeDeclaration::Union(_))
                );
                if !is_relation {
                    continue;
                }

                let prefixed = format!("{}/{}", object_type.name, field_name);
                resolvers.insert(
                    (object_type.name.clone(), field_name.clone()),
                    forward_resolver(&repository, &prefixed, field.list),
                );

                // The reverse side lives on the target type; only entity
                // targets carry one (union targets have no single home).
                if matches!(
                    hydrated.get(&field.type_name),
                    Some(TypeDeclaration::Type(_))
                ) {
                    let backlink_name = field
                        .reverse_name
                        .clone()
                        .unwrap_or_else(|| format!("{}_{}", object_type.name, field_name));
                    resolvers.insert(
                        (field.type_name.clone(), backlink_name),
                        backlink_resolver(&repository, &prefixed, field.list),
                    );
                }
            }
        }

        debug!("bound resolver table [fields={}]", resolvers.len());
        Self { resolvers }
    }

    /// Resolve one field. The parent is the store document the field was
    /// requested on; root query fields take no parent.
    pub fn resolve(
        &self,
        type_name: &str,
        field: &str,
        parent: Option<&Document>,
    ) -> Result<Value> {
        let resolver = self
            .resolvers
            .get(&(type_name.to_string(), field.to_string()))
            .ok_or_else(|| ResolveError::UnknownField {
                type_name: type_name.to_string(),
                field: field.to_string(),
            })?;
        resolver(parent)
    }

    pub fn contains(&self, type_name: &str, field: &str) -> bool {
        self.resolvers
            .contains_key(&(type_name.to_string(), field.to_string()))
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// Concrete member type of a union-valued result, read from the
    /// document's discriminator.
    pub fn resolve_union_type(value: &Value) -> Result<&str> {
        value
            .get("object_type")
            .and_then(|v| v.as_str())
            .ok_or(ResolveError::MissingObjectType)
    }
}

fn all_entities_resolver(repository: &Arc<ObjectRepository>) -> ResolverFn {
    let repository = Arc::clone(repository);
    Box::new(move |_parent| {
        let documents = repository
            .store()
            .query(&QueryPattern::has_field("object_type"))?;
        Ok(Value::Array(
            documents.iter().map(ObjectRepository::deserialize).collect(),
        ))
    })
}

fn by_type_resolver(repository: &Arc<ObjectRepository>, object_type: &str) -> ResolverFn {
    let repository = Arc::clone(repository);
    let object_type = object_type.to_string();
    Box::new(move |_parent| {
        let documents = repository
            .store()
            .query(&QueryPattern::field_equals("object_type", object_type.as_str()))?;
        Ok(Value::Array(
            documents.iter().map(ObjectRepository::deserialize).collect(),
        ))
    })
}

/// Follow a stored link: the prefixed field of the parent document holds the
/// primary key (or keys) of the target.
fn forward_resolver(repository: &Arc<ObjectRepository>, prefixed: &str, list: bool) -> ResolverFn {
    let repository = Arc::clone(repository);
    let prefixed = prefixed.to_string();
    Box::new(move |parent| {
        let parent = parent.ok_or_else(|| ResolveError::MissingParent {
            field: prefixed.clone(),
        })?;
        let value = parent.get(&prefixed).ok_or_else(|| ResolveError::InvalidLink {
            field: prefixed.clone(),
        })?;

        if list {
            let keys = value.as_array().ok_or_else(|| ResolveError::InvalidLink {
                field: prefixed.clone(),
            })?;
            let mut resolved = Vec::with_capacity(keys.len());
            for key in keys {
                let key = key.as_str().ok_or_else(|| ResolveError::InvalidLink {
                    field: prefixed.clone(),
                })?;
                resolved.push(repository.fetch(key)?);
            }
            Ok(Value::Array(resolved))
        } else {
            let key = value.as_str().ok_or_else(|| ResolveError::InvalidLink {
                field: prefixed.clone(),
            })?;
            Ok(repository.fetch(key)?)
        }
    })
}

/// Reverse a stored link: every document whose prefixed forward field points
/// at the parent's primary key.
fn backlink_resolver(repository: &Arc<ObjectRepository>, prefixed: &str, list: bool) -> ResolverFn {
    let repository = Arc::clone(repository);
    let prefixed = prefixed.to_string();
    Box::new(move |parent| {
        let parent = parent.ok_or_else(|| ResolveError::MissingParent {
            field: prefixed.clone(),
        })?;
        let primary_key = parent
            .get("primary_key")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ResolveError::InvalidLink {
                field: prefixed.clone(),
            })?;

        let documents = if list {
            // List-valued forward fields store an array of keys, so match
            // by membership instead of equality.
            repository
                .store()
                .query(&QueryPattern::has_field(&prefixed))?
                .into_iter()
                .filter(|doc| match doc.get(&prefixed) {
                    Some(Value::Array(keys)) => {
                        keys.iter().any(|k| k.as_str() == Some(primary_key))
                    }
                    _ => false,
                })
                .collect()
        } else {
            repository
                .store()
                .query(&QueryPattern::field_equals(&prefixed, primary_key))?
        };

        Ok(Value::Array(
            documents.iter().map(ObjectRepository::deserialize).collect(),
        ))
    })
}
