//! Per-tenant ingestion pipeline.
//!
//! An [`Ingester`] owns one tenant's store handle and its active set: the
//! validated schema plus everything built from it (derived schemas, record
//! types, repository, resolvers). Schema changes build a complete new set
//! first and swap it in atomically; a failure anywhere leaves the previous
//! set serving.

use std::sync::{Arc, RwLock};

use log::{error, info};
use serde_json::Value;

use crate::error::Result;
use crate::model::Entity;
use crate::repository::ObjectRepository;
use crate::resolver::ResolverBridge;
use crate::schema::{self, print_schema, DerivedSchemas, ValidatedSchema};
use crate::store::DocumentStore;
use crate::typegen::{generate, TypeRegistry};

/// Everything built from one schema version. Swapped as a unit so readers
/// never observe a registry from one version and resolvers from another.
pub struct ActiveSet {
    pub schema: ValidatedSchema,
    pub derived: DerivedSchemas,
    pub registry: Arc<TypeRegistry>,
    pub repository: Arc<ObjectRepository>,
    pub resolvers: ResolverBridge,
}

impl ActiveSet {
    fn build(store: Arc<dyn DocumentStore>, schema: ValidatedSchema) -> Result<Self> {
        let derived = schema::derive(&schema);
        let registry = Arc::new(generate(&derived.extended)?);
        let repository = Arc::new(ObjectRepository::new(store, Arc::clone(&registry)));
        let resolvers = ResolverBridge::bind(&derived.hydrated, Arc::clone(&repository));

        Ok(Self {
            schema,
            derived,
            registry,
            repository,
            resolvers,
        })
    }
}

/// One tenant's ingestion pipeline.
pub struct Ingester {
    id: String,
    store: Arc<dyn DocumentStore>,
    schema_document_id: String,
    active: RwLock<Arc<ActiveSet>>,
}

impl Ingester {
    /// Open the pipeline for one tenant, loading the persisted schema (or the
    /// bundled default when none exists).
    pub fn new(
        id: &str,
        store: Arc<dyn DocumentStore>,
        schema_document_id: &str,
    ) -> Result<Self> {
        let schema = schema::load_from_store(store.as_ref(), schema_document_id)?;
        let active = ActiveSet::build(Arc::clone(&store), schema)?;
        info!("ingester started [tenant={}]", id);

        Ok(Self {
            id: id.to_string(),
            store,
            schema_document_id: schema_document_id.to_string(),
            active: RwLock::new(Arc::new(active)),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Snapshot of the current active set. Holders keep serving the version
    /// they grabbed even across a concurrent swap.
    pub fn active(&self) -> Arc<ActiveSet> {
        let guard = self.active.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Validate a new schema definition, build a complete replacement set,
    /// persist the definition, and swap. Nothing is published until every
    /// step succeeded; any error leaves the previous set active.
    pub fn ingest(&self, definition: &str) -> Result<()> {
        let schema = match schema::load(definition) {
            Ok(schema) => schema,
            Err(err) => {
                error!(
                    "rejected schema definition [tenant={}]: {}",
                    self.id, err
                );
                return Err(err.into());
            }
        };
        let next = ActiveSet::build(Arc::clone(&self.store), schema)?;
        schema::persist(self.store.as_ref(), &self.schema_document_id, &next.schema)?;

        let mut guard = self.active.write().unwrap_or_else(|e| e.into_inner());
        *guard = Arc::new(next);
        info!("activated new schema [tenant={}]", self.id);
        Ok(())
    }

    /// Parse a raw payload against the active schema and persist the
    /// resulting entity graph.
    pub fn declare(&self, payload: &Value) -> Result<Entity> {
        let active = self.active();
        let entity = active.registry.parse(payload)?;
        active.repository.save(&entity)?;
        Ok(entity)
    }

    /// Printable text form of the active hydrated schema.
    pub fn print_active_schema(&self) -> String {
        print_schema(&self.active().derived.hydrated)
    }
}
