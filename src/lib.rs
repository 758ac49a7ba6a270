//! Object-graph modeling and persistence core.
//!
//! The pipeline runs schema-first: a validated schema definition is derived
//! into the variants the rest of the system consumes, record-type
//! descriptors are generated from it, and raw payloads are parsed into
//! content-addressed entities that the repository persists as flat linked
//! documents. An [`ingester::Ingester`] wires the whole chain together for
//! one tenant and hot-swaps it on schema changes.

pub mod config;
pub mod error;
pub mod ingester;
pub mod model;
pub mod repository;
pub mod resolver;
pub mod schema;
pub mod store;
pub mod typegen;

pub use config::Settings;
pub use error::{OoiGraphError, Result};
pub use ingester::{ActiveSet, Ingester};
pub use model::{Entity, PropertyValue};
pub use repository::ObjectRepository;
pub use resolver::ResolverBridge;
pub use store::{DocumentStore, SledStore};
pub use typegen::TypeRegistry;
