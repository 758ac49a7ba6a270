//! Unified error type for the crate.
//!
//! Each module defines its own error enum; this umbrella type exists so that
//! pipeline-level code (the ingester, the schema loader) can carry any of them
//! through one `Result`.

use crate::config::ConfigError;
use crate::model::IdentityError;
use crate::resolver::ResolveError;
use crate::schema::SchemaError;
use crate::store::StoreError;
use crate::typegen::TypeGenError;

/// Unified error type covering every stage of the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum OoiGraphError {
    /// A candidate schema definition failed to parse or validate.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Record-type generation or payload parsing failed.
    #[error("type generation error: {0}")]
    TypeGen(#[from] TypeGenError),

    /// An entity could not compute its identity.
    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),

    /// The backing document store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A schema field could not be resolved against the store.
    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),

    /// Settings could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result alias for pipeline-level operations.
pub type Result<T> = std::result::Result<T, OoiGraphError>;
