//! Backing document store boundary.
//!
//! The store is an external collaborator: a bitemporal document store that
//! offers point-in-time gets, a declarative query primitive, and atomic
//! multi-put transactions tagged with a valid-time. [`SledStore`] is the
//! bundled implementation.

mod sled_store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use sled_store::SledStore;

/// Field of a stored document holding its store identifier.
pub const DOCUMENT_ID_FIELD: &str = "doc/id";

/// A flat document as persisted in the store.
pub type Document = serde_json::Map<String, Value>;

/// Store failures. `NotFound` is recoverable and expected for lookups;
/// everything else aborts the enclosing operation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("document not found [id={0}]")]
    NotFound(String),

    #[error("store backend error: {0}")]
    Backend(String),

    #[error("store serialization error: {0}")]
    Serialization(String),

    #[error("document has no '{DOCUMENT_ID_FIELD}' field")]
    MissingDocumentId,

    #[error("session already committed")]
    SessionCommitted,
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// Result alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// A document together with the valid-time of the write that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionedDocument {
    pub document: Document,
    pub valid_time: DateTime<Utc>,
}

/// One operation inside a store transaction.
#[derive(Debug, Clone)]
pub enum Operation {
    Put {
        document: Document,
        valid_time: DateTime<Utc>,
    },
}

/// Declarative query patterns the store must answer.
#[derive(Debug, Clone)]
pub enum QueryPattern {
    /// Documents where `field` equals `value`.
    FieldEquals { field: String, value: Value },
    /// Documents carrying `field` at all.
    HasField { field: String },
}

impl QueryPattern {
    pub fn field_equals(field: &str, value: impl Into<Value>) -> Self {
        QueryPattern::FieldEquals {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn has_field(field: &str) -> Self {
        QueryPattern::HasField {
            field: field.to_string(),
        }
    }

    pub fn matches(&self, document: &Document) -> bool {
        match self {
            QueryPattern::FieldEquals { field, value } => document.get(field) == Some(value),
            QueryPattern::HasField { field } => document.contains_key(field),
        }
    }
}

/// Capability consumed from the backing store. Calls block the caller;
/// failures come back as terminal errors from the client.
pub trait DocumentStore: Send + Sync {
    /// Fetch a single document by store identifier.
    fn get_document(&self, id: &str) -> Result<VersionedDocument>;

    /// Apply a batch of operations as one atomic transaction: either every
    /// operation becomes visible or none does.
    fn submit(&self, operations: Vec<Operation>) -> Result<()>;

    /// Return every document matching the pattern.
    fn query(&self, pattern: &QueryPattern) -> Result<Vec<Document>>;
}

/// Collects operations for a single atomic commit.
pub struct StoreSession<'a> {
    store: &'a dyn DocumentStore,
    operations: Vec<Operation>,
    committed: bool,
}

impl<'a> StoreSession<'a> {
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self {
            store,
            operations: Vec::new(),
            committed: false,
        }
    }

    /// Queue a put. The document must carry its store identifier.
    pub fn put(&mut self, document: Document, valid_time: DateTime<Utc>) -> Result<()> {
        if !document.contains_key(DOCUMENT_ID_FIELD) {
            return Err(StoreError::MissingDocumentId);
        }
        self.operations.push(Operation::Put {
            document,
            valid_time,
        });
        Ok(())
    }

    /// Submit every queued operation in one transaction.
    pub fn commit(&mut self) -> Result<()> {
        if self.committed {
            return Err(StoreError::SessionCommitted);
        }
        self.committed = true;

        if self.operations.is_empty() {
            return Ok(());
        }
        self.store.submit(std::mem::take(&mut self.operations))
    }
}
