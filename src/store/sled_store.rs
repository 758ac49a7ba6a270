//! Sled-backed document store.

use std::path::Path;

use log::debug;

use super::{
    Document, DocumentStore, Operation, QueryPattern, Result, StoreError, VersionedDocument,
    DOCUMENT_ID_FIELD,
};

/// Embedded document store over a sled tree. Every document is persisted in
/// a versioned envelope carrying the valid-time of the write; `submit`
/// applies one batch so a transaction is all-or-nothing.
pub struct SledStore {
    documents: sled::Tree,
}

impl SledStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path).map_err(backend)?;
        let documents = db.open_tree("documents").map_err(backend)?;
        Ok(Self { documents })
    }
}

impl DocumentStore for SledStore {
    fn get_document(&self, id: &str) -> Result<VersionedDocument> {
        match self.documents.get(id.as_bytes()).map_err(backend)? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| StoreError::Serialization(e.to_string())),
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }

    fn submit(&self, operations: Vec<Operation>) -> Result<()> {
        let mut batch = sled::Batch::default();
        let count = operations.len();

        for operation in operations {
            let Operation::Put {
                document,
                valid_time,
            } = operation;

            let id = document
                .get(DOCUMENT_ID_FIELD)
                .and_then(|v| v.as_str())
                .ok_or(StoreError::MissingDocumentId)?
                .to_string();
            let envelope = VersionedDocument {
                document,
                valid_time,
            };
            let bytes = serde_json::to_vec(&envelope)
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
            batch.insert(id.as_bytes(), bytes);
        }

        self.documents.apply_batch(batch).map_err(backend)?;
        self.documents.flush().map_err(backend)?;
        debug!("committed transaction [operations={}]", count);
        Ok(())
    }

    fn query(&self, pattern: &QueryPattern) -> Result<Vec<Document>> {
        let mut matches = Vec::new();
        for entry in self.documents.iter() {
            let (_, bytes) = entry.map_err(backend)?;
            let envelope: VersionedDocument = serde_json::from_slice(&bytes)
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
            if pattern.matches(&envelope.document) {
                matches.push(envelope.document);
            }
        }
        Ok(matches)
    }
}

fn backend(err: sled::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}
