//! Record-type generation: derived schema → runtime type descriptors.
//!
//! One [`RecordType`] descriptor is produced per entity type. Descriptors are
//! plain data interpreted uniformly by parse, serialize, and identity code;
//! no concrete types are synthesized at runtime.

mod generator;
mod types;

pub use generator::{generate, TypeRegistry};
pub use types::{FieldKind, FieldType, RecordType, TypeGenError};
