//! Schema definition language types.
//!
//! A schema definition is a JSON document holding an ordered list of
//! declarations. Only `type`, `interface`, `enum`, and `union` survive
//! validation; `scalar`, `directive`, and `input` parse so that validation
//! can reject them with a precise message.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Type names owned by the platform that user schemas may not redeclare.
pub const RESERVED_TYPE_NAMES: [&str; 5] = ["Query", "Mutation", "Subscription", "BaseObject", "OOI"];

/// The two interfaces every entity type must implement.
pub const BASE_INTERFACE: &str = "BaseObject";
pub const OOI_INTERFACE: &str = "OOI";

/// Name of the generated union over every entity type.
pub const OOI_UNION: &str = "UOOI";

/// Required prefix for self-declared unions, distinguishing them from
/// generated ones.
pub const UNION_PREFIX: &str = "U";

/// Built-in scalar type names.
pub const BUILTIN_SCALARS: [&str; 5] = ["String", "Int", "Float", "Boolean", "ID"];

/// Errors raised while parsing or validating a schema definition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// The definition text is not a well-formed schema document.
    #[error("schema definition could not be parsed: {0}")]
    Parse(String),

    /// A platform convention was violated. The message is stable and keyed
    /// by the offending type name.
    #[error("{0}")]
    Validation(String),
}

/// Result alias for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;

/// A parsed schema definition: an ordered list of declarations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaDefinition {
    pub types: Vec<TypeDeclaration>,
}

impl SchemaDefinition {
    pub fn parse(definition: &str) -> Result<Self> {
        serde_json::from_str(definition).map_err(|e| SchemaError::Parse(e.to_string()))
    }
}

/// One declaration in a schema definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TypeDeclaration {
    Type(ObjectTypeDeclaration),
    Interface(InterfaceDeclaration),
    Enum(EnumDeclaration),
    Union(UnionDeclaration),
    Scalar(ScalarDeclaration),
    Directive(DirectiveDeclaration),
    Input(InputDeclaration),
}

impl TypeDeclaration {
    pub fn name(&self) -> &str {
        match self {
            TypeDeclaration::Type(d) => &d.name,
            TypeDeclaration::Interface(d) => &d.name,
            TypeDeclaration::Enum(d) => &d.name,
            TypeDeclaration::Union(d) => &d.name,
            TypeDeclaration::Scalar(d) => &d.name,
            TypeDeclaration::Directive(d) => &d.name,
            TypeDeclaration::Input(d) => &d.name,
        }
    }
}

/// An entity type: fields plus the two required pieces of identity metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectTypeDeclaration {
    pub name: String,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldDeclaration>,
    /// Ordered natural-key attribute names; identity hashing sorts them.
    pub natural_key: Vec<String>,
    /// Human-readable format template with `{field}` placeholders.
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceDeclaration {
    pub name: String,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldDeclaration>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumDeclaration {
    pub name: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnionDeclaration {
    pub name: String,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalarDeclaration {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectiveDeclaration {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputDeclaration {
    pub name: String,
}

/// A field on a type or interface declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDeclaration {
    /// Scalar, enum, entity, or union type name.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Single value or list.
    #[serde(default)]
    pub list: bool,
    /// Name of the backlink field generated on the target type. Defaults to
    /// `<SourceType>_<field>` when absent.
    #[serde(default)]
    pub reverse_name: Option<String>,
    /// Marks a field that is itself a reverse relation; no backlink is
    /// generated for it.
    #[serde(default)]
    pub backlink: bool,
}

impl FieldDeclaration {
    pub fn scalar(type_name: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            list: false,
            reverse_name: None,
            backlink: false,
        }
    }

    pub fn list_of(type_name: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            list: true,
            reverse_name: None,
            backlink: false,
        }
    }
}

/// A set of declarations with a stable iteration order and name lookup.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    order: Vec<String>,
    types: BTreeMap<String, TypeDeclaration>,
}

impl Schema {
    pub fn insert(&mut self, declaration: TypeDeclaration) {
        let name = declaration.name().to_string();
        if self.types.insert(name.clone(), declaration).is_none() {
            self.order.push(name);
        }
    }

    pub fn get(&self, name: &str) -> Option<&TypeDeclaration> {
        self.types.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut TypeDeclaration> {
        self.types.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Declarations in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeDeclaration> {
        self.order.iter().filter_map(|name| self.types.get(name))
    }

    /// Entity type declarations, excluding the root query surface.
    pub fn object_types(&self) -> impl Iterator<Item = &ObjectTypeDeclaration> {
        self.iter().filter_map(|decl| match decl {
            TypeDeclaration::Type(object_type) if object_type.name != "Query" => Some(object_type),
            _ => None,
        })
    }

    pub fn enums(&self) -> impl Iterator<Item = &EnumDeclaration> {
        self.iter().filter_map(|decl| match decl {
            TypeDeclaration::Enum(e) => Some(e),
            _ => None,
        })
    }

    pub fn unions(&self) -> impl Iterator<Item = &UnionDeclaration> {
        self.iter().filter_map(|decl| match decl {
            TypeDeclaration::Union(u) => Some(u),
            _ => None,
        })
    }
}

/// A schema that passed platform validation, together with the definition
/// text it was parsed from (kept for persistence).
#[derive(Debug, Clone)]
pub struct ValidatedSchema {
    /// Base interfaces merged with the user declarations.
    pub schema: Schema,
    /// The raw definition text this schema was built from.
    pub definition: String,
}

/// The derived schema variants, produced in one pass from a validated schema.
#[derive(Debug, Clone)]
pub struct DerivedSchemas {
    /// Base interfaces plus user declarations.
    pub domain: Schema,
    /// Domain plus the generated entity union and system types.
    pub extended: Schema,
    /// Extended plus backlink fields and the root query surface.
    pub hydrated: Schema,
}
