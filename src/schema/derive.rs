//! Schema derivation: base → domain → extended → hydrated.
//!
//! The derivation layers mirror how the schema is consumed: the domain
//! schema drives validation, the extended schema drives record-type
//! generation, and the hydrated schema is the query surface handed to
//! resolvers and introspection.

use std::collections::BTreeMap;

use super::types::{
    DerivedSchemas, FieldDeclaration, InterfaceDeclaration, ObjectTypeDeclaration, Schema,
    TypeDeclaration, UnionDeclaration, ValidatedSchema, BASE_INTERFACE, OOI_INTERFACE, OOI_UNION,
};

/// System entity type wrapping normalizer results; references "any entity".
pub const ORIGIN_TYPE: &str = "Origin";

/// The fixed base schema: the two system interfaces every entity implements.
pub fn base_schema() -> Schema {
    let mut reserved = BTreeMap::new();
    reserved.insert("object_type".to_string(), FieldDeclaration::scalar("String"));
    reserved.insert("primary_key".to_string(), FieldDeclaration::scalar("String"));
    reserved.insert(
        "human_readable".to_string(),
        FieldDeclaration::scalar("String"),
    );

    let mut schema = Schema::default();
    schema.insert(TypeDeclaration::Interface(InterfaceDeclaration {
        name: BASE_INTERFACE.to_string(),
        fields: reserved,
    }));
    schema.insert(TypeDeclaration::Interface(InterfaceDeclaration {
        name: OOI_INTERFACE.to_string(),
        fields: BTreeMap::new(),
    }));
    schema
}

/// Derive the three schema variants from a validated schema. Pure; never
/// mutates previously derived schemas.
pub fn derive(validated: &ValidatedSchema) -> DerivedSchemas {
    let domain = validated.schema.clone();
    let extended = extend(&domain);
    let hydrated = hydrate(&extended);

    DerivedSchemas {
        domain,
        extended,
        hydrated,
    }
}

/// Extended schema: domain plus the generated union over every entity type
/// and the system types depending on it.
fn extend(domain: &Schema) -> Schema {
    let mut extended = domain.clone();

    extended.insert(TypeDeclaration::Type(origin_type()));

    let members: Vec<String> = extended
        .object_types()
        .map(|object_type| object_type.name.clone())
        .collect();
    extended.insert(TypeDeclaration::Union(UnionDeclaration {
        name: OOI_UNION.to_string(),
        members,
    }));

    extended
}

fn origin_type() -> ObjectTypeDeclaration {
    let mut fields = BTreeMap::new();
    fields.insert("method".to_string(), FieldDeclaration::scalar("String"));
    fields.insert("source".to_string(), FieldDeclaration::scalar("String"));
    fields.insert("results".to_string(), FieldDeclaration::list_of(OOI_UNION));

    ObjectTypeDeclaration {
        name: ORIGIN_TYPE.to_string(),
        interfaces: vec![BASE_INTERFACE.to_string(), OOI_INTERFACE.to_string()],
        fields,
        natural_key: vec!["method".to_string(), "source".to_string()],
        format: "{method} on {source}".to_string(),
    }
}

/// Hydrated schema: extended plus backlink fields and the root query surface.
fn hydrate(extended: &Schema) -> Schema {
    let mut hydrated = extended.clone();

    // Inject a reverse list-field on the target of every forward relation.
    let mut backlinks: Vec<(String, String, FieldDeclaration)> = Vec::new();
    for object_type in extended.object_types() {
        for (field_name, field) in &object_type.fields {
            if field.backlink {
                continue;
            }
            let target_is_entity = matches!(
                extended.get(&field.type_name),
                Some(TypeDeclaration::Type(_))
            );
            if !target_is_entity {
                continue;
            }
            let backlink_name = field
                .reverse_name
                .clone()
                .unwrap_or_else(|| format!("{}_{}", object_type.name, field_name));
            let mut declaration = FieldDeclaration::list_of(&object_type.name);
            declaration.backlink = true;
            backlinks.push((field.type_name.clone(), backlink_name, declaration));
        }
    }
    for (target, name, declaration) in backlinks {
        if let Some(TypeDeclaration::Type(object_type)) = hydrated.get_mut(&target) {
            object_type.fields.entry(name).or_insert(declaration);
        }
    }

    // Root query surface: one list field per entity type plus the union field.
    let mut query_fields = BTreeMap::new();
    for object_type in extended.object_types() {
        query_fields.insert(
            object_type.name.clone(),
            FieldDeclaration::list_of(&object_type.name),
        );
    }
    query_fields.insert("OOI".to_string(), FieldDeclaration::list_of(OOI_UNION));

    hydrated.insert(TypeDeclaration::Type(ObjectTypeDeclaration {
        name: "Query".to_string(),
        interfaces: Vec::new(),
        fields: query_fields,
        natural_key: Vec::new(),
        format: String::new(),
    }));

    hydrated
}

/// Render a schema in its canonical printable text form, used by the API
/// layer for introspection.
pub fn print_schema(schema: &Schema) -> String {
    let mut out = String::new();
    for declaration in schema.iter() {
        if !out.is_empty() {
            out.push('\n');
        }
        match declaration {
            TypeDeclaration::Interface(interface) => {
                out.push_str(&format!("interface {} {{\n", interface.name));
                print_fields(&mut out, &interface.fields);
                out.push_str("}\n");
            }
            TypeDeclaration::Type(object_type) => {
                out.push_str(&format!("type {}", object_type.name));
                if !object_type.interfaces.is_empty() {
                    out.push_str(&format!(
                        " implements {}",
                        object_type.interfaces.join(" & ")
                    ));
                }
                if !object_type.natural_key.is_empty() {
                    out.push_str(&format!(
                        " @natural_key(fields: [{}])",
                        object_type
                            .natural_key
                            .iter()
                            .map(|a| format!("\"{}\"", a))
                            .collect::<Vec<_>>()
                            .join(", ")
                    ));
                }
                if !object_type.format.is_empty() {
                    out.push_str(&format!(" @format(template: \"{}\")", object_type.format));
                }
                out.push_str(" {\n");
                print_fields(&mut out, &object_type.fields);
                out.push_str("}\n");
            }
            TypeDeclaration::Enum(decl) => {
                out.push_str(&format!("enum {} {{\n", decl.name));
                for value in &decl.values {
                    out.push_str(&format!("  {}\n", value));
                }
                out.push_str("}\n");
            }
            TypeDeclaration::Union(union) => {
                out.push_str(&format!(
                    "union {} = {}\n",
                    union.name,
                    union.members.join(" | ")
                ));
            }
            // Rejected by validation; only printable before validation runs.
            TypeDeclaration::Scalar(scalar) => {
                out.push_str(&format!("scalar {}\n", scalar.name));
            }
            TypeDeclaration::Directive(directive) => {
                out.push_str(&format!("directive @{}\n", directive.name));
            }
            TypeDeclaration::Input(input) => {
                out.push_str(&format!("input {}\n", input.name));
            }
        }
    }
    out
}

fn print_fields(out: &mut String, fields: &BTreeMap<String, FieldDeclaration>) {
    for (name, field) in fields {
        let rendered = if field.list {
            format!("[{}]", field.type_name)
        } else {
            field.type_name.clone()
        };
        if let Some(reverse_name) = &field.reverse_name {
            out.push_str(&format!(
                "  {}: {} @reverse_name(name: \"{}\")\n",
                name, rendered, reverse_name
            ));
        } else {
            out.push_str(&format!("  {}: {}\n", name, rendered));
        }
    }
}
