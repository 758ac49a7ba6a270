use super::types::{SchemaError, TypeDeclaration};
use super::{derive, load, print_schema};

const ZOO_SCHEMA: &str = r#"{
  "types": [
    {
      "kind": "type",
      "name": "Animal",
      "interfaces": ["BaseObject", "OOI"],
      "natural_key": ["name"],
      "format": "Hello: {name}",
      "fields": {
        "name": { "type": "String" },
        "color": { "type": "Color" }
      }
    },
    {
      "kind": "type",
      "name": "ZooKeeper",
      "interfaces": ["BaseObject", "OOI"],
      "natural_key": ["name"],
      "format": "{name} pets {pet_name}",
      "fields": {
        "name": { "type": "String" },
        "pet": { "type": "Animal", "reverse_name": "zookeepers" }
      }
    },
    { "kind": "enum", "name": "Color", "values": ["red", "green"] },
    { "kind": "union", "name": "UZooDweller", "members": ["Animal", "ZooKeeper"] }
  ]
}"#;

fn validation_message(definition: &str) -> String {
    match load(definition).unwrap_err() {
        SchemaError::Validation(message) => message,
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[test]
fn valid_schema_loads() {
    let validated = load(ZOO_SCHEMA).unwrap();
    assert!(validated.schema.contains("Animal"));
    assert!(validated.schema.contains("BaseObject"));
}

#[test]
fn default_schema_loads() {
    let validated = load(super::DEFAULT_SCHEMA).unwrap();
    assert!(validated.schema.contains("IPPort"));
}

#[test]
fn rejects_non_pascal_case_names() {
    let definition = r#"{"types": [{"kind": "type", "name": "zooKeeper",
        "interfaces": ["BaseObject", "OOI"], "natural_key": [], "format": "", "fields": {}}]}"#;
    assert_eq!(
        validation_message(definition),
        "Object types must follow PascalCase conventions [type=zooKeeper]"
    );
}

#[test]
fn rejects_reserved_type_names() {
    for name in ["Query", "Mutation", "Subscription", "BaseObject", "OOI"] {
        let definition = format!(
            r#"{{"types": [{{"kind": "type", "name": "{}",
                "interfaces": ["BaseObject", "OOI"], "natural_key": [], "format": "", "fields": {{}}}}]}}"#,
            name
        );
        assert_eq!(
            validation_message(&definition),
            format!("Use of reserved type name is not allowed [type={}]", name)
        );
    }
}

#[test]
fn rejects_custom_scalars() {
    let definition = r#"{"types": [{"kind": "scalar", "name": "CustomScalar"}]}"#;
    assert_eq!(
        validation_message(definition),
        "A schema may only define a Type, Enum, Union, or Interface, not Scalar [type=CustomScalar]"
    );
}

#[test]
fn rejects_custom_directives() {
    let definition = r#"{"types": [{"kind": "directive", "name": "test"}]}"#;
    assert_eq!(
        validation_message(definition),
        "A schema may only define a Type, Enum, Union, or Interface, not Directive [directive=test]"
    );
}

#[test]
fn rejects_input_objects() {
    let definition = r#"{"types": [{"kind": "input", "name": "CatSpeech"}]}"#;
    assert_eq!(
        validation_message(definition),
        "A schema may only define a Type, Enum, Union, or Interface, not Input [type=CatSpeech]"
    );
}

#[test]
fn rejects_missing_base_object_interface() {
    let definition = r#"{"types": [{"kind": "type", "name": "Test",
        "interfaces": ["OOI"], "natural_key": [], "format": "", "fields": {}}]}"#;
    assert_eq!(
        validation_message(definition),
        "An object must inherit both BaseObject and OOI (missing BaseObject) [type=Test]"
    );
}

#[test]
fn rejects_missing_ooi_interface() {
    let definition = r#"{"types": [{"kind": "type", "name": "Test",
        "interfaces": ["BaseObject"], "natural_key": [], "format": "", "fields": {}}]}"#;
    assert_eq!(
        validation_message(definition),
        "An object must inherit both BaseObject and OOI (missing OOI) [type=Test]"
    );
}

#[test]
fn rejects_missing_both_interfaces() {
    let definition = r#"{"types": [{"kind": "type", "name": "Test",
        "interfaces": [], "natural_key": [], "format": "", "fields": {}}]}"#;
    assert_eq!(
        validation_message(definition),
        "An object must inherit both BaseObject and OOI (missing both) [type=Test]"
    );
}

#[test]
fn rejects_unprefixed_unions() {
    let definition = r#"{"types": [
        {"kind": "type", "name": "Animal", "interfaces": ["BaseObject", "OOI"],
         "natural_key": [], "format": "", "fields": {}},
        {"kind": "union", "name": "Animals", "members": ["Animal"]}]}"#;
    assert_eq!(
        validation_message(definition),
        "Self-defined unions must start with a U [type=Animals]"
    );
}

#[test]
fn rejects_natural_key_without_field() {
    let definition = r#"{"types": [{"kind": "type", "name": "Animal",
        "interfaces": ["BaseObject", "OOI"], "natural_key": ["size"], "format": "",
        "fields": {"name": {"type": "String"}}}]}"#;
    assert_eq!(
        validation_message(definition),
        "Natural keys must be defined as fields [type=Animal, natural_key=size]"
    );
}

#[test]
fn rejects_dangling_field_types() {
    let definition = r#"{"types": [{"kind": "type", "name": "Animal",
        "interfaces": ["BaseObject", "OOI"], "natural_key": [], "format": "",
        "fields": {"home": {"type": "Zoo"}}}]}"#;
    assert_eq!(
        validation_message(definition),
        "Field references an undeclared type [type=Animal, field=home, referenced=Zoo]"
    );
}

#[test]
fn rejects_malformed_definition_text() {
    assert!(matches!(
        load("not json").unwrap_err(),
        SchemaError::Parse(_)
    ));
}

#[test]
fn extended_schema_gains_union_and_origin() {
    let validated = load(ZOO_SCHEMA).unwrap();
    let derived = derive(&validated);

    let union = derived
        .extended
        .unions()
        .find(|u| u.name == "UOOI")
        .unwrap();
    assert!(union.members.contains(&"Animal".to_string()));
    assert!(union.members.contains(&"ZooKeeper".to_string()));
    assert!(union.members.contains(&"Origin".to_string()));

    match derived.extended.get("Origin") {
        Some(TypeDeclaration::Type(origin)) => {
            let results = origin.fields.get("results").unwrap();
            assert_eq!(results.type_name, "UOOI");
            assert!(results.list);
        }
        other => panic!("Origin missing from extended schema: {:?}", other),
    }

    // Domain schema is untouched by the extension.
    assert!(!derived.domain.contains("UOOI"));
    assert!(!derived.domain.contains("Origin"));
}

#[test]
fn hydrated_schema_gains_backlinks_and_query() {
    let validated = load(ZOO_SCHEMA).unwrap();
    let derived = derive(&validated);

    match derived.hydrated.get("Animal") {
        Some(TypeDeclaration::Type(animal)) => {
            let backlink = animal.fields.get("zookeepers").unwrap();
            assert_eq!(backlink.type_name, "ZooKeeper");
            assert!(backlink.list);
            assert!(backlink.backlink);
        }
        other => panic!("Animal missing from hydrated schema: {:?}", other),
    }

    match derived.hydrated.get("Query") {
        Some(TypeDeclaration::Type(query)) => {
            assert!(query.fields.contains_key("Animal"));
            assert!(query.fields.contains_key("ZooKeeper"));
            let ooi = query.fields.get("OOI").unwrap();
            assert_eq!(ooi.type_name, "UOOI");
            assert!(ooi.list);
        }
        other => panic!("Query missing from hydrated schema: {:?}", other),
    }

    // The extended schema carries neither backlinks nor a query surface.
    assert!(!derived.extended.contains("Query"));
    match derived.extended.get("Animal") {
        Some(TypeDeclaration::Type(animal)) => {
            assert!(!animal.fields.contains_key("zookeepers"))
        }
        other => panic!("Animal missing from extended schema: {:?}", other),
    }
}

#[test]
fn default_backlink_name_uses_source_type_and_field() {
    let definition = r#"{"types": [
        {"kind": "type", "name": "Network", "interfaces": ["BaseObject", "OOI"],
         "natural_key": ["name"], "format": "{name}",
         "fields": {"name": {"type": "String"}}},
        {"kind": "type", "name": "Hostname", "interfaces": ["BaseObject", "OOI"],
         "natural_key": ["name"], "format": "{name}",
         "fields": {"name": {"type": "String"}, "network": {"type": "Network"}}}]}"#;
    let derived = derive(&load(definition).unwrap());

    match derived.hydrated.get("Network") {
        Some(TypeDeclaration::Type(network)) => {
            assert!(network.fields.contains_key("Hostname_network"));
        }
        other => panic!("Network missing from hydrated schema: {:?}", other),
    }
}

#[test]
fn printed_schema_is_canonical() {
    let validated = load(ZOO_SCHEMA).unwrap();
    let derived = derive(&validated);
    let printed = print_schema(&derived.hydrated);

    assert!(printed.contains("interface BaseObject {"));
    assert!(printed.contains("type Animal implements BaseObject & OOI"));
    assert!(printed.contains("@natural_key(fields: [\"name\"])"));
    assert!(printed.contains("@format(template: \"Hello: {name}\")"));
    assert!(printed.contains("union UZooDweller = Animal | ZooKeeper"));
    assert!(printed.contains("type Query"));

    // Printing is deterministic.
    assert_eq!(printed, print_schema(&derived.hydrated));
}
