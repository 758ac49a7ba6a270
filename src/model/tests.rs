use std::collections::BTreeMap;

use proptest::prelude::*;

use super::{Entity, IdentityError, PropertyValue};

fn animal(name: &str, color: &str) -> Entity {
    let mut properties = BTreeMap::new();
    properties.insert("name".to_string(), PropertyValue::String(name.to_string()));
    properties.insert("color".to_string(), PropertyValue::Enum(color.to_string()));
    Entity::new(
        "Animal",
        properties,
        &["name".to_string()],
        "Hello: {name}",
    )
    .unwrap()
}

fn zookeeper(name: &str, pet: Entity) -> Entity {
    let mut properties = BTreeMap::new();
    properties.insert("name".to_string(), PropertyValue::String(name.to_string()));
    properties.insert("pet".to_string(), PropertyValue::Entity(Box::new(pet)));
    Entity::new(
        "ZooKeeper",
        properties,
        &["name".to_string()],
        "{name} pets {pet_name}",
    )
    .unwrap()
}

#[test]
fn human_readable_from_template() {
    let whiskers = animal("Whiskers", "red");
    assert_eq!(whiskers.object_type, "Animal");
    assert_eq!(whiskers.human_readable, "Hello: Whiskers");
}

#[test]
fn human_readable_flattens_nested_entities() {
    let leslie = zookeeper("Leslie", animal("Whiskers", "red"));
    assert_eq!(leslie.human_readable, "Leslie pets Whiskers");
}

#[test]
fn primary_key_is_deterministic() {
    let a = animal("Whiskers", "red");
    let b = animal("Whiskers", "green");
    // color is not part of the natural key
    assert_eq!(a.primary_key, b.primary_key);
    assert_eq!(a.primary_key.len(), 32);
    assert!(a.primary_key.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn primary_key_ignores_attribute_declaration_order() {
    let mut properties = BTreeMap::new();
    properties.insert("name".to_string(), PropertyValue::String("x".to_string()));
    properties.insert("port".to_string(), PropertyValue::Int(80));

    let forward = Entity::new(
        "Service",
        properties.clone(),
        &["name".to_string(), "port".to_string()],
        "{name}",
    )
    .unwrap();
    let reversed = Entity::new(
        "Service",
        properties,
        &["port".to_string(), "name".to_string()],
        "{name}",
    )
    .unwrap();

    assert_eq!(forward.primary_key, reversed.primary_key);
}

#[test]
fn nested_entity_contributes_its_primary_key() {
    let pet = animal("Whiskers", "red");
    let pet_key = pet.primary_key.clone();
    let keeper = zookeeper("Leslie", pet);

    // Same keeper with a pet of equal identity but different non-key content.
    let other = zookeeper("Leslie", animal("Whiskers", "green"));
    assert_eq!(keeper.primary_key, other.primary_key);

    match keeper.get("pet") {
        Some(PropertyValue::Entity(nested)) => assert_eq!(nested.primary_key, pet_key),
        other => panic!("unexpected pet value: {:?}", other),
    }
}

#[test]
fn missing_natural_key_attribute_is_an_error() {
    let err = Entity::new(
        "Animal",
        BTreeMap::new(),
        &["name".to_string()],
        "Hello: {name}",
    )
    .unwrap_err();
    assert_eq!(
        err,
        IdentityError::MissingNaturalKey {
            object_type: "Animal".to_string(),
            attribute: "name".to_string(),
        }
    );
}

#[test]
fn missing_placeholder_is_an_error() {
    let mut properties = BTreeMap::new();
    properties.insert("name".to_string(), PropertyValue::String("x".to_string()));
    let err = Entity::new("Animal", properties, &["name".to_string()], "{size}").unwrap_err();
    assert_eq!(
        err,
        IdentityError::MissingPlaceholder {
            object_type: "Animal".to_string(),
            placeholder: "size".to_string(),
        }
    );
}

#[test]
fn sub_objects_yields_children_before_parent() {
    let leslie = zookeeper("Leslie", animal("Whiskers", "red"));
    let order: Vec<&str> = leslie.sub_objects().map(|e| e.object_type.as_str()).collect();
    assert_eq!(order, vec!["Animal", "ZooKeeper"]);
}

#[test]
fn sub_objects_is_restartable() {
    let leslie = zookeeper("Leslie", animal("Whiskers", "red"));
    assert_eq!(leslie.sub_objects().count(), 2);
    assert_eq!(leslie.sub_objects().count(), 2);
}

#[test]
fn sub_objects_deduplicates_shared_children() {
    let pet = animal("Whiskers", "red");
    let mut properties = BTreeMap::new();
    properties.insert("name".to_string(), PropertyValue::String("Leslie".to_string()));
    properties.insert("pet".to_string(), PropertyValue::Entity(Box::new(pet.clone())));
    properties.insert(
        "favorite".to_string(),
        PropertyValue::Entity(Box::new(pet)),
    );
    let keeper = Entity::new("ZooKeeper", properties, &["name".to_string()], "{name}").unwrap();

    assert_eq!(keeper.sub_objects().count(), 2);
}

proptest! {
    // Discrimination: differing natural-key values produce differing keys.
    #[test]
    fn distinct_natural_keys_produce_distinct_primary_keys(
        a in "[a-zA-Z0-9 .:-]{1,40}",
        b in "[a-zA-Z0-9 .:-]{1,40}",
    ) {
        prop_assume!(a != b);
        let left = animal(&a, "red");
        let right = animal(&b, "red");
        prop_assert_ne!(left.primary_key, right.primary_key);
    }

    #[test]
    fn equal_content_produces_equal_primary_keys(name in "[a-zA-Z0-9 .:-]{1,40}") {
        let left = animal(&name, "red");
        let right = animal(&name, "green");
        prop_assert_eq!(left.primary_key, right.primary_key);
    }
}
