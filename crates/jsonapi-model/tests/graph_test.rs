use jsonapi_model::{AttrMap, Model, ModelEvent, ProjectOptions, Schema, SetOptions};
use serde_json::{json, Value};
use std::sync::Arc;

fn attrs(value: Value) -> AttrMap {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected an object"),
    }
}

fn library_schema() -> Arc<Schema> {
    let address = Schema::builder("address").prop("city").build();
    let person = Schema::builder("person")
        .prop("name")
        .child("address", address)
        .build();
    let chapter = Schema::builder("chapter").prop("title").prop("number").build();
    Schema::builder("book")
        .prop("title")
        .prop_with_default("length", json!(0))
        .session("draft_notes")
        .child("author", person)
        .collection("chapters", chapter)
        .build()
}

fn tempest_payload() -> Value {
    json!({
        "data": {
            "id": "1-the-tempest",
            "type": "book",
            "attributes": {
                "title": "The Tempest",
                "length": 123,
                "author": {
                    "id": "9",
                    "type": "person",
                    "attributes": {
                        "name": "Bill Shakespeare",
                        "address": {
                            "id": "3",
                            "type": "address",
                            "attributes": {"city": "Stratford"}
                        }
                    }
                }
            }
        }
    })
}

/// Parsing a model's own serialization reproduces its persisted
/// projection, identity included.
#[test]
fn serialize_then_parse_round_trips_persisted_state() {
    let book = Model::from_payload(library_schema(), Some(&tempest_payload())).unwrap();

    let mut probe = Model::new(library_schema());
    let reparsed = probe.parse(Some(&book.serialize())).unwrap();

    let flat = book.attributes(
        &ProjectOptions {
            props: true,
            children: false,
            collections: false,
            ..ProjectOptions::default()
        },
        true,
    );
    assert_eq!(reparsed, flat);
    assert_eq!(reparsed.get("id"), Some(&json!("1-the-tempest")));
    assert_eq!(reparsed.get("type"), Some(&json!("book")));
}

/// The whole child chain seeds from the one payload, each level from its
/// own sub-object.
#[test]
fn nested_children_initialize_from_the_parent_payload() {
    let book = Model::from_payload(library_schema(), Some(&tempest_payload())).unwrap();

    let author = book.child("author").unwrap();
    assert_eq!(author.raw("name"), Some(&json!("Bill Shakespeare")));
    assert_eq!(
        author.remembered_attrs().and_then(|bag| bag.get("name")),
        Some(&json!("Bill Shakespeare"))
    );

    let address = author.child("address").unwrap();
    assert_eq!(address.raw("city"), Some(&json!("Stratford")));
    assert_eq!(address.id(), Some(&json!("3")));
}

/// Events from a grandchild arrive on the root doubly wrapped.
#[test]
fn grandchild_events_bubble_to_the_root() {
    let mut book = Model::from_payload(library_schema(), Some(&tempest_payload())).unwrap();
    let mut events = book.subscribe();

    book.child_mut("author")
        .unwrap()
        .child_mut("address")
        .unwrap()
        .set(&attrs(json!({"city": "London"})), &SetOptions::default());

    assert_eq!(
        events.try_recv().unwrap(),
        ModelEvent::Child {
            name: "author".to_string(),
            event: Box::new(ModelEvent::Child {
                name: "address".to_string(),
                event: Box::new(ModelEvent::Change {
                    field: "city".to_string()
                }),
            }),
        }
    );
}

/// Declared collections come up empty and fill from collection documents.
#[test]
fn collections_reset_from_a_collection_document() {
    let mut book = Model::from_payload(library_schema(), Some(&tempest_payload())).unwrap();
    assert_eq!(book.collection("chapters").unwrap().len(), 0);

    book.collection_mut("chapters")
        .unwrap()
        .reset(Some(&json!({
            "data": [
                {"id": "c1", "type": "chapter", "attributes": {"title": "One", "number": 1}},
                {"id": "c2", "type": "chapter", "attributes": {"title": "Two", "number": 2}}
            ]
        })))
        .unwrap();

    let chapters = book.collection("chapters").unwrap();
    assert_eq!(chapters.len(), 2);
    assert_eq!(chapters.get(0).unwrap().raw("title"), Some(&json!("One")));

    // members appear in the full projection under the collection name
    let projection = book.attributes(&ProjectOptions::persisted(), true);
    let members = projection.get("chapters").unwrap().as_array().unwrap();
    assert_eq!(members.len(), 2);
    assert_eq!(members[1]["number"], json!(2));
}

/// A payload without a declared child's sub-object leaves that child
/// blank rather than failing.
#[test]
fn missing_child_sub_payload_yields_a_blank_child() {
    let payload = json!({
        "data": {
            "id": "2",
            "type": "book",
            "attributes": {"title": "Henry V"}
        }
    });
    let book = Model::from_payload(library_schema(), Some(&payload)).unwrap();
    let author = book.child("author").unwrap();
    assert!(author.is_new());
    assert!(author.raw("name").is_none());
}
