use jsonapi_model::{Model, ModelError, ModelEvent, SaveOptions, SyncMethod};
use jsonapi_sample::lifecycle::LibrarySystem;
use jsonapi_sample::model::{book_schema, ChapterSeed};
use serde_json::json;
use std::sync::Arc;

fn tempest_payload() -> serde_json::Value {
    json!({
        "data": {
            "type": "book",
            "attributes": {
                "title": "The Tempest",
                "length": 123,
                "audience": "general",
                "author": {
                    "id": "person_9",
                    "type": "person",
                    "attributes": {"name": "Bill Shakespeare"}
                }
            }
        }
    })
}

/// Full end-to-end flow against the real server task: create, patch,
/// fetch, destroy.
#[tokio::test]
async fn full_catalogue_flow() {
    let system = LibrarySystem::start();

    let mut book = Model::from_payload(book_schema(), Some(&tempest_payload()))
        .expect("payload parses")
        .with_transport(Arc::new(system.transport.clone()));
    let mut events = book.subscribe();

    assert!(book.is_new());
    assert_eq!(
        book.derived("byline"),
        Some(json!("The Tempest by Bill Shakespeare"))
    );

    // Create: the server assigns an identity
    let outcome = book.save(None, SaveOptions::default()).await.unwrap();
    assert_eq!(outcome.method, SyncMethod::Create);
    assert_eq!(book.id(), Some(&json!("book_1")));
    assert!(!book.is_new());

    // Patch: only the named attribute travels
    book.save_key(
        "length",
        json!(130),
        SaveOptions {
            patch: true,
            ..SaveOptions::default()
        },
    )
    .await
    .unwrap();

    // Fetch: the patched value comes back from the store
    book.fetch().await.unwrap();
    assert_eq!(book.raw("length"), Some(&json!(130)));
    assert_eq!(book.raw("title"), Some(&json!("The Tempest")));

    // Chapters fill from a collection document of typed seeds
    let chapters_doc = json!({
        "data": [
            ChapterSeed { title: "One".to_string(), number: 1 }.to_resource("c1"),
            ChapterSeed { title: "Two".to_string(), number: 2 }.to_resource("c2"),
        ]
    });
    book.collection_mut("chapters")
        .unwrap()
        .reset(Some(&chapters_doc))
        .unwrap();
    assert_eq!(book.collection("chapters").unwrap().len(), 2);

    // The author child survived every round-trip
    let author = book.child("author").unwrap();
    assert_eq!(author.raw("name"), Some(&json!("Bill Shakespeare")));

    // Destroy: the resource is gone afterwards
    book.destroy().await.unwrap();
    let result = book.fetch().await;
    assert!(matches!(result, Err(ModelError::Transport(_))));

    let seen: Vec<_> = std::iter::from_fn(|| events.try_recv().ok()).collect();
    assert!(seen.contains(&ModelEvent::Sync {
        method: SyncMethod::Create
    }));
    assert!(seen.contains(&ModelEvent::Sync {
        method: SyncMethod::Patch
    }));
    assert!(seen.contains(&ModelEvent::Destroy));
    assert!(seen
        .iter()
        .any(|event| matches!(event, ModelEvent::Error { .. })));

    drop(book);
    system.shutdown().await;
}

/// Two creates get distinct server-assigned identities.
#[tokio::test]
async fn the_server_assigns_sequential_identities() {
    let system = LibrarySystem::start();

    let mut first = Model::from_payload(book_schema(), Some(&tempest_payload()))
        .unwrap()
        .with_transport(Arc::new(system.transport.clone()));
    let mut second = Model::from_payload(book_schema(), Some(&tempest_payload()))
        .unwrap()
        .with_transport(Arc::new(system.transport.clone()));

    first.save(None, SaveOptions::default()).await.unwrap();
    second.save(None, SaveOptions::default()).await.unwrap();

    assert_eq!(first.id(), Some(&json!("book_1")));
    assert_eq!(second.id(), Some(&json!("book_2")));

    drop(first);
    drop(second);
    system.shutdown().await;
}

/// Reading a resource the server never stored surfaces as a transport
/// rejection, re-emitted as an error event.
#[tokio::test]
async fn fetching_an_unknown_resource_is_rejected() {
    let system = LibrarySystem::start();

    let mut ghost = Model::from_payload(
        book_schema(),
        Some(&json!({
            "data": {"id": "book_404", "type": "book", "attributes": {"title": "Missing"}}
        })),
    )
    .unwrap()
    .with_transport(Arc::new(system.transport.clone()));
    let mut events = ghost.subscribe();

    let result = ghost.fetch().await;
    assert!(matches!(result, Err(ModelError::Transport(_))));
    assert!(matches!(
        events.try_recv().unwrap(),
        ModelEvent::Error { .. }
    ));

    drop(ghost);
    system.shutdown().await;
}
