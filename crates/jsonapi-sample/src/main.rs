//! # Library Catalogue Demo
//!
//! Demonstrates the full mapping flow against the in-memory server:
//!
//! 1. Start the [`LibrarySystem`].
//! 2. Build a book from a JSON:API payload (author child included).
//! 3. Create it on the server, then patch, fetch, and destroy it.
//!
//! Run with `RUST_LOG=info cargo run` for the milestone log, or
//! `RUST_LOG=debug` to see every dispatched document.

use jsonapi_model::{Model, SaveOptions};
use jsonapi_sample::lifecycle::{setup_tracing, LibrarySystem};
use jsonapi_sample::model::book_schema;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Setup tracing once for the entire application
    setup_tracing();

    info!("Starting library catalogue demo");
    let system = LibrarySystem::start();

    let mut book = Model::from_payload(
        book_schema(),
        Some(&json!({
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
        })),
    )?
    .with_transport(Arc::new(system.transport.clone()));
    let mut events = book.subscribe();

    let span = tracing::info_span!("book_creation");
    async {
        info!(byline = ?book.derived("byline"), "Creating the book");
        book.save(None, SaveOptions::default()).await
    }
    .instrument(span)
    .await?;
    info!(id = ?book.id(), "Book created");

    let span = tracing::info_span!("book_revision");
    async {
        info!("Patching the length");
        book.save_key(
            "length",
            json!(130),
            SaveOptions {
                patch: true,
                ..SaveOptions::default()
            },
        )
        .await
    }
    .instrument(span)
    .await?;

    book.fetch().await?;
    info!(length = ?book.raw("length"), "Fetched back from the server");

    book.destroy().await?;
    info!("Book destroyed");

    while let Ok(event) = events.try_recv() {
        debug!(?event, "observed event");
    }

    drop(book);
    system.shutdown().await;
    info!("Demo completed successfully");
    Ok(())
}
