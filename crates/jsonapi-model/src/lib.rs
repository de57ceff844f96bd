//! # JSON:API Model Mapping
//!
//! This crate provides a bidirectional mapping layer between JSON:API
//! documents and an in-memory object graph of schema-typed models, nested
//! child models, and ordered collections, and back again for persistence
//! (create/update/patch/delete).
//!
//! ## Architecture Overview
//!
//! The layer separates concerns into three seams:
//!
//! 1. **Declaration** ([`Schema`]): each model type declares its
//!    persisted/session attributes, derived values, children, and
//!    collections once; all behavior below is derived from that
//!    declaration by iterating it.
//! 2. **Mapping** ([`Model`]): parsing a document into a flat attribute
//!    bag ([`Model::parse`]), projecting live state to plain data
//!    ([`Model::attributes`]), serializing back to a document
//!    ([`Model::serialize`]), and computing minimal patch bodies
//!    ([`transform_for_patch`]).
//! 3. **Persistence** ([`Transport`]): the orchestrated save/fetch/destroy
//!    round-trips dispatch documents through an injected transport and
//!    reconcile the responses; what a request *means* (URLs, protocol) is
//!    entirely the transport's business.
//!
//! ## Core Flow
//!
//! Incoming: payload → parse → graph initialization (children seed from
//! their own sub-payloads, recursively) → model ready. Outgoing: save →
//! projection (+ deep-patch reduction for patch) → transport → parse of the
//! response → model updated.
//!
//! ## Example
//!
//! ```rust
//! use jsonapi_model::{Model, Schema};
//! use serde_json::json;
//!
//! let book_schema = Schema::builder("book")
//!     .prop("title")
//!     .child("author", Schema::builder("person").prop("name").build())
//!     .build();
//!
//! let book = Model::from_payload(book_schema, Some(&json!({
//!     "data": {
//!         "id": "7",
//!         "type": "book",
//!         "attributes": {
//!             "title": "The Tempest",
//!             "author": {
//!                 "id": "9",
//!                 "type": "person",
//!                 "attributes": {"name": "Bill Shakespeare"}
//!             }
//!         }
//!     }
//! }))).unwrap();
//!
//! assert_eq!(book.raw("title"), Some(&json!("The Tempest")));
//! assert_eq!(book.child("author").unwrap().id(), Some(&json!("9")));
//! assert_eq!(
//!     book.serialize()["data"]["relationships"]["author"]["data"]["type"],
//!     json!("person")
//! );
//! ```
//!
//! ## Saving
//!
//! ```rust
//! use jsonapi_model::{AttrMap, MockTransport, Model, SaveOptions, Schema, SyncMethod};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let schema = Schema::builder("book").prop("title").build();
//!     let mock = MockTransport::new();
//!     mock.expect(SyncMethod::Create).return_ok(Some(json!({
//!         "data": {"id": "b1", "type": "book", "attributes": {"title": "The Tempest"}}
//!     })));
//!
//!     let mut book = Model::new(schema).with_transport(Arc::new(mock.clone()));
//!     let mut attrs = AttrMap::new();
//!     attrs.insert("title".to_string(), json!("The Tempest"));
//!     let outcome = book.save(Some(attrs), SaveOptions::default()).await.unwrap();
//!
//!     assert_eq!(outcome.method, SyncMethod::Create);
//!     assert_eq!(book.id(), Some(&json!("b1")));
//!     mock.verify();
//! }
//! ```
//!
//! ## Testing
//!
//! [`MockTransport`] queues responses and records dispatched documents for
//! assertion-style tests; [`transport::channel`] hands you the raw request
//! receiver for park-and-inspect tests where the timing between dispatch
//! and response matters (wait-mode saves, mid-flight failures). See the
//! [`mock`] module for the trade-offs.

pub mod collection;
pub mod error;
pub mod event;
pub mod mock;
pub mod model;
pub mod parse;
pub mod patch;
pub mod project;
pub mod save;
pub mod schema;
pub mod serialize;
pub mod transport;

// Re-export core types for convenience
pub use collection::Collection;
pub use error::{ModelError, TransportError};
pub use event::{EventHub, ModelEvent};
pub use mock::MockTransport;
pub use model::{AttrMap, Model, SetOptions};
pub use patch::transform_for_patch;
pub use project::ProjectOptions;
pub use save::{SaveOptions, SaveOutcome};
pub use schema::{FieldDescriptor, Schema, SchemaBuilder};
pub use transport::{channel, ChannelTransport, SyncMethod, SyncRequest, Transport};
