//! # Catalogue Schemas
//!
//! Pure schema declarations for the sample library catalogue: a `book`
//! with an owned `author` child, an ordered `chapters` collection, a
//! session-only scratch field, and a derived byline. Built once behind
//! `OnceLock` so every model instance shares the same declaration.

use jsonapi_model::Schema;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::{Arc, OnceLock};

/// Typed seed for chapter resources.
///
/// Serialized into the attributes of a bare JSON:API resource object, the
/// shape collection members arrive in.
#[derive(Debug, Clone, Serialize)]
pub struct ChapterSeed {
    pub title: String,
    pub number: u32,
}

impl ChapterSeed {
    pub fn to_resource(&self, id: &str) -> Value {
        let attributes = serde_json::to_value(self).unwrap_or_else(|_| json!({}));
        json!({"id": id, "type": "chapter", "attributes": attributes})
    }
}

pub fn person_schema() -> Arc<Schema> {
    static SCHEMA: OnceLock<Arc<Schema>> = OnceLock::new();
    SCHEMA
        .get_or_init(|| Schema::builder("person").prop("name").build())
        .clone()
}

pub fn chapter_schema() -> Arc<Schema> {
    static SCHEMA: OnceLock<Arc<Schema>> = OnceLock::new();
    SCHEMA
        .get_or_init(|| {
            Schema::builder("chapter")
                .prop("title")
                .prop_with_default("number", json!(0))
                .build()
        })
        .clone()
}

pub fn book_schema() -> Arc<Schema> {
    static SCHEMA: OnceLock<Arc<Schema>> = OnceLock::new();
    SCHEMA
        .get_or_init(|| {
            Schema::builder("book")
                .prop("title")
                .prop_with_default("length", json!(0))
                .prop("audience")
                .session("draft_notes")
                .derived("byline", |model| {
                    let title = model
                        .value("title")
                        .and_then(|title| title.as_str().map(str::to_owned))
                        .unwrap_or_default();
                    let author = model
                        .child("author")
                        .and_then(|author| author.value("name"))
                        .and_then(|name| name.as_str().map(str::to_owned));
                    match author {
                        Some(name) if !name.is_empty() => json!(format!("{title} by {name}")),
                        _ => json!(title),
                    }
                })
                .child("author", person_schema())
                .collection("chapters", chapter_schema())
                .validate(|attrs| match attrs.get("title") {
                    Some(title) => title.as_str().is_some_and(|t| !t.is_empty()),
                    None => true,
                })
                .build()
        })
        .clone()
}
