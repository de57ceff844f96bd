//! # Collections
//!
//! An ordered, parent-owned list of models sharing one member schema.
//! Collection documents arrive as `{"data": [resource, ...]}`; each member
//! resource is parsed through the same adapter a standalone model uses,
//! which is why the adapter accepts bare resources without an envelope.

use crate::error::ModelError;
use crate::model::Model;
use crate::schema::Schema;
use serde_json::Value;
use std::sync::Arc;

/// Ordered collection of models built from one member schema.
pub struct Collection {
    member_schema: Arc<Schema>,
    models: Vec<Model>,
}

impl Collection {
    pub(crate) fn new(member_schema: Arc<Schema>) -> Self {
        Self {
            member_schema,
            models: Vec::new(),
        }
    }

    pub fn member_schema(&self) -> &Arc<Schema> {
        &self.member_schema
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Model> {
        self.models.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Model> {
        self.models.iter()
    }

    /// Appends an already-built member.
    pub fn add(&mut self, model: Model) {
        self.models.push(model);
    }

    /// Replaces the members with those parsed from a collection payload.
    ///
    /// Accepts a `{"data": [..]}` document or a bare resource array; an
    /// absent payload or one without members just empties the collection.
    /// Returns the new member count.
    pub fn reset(&mut self, payload: Option<&Value>) -> Result<usize, ModelError> {
        self.models.clear();
        let resources = match payload {
            Some(Value::Array(items)) => items,
            Some(Value::Object(document)) => match document.get("data") {
                Some(Value::Array(items)) => items,
                Some(Value::Null) | None => return Ok(0),
                Some(_) => {
                    return Err(ModelError::MalformedPayload(
                        "collection `data` is not an array".to_string(),
                    ))
                }
            },
            _ => return Ok(0),
        };
        for resource in resources {
            self.models
                .push(Model::from_payload(self.member_schema.clone(), Some(resource))?);
        }
        Ok(self.models.len())
    }
}
