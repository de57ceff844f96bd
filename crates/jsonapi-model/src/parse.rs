//! # Parse Adapter
//!
//! Normalizes an incoming JSON:API document into the flat attribute bag
//! [`Model::set`] expects. Two shapes are accepted: a single resource
//! wrapped in a `{"data": ...}` envelope (querying the resource API
//! directly) and a bare resource object (a member of a collection's `data`
//! array, which carries no envelope of its own).
//!
//! The flattened bag is also remembered on the model so that graph
//! initialization can hand each declared child its own sub-payload instead
//! of the parent's full document.

use crate::error::ModelError;
use crate::model::{AttrMap, Model};
use serde_json::Value;

fn present(object: &AttrMap, key: &str) -> bool {
    matches!(object.get(key), Some(value) if !value.is_null())
}

impl Model {
    /// Parses a server payload into a flat attribute bag.
    ///
    /// An absent payload, a non-object payload, or an object with neither
    /// `data` nor `id` yields an empty bag ("nothing to apply"), which is
    /// the normal case for collection members re-parsed without an
    /// envelope. A payload that passes that guard but lacks an
    /// `attributes` object is malformed and fails loudly.
    ///
    /// The resource's top-level `id` and `type` are folded into the bag,
    /// overwriting same-named keys from `attributes`. The bag is stored as
    /// this model's remembered raw attributes before being returned.
    pub fn parse(&mut self, payload: Option<&Value>) -> Result<AttrMap, ModelError> {
        let document = match payload {
            Some(Value::Object(document)) => document,
            _ => return Ok(AttrMap::new()),
        };
        if !present(document, "data") && !present(document, "id") {
            return Ok(AttrMap::new());
        }

        let resource = match document.get("data") {
            Some(Value::Object(resource)) => resource,
            Some(value) if !value.is_null() => {
                return Err(ModelError::MalformedPayload(
                    "`data` is not a resource object".to_string(),
                ))
            }
            _ => document,
        };

        let mut attrs = match resource.get("attributes") {
            Some(Value::Object(attributes)) => attributes.clone(),
            Some(_) => {
                return Err(ModelError::MalformedPayload(
                    "`attributes` is not an object".to_string(),
                ))
            }
            None => {
                return Err(ModelError::MalformedPayload(
                    "resource object has no `attributes`".to_string(),
                ))
            }
        };

        for key in ["id", "type"] {
            match resource.get(key) {
                Some(value) if !value.is_null() => {
                    attrs.insert(key.to_string(), value.clone());
                }
                _ => {
                    attrs.remove(key);
                }
            }
        }

        self.remembered = Some(attrs.clone());
        Ok(attrs)
    }
}
