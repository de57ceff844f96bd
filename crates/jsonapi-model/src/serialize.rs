//! # Serializer
//!
//! Turns a model back into the JSON:API document shape the server expects:
//! `{"data": {"id", "type", "attributes", "relationships"}}`. The
//! attributes are the raw persisted projection with `id`/`type` extracted
//! into the envelope, and `relationships` holds one `{id, type}` reference
//! per declared child. Collections are not represented in `relationships`;
//! only direct children are.

use crate::model::{AttrMap, Model};
use crate::project::ProjectOptions;
use serde_json::{json, Value};

impl Model {
    /// Serializes this model into a JSON:API document.
    ///
    /// Read-only and repeatable: the relationship references are computed
    /// fresh on every call and nothing on the model changes. A model with
    /// no server-assigned identity omits the `id` key from the envelope.
    pub fn serialize(&self) -> Value {
        let options = ProjectOptions {
            props: true,
            children: false,
            collections: false,
            ..ProjectOptions::default()
        };
        let mut attributes = self.attributes(&options, true);
        let id = attributes.remove("id").filter(|id| !id.is_null());
        let type_value = attributes
            .remove("type")
            .unwrap_or_else(|| Value::String(self.schema.type_name().to_string()));

        let mut relationships = AttrMap::new();
        for relation in self.schema.children() {
            let Some(child) = self.child(&relation.name) else {
                continue;
            };
            let mut reference = AttrMap::new();
            if let Some(child_id) = child.id() {
                reference.insert("id".to_string(), child_id.clone());
            }
            reference.insert(
                "type".to_string(),
                Value::String(child.type_name().to_string()),
            );
            relationships.insert(relation.name.clone(), json!({ "data": reference }));
        }

        let mut data = AttrMap::new();
        if let Some(id) = id {
            data.insert("id".to_string(), id);
        }
        data.insert("type".to_string(), type_value);
        data.insert("attributes".to_string(), Value::Object(attributes));
        data.insert("relationships".to_string(), Value::Object(relationships));
        json!({ "data": data })
    }
}
