//! # Schema Descriptors
//!
//! The [`Schema`] type is the contract every model type declares once and
//! the generic machinery derives all behavior from: which attributes are
//! persisted vs. session-only, which values are computed, which keys hold
//! owned child models, which hold ordered collections.
//!
//! # Architecture Note
//! Why an explicit descriptor list instead of per-type structs?
//! The mapping layer's job is uniform: project, parse, diff, and serialize
//! *any* declared shape. By making the declaration a value (a list of
//! [`FieldDescriptor`]s plus derived/child/collection relations) we write
//! the projection and serialization logic once and iterate the declaration
//! with ordinary loops. No reflection, no per-field dispatch.
//!
//! `id` and `type` are auto-declared as persisted fields on every schema
//! (`type` defaults to the schema's type name). That keeps the resource
//! identity flowing through the same projection path as everything else;
//! the serializer extracts the pair back out into the document envelope.

use crate::model::{AttrMap, Model};
use serde_json::Value;
use std::sync::Arc;

/// Getter applied to a stored value when projecting in non-raw mode.
pub type ReadFn = Arc<dyn Fn(&Value) -> Value + Send + Sync>;
/// Computes a derived (read-only) attribute from the live model.
pub type ComputeFn = Arc<dyn Fn(&Model) -> Value + Send + Sync>;
/// Validation hook run over a proposed attribute bag.
pub type ValidateFn = Arc<dyn Fn(&AttrMap) -> bool + Send + Sync>;

/// One declared attribute.
pub struct FieldDescriptor {
    pub name: String,
    /// Session fields live only in memory and are never persisted.
    pub session: bool,
    /// Fallback used by projection when the field has no stored value.
    pub default: Option<Value>,
    /// Optional getter; raw projection bypasses it.
    pub read: Option<ReadFn>,
}

/// A computed, read-only attribute.
pub struct DerivedField {
    pub name: String,
    pub compute: ComputeFn,
}

/// A named owned child model and the schema it is built from.
pub struct ChildRelation {
    pub name: String,
    pub schema: Arc<Schema>,
}

/// A named owned collection and its member schema.
pub struct CollectionRelation {
    pub name: String,
    pub member: Arc<Schema>,
}

/// Static per-type declaration shared by every instance of a model type.
pub struct Schema {
    type_name: String,
    fields: Vec<FieldDescriptor>,
    derived: Vec<DerivedField>,
    children: Vec<ChildRelation>,
    collections: Vec<CollectionRelation>,
    validate: Option<ValidateFn>,
}

impl Schema {
    pub fn builder(type_name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            type_name: type_name.into(),
            fields: Vec::new(),
            derived: Vec::new(),
            children: Vec::new(),
            collections: Vec::new(),
            validate: None,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn derived(&self) -> &[DerivedField] {
        &self.derived
    }

    pub fn children(&self) -> &[ChildRelation] {
        &self.children
    }

    pub fn collections(&self) -> &[CollectionRelation] {
        &self.collections
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn child(&self, name: &str) -> Option<&ChildRelation> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn collection(&self, name: &str) -> Option<&CollectionRelation> {
        self.collections.iter().find(|collection| collection.name == name)
    }

    /// Runs the validation hook; a schema without one accepts everything.
    pub(crate) fn run_validator(&self, attrs: &AttrMap) -> bool {
        match &self.validate {
            Some(validate) => validate(attrs),
            None => true,
        }
    }
}

/// Fluent constructor for [`Schema`].
pub struct SchemaBuilder {
    type_name: String,
    fields: Vec<FieldDescriptor>,
    derived: Vec<DerivedField>,
    children: Vec<ChildRelation>,
    collections: Vec<CollectionRelation>,
    validate: Option<ValidateFn>,
}

impl SchemaBuilder {
    /// Declares a persisted attribute.
    pub fn prop(self, name: impl Into<String>) -> Self {
        self.field(name, false, None)
    }

    /// Declares a persisted attribute with a projection-time default.
    pub fn prop_with_default(self, name: impl Into<String>, default: Value) -> Self {
        self.field(name, false, Some(default))
    }

    /// Declares a session (in-memory only) attribute.
    pub fn session(self, name: impl Into<String>) -> Self {
        self.field(name, true, None)
    }

    fn field(mut self, name: impl Into<String>, session: bool, default: Option<Value>) -> Self {
        self.fields.push(FieldDescriptor {
            name: name.into(),
            session,
            default,
            read: None,
        });
        self
    }

    /// Attaches a getter to an already-declared attribute.
    ///
    /// # Panics
    /// Panics if no field with that name was declared; attaching a getter
    /// to nothing is a schema-authoring bug.
    pub fn getter<F>(mut self, name: &str, read: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        match self.fields.iter_mut().find(|field| field.name == name) {
            Some(field) => field.read = Some(Arc::new(read)),
            None => panic!("getter declared for unknown field `{name}`"),
        }
        self
    }

    /// Declares a derived attribute computed from the live model.
    pub fn derived<F>(mut self, name: impl Into<String>, compute: F) -> Self
    where
        F: Fn(&Model) -> Value + Send + Sync + 'static,
    {
        self.derived.push(DerivedField {
            name: name.into(),
            compute: Arc::new(compute),
        });
        self
    }

    /// Declares an owned child model under the given key.
    pub fn child(mut self, name: impl Into<String>, schema: Arc<Schema>) -> Self {
        self.children.push(ChildRelation {
            name: name.into(),
            schema,
        });
        self
    }

    /// Declares an owned ordered collection under the given key.
    pub fn collection(mut self, name: impl Into<String>, member: Arc<Schema>) -> Self {
        self.collections.push(CollectionRelation {
            name: name.into(),
            member,
        });
        self
    }

    /// Installs the validation hook.
    pub fn validate<F>(mut self, validate: F) -> Self
    where
        F: Fn(&AttrMap) -> bool + Send + Sync + 'static,
    {
        self.validate = Some(Arc::new(validate));
        self
    }

    pub fn build(mut self) -> Arc<Schema> {
        if !self.fields.iter().any(|field| field.name == "id") {
            self.fields.insert(
                0,
                FieldDescriptor {
                    name: "id".to_string(),
                    session: false,
                    default: None,
                    read: None,
                },
            );
        }
        if !self.fields.iter().any(|field| field.name == "type") {
            self.fields.insert(
                1,
                FieldDescriptor {
                    name: "type".to_string(),
                    session: false,
                    default: Some(Value::String(self.type_name.clone())),
                    read: None,
                },
            );
        }
        Arc::new(Schema {
            type_name: self.type_name,
            fields: self.fields,
            derived: self.derived,
            children: self.children,
            collections: self.collections,
            validate: self.validate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn id_and_type_are_auto_declared() {
        let schema = Schema::builder("book").prop("title").build();
        assert!(schema.field("id").is_some());
        let type_field = schema.field("type").expect("type field");
        assert_eq!(type_field.default, Some(json!("book")));
        assert_eq!(schema.fields().len(), 3);
    }

    #[test]
    fn explicit_id_declaration_is_not_duplicated() {
        let schema = Schema::builder("book")
            .prop_with_default("id", json!("draft"))
            .prop("title")
            .build();
        let declared: Vec<_> = schema
            .fields()
            .iter()
            .filter(|field| field.name == "id")
            .collect();
        assert_eq!(declared.len(), 1);
        assert_eq!(declared[0].default, Some(json!("draft")));
    }

    #[test]
    fn session_flag_and_lookup() {
        let schema = Schema::builder("book")
            .prop("title")
            .session("draft_notes")
            .build();
        assert!(!schema.field("title").unwrap().session);
        assert!(schema.field("draft_notes").unwrap().session);
        assert!(schema.field("missing").is_none());
    }

    #[test]
    fn validator_defaults_to_accepting() {
        let open = Schema::builder("book").prop("title").build();
        assert!(open.run_validator(&AttrMap::new()));

        let strict = Schema::builder("book")
            .prop("title")
            .validate(|attrs| !attrs.contains_key("forbidden"))
            .build();
        let mut attrs = AttrMap::new();
        attrs.insert("forbidden".to_string(), json!(1));
        assert!(!strict.run_validator(&attrs));
    }
}
