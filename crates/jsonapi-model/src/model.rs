//! # The Model Entity
//!
//! [`Model`] is a schema-typed node in an object graph: a bag of raw
//! attribute values plus owned child models and owned ordered collections,
//! all declared by its [`Schema`]. The model exclusively owns its children
//! and collection members; children hold only a non-owning event link back
//! to the parent, so anything a child emits resurfaces on the parent
//! wrapped in [`ModelEvent::Child`].
//!
//! # Construction
//! - [`Model::new`]: empty graph, declared collections empty, declared
//!   children present but blank.
//! - [`Model::from_payload`]: the server-payload path. Parse the document,
//!   apply the flat bag, then initialize collections and children so each
//!   child can seed itself from its own sub-payload (the remembered raw
//!   attributes from the parse).
//! - [`Model::from_attrs`]: the snapshot path. Seed from a projection,
//!   treating nested objects under child names as child bags and arrays
//!   under collection names as member bags. Used by wait-mode saves to
//!   build a transient "to-be" clone without touching the real model.
//!
//! # Concurrency Note
//! There is no internal locking and no request queue. A save borrows the
//! model mutably for its whole round-trip, so overlapping saves on one
//! model are impossible within a single task; designs that share a
//! transport across clones of the model's state inherit the usual
//! last-writer-wins caveat on reconciliation.

use crate::collection::Collection;
use crate::error::ModelError;
use crate::event::{EventHub, ModelEvent};
use crate::schema::Schema;
use crate::transport::Transport;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::warn;

/// Flat attribute bag: attribute name to JSON value.
pub type AttrMap = serde_json::Map<String, Value>;

/// Options for [`Model::set`].
#[derive(Debug, Clone, Default)]
pub struct SetOptions {
    /// Run the schema's validation hook before applying anything.
    pub validate: bool,
}

/// A schema-typed entity with owned children and collections.
pub struct Model {
    pub(crate) schema: Arc<Schema>,
    pub(crate) values: AttrMap,
    pub(crate) children: BTreeMap<String, Model>,
    pub(crate) collections: BTreeMap<String, Collection>,
    /// Last parsed flat bag, kept so children can pull their own
    /// sub-payload during graph initialization. Overwritten on every parse.
    pub(crate) remembered: Option<AttrMap>,
    pub(crate) events: EventHub,
    pub(crate) transport: Option<Arc<dyn Transport>>,
}

impl Model {
    fn bare(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            values: AttrMap::new(),
            children: BTreeMap::new(),
            collections: BTreeMap::new(),
            remembered: None,
            events: EventHub::new(),
            transport: None,
        }
    }

    /// Creates an empty model with its declared graph in place.
    pub fn new(schema: Arc<Schema>) -> Self {
        let mut model = Self::bare(schema);
        model.init_collections();
        let declared = model.schema.clone();
        for relation in declared.children() {
            let child = Model::new(relation.schema.clone());
            model.adopt_child(&relation.name, child);
        }
        model
    }

    /// Builds a model from a server payload: parse, apply, initialize the
    /// graph so children seed themselves from their own sub-payloads.
    pub fn from_payload(schema: Arc<Schema>, payload: Option<&Value>) -> Result<Self, ModelError> {
        let mut model = Self::bare(schema);
        let attrs = model.parse(payload)?;
        model.set(&attrs, &SetOptions::default());
        model.init_collections();
        model.init_children()?;
        Ok(model)
    }

    /// Builds a model from a plain projection snapshot (no parsing).
    ///
    /// Nested objects under declared child names become child seeds and
    /// arrays under declared collection names become member seeds, which is
    /// exactly what [`Model::attributes`] produces for a full graph.
    pub fn from_attrs(schema: Arc<Schema>, attrs: AttrMap) -> Self {
        let mut model = Self::bare(schema);
        model.set(&attrs, &SetOptions::default());
        model.init_collections();
        let declared = model.schema.clone();
        for relation in declared.children() {
            let child = match attrs.get(&relation.name) {
                Some(Value::Object(bag)) => {
                    Model::from_attrs(relation.schema.clone(), bag.clone())
                }
                _ => Model::new(relation.schema.clone()),
            };
            model.adopt_child(&relation.name, child);
        }
        for relation in declared.collections() {
            if let (Some(collection), Some(Value::Array(items))) = (
                model.collections.get_mut(&relation.name),
                attrs.get(&relation.name),
            ) {
                for item in items {
                    if let Value::Object(bag) = item {
                        collection.add(Model::from_attrs(relation.member.clone(), bag.clone()));
                    }
                }
            }
        }
        model
    }

    /// Instantiates every declared collection that is not already present.
    pub(crate) fn init_collections(&mut self) {
        let declared = self.schema.clone();
        for relation in declared.collections() {
            self.collections
                .entry(relation.name.clone())
                .or_insert_with(|| Collection::new(relation.member.clone()));
        }
    }

    /// Instantiates every declared child that is not already present,
    /// seeding each from its sub-object in the remembered raw attributes
    /// and linking its events to this model.
    ///
    /// Must run after a parse has populated the remembered attributes;
    /// otherwise children come up blank.
    pub(crate) fn init_children(&mut self) -> Result<(), ModelError> {
        let declared = self.schema.clone();
        for relation in declared.children() {
            if self.children.contains_key(&relation.name) {
                continue;
            }
            let seed = self
                .remembered
                .as_ref()
                .and_then(|bag| bag.get(&relation.name))
                .filter(|value| value.is_object())
                .cloned();
            let child = match seed {
                Some(payload) => Model::from_payload(relation.schema.clone(), Some(&payload))?,
                None => Model::new(relation.schema.clone()),
            };
            self.adopt_child(&relation.name, child);
        }
        Ok(())
    }

    fn adopt_child(&mut self, name: &str, child: Model) {
        child.events.bubble_to(name, &self.events);
        self.children.insert(name.to_string(), child);
    }

    /// Applies a flat attribute bag.
    ///
    /// Declared fields are stored (emitting [`ModelEvent::Change`] when the
    /// value actually changes), objects under declared child names are
    /// delegated to the child, and unknown keys are ignored. Returns
    /// `false` without applying anything when validation was requested and
    /// the hook rejected the bag.
    pub fn set(&mut self, attrs: &AttrMap, options: &SetOptions) -> bool {
        if options.validate && !self.schema.run_validator(attrs) {
            warn!(
                model_type = %self.schema.type_name(),
                "validation rejected attributes"
            );
            return false;
        }
        let declared = self.schema.clone();
        for (key, value) in attrs {
            if declared.field(key).is_some() {
                if self.values.get(key) != Some(value) {
                    self.values.insert(key.clone(), value.clone());
                    self.events.emit(ModelEvent::Change { field: key.clone() });
                }
            } else if declared.child(key).is_some() {
                if let (Some(child), Value::Object(bag)) = (self.children.get_mut(key), value) {
                    child.set(bag, options);
                }
            }
        }
        true
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Server-assigned identity, if any.
    pub fn id(&self) -> Option<&Value> {
        self.values.get("id").filter(|id| !id.is_null())
    }

    /// The resource type: the stored `type` value, falling back to the
    /// schema's type name.
    pub fn type_name(&self) -> &str {
        self.values
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_else(|| self.schema.type_name())
    }

    /// True until the server has assigned an identity.
    pub fn is_new(&self) -> bool {
        self.id().is_none()
    }

    /// The stored raw value of a field.
    pub fn raw(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    /// The getter-exposed value of a field; falls back to the raw value
    /// when the field has no getter.
    pub fn value(&self, field: &str) -> Option<Value> {
        let stored = self.values.get(field)?;
        match self.schema.field(field).and_then(|f| f.read.as_ref()) {
            Some(read) => Some(read(stored)),
            None => Some(stored.clone()),
        }
    }

    /// The current value of a derived field.
    pub fn derived(&self, name: &str) -> Option<Value> {
        self.schema
            .derived()
            .iter()
            .find(|derived| derived.name == name)
            .map(|derived| (derived.compute)(self))
    }

    pub fn child(&self, name: &str) -> Option<&Model> {
        self.children.get(name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Model> {
        self.children.get_mut(name)
    }

    pub fn collection(&self, name: &str) -> Option<&Collection> {
        self.collections.get(name)
    }

    pub fn collection_mut(&mut self, name: &str) -> Option<&mut Collection> {
        self.collections.get_mut(name)
    }

    /// The last parsed flat bag, if a parse has happened.
    pub fn remembered_attrs(&self) -> Option<&AttrMap> {
        self.remembered.as_ref()
    }

    /// Subscribes to this model's events (own and bubbled).
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<ModelEvent> {
        self.events.subscribe()
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn set_transport(&mut self, transport: Arc<dyn Transport>) {
        self.transport = Some(transport);
    }

    pub(crate) fn transport(&self) -> Result<Arc<dyn Transport>, ModelError> {
        self.transport.clone().ok_or(ModelError::NoTransport)
    }
}
