//! # Attribute Projector
//!
//! Walks a model's schema and produces a plain-data snapshot of its state.
//! Field categories are selected through [`ProjectOptions`]; the positional
//! `raw` flag picks between the stored raw value and the getter-exposed
//! value for each persisted/session attribute.
//!
//! Projection is read-only and deterministic: the same model state and the
//! same options always produce the same bag.

use crate::model::{AttrMap, Model};
use serde_json::Value;

/// Field selection for [`Model::attributes`].
#[derive(Debug, Clone)]
pub struct ProjectOptions {
    /// Include session (in-memory only) attributes.
    pub session: bool,
    /// Include persisted attributes.
    pub props: bool,
    /// Include derived attributes.
    pub derived: bool,
    /// Recursively include child projections.
    pub children: bool,
    /// Include collection member projections.
    pub collections: bool,
}

impl Default for ProjectOptions {
    fn default() -> Self {
        Self {
            session: false,
            props: false,
            derived: false,
            children: true,
            collections: true,
        }
    }
}

impl ProjectOptions {
    /// Persisted attributes with the default graph inclusion.
    pub fn persisted() -> Self {
        Self {
            props: true,
            ..Self::default()
        }
    }

    /// Everything the schema declares: session, persisted, and derived.
    pub fn full() -> Self {
        Self {
            session: true,
            props: true,
            derived: true,
            children: true,
            collections: true,
        }
    }
}

impl Model {
    /// Projects this model (and, per options, its graph) to a plain bag.
    ///
    /// A persisted/session field is included when its category is selected
    /// and it resolves to a value: the stored value (raw mode) or the
    /// getter-exposed value, falling back to the field's declared default,
    /// omitted entirely when still unresolved. Derived fields are included
    /// unconditionally when selected. Children nest their own projection
    /// under their name; collections contribute an array of member
    /// projections.
    pub fn attributes(&self, options: &ProjectOptions, raw: bool) -> AttrMap {
        let mut result = AttrMap::new();
        for field in self.schema.fields() {
            let wanted = (options.session && field.session) || (options.props && !field.session);
            if !wanted {
                continue;
            }
            let mut value = if raw {
                self.raw(&field.name).cloned()
            } else {
                self.value(&field.name)
            };
            if value.is_none() {
                value = field.default.clone();
            }
            if let Some(value) = value {
                result.insert(field.name.clone(), value);
            }
        }
        if options.derived {
            for derived in self.schema.derived() {
                result.insert(derived.name.clone(), (derived.compute)(self));
            }
        }
        if options.children {
            for relation in self.schema.children() {
                if let Some(child) = self.child(&relation.name) {
                    result.insert(
                        relation.name.clone(),
                        Value::Object(child.attributes(options, raw)),
                    );
                }
            }
        }
        if options.collections {
            for relation in self.schema.collections() {
                if let Some(collection) = self.collection(&relation.name) {
                    let members = collection
                        .iter()
                        .map(|member| Value::Object(member.attributes(options, raw)))
                        .collect();
                    result.insert(relation.name.clone(), Value::Array(members));
                }
            }
        }
        result
    }
}
