//! # Save Orchestrator
//!
//! Coordinates a persistence round-trip: validate (or apply) the caller's
//! attributes, pick the method, build the outgoing document, dispatch it
//! through the transport, and reconcile the server's answer back into
//! local state.
//!
//! Two update semantics are supported:
//!
//! - **Optimistic** (default): the caller's attributes are applied to the
//!   model immediately, before the request goes out.
//! - **Wait mode** (`wait: true`): the model is left untouched; the
//!   outgoing body is built from a transient clone seeded with the current
//!   persisted projection plus the caller's attributes, and the attributes
//!   land on the real model only when the server confirms.
//!
//! Completion surfaces three ways at once, mirroring the callback contract
//! of the collaborator seam: the returned `Result`, a [`ModelEvent::Sync`]
//! on success, and a [`ModelEvent::Error`] on every transport failure.
//!
//! There is no internal retry and no request queue; a second save issued
//! before the first resolves is the caller's problem to order (the mutable
//! borrow makes that explicit in Rust).

use crate::error::ModelError;
use crate::event::ModelEvent;
use crate::model::{AttrMap, Model, SetOptions};
use crate::patch::transform_for_patch;
use crate::project::ProjectOptions;
use crate::transport::SyncMethod;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Options for [`Model::save`].
#[derive(Debug, Clone)]
pub struct SaveOptions {
    /// Run the schema's validation hook before dispatching.
    pub validate: bool,
    /// Apply the attributes only after server confirmation.
    pub wait: bool,
    /// Send a minimal patch body instead of the full document.
    pub patch: bool,
    /// Parse the server response and apply it to local state.
    pub parse: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            validate: true,
            wait: false,
            patch: false,
            parse: true,
        }
    }
}

/// What a completed save resolved to.
#[derive(Debug)]
pub struct SaveOutcome {
    /// The persistence method that was dispatched.
    pub method: SyncMethod,
    /// The server's response document, if it sent one.
    pub response: Option<Value>,
}

impl Model {
    /// Persists this model.
    ///
    /// With no attributes the current state is saved as-is. With
    /// attributes, they are applied up front (optimistic) or staged until
    /// confirmation (wait mode). Method selection: `create` for a model
    /// with no identity, `patch` when requested, `update` otherwise.
    ///
    /// Returns [`ModelError::ValidationFailed`] without dispatching when
    /// the validation hook rejects the attributes, and
    /// [`ModelError::Transport`] (after emitting [`ModelEvent::Error`])
    /// when the transport fails.
    pub async fn save(
        &mut self,
        attrs: Option<AttrMap>,
        options: SaveOptions,
    ) -> Result<SaveOutcome, ModelError> {
        let transport = self.transport()?;

        // Validation gate: optimistic saves apply (and validate) the
        // attributes immediately; wait-mode and attribute-less saves run
        // the hook without mutating.
        match (&attrs, options.wait) {
            (Some(bag), false) => {
                if !self.set(
                    bag,
                    &SetOptions {
                        validate: options.validate,
                    },
                ) {
                    return Err(ModelError::ValidationFailed);
                }
            }
            _ => {
                if options.validate {
                    let bag = attrs.clone().unwrap_or_default();
                    if !self.schema.run_validator(&bag) {
                        warn!(
                            model_type = %self.type_name(),
                            "validation rejected attributes"
                        );
                        return Err(ModelError::ValidationFailed);
                    }
                }
            }
        }

        let method = if self.is_new() {
            SyncMethod::Create
        } else if options.patch {
            SyncMethod::Patch
        } else {
            SyncMethod::Update
        };

        let candidate = attrs.unwrap_or_default();
        let payload = if method == SyncMethod::Patch {
            transform_for_patch(&self.serialize(), &candidate)
        } else if options.wait {
            // Stage the to-be state on a throwaway clone so the real model
            // stays untouched until the server confirms.
            let snapshot = self.attributes(&ProjectOptions::persisted(), false);
            let mut staged = Model::from_attrs(self.schema.clone(), snapshot);
            staged.set(&candidate, &SetOptions::default());
            staged.serialize()
        } else {
            self.serialize()
        };

        debug!(model_type = %self.type_name(), %method, "dispatching save");
        match transport.sync(method, payload).await {
            Ok(response) => {
                let mut server_attrs = if options.parse {
                    self.parse(response.as_ref())?
                } else {
                    AttrMap::new()
                };
                if options.wait {
                    // The intended attributes go under the server's;
                    // server values win on conflict.
                    let mut merged = candidate;
                    for (key, value) in server_attrs {
                        merged.insert(key, value);
                    }
                    server_attrs = merged;
                }
                if !self.set(
                    &server_attrs,
                    &SetOptions {
                        validate: options.validate,
                    },
                ) {
                    return Err(ModelError::ValidationFailed);
                }
                info!(model_type = %self.type_name(), %method, "save confirmed");
                self.events.emit(ModelEvent::Sync { method });
                Ok(SaveOutcome { method, response })
            }
            Err(source) => {
                warn!(
                    model_type = %self.type_name(),
                    %method,
                    error = %source,
                    "save failed"
                );
                self.events.emit(ModelEvent::Error {
                    message: source.to_string(),
                });
                Err(ModelError::Transport(source))
            }
        }
    }

    /// Positional form of [`Model::save`]: one key, one value.
    pub async fn save_key(
        &mut self,
        key: &str,
        value: Value,
        options: SaveOptions,
    ) -> Result<SaveOutcome, ModelError> {
        let mut attrs = AttrMap::new();
        attrs.insert(key.to_string(), value);
        self.save(Some(attrs), options).await
    }

    /// Re-reads this model from the server and applies the response.
    pub async fn fetch(&mut self) -> Result<Option<Value>, ModelError> {
        let transport = self.transport()?;
        debug!(model_type = %self.type_name(), "dispatching fetch");
        match transport.sync(SyncMethod::Read, self.serialize()).await {
            Ok(response) => {
                let attrs = self.parse(response.as_ref())?;
                self.set(&attrs, &SetOptions::default());
                self.events.emit(ModelEvent::Sync {
                    method: SyncMethod::Read,
                });
                Ok(response)
            }
            Err(source) => {
                warn!(model_type = %self.type_name(), error = %source, "fetch failed");
                self.events.emit(ModelEvent::Error {
                    message: source.to_string(),
                });
                Err(ModelError::Transport(source))
            }
        }
    }

    /// Deletes this model on the server.
    ///
    /// A model that was never persisted performs no dispatch; it just
    /// emits [`ModelEvent::Destroy`] and resolves with no response.
    pub async fn destroy(&mut self) -> Result<Option<Value>, ModelError> {
        if self.is_new() {
            self.events.emit(ModelEvent::Destroy);
            return Ok(None);
        }
        let transport = self.transport()?;
        debug!(model_type = %self.type_name(), "dispatching destroy");
        match transport.sync(SyncMethod::Delete, self.serialize()).await {
            Ok(response) => {
                self.events.emit(ModelEvent::Destroy);
                self.events.emit(ModelEvent::Sync {
                    method: SyncMethod::Delete,
                });
                Ok(response)
            }
            Err(source) => {
                warn!(model_type = %self.type_name(), error = %source, "destroy failed");
                self.events.emit(ModelEvent::Error {
                    message: source.to_string(),
                });
                Err(ModelError::Transport(source))
            }
        }
    }
}
