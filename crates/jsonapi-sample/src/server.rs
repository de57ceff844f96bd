//! # In-Memory Library Server
//!
//! The server half of the sample: a task that owns a document store and
//! processes [`SyncRequest`]s sequentially. Each request is answered with
//! a JSON:API document (or a rejection), which makes it a stand-in for a
//! real HTTP backend in demos and end-to-end tests.
//!
//! Because the loop processes one message at a time and owns the store
//! exclusively, no locking is needed anywhere.

use jsonapi_model::{channel, ChannelTransport, SyncMethod, SyncRequest, TransportError};
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Owns the catalogue documents and the receiving end of the transport.
pub struct LibraryServer {
    receiver: mpsc::Receiver<SyncRequest>,
    store: HashMap<String, Value>,
    next_id: u32,
}

impl LibraryServer {
    /// Creates the server and the transport clients dispatch through.
    pub fn new(buffer_size: usize) -> (Self, ChannelTransport) {
        let (transport, receiver) = channel(buffer_size);
        let server = Self {
            receiver,
            store: HashMap::new(),
            next_id: 1,
        };
        (server, transport)
    }

    /// Runs the request loop until every transport clone is dropped.
    pub async fn run(mut self) {
        info!("Library server started");

        while let Some(SyncRequest {
            method,
            payload,
            respond_to,
        }) = self.receiver.recv().await
        {
            debug!(%method, ?payload, "request received");
            let result = match method {
                SyncMethod::Create => self.create(payload),
                SyncMethod::Read => self.read(&payload),
                SyncMethod::Update => self.update(payload),
                SyncMethod::Patch => self.patch(&payload),
                SyncMethod::Delete => self.delete(&payload),
            };
            if let Err(error) = &result {
                warn!(%method, %error, "request rejected");
            }
            let _ = respond_to.send(result);
        }

        info!(size = self.store.len(), "Library server shut down");
    }

    fn create(&mut self, mut document: Value) -> Result<Option<Value>, TransportError> {
        let id = format!("book_{}", self.next_id);
        self.next_id += 1;
        match document.get_mut("data") {
            Some(Value::Object(data)) => {
                data.insert("id".to_string(), Value::String(id.clone()));
            }
            _ => {
                return Err(TransportError::Rejected(
                    "document has no `data`".to_string(),
                ))
            }
        }
        self.store.insert(id.clone(), document.clone());
        info!(%id, size = self.store.len(), "Created");
        Ok(Some(document))
    }

    fn read(&self, payload: &Value) -> Result<Option<Value>, TransportError> {
        let id = resource_id(payload)?;
        match self.store.get(&id) {
            Some(document) => {
                debug!(%id, "Read");
                Ok(Some(document.clone()))
            }
            None => Err(TransportError::Rejected(format!("no resource `{id}`"))),
        }
    }

    fn update(&mut self, document: Value) -> Result<Option<Value>, TransportError> {
        let id = resource_id(&document)?;
        if !self.store.contains_key(&id) {
            return Err(TransportError::Rejected(format!("no resource `{id}`")));
        }
        self.store.insert(id.clone(), document.clone());
        info!(%id, "Updated");
        Ok(Some(document))
    }

    /// Merges the patch body's attributes over the stored document. The
    /// body is already minimally substituted by the client, so a shallow
    /// merge per attribute key is all replacement the server needs.
    fn patch(&mut self, document: &Value) -> Result<Option<Value>, TransportError> {
        let id = resource_id(document)?;
        let stored = self
            .store
            .get_mut(&id)
            .ok_or_else(|| TransportError::Rejected(format!("no resource `{id}`")))?;
        if let (Some(Value::Object(target)), Some(Value::Object(changes))) = (
            stored.pointer_mut("/data/attributes"),
            document.pointer("/data/attributes"),
        ) {
            for (key, value) in changes {
                target.insert(key.clone(), value.clone());
            }
        }
        info!(%id, "Patched");
        Ok(Some(stored.clone()))
    }

    fn delete(&mut self, payload: &Value) -> Result<Option<Value>, TransportError> {
        let id = resource_id(payload)?;
        match self.store.remove(&id) {
            Some(_) => {
                info!(%id, size = self.store.len(), "Deleted");
                Ok(None)
            }
            None => Err(TransportError::Rejected(format!("no resource `{id}`"))),
        }
    }
}

fn resource_id(payload: &Value) -> Result<String, TransportError> {
    payload
        .pointer("/data/id")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| TransportError::Rejected("document has no `data.id`".to_string()))
}
