//! # Transport Seam
//!
//! This module defines the boundary between the mapping layer and whatever
//! actually moves documents to a server. The model never constructs URLs or
//! speaks a protocol; it hands a [`SyncMethod`] and a serialized document to
//! a [`Transport`] and awaits the response document.
//!
//! [`ChannelTransport`] is the in-process implementation: requests travel
//! over a Tokio mpsc channel as [`SyncRequest`] messages and come back on a
//! oneshot channel. The receiving end can be a server task (see the sample
//! crate) or a bare receiver held by a test that wants to inspect the
//! request mid-flight before answering.

use crate::error::TransportError;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use tokio::sync::{mpsc, oneshot};

/// Persistence method selected by the save orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMethod {
    Create,
    Read,
    Update,
    Patch,
    Delete,
}

impl fmt::Display for SyncMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Patch => "patch",
            Self::Delete => "delete",
        };
        write!(f, "{name}")
    }
}

/// Type alias for the one-shot response channel used by transports.
pub type Response = oneshot::Sender<Result<Option<Value>, TransportError>>;

/// A single persistence request in flight.
///
/// The payload is always the document the model built for the call: the
/// full serialization for create/update, the reduced structure for patch,
/// and the identity envelope for read/delete.
#[derive(Debug)]
pub struct SyncRequest {
    pub method: SyncMethod,
    pub payload: Value,
    pub respond_to: Response,
}

/// The external collaborator a model delegates persistence to.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Dispatches one request and resolves with the server's response
    /// document, if any.
    async fn sync(
        &self,
        method: SyncMethod,
        payload: Value,
    ) -> Result<Option<Value>, TransportError>;
}

/// Channel-backed [`Transport`].
///
/// Cheap to clone; holds only the sending half. The paired receiver decides
/// what a request means: a real server task or a test harness.
#[derive(Clone)]
pub struct ChannelTransport {
    sender: mpsc::Sender<SyncRequest>,
}

impl ChannelTransport {
    pub fn new(sender: mpsc::Sender<SyncRequest>) -> Self {
        Self { sender }
    }
}

/// Creates a connected transport and the receiver its requests arrive on.
pub fn channel(buffer_size: usize) -> (ChannelTransport, mpsc::Receiver<SyncRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ChannelTransport::new(sender), receiver)
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn sync(
        &self,
        method: SyncMethod,
        payload: Value,
    ) -> Result<Option<Value>, TransportError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(SyncRequest {
                method,
                payload,
                respond_to,
            })
            .await
            .map_err(|_| TransportError::Closed)?;
        response.await.map_err(|_| TransportError::Dropped)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn request_round_trips_through_the_channel() {
        let (transport, mut receiver) = channel(4);

        let call = tokio::spawn(async move {
            transport
                .sync(SyncMethod::Create, json!({"data": {"type": "widget"}}))
                .await
        });

        let request = receiver.recv().await.expect("expected a request");
        assert_eq!(request.method, SyncMethod::Create);
        assert_eq!(request.payload["data"]["type"], json!("widget"));
        request
            .respond_to
            .send(Ok(Some(json!({"data": {"id": "w1"}}))))
            .unwrap();

        let response = call.await.unwrap().unwrap();
        assert_eq!(response, Some(json!({"data": {"id": "w1"}})));
    }

    #[tokio::test]
    async fn closed_receiver_maps_to_transport_closed() {
        let (transport, receiver) = channel(4);
        drop(receiver);

        let result = transport.sync(SyncMethod::Read, json!({})).await;
        assert!(matches!(result, Err(TransportError::Closed)));
    }

    #[tokio::test]
    async fn dropped_responder_maps_to_transport_dropped() {
        let (transport, mut receiver) = channel(4);

        let call =
            tokio::spawn(async move { transport.sync(SyncMethod::Delete, json!({})).await });

        let request = receiver.recv().await.expect("expected a request");
        drop(request.respond_to);

        let result = call.await.unwrap();
        assert!(matches!(result, Err(TransportError::Dropped)));
    }
}
