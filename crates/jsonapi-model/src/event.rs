//! # Model Events
//!
//! This module defines the typed event channel models emit on. Instead of
//! stringly-named events with pattern matching, every notification is a
//! variant of [`ModelEvent`], and bubbling wraps a child's event in
//! [`ModelEvent::Child`] tagged with the child's declared name. Multi-level
//! graphs nest `Child` wrappers, so the full path from the root is always
//! recoverable by unwrapping.
//!
//! Subscribers receive events over unbounded channels handed out by
//! [`EventHub::subscribe`]; a hub with no subscribers drops events on the
//! floor, which keeps emission non-blocking for the owning model.

use crate::transport::SyncMethod;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// A notification emitted by a model.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelEvent {
    /// A stored attribute value changed through `set`.
    Change { field: String },
    /// A persistence round-trip completed and the server state was applied.
    Sync { method: SyncMethod },
    /// The model was destroyed (server-side, or locally for a never-saved
    /// model).
    Destroy,
    /// A transport failure. Always emitted in addition to the `Err` return
    /// of the operation that hit it.
    Error { message: String },
    /// An event bubbled up from an owned child model, tagged with the
    /// child's declared name.
    Child { name: String, event: Box<ModelEvent> },
}

/// Fan-out point for [`ModelEvent`]s with an optional upstream link.
///
/// Every model owns one hub. When a parent adopts a child it links the
/// child's hub to its own, so anything the child emits is re-emitted on the
/// parent wrapped in [`ModelEvent::Child`]. The link goes child-to-parent
/// only; the parent's hub never references the child.
#[derive(Clone, Default)]
pub struct EventHub {
    inner: Arc<Mutex<HubState>>,
}

#[derive(Default)]
struct HubState {
    subscribers: Vec<mpsc::UnboundedSender<ModelEvent>>,
    upstream: Option<(String, EventHub)>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new subscriber and returns its receiving end.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<ModelEvent> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.inner.lock().unwrap().subscribers.push(sender);
        receiver
    }

    /// Delivers `event` to every live subscriber, then bubbles it upstream.
    pub fn emit(&self, event: ModelEvent) {
        let upstream = {
            let mut state = self.inner.lock().unwrap();
            state
                .subscribers
                .retain(|subscriber| subscriber.send(event.clone()).is_ok());
            state.upstream.clone()
        };
        if let Some((name, parent)) = upstream {
            parent.emit(ModelEvent::Child {
                name,
                event: Box::new(event),
            });
        }
    }

    /// Links this hub to a parent hub under the given child name.
    pub(crate) fn bubble_to(&self, name: &str, parent: &EventHub) {
        self.inner.lock().unwrap().upstream = Some((name.to_string(), parent.clone()));
    }
}
