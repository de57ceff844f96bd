//! # Mock Transport
//!
//! [`MockTransport`] implements the same [`Transport`] API as the real
//! channel transport but operates entirely in-memory. It lets you queue
//! responses for unit tests and assert on the documents a model actually
//! dispatched, without spawning any server task.
//!
//! Two styles are available:
//!
//! - **Queued expectations** (this module): set up responses up front with
//!   `expect(method).return_ok(..)`, run the code under test, then check
//!   [`MockTransport::requests`] and call [`MockTransport::verify`].
//! - **Park and inspect** ([`crate::transport::channel`]): hold the raw
//!   receiver, spawn the save, assert on the [`SyncRequest`] while the
//!   model is still waiting, then answer. Use this when the timing between
//!   dispatch and response is part of what you are testing (wait-mode
//!   saves, error injection mid-flight).
//!
//! Clones share the expectation queue and the request log, so a test can
//! keep one handle while the model owns the other behind an
//! `Arc<dyn Transport>`.

use crate::error::TransportError;
use crate::transport::{SyncMethod, Transport};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

struct Expectation {
    method: SyncMethod,
    response: Result<Option<Value>, TransportError>,
}

/// One dispatched request, as the model sent it.
#[derive(Debug, Clone)]
pub struct SyncRecord {
    pub method: SyncMethod,
    pub payload: Value,
}

/// An in-memory [`Transport`] with expectation tracking.
///
/// # Example
/// ```
/// use jsonapi_model::mock::MockTransport;
/// use jsonapi_model::SyncMethod;
/// use serde_json::json;
///
/// let mock = MockTransport::new();
/// mock.expect(SyncMethod::Create)
///     .return_ok(Some(json!({"data": {"id": "b1", "type": "book", "attributes": {}}})));
/// // hand `mock.clone()` to the model, run the save, then:
/// // mock.verify();
/// ```
#[derive(Clone, Default)]
pub struct MockTransport {
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
    requests: Arc<Mutex<Vec<SyncRecord>>>,
}

impl MockTransport {
    /// Creates a new mock with no expectations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an expectation for the next request of the given method.
    pub fn expect(&self, method: SyncMethod) -> SyncExpectationBuilder {
        SyncExpectationBuilder {
            method,
            expectations: self.expectations.clone(),
        }
    }

    /// Every request dispatched so far, oldest first.
    pub fn requests(&self) -> Vec<SyncRecord> {
        self.requests.lock().unwrap().clone()
    }

    /// Panics if any queued expectation was never consumed.
    pub fn verify(&self) {
        let expectations = self.expectations.lock().unwrap();
        if !expectations.is_empty() {
            panic!(
                "Not all expectations were met. {} remaining",
                expectations.len()
            );
        }
    }
}

/// Builder for a single queued response.
pub struct SyncExpectationBuilder {
    method: SyncMethod,
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
}

impl SyncExpectationBuilder {
    /// Queues a successful response document.
    pub fn return_ok(self, response: Option<Value>) {
        self.expectations.lock().unwrap().push_back(Expectation {
            method: self.method,
            response: Ok(response),
        });
    }

    /// Queues a transport failure.
    pub fn return_err(self, error: TransportError) {
        self.expectations.lock().unwrap().push_back(Expectation {
            method: self.method,
            response: Err(error),
        });
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn sync(
        &self,
        method: SyncMethod,
        payload: Value,
    ) -> Result<Option<Value>, TransportError> {
        self.requests
            .lock()
            .unwrap()
            .push(SyncRecord { method, payload });
        let expectation = self.expectations.lock().unwrap().pop_front();
        match expectation {
            Some(expectation) if expectation.method == method => expectation.response,
            Some(expectation) => panic!(
                "Expected a {} request, got {}",
                expectation.method, method
            ),
            None => panic!("Unexpected {} request with no expectation queued", method),
        }
    }
}
