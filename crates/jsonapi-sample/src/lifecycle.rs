//! # System Lifecycle & Observability
//!
//! Wires the sample system together: tracing setup and the
//! [`LibrarySystem`] orchestrator that spawns the server task, hands out
//! the transport, and shuts everything down cleanly.
//!
//! ## Tracing
//!
//! Structured logging with the `tracing` crate, configurable through the
//! `RUST_LOG` environment variable:
//!
//! ```bash
//! # Lifecycle milestones only
//! RUST_LOG=info cargo run
//!
//! # Full request payloads at dispatch time
//! RUST_LOG=debug cargo run
//! ```
//!
//! The compact format hides module targets; log lines carry structured
//! fields (`model_type`, `method`, `id`) instead.

use crate::server::LibraryServer;
use jsonapi_model::ChannelTransport;
use tokio::task::JoinHandle;

/// Initializes the tracing subscriber for the whole application.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}

/// Running sample system: one server task plus the transport to reach it.
pub struct LibrarySystem {
    pub transport: ChannelTransport,
    handle: JoinHandle<()>,
}

impl LibrarySystem {
    /// Spawns the server and returns the connected system.
    pub fn start() -> Self {
        let (server, transport) = LibraryServer::new(32);
        let handle = tokio::spawn(server.run());
        Self { transport, handle }
    }

    /// Drops the transport to signal shutdown, then awaits the server.
    ///
    /// Any transport clones still held by live models keep the server
    /// running; drop the models first.
    pub async fn shutdown(self) {
        drop(self.transport);
        let _ = self.handle.await;
    }
}
