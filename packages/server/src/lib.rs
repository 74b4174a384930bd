//! Real-time message relay server.
//!
//! Clients connect over WebSocket with a `client_id`; every frame they send is
//! persisted first and then forwarded to its recipient. Backend services can
//! push to connected clients over the HTTP API.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// wiring
pub mod bootstrap;
pub mod config;
