//! Server module for building the dashboard HTTP server
//!
//! This module provides a `ServerBuilder` that wires:
//! - The invoice store, customer directory and identity provider
//! - Login, dashboard and invoice routes
//! - The session middleware guarding `/dashboard`

pub mod builder;
pub mod exposure;
pub mod handlers;
pub mod host;
pub mod middleware;
pub mod router;

pub use builder::ServerBuilder;
pub use exposure::RestExposure;
pub use host::ServerHost;
