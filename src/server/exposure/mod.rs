//! API exposure
//!
//! An exposure consumes a `ServerHost` and produces a Router for its
//! protocol. The dashboard is exposed over REST only.

pub mod rest;

pub use rest::RestExposure;
