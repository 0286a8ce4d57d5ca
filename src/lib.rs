//! Typed request/response cache client for the department portal REST API.
//!
//! Feature modules under [`endpoints`] declare the API; [`client::PortalClient`]
//! runs queries through the [`cache`] and mutations through the tag-based
//! invalidation that keeps cached queries consistent.

pub mod cache;
pub mod client;
pub mod config;
pub mod endpoint;
pub mod endpoints;
pub mod infra;
pub mod session;
pub mod transport;

pub use client::PortalClient;
pub use deptportal_api_types as api_types;
