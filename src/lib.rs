//! REST backend for a recipe-sharing site.
//!
//! The crate follows a hexagonal layout: `domain` holds entities, rules,
//! and repository ports; `inbound::http` adapts them to Actix handlers;
//! `outbound::persistence` implements the ports against MongoDB or an
//! in-memory store; `server` wires everything together.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

pub use middleware::Trace;
