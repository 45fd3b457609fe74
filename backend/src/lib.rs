//! Animelist backend: a personal anime watch-list HTTP API.
//!
//! The crate follows a hexagonal layout. [`domain`] holds the aggregates,
//! ports and use-case services; [`inbound`] adapts HTTP requests onto the
//! driving ports; [`outbound`] implements the driven ports against
//! PostgreSQL, an in-memory store, Argon2 and JWT.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(test)]
pub(crate) mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
