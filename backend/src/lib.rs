//! Recipe backend library modules.
//!
//! Hexagonal layout: [`domain`] holds the model, services and ports,
//! [`inbound`] adapts HTTP onto the driving ports, and [`outbound`]
//! implements the driven ports in memory or on PostgreSQL.

pub mod composition;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
