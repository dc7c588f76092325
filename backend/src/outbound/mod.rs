//! Outbound adapters implementing the driven domain ports.
//!
//! - **memory**: process-local repositories used when no database is
//!   configured and by HTTP tests.
//! - **persistence**: PostgreSQL repositories built on Diesel.
//!
//! Adapters translate between domain types and storage representations and
//! contain no business rules beyond the uniqueness and ownership guarantees
//! the ports demand.

pub mod memory;
pub mod persistence;
