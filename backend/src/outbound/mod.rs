//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed stores using Diesel
//! - **memory**: process-local keyspace for development and tests
//! - **credentials**: Argon2id password hashing
//! - **uploads**: photo files under a capability-scoped directory
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod credentials;
pub mod memory;
pub mod persistence;
pub mod uploads;
