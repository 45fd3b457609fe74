//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **memory**: process-local repositories used when no database is set
//! - **password**: Argon2id credential hashing
//! - **token**: HS256 JSON Web Tokens
//!
//! Adapters translate between domain types and infrastructure-specific
//! representations. They contain no business logic.

pub mod memory;
pub mod password;
pub mod persistence;
pub mod token;
