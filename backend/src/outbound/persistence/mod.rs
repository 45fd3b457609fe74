//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the repository ports backed by PostgreSQL via
//! Diesel, with async support through `diesel-async` and `bb8` pooling.
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types. Ownership scoping happens in every `WHERE` clause.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leak into the domain.
//! - **Strongly typed errors**: database failures map onto each port's
//!   `define_port_error!` enum.
//!
//! # Example
//!
//! ```ignore
//! use animelist::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! if let Some(config) = PoolConfig::from_settings(&settings)? {
//!     let users = DieselUserRepository::new(DbPool::connect(&config).await?);
//! }
//! ```

mod diesel_anime_repository;
mod diesel_helpers;
mod diesel_playlist_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_anime_repository::DieselAnimeRepository;
pub use diesel_playlist_repository::DieselPlaylistRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DEFAULT_MAX_CONNECTIONS, DbPool, PoolConfig, PoolError};
