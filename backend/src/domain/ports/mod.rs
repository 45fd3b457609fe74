//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`TokenService`], [`PasswordHasher`]) are
//! implemented by outbound adapters. Driving ports (`*Command`, `*Query`)
//! are implemented by the domain services and consumed by HTTP handlers.

mod macros;
pub(crate) use macros::define_port_error;

mod account_command;
mod anime_command;
mod anime_repository;
mod password_hasher;
mod playlist_command;
mod playlist_repository;
mod token_service;
mod user_repository;

#[cfg(test)]
pub use account_command::MockAccountCommand;
pub use account_command::{AccountCommand, AuthSession};
#[cfg(test)]
pub use anime_command::{MockAnimeCommand, MockAnimeQuery};
pub use anime_command::{AnimeCommand, AnimeQuery};
#[cfg(test)]
pub use anime_repository::MockAnimeRepository;
pub use anime_repository::{AnimeRepository, AnimeRepositoryError};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use playlist_command::{MockPlaylistCommand, MockPlaylistQuery};
pub use playlist_command::{NewPlaylist, PlaylistChanges, PlaylistCommand, PlaylistQuery};
#[cfg(test)]
pub use playlist_repository::MockPlaylistRepository;
pub use playlist_repository::{PlaylistRepository, PlaylistRepositoryError};
#[cfg(test)]
pub use token_service::MockTokenService;
pub use token_service::{InvalidTokenError, TokenIssueError, TokenService};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
