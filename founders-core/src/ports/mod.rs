//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The core domain
//! depends only on these traits, not on concrete implementations.

mod identity;
mod repository;

pub use identity::{Identity, IdentityProvider};
pub use repository::WorkspaceRepository;
