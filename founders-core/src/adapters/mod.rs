//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - DuckDB for the WorkspaceRepository port (durable)
//! - In-process maps for the WorkspaceRepository port (tests, throwaway sessions)
//! - Caller-supplied profiles for the IdentityProvider port

pub mod duckdb;
pub mod local_identity;
pub mod memory;
