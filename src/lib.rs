//! Wheelhouse - the client-side state engine for a project-tracking dashboard.
//!
//! This library owns the in-memory view of a user's projects and their
//! attached notes, shell commands, and quick-launch links, and keeps that
//! view synchronized with a remote store:
//! - `models` - entity records and partial-field patches
//! - `store` - the in-memory entity store (copy-on-write snapshots)
//! - `sync` - optimistic mutation, debounced write coalescing, reconciliation
//! - `remote` - the trait boundary to the remote store
//!
//! Everything network-facing goes through the [`remote::Remote`] trait;
//! authentication, persistence, and routing live on the other side of it.

pub mod assistant;
pub mod config;
pub mod ids;
pub mod models;
pub mod notify;
pub mod remote;
pub mod store;
pub mod sync;

pub use sync::Dashboard;

/// Library-level error type for Wheelhouse operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Remote rejected request: {0}")]
    Rejected(String),

    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Invalid ID format: {0}")]
    InvalidId(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid config: {0}")]
    Config(String),
}

/// Result type alias for Wheelhouse operations.
pub type Result<T> = std::result::Result<T, Error>;
