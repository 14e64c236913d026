//! User-facing errors raised by the catalog and details layers.

use thiserror::Error;

use crate::models::GameId;

/// Errors surfaced to the orchestrating layer. Messages are safe to show;
/// upstream detail has already been logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The listing (and its fallback, if any) failed.
    #[error("Failed to load games. Please check your internet connection and try again.")]
    LoadFailure,
    /// The details lookup failed. Nothing was cached.
    #[error("Failed to load game details. Please try again.")]
    DetailsFailure {
        /// Requested id, when the input normalized to one.
        id: Option<GameId>,
    },
    /// A newer load started while this one was in flight; its result was
    /// discarded.
    #[error("A newer catalog load replaced this one.")]
    Superseded,
}
