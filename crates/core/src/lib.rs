#![warn(clippy::all, missing_docs)]

//! Data access for the free-to-play games catalog.
//!
//! This crate hosts the configuration, domain models, HTTP client,
//! catalog store and details cache used by the terminal UI and any
//! future frontends.

pub mod api;
pub mod catalog;
pub mod categories;
pub mod config;
pub mod details;
pub mod error;
pub mod models;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{ApiError, GamesApi, HttpGamesApi};
pub use catalog::{CatalogSnapshot, CatalogStore};
pub use crate::config::AppConfig;
pub use details::DetailsCache;
pub use error::CatalogError;
pub use models::{CatalogStats, Game, GameDetails, GameId, IntoGameId, SystemRequirements};
