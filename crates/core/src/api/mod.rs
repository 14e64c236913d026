//! Remote games API.

/// reqwest-backed implementation of [`GamesApi`].
pub mod client;

use std::future::Future;

use thiserror::Error;

use crate::models::{Game, GameDetails, GameId};

pub use client::HttpGamesApi;

/// Failures talking to the remote service. These carry full diagnostic
/// detail and are logged, never shown to the end user.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    /// Non-success status code.
    #[error("HTTP {status}: {body}")]
    Response {
        /// Status code returned by the service.
        status: u16,
        /// Response body text.
        body: String,
    },
    /// A 2xx body that does not match the expected shape.
    #[error("undecodable response body: {source}")]
    Decode {
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
        /// Raw body text.
        body: String,
    },
    /// The listing endpoint answered with no games.
    #[error("listing returned no games")]
    Empty,
}

/// A listing with no games is treated as a failed listing.
pub(crate) fn require_games(games: Vec<Game>) -> Result<Vec<Game>, ApiError> {
    if games.is_empty() {
        Err(ApiError::Empty)
    } else {
        Ok(games)
    }
}

/// Contract consumed from the remote listing service.
///
/// Both operations are single attempts; retry and caching policy live in
/// [`crate::catalog::CatalogStore`] and [`crate::details::DetailsCache`].
pub trait GamesApi: Send + Sync {
    /// List games, optionally scoped to a server-side category.
    fn fetch_games(
        &self,
        category: Option<&str>,
    ) -> impl Future<Output = Result<Vec<Game>, ApiError>> + Send;

    /// Fetch extended details for one game.
    fn fetch_game_details(
        &self,
        id: GameId,
    ) -> impl Future<Output = Result<GameDetails, ApiError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::game;

    #[test]
    fn empty_listing_is_an_error() {
        assert!(matches!(require_games(Vec::new()), Err(ApiError::Empty)));
        let games = vec![game(1, "Alpha", "Shooter", "PC", "Acme")];
        assert_eq!(require_games(games.clone()).ok(), Some(games));
    }
}
