//! In-process stand-in for the remote service, used by unit tests.

use std::{collections::HashMap, time::Duration};

use parking_lot::Mutex;
use serde_json::json;

use crate::{
    api::{require_games, ApiError, GamesApi},
    models::{Game, GameDetails, GameId},
};

/// Counting fake. Categories or ids without a configured answer fail with
/// an HTTP 500 response.
#[derive(Default)]
pub(crate) struct FakeApi {
    listings: Mutex<HashMap<String, Vec<Game>>>,
    details: Mutex<HashMap<GameId, GameDetails>>,
    delays: Mutex<HashMap<String, Duration>>,
    listing_calls: Mutex<Vec<Option<String>>>,
    detail_calls: Mutex<Vec<GameId>>,
}

impl FakeApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Serve `games` for `category`; `""` is the unfiltered listing.
    pub(crate) fn with_listing(self, category: &str, games: Vec<Game>) -> Self {
        self.listings.lock().insert(category.to_string(), games);
        self
    }

    pub(crate) fn with_delay(self, category: &str, delay: Duration) -> Self {
        self.delays.lock().insert(category.to_string(), delay);
        self
    }

    pub(crate) fn with_details(self, details: GameDetails) -> Self {
        self.details.lock().insert(details.id(), details);
        self
    }

    pub(crate) fn set_details(&self, details: GameDetails) {
        self.details.lock().insert(details.id(), details);
    }

    pub(crate) fn listing_calls(&self) -> Vec<Option<String>> {
        self.listing_calls.lock().clone()
    }

    pub(crate) fn detail_calls(&self) -> usize {
        self.detail_calls.lock().len()
    }
}

impl GamesApi for FakeApi {
    async fn fetch_games(&self, category: Option<&str>) -> Result<Vec<Game>, ApiError> {
        self.listing_calls.lock().push(category.map(str::to_string));
        let key = category.unwrap_or("").to_string();

        let delay = self.delays.lock().get(&key).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let games = self.listings.lock().get(&key).cloned();
        match games {
            Some(games) => require_games(games),
            None => Err(ApiError::Response {
                status: 500,
                body: format!("no listing for {key:?}"),
            }),
        }
    }

    async fn fetch_game_details(&self, id: GameId) -> Result<GameDetails, ApiError> {
        self.detail_calls.lock().push(id);
        let details = self.details.lock().get(&id).cloned();
        details.ok_or_else(|| ApiError::Response {
            status: 404,
            body: format!("no game {id}"),
        })
    }
}

pub(crate) fn game(id: u32, title: &str, genre: &str, platform: &str, publisher: &str) -> Game {
    serde_json::from_value(json!({
        "id": id,
        "title": title,
        "genre": genre,
        "platform": platform,
        "publisher": publisher,
    }))
    .expect("valid game fixture")
}

pub(crate) fn details(id: u32, title: &str) -> GameDetails {
    serde_json::from_value(json!({
        "id": id,
        "title": title,
        "screenshots": [],
        "minimum_system_requirements": null,
    }))
    .expect("valid details fixture")
}
