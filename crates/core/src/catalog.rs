//! Catalog store: the last-loaded game list and queries over it.

use std::{
    collections::BTreeSet,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{info, warn};

use crate::{
    api::GamesApi,
    error::CatalogError,
    models::{CatalogStats, Game, IntoGameId},
};

/// Result of one successful load. Never mutated after construction; a new
/// load swaps in a fresh snapshot.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    games: Vec<Game>,
    category: Option<String>,
    fallback: bool,
    loaded_at: Option<DateTime<Utc>>,
}

impl CatalogSnapshot {
    fn new(games: Vec<Game>, category: Option<String>, fallback: bool) -> Self {
        Self {
            games,
            category,
            fallback,
            loaded_at: Some(Utc::now()),
        }
    }

    /// Games in listing order.
    pub fn games(&self) -> &[Game] {
        &self.games
    }

    /// Category the listing was served for; `None` for the unfiltered list.
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Whether the unfiltered fallback produced this snapshot.
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    /// When the snapshot was loaded; `None` before the first load.
    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }

    /// Whether nothing has been loaded yet.
    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Exact id match after normalizing the input.
    pub fn find_by_id(&self, id: impl IntoGameId) -> Option<&Game> {
        let id = id.into_game_id()?;
        self.games.iter().find(|game| game.id == id)
    }

    /// Case-insensitive substring search over title, genre and publisher.
    pub fn search(&self, term: &str) -> Vec<Game> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return self.games.clone();
        }
        self.games
            .iter()
            .filter(|game| game.matches(&needle))
            .cloned()
            .collect()
    }

    /// Case-insensitive containment match on genre.
    pub fn filter_by_genre(&self, genre: &str) -> Vec<Game> {
        if genre.is_empty() {
            return self.games.clone();
        }
        let needle = genre.to_lowercase();
        self.games
            .iter()
            .filter(|game| game.genre.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    /// Distinct genres, sorted ascending.
    pub fn available_genres(&self) -> Vec<String> {
        self.games
            .iter()
            .map(|game| game.genre.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Totals over the snapshot.
    pub fn stats(&self) -> CatalogStats {
        let platforms: BTreeSet<&str> = self.games.iter().map(|g| g.platform.as_str()).collect();
        CatalogStats {
            total: self.games.len(),
            genre_count: self.available_genres().len(),
            platform_count: platforms.len(),
        }
    }
}

impl From<Vec<Game>> for CatalogSnapshot {
    /// An unfiltered snapshot over `games`.
    fn from(games: Vec<Game>) -> Self {
        Self::new(games, None, false)
    }
}

/// Owns the current catalog snapshot and loads new ones from a [`GamesApi`].
///
/// Loads are tagged with a generation number. A load whose response arrives
/// after a newer load has started is discarded and returns
/// [`CatalogError::Superseded`], so the snapshot always reflects the most
/// recently requested category.
pub struct CatalogStore<A> {
    api: A,
    snapshot: RwLock<Arc<CatalogSnapshot>>,
    generation: AtomicU64,
}

impl<A: GamesApi> CatalogStore<A> {
    /// Create an empty store backed by `api`.
    pub fn new(api: A) -> Self {
        Self {
            api,
            snapshot: RwLock::new(Arc::new(CatalogSnapshot::default())),
            generation: AtomicU64::new(0),
        }
    }

    /// Backing API.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Fetch the listing for `category` (blank means all games) and make it
    /// the current snapshot.
    ///
    /// A failed category request is retried once without a category. If
    /// that fails too, or no category was requested, the snapshot is left
    /// untouched and [`CatalogError::LoadFailure`] is returned.
    pub async fn load(&self, category: &str) -> Result<Vec<Game>, CatalogError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let category = Some(category.trim()).filter(|c| !c.is_empty());
        info!(category = category.unwrap_or(""), generation, "loading games");

        let (games, served, fallback) = match self.api.fetch_games(category).await {
            Ok(games) => (games, category, false),
            Err(err) => {
                warn!(category = category.unwrap_or(""), error = %err, "error fetching games");
                let Some(requested) = category else {
                    return Err(CatalogError::LoadFailure);
                };
                info!(category = requested, "retrying without category");
                match self.api.fetch_games(None).await {
                    Ok(games) => (games, None, true),
                    Err(err) => {
                        warn!(error = %err, "fallback listing failed");
                        return Err(CatalogError::LoadFailure);
                    }
                }
            }
        };

        let mut current = self.snapshot.write();
        if self.generation.load(Ordering::SeqCst) != generation {
            info!(generation, "discarding superseded catalog load");
            return Err(CatalogError::Superseded);
        }
        *current = Arc::new(CatalogSnapshot::new(
            games.clone(),
            served.map(str::to_string),
            fallback,
        ));
        info!(count = games.len(), fallback, "games loaded");
        Ok(games)
    }

    /// The current snapshot. Hold on to it to run several queries against
    /// the same data.
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.snapshot.read().clone()
    }

    /// Category of the current snapshot.
    pub fn current_category(&self) -> Option<String> {
        self.snapshot().category().map(str::to_string)
    }

    /// See [`CatalogSnapshot::find_by_id`].
    pub fn find_by_id(&self, id: impl IntoGameId) -> Option<Game> {
        self.snapshot().find_by_id(id).cloned()
    }

    /// See [`CatalogSnapshot::search`].
    pub fn search(&self, term: &str) -> Vec<Game> {
        self.snapshot().search(term)
    }

    /// See [`CatalogSnapshot::filter_by_genre`].
    pub fn filter_by_genre(&self, genre: &str) -> Vec<Game> {
        self.snapshot().filter_by_genre(genre)
    }

    /// See [`CatalogSnapshot::available_genres`].
    pub fn available_genres(&self) -> Vec<String> {
        self.snapshot().available_genres()
    }

    /// See [`CatalogSnapshot::stats`].
    pub fn stats(&self) -> CatalogStats {
        self.snapshot().stats()
    }
}
