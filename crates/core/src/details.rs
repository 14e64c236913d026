//! Memoizing cache for per-game details.

use std::{collections::HashMap, sync::Arc};

use parking_lot::RwLock;
use tracing::{debug, error, info};

use crate::{
    api::GamesApi,
    error::CatalogError,
    models::{GameDetails, GameId, IntoGameId},
};

/// Fetches [`GameDetails`] on demand and keeps every success for the
/// lifetime of the cache. Failures are never cached and never retried here.
pub struct DetailsCache<A> {
    api: A,
    entries: RwLock<HashMap<GameId, Arc<GameDetails>>>,
}

impl<A: GamesApi> DetailsCache<A> {
    /// Create an empty cache backed by `api`.
    pub fn new(api: A) -> Self {
        Self {
            api,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Backing API.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Cached details for `id`, fetching them on first use.
    ///
    /// Repeated calls return the same `Arc` until [`DetailsCache::clear`].
    pub async fn get(&self, id: impl IntoGameId) -> Result<Arc<GameDetails>, CatalogError> {
        let Some(id) = id.into_game_id() else {
            error!("details requested for an invalid game id");
            return Err(CatalogError::DetailsFailure { id: None });
        };

        let cached = self.entries.read().get(&id).cloned();
        if let Some(cached) = cached {
            debug!(game_id = %id, "returning cached game details");
            return Ok(cached);
        }

        info!(game_id = %id, "fetching game details");
        match self.api.fetch_game_details(id).await {
            Ok(details) => {
                let details = Arc::new(details);
                self.entries.write().insert(id, Arc::clone(&details));
                Ok(details)
            }
            Err(err) => {
                error!(game_id = %id, error = %err, "error fetching game details");
                Err(CatalogError::DetailsFailure { id: Some(id) })
            }
        }
    }

    /// Whether `id` is already cached.
    pub fn contains(&self, id: impl IntoGameId) -> bool {
        id.into_game_id()
            .map(|id| self.entries.read().contains_key(&id))
            .unwrap_or(false)
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Number of cached entries.
    pub fn size(&self) -> usize {
        self.entries.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{details, FakeApi};

    #[tokio::test]
    async fn second_get_is_served_from_cache() -> anyhow::Result<()> {
        let cache = DetailsCache::new(FakeApi::new().with_details(details(42, "Beta")));

        let first = cache.get(42u32).await?;
        assert_eq!(cache.api().detail_calls(), 1);
        assert_eq!(first.title(), "Beta");
        assert!(first.screenshots.is_empty());
        assert!(first.minimum_system_requirements.is_none());

        let second = cache.get("42").await?;
        assert_eq!(cache.api().detail_calls(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.size(), 1);
        assert!(cache.contains(42u32));
        Ok(())
    }

    #[tokio::test]
    async fn cached_value_is_returned_even_if_upstream_changes() -> anyhow::Result<()> {
        let cache = DetailsCache::new(FakeApi::new().with_details(details(7, "Old")));
        cache.get(7u32).await?;

        cache.api().set_details(details(7, "New"));
        assert_eq!(cache.get(7u32).await?.title(), "Old");
        assert_eq!(cache.api().detail_calls(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn clear_forces_a_new_fetch() -> anyhow::Result<()> {
        let cache = DetailsCache::new(FakeApi::new().with_details(details(42, "Beta")));
        let before = cache.get(42u32).await?;

        cache.clear();
        assert_eq!(cache.size(), 0);

        let after = cache.get(42u32).await?;
        assert_eq!(cache.api().detail_calls(), 2);
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(*before, *after);
        Ok(())
    }

    #[tokio::test]
    async fn failures_are_not_cached() -> anyhow::Result<()> {
        let cache = DetailsCache::new(FakeApi::new());

        let err = cache.get(9u32).await.unwrap_err();
        assert_eq!(err, CatalogError::DetailsFailure { id: Some(GameId(9)) });
        assert_eq!(
            err.to_string(),
            "Failed to load game details. Please try again."
        );
        assert_eq!(cache.size(), 0);

        cache.api().set_details(details(9, "Late"));
        assert_eq!(cache.get(9u32).await?.title(), "Late");
        assert_eq!(cache.api().detail_calls(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn invalid_id_fails_without_network() {
        let cache = DetailsCache::new(FakeApi::new());

        let err = cache.get("not-a-number").await.unwrap_err();
        assert_eq!(err, CatalogError::DetailsFailure { id: None });
        assert_eq!(cache.api().detail_calls(), 0);
        assert!(!cache.contains("not-a-number"));
    }
}
