//! App Context

use std::{path::Path, sync::Arc};

use carta::{
    fixtures::{Fixture, FixtureError},
    ids::ItemId,
    promotions::authoring::PromotionAuthor,
};
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::info;

use crate::{
    catalog::CatalogService,
    memory::{InMemoryCatalogService, InMemoryPromotionStore},
    service::{EnginePromotionsService, PromotionsService, PromotionsServiceError},
    snapshot::SnapshotCoordinator,
};

/// Errors building an [`AppContext`].
#[derive(Debug, Error)]
pub enum AppInitError {
    /// Fixture files could not be read or parsed.
    #[error("failed to load fixture set")]
    Fixture(#[from] FixtureError),

    /// A fixture draft was rejected by the promotions service.
    #[error("failed to seed promotion {key}")]
    Seed {
        /// Fixture key of the draft.
        key: String,

        /// Why it was rejected.
        #[source]
        source: PromotionsServiceError,
    },

    /// The first snapshot could not be loaded.
    #[error("failed to load promotion snapshot")]
    Snapshot(#[source] PromotionsServiceError),
}

/// Shared services for the CLI.
#[derive(Clone)]
pub struct AppContext {
    /// Promotions service.
    pub promotions: Arc<dyn PromotionsService>,

    /// Menu catalog.
    pub catalog: Arc<dyn CatalogService>,

    /// Zone and currency drafts are authored in.
    pub author: PromotionAuthor<'static>,

    item_keys: Arc<FxHashMap<String, ItemId>>,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("author", &self.author)
            .field("item_keys", &self.item_keys)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Build application context from a fixture set, storing every draft through the
    /// promotions service.
    ///
    /// # Errors
    ///
    /// Returns an error when the fixture set cannot be loaded or a draft cannot be stored.
    pub async fn from_fixture_set(
        base_path: &Path,
        name: &str,
        author: PromotionAuthor<'static>,
    ) -> Result<Self, AppInitError> {
        let mut fixture = Fixture::with_base_path(base_path)
            .with_time_zone(author.time_zone().clone());

        fixture.load_menu(name)?;

        let drafts = fixture.read_drafts(name)?;

        let catalog: Arc<dyn CatalogService> =
            Arc::new(InMemoryCatalogService::new(fixture.items().cloned()));

        let promotions: Arc<dyn PromotionsService> = Arc::new(EnginePromotionsService::new(
            author.clone(),
            Arc::clone(&catalog),
            Arc::new(InMemoryPromotionStore::new()),
            Arc::new(SnapshotCoordinator::new()),
        ));

        for (key, draft) in &drafts {
            promotions
                .create_promotion(draft)
                .await
                .map_err(|source| AppInitError::Seed {
                    key: key.clone(),
                    source,
                })?;
        }

        let snapshot = promotions.refresh().await.map_err(AppInitError::Snapshot)?;

        info!(
            fixture_set = name,
            promotion_count = snapshot.promotions().len(),
            "loaded fixture set"
        );

        let item_keys = fixture
            .item_keys()
            .map(|(key, id)| (key.to_string(), id))
            .collect();

        Ok(Self {
            promotions,
            catalog,
            author,
            item_keys: Arc::new(item_keys),
        })
    }

    /// Menu item id for a fixture key.
    pub fn item_id(&self, key: &str) -> Option<ItemId> {
        self.item_keys.get(key).copied()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use carta::promotions::lifecycle::LifecycleState;
    use rusty_money::iso::USD;
    use testresult::TestResult;

    use crate::test_support::mid_window;

    use super::*;

    fn fixtures() -> PathBuf {
        PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../../fixtures"))
    }

    #[tokio::test]
    async fn diner_set_seeds_every_promotion() -> TestResult {
        let context =
            AppContext::from_fixture_set(&fixtures(), "diner", PromotionAuthor::utc(USD)).await?;

        let listed = context.promotions.list_with_states(mid_window()?).await?;

        assert_eq!(listed.len(), 8);
        assert!(
            listed
                .iter()
                .any(|listing| listing.promotion.denomination() == "Promotion 3x2"
                    && listing.state == LifecycleState::Active)
        );

        Ok(())
    }

    #[tokio::test]
    async fn item_keys_resolve_to_catalog_items() -> TestResult {
        let context =
            AppContext::from_fixture_set(&fixtures(), "diner", PromotionAuthor::utc(USD)).await?;

        let Some(burger) = context.item_id("burger") else {
            unreachable!("expected the burger key");
        };

        assert_eq!(context.catalog.get_unit_price(burger).await?.name(), "Classic Burger");
        assert_eq!(context.item_id("caviar"), None);

        Ok(())
    }

    #[tokio::test]
    async fn missing_fixture_set_is_an_error() {
        let result =
            AppContext::from_fixture_set(&fixtures(), "missing", PromotionAuthor::utc(USD)).await;

        assert!(matches!(result, Err(AppInitError::Fixture(FixtureError::Io(_)))));
    }
}
