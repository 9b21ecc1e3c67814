use std::sync::Arc;

use carta::fixtures::Fixture;
use carta_app::{
    config::EngineConfig,
    memory::{InMemoryCatalogService, InMemoryPromotionStore},
    service::{EnginePromotionsService, PromotionsService, PromotionsServiceError},
    snapshot::SnapshotCoordinator,
};
use clap::Args;

#[derive(Debug, Args)]
pub(crate) struct ValidateArgs {
    /// Only validate the draft with this key
    #[arg(long)]
    key: Option<String>,
}

pub(crate) async fn run(engine: &EngineConfig, args: ValidateArgs) -> Result<(), String> {
    let author = super::author(engine)?;

    let mut fixture = Fixture::with_base_path(&engine.fixtures)
        .with_time_zone(author.time_zone().clone());

    fixture
        .load_menu(&engine.fixture)
        .map_err(|error| format!("failed to load menu: {error}"))?;

    let drafts = fixture
        .read_drafts(&engine.fixture)
        .map_err(|error| format!("failed to read drafts: {error}"))?;

    // Nothing is stored; the service only authors and prices.
    let service = EnginePromotionsService::new(
        author,
        Arc::new(InMemoryCatalogService::new(fixture.items().cloned())),
        Arc::new(InMemoryPromotionStore::new()),
        Arc::new(SnapshotCoordinator::new()),
    );

    let mut checked = 0_usize;
    let mut invalid = 0_usize;

    for (key, draft) in &drafts {
        if args.key.as_ref().is_some_and(|wanted| wanted != key) {
            continue;
        }

        checked += 1;

        match service.preview_totals(draft).await {
            Ok(totals) => println!(
                "ok {key}: {} -> {} (saves {})",
                totals.original, totals.discounted, totals.savings
            ),
            Err(PromotionsServiceError::Validation(errors)) => {
                invalid += 1;

                println!("invalid {key}:");

                for error in &errors {
                    println!("  {}: {}", error.field, error.kind);
                }
            }
            Err(error) => {
                invalid += 1;

                println!("invalid {key}: {}", super::report(&error));
            }
        }
    }

    if checked == 0 {
        return Err(match args.key {
            Some(key) => format!("no draft with key {key}"),
            None => "no drafts to validate".to_string(),
        });
    }

    if invalid > 0 {
        return Err(format!("{invalid} of {checked} drafts are invalid"));
    }

    Ok(())
}
