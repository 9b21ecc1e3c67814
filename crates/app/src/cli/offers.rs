use std::io::{self, Write};

use carta::{board::Board, ids::ItemId, promotions::Promotion};
use carta_app::{config::EngineConfig, service::PromotionsService};
use clap::Args;
use jiff::Timestamp;

#[derive(Debug, Args)]
pub(crate) struct OffersArgs {
    /// Menu item key to resolve a single offer for
    #[arg(long)]
    item: Option<String>,
}

pub(crate) async fn run(engine: &EngineConfig, args: OffersArgs) -> Result<(), String> {
    let context = super::context(engine).await?;
    let now = engine.now();

    if let Some(key) = args.item {
        let item = context
            .item_id(&key)
            .ok_or_else(|| format!("unknown menu item {key}"))?;

        return write_item_offer(io::stdout().lock(), context.promotions.as_ref(), item, now).await;
    }

    let items = context
        .catalog
        .list_items()
        .await
        .map_err(|error| format!("failed to list menu items: {error}"))?;

    let promotions: Vec<Promotion<'static>> = context
        .promotions
        .list_with_states(now)
        .await
        .map_err(|error| format!("failed to list promotions: {}", super::report(&error)))?
        .into_iter()
        .map(|listing| listing.promotion)
        .collect();

    Board::new(now, context.author.time_zone().clone())
        .write_offers(io::stdout().lock(), &items, &promotions)
        .map_err(|error| format!("failed to write offers: {}", super::report(&error)))
}

async fn write_item_offer(
    mut out: impl Write,
    service: &dyn PromotionsService,
    item: ItemId,
    now: Timestamp,
) -> Result<(), String> {
    let offer = service
        .resolve_best_offer(item, now)
        .await
        .map_err(|error| format!("failed to resolve offer: {}", super::report(&error)))?;

    let written = match offer {
        Some(offer) => writeln!(
            out,
            "item: {}\nunit_price: {}\npromotion: {}\noffer: {}\noffer_price: {}",
            offer.item.name(),
            offer.item.price(),
            offer.promotion.denomination(),
            offer.label,
            offer.unit_price_after_discount,
        ),
        None => writeln!(out, "no active offer for item {item} at {now}"),
    };

    written.map_err(|error| format!("failed to write offer: {error}"))
}
