use std::io;

use carta::{board::Board, catalog::MenuCatalog, promotions::Promotion};
use carta_app::config::EngineConfig;
use clap::Args;

#[derive(Debug, Args)]
pub(crate) struct PromotionsArgs {
    /// Only list promotions active at the instant
    #[arg(long)]
    active: bool,
}

pub(crate) async fn run(engine: &EngineConfig, args: PromotionsArgs) -> Result<(), String> {
    let context = super::context(engine).await?;
    let now = engine.now();

    let promotions: Vec<Promotion<'static>> = context
        .promotions
        .list_with_states(now)
        .await
        .map_err(|error| format!("failed to list promotions: {}", super::report(&error)))?
        .into_iter()
        .filter(|listing| !args.active || listing.state.is_active())
        .map(|listing| listing.promotion)
        .collect();

    if promotions.is_empty() {
        println!("no promotions to show at {now}");
        return Ok(());
    }

    let menu: MenuCatalog<'static> = context
        .catalog
        .list_items()
        .await
        .map_err(|error| format!("failed to list menu items: {error}"))?
        .into_iter()
        .collect();

    Board::new(now, context.author.time_zone().clone())
        .write_promotions(io::stdout().lock(), &promotions, &menu)
        .map_err(|error| format!("failed to write promotions: {}", super::report(&error)))
}
