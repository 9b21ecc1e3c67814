use std::error::Error;

use carta::promotions::authoring::PromotionAuthor;
use carta_app::{
    config::{EngineConfig, LoggingConfig},
    context::AppContext,
};
use clap::{Parser, Subcommand};

mod offers;
mod promotions;
mod validate;

#[derive(Debug, Parser)]
#[command(name = "carta-app", about = "Carta promotion engine CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    logging: LoggingConfig,

    #[command(flatten)]
    engine: EngineConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List every promotion with its state and bundle totals
    Promotions(promotions::PromotionsArgs),

    /// Show the best active offer per menu item
    Offers(offers::OffersArgs),

    /// Author every draft in the fixture set and report field errors
    Validate(validate::ValidateArgs),
}

impl Cli {
    /// Load configuration from `.env`, the environment and CLI arguments.
    pub(crate) fn load() -> Result<Self, clap::Error> {
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    pub(crate) fn logging(&self) -> &LoggingConfig {
        &self.logging
    }

    pub(crate) async fn run(self) -> Result<(), String> {
        let Self {
            engine, command, ..
        } = self;

        match command {
            Commands::Promotions(args) => promotions::run(&engine, args).await,
            Commands::Offers(args) => offers::run(&engine, args).await,
            Commands::Validate(args) => validate::run(&engine, args).await,
        }
    }
}

fn author(engine: &EngineConfig) -> Result<PromotionAuthor<'static>, String> {
    let time_zone = engine
        .time_zone()
        .map_err(|error| format!("invalid time zone {}: {error}", engine.time_zone))?;

    let currency = engine
        .currency()
        .map_err(|error| format!("invalid currency: {error}"))?;

    Ok(PromotionAuthor::new(time_zone, currency))
}

async fn context(engine: &EngineConfig) -> Result<AppContext, String> {
    AppContext::from_fixture_set(&engine.fixtures, &engine.fixture, author(engine)?)
        .await
        .map_err(|error| report(&error))
}

/// One line with the error and every source below it.
fn report(error: &dyn Error) -> String {
    let mut line = error.to_string();
    let mut source = error.source();

    while let Some(cause) = source {
        line.push_str(": ");
        line.push_str(&cause.to_string());
        source = cause.source();
    }

    line
}
