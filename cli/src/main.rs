use anyhow::{Context, Result};
use clap::Parser;
use cookbook_sdk::{build_shareable_query, parse_shareable_query, CookbookClient, SearchParams};
use serde::Serialize;
use shared::telemetry::{self, LogWriter, TelemetryConfig};
use shared::{ClientConfig, NewRating};
use tracing::{error, info};

mod args;

use args::{Cli, Commands, FavoritesAction};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // The share command never talks to the backend, so it needs no config.
    if let Commands::Share(search) = &cli.command {
        println!("{}", build_shareable_query(&SearchParams::from(search.clone())));
        return Ok(());
    }

    let telemetry_config = TelemetryConfig::from_env(env!("CARGO_PKG_NAME")).with_writer(LogWriter::Stderr);
    telemetry::init_telemetry(telemetry_config)?;

    let result = run(cli.command).await;
    if let Err(e) = &result {
        error!("Command failed: {:#}", e);
    }

    telemetry::shutdown_telemetry().await;
    result
}

async fn run(command: Commands) -> Result<()> {
    let config = ClientConfig::from_env().context("Invalid cookbook configuration")?;
    let client = CookbookClient::from_config(&config)?;

    match command {
        Commands::Search(search) => {
            let page = client.search().search(&search.into()).await?;
            print_json(&page)?;
        }
        Commands::Find { text, filters } => {
            let page = client
                .search()
                .text_search(&text, &filters.into())
                .await?;
            print_json(&page)?;
        }
        Commands::Suggest { query } => {
            let suggestions = client.search().suggestions(&query).await?;
            print_json(&suggestions)?;
        }
        // Printed in main before any config is loaded.
        Commands::Share(_) => {}
        Commands::Open { query } => {
            let params = parse_shareable_query(&query);
            info!("Running shared search: {}", build_shareable_query(&params));
            let page = client.search().search(&params).await?;
            print_json(&page)?;
        }
        Commands::Categories { refresh } => {
            let set = if refresh {
                client.categories().refresh().await
            } else {
                client.categories().categories().await
            };
            info!("Categories loaded from {:?}", set.source);
            print_json(set.categories.as_ref())?;
        }
        Commands::Show { id } => {
            let recipe = client.recipes().get(id).await?;
            print_json(&recipe)?;
        }
        Commands::Ratings { id, page } => {
            let ratings = client.recipes().ratings(id, page).await?;
            print_json(&ratings)?;
        }
        Commands::Rate { id, score, review } => {
            let rating = client
                .recipes()
                .rate(id, &NewRating { rating: score, review })
                .await?;
            print_json(&rating)?;
        }
        Commands::Favorites { action } => {
            let favorites = client.favorites();
            match action {
                FavoritesAction::List => print_json(&favorites.list().await?)?,
                FavoritesAction::Add { id } => {
                    favorites.add(id).await?;
                    print_json(&favorites.list().await?)?;
                }
                FavoritesAction::Remove { id } => {
                    favorites.remove(id).await?;
                    print_json(&favorites.list().await?)?;
                }
                FavoritesAction::Toggle { id } => {
                    let is_favorite = favorites.toggle(id).await?;
                    print_json(&serde_json::json!({ "id": id, "is_favorite": is_favorite }))?;
                }
                FavoritesAction::Clear => {
                    favorites.clear().await?;
                    info!("Cleared local favorites");
                }
            }
        }
        Commands::Favorite { id } => {
            let status = client.recipes().toggle_favorite(id).await;
            print_json(&status)?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
