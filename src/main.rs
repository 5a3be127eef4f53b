//! pokecache - Browse PokeAPI location areas and Pokémon
//!
//! A command-line client whose responses are held in an in-memory cache that
//! expires entries after a fixed TTL.

use std::process;
use std::sync::Arc;

use clap::Parser;

use pokecache::cache::ExpiringCache;
use pokecache::cli::{Cli, Command, StartupConfig};
use pokecache::data::{ApiError, LocationAreaPage, PokeApiClient};
use pokecache::logging;

/// Prints one page of location areas
fn print_page(number: u32, page: &LocationAreaPage) {
    println!("-- page {} --", number);
    for area in &page.results {
        println!("{}", area.name);
    }
}

/// Walks `pages` pages forward, then follows `previous` links back to the start
///
/// The API links back to the first page as `?offset=0&limit=..`, a different
/// URL from the one the first page was fetched with, so the walk back ends
/// on the original first-page request to reuse its cache entry.
async fn run_map(client: &PokeApiClient, pages: u32) -> Result<(), ApiError> {
    let mut page = client.location_areas(None).await?;
    let mut number = 1;
    print_page(number, &page);

    while number < pages {
        let Some(next) = page.next.clone() else {
            println!("you're on the last page");
            break;
        };
        page = client.location_areas(Some(&next)).await?;
        number += 1;
        print_page(number, &page);
    }

    while let Some(previous) = page.previous.clone() {
        number = number.saturating_sub(1);
        let url = if number <= 1 { None } else { Some(previous.as_str()) };
        page = client.location_areas(url).await?;
        print_page(number.max(1), &page);
        if number <= 1 {
            break;
        }
    }

    Ok(())
}

async fn run_explore(client: &PokeApiClient, area: &str) -> Result<(), ApiError> {
    let location = client.location_area(area).await?;
    println!("Exploring {}...", location.name);
    println!("Found Pokemon:");
    for name in location.pokemon_names() {
        println!(" - {}", name);
    }
    Ok(())
}

async fn run_inspect(client: &PokeApiClient, name: &str) -> Result<(), ApiError> {
    let pokemon = client.pokemon(name).await?;
    println!("Name: {}", pokemon.name);
    println!("Height: {}", pokemon.height);
    println!("Weight: {}", pokemon.weight);
    println!("Stats:");
    for stat in &pokemon.stats {
        println!("  -{}: {}", stat.stat.name, stat.base_stat);
    }
    println!("Types:");
    for kind in &pokemon.types {
        println!("  - {}", kind.kind.name);
    }
    Ok(())
}

async fn run(client: &PokeApiClient, command: &Command) -> Result<(), ApiError> {
    match command {
        Command::Map { pages } => run_map(client, *pages).await,
        Command::Explore { area } => run_explore(client, area).await,
        Command::Inspect { pokemon } => run_inspect(client, pokemon).await,
    }
}

/// Prints `err` in its display form and exits with `code`
fn exit_with(err: &dyn std::error::Error, code: i32) -> ! {
    eprintln!("error: {}", err);
    process::exit(code);
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(err) => exit_with(&err, 2),
    };

    logging::init(config.verbosity);

    let cache = Arc::new(ExpiringCache::with_config(config.cache));
    let client = match PokeApiClient::new(config.client, Arc::clone(&cache)) {
        Ok(client) => client,
        Err(err) => exit_with(&err, 1),
    };

    let result = run(&client, &cli.command).await;

    tracing::info!(entries = cache.len(), "shutting down response cache");
    cache.shutdown().await;

    if let Err(err) = result {
        exit_with(&err, 1);
    }
}
