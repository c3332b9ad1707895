use anyhow::Context;
use clap::{Parser, ValueEnum};
use flat_scout::api::{FlatSource, HttpFlatSource, InMemoryFlatSource};
use flat_scout::session::FileKeyValueStore;
use flat_scout::{Config, ListingRoute, ListingScreen, Session};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    All,
    Favorites,
}

/// Browse rental flats and their favorite state
#[derive(Debug, Parser)]
#[command(name = "flat-scout", version)]
struct Args {
    /// Which listing to show
    #[arg(long, value_enum, default_value_t = Mode::All)]
    mode: Mode,

    /// User whose favorites to list (defaults to the stored session user)
    #[arg(long)]
    user: Option<String>,

    /// Key-value file holding the stored session
    #[arg(long)]
    session_file: Option<PathBuf>,

    /// Use built-in sample listings instead of the API
    #[arg(long)]
    offline: bool,

    /// Save the rendered flats as JSON
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut config = Config::from_env().context("Invalid configuration")?;
    if let Some(path) = args.session_file {
        config.session_file = path;
    }

    info!("🏠 Flat Scout");

    let store = FileKeyValueStore::new(&config.session_file);
    let session = Session::load(&store).await;

    let route = match args.mode {
        Mode::All => ListingRoute::all(),
        Mode::Favorites => {
            ListingRoute::favorites_of(args.user.unwrap_or_else(|| session.user_id.clone()))
        }
    };

    let source: Arc<dyn FlatSource> = if args.offline {
        Arc::new(InMemoryFlatSource::sample())
    } else {
        Arc::new(HttpFlatSource::with_endpoints(
            config.endpoints.clone(),
            config.request_timeout,
            config.listing_timeout,
        )?)
    };

    let mut screen = ListingScreen::with_options(source, session, route, config.screen);
    if let Some(report) = screen.refresh().await {
        info!(
            "Favorite status: {} of {} favorited, {} lookups failed",
            report.favorited, report.queried, report.failed
        );
    }

    let cards = screen.cards();
    info!("Showing {} flats", cards.len());

    for (i, card) in cards.iter().enumerate() {
        let flat = card.flat;
        let heart = if card.is_favorite { "♥" } else { "♡" };
        println!("{}. {} {} ({})", i + 1, heart, card.address(), flat.city);
        println!("   Rent Price: ${}", flat.rent_price);
        println!("   Area Size: {} sq ft", flat.area_size);
        if let Some(year) = flat.year_built {
            println!("   Year Built: {}", year);
        }
        println!("   Available: {}", card.availability());
        println!("   {}", if flat.has_ac { "Has AC" } else { "No AC" });
        if card.can_edit {
            println!("   (your listing)");
        } else {
            println!("   Contact: {}", flat.owner.email);
        }
        println!();
    }

    if let Some(path) = args.output {
        let flats: Vec<_> = cards.iter().map(|card| card.flat).collect();
        let json = serde_json::to_string_pretty(&flats)?;
        tokio::fs::write(&path, json)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("💾 Saved {} flats to {}", flats.len(), path.display());
    }

    Ok(())
}
