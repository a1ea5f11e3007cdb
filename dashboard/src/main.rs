//! Dashboard entry point: fetch the nearby catalog for a coordinate, render
//! the panels as text, and optionally resolve a walking route to a selected
//! stop.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::eyre;
use reqwest::Url;
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

use dashboard::domain::catalog::CatalogConfig;
use dashboard::domain::ports::RouteSource;
use dashboard::domain::{
    fetch_catalog, Action, Coordinate, DashboardSession, FavoriteRecord, FavoritesStore,
    Selection, DEFAULT_QUERY_RADIUS_METERS,
};
use dashboard::outbound::overpass::{OverpassHttpSource, DEFAULT_OVERPASS_ENDPOINT};
use dashboard::outbound::persistence::JsonFileStore;
use dashboard::outbound::routing::HttpRouteResolver;

/// Nearby transit and places dashboard.
#[derive(Debug, Parser)]
#[command(name = "dashboard", about = "Rank nearby transit stops and places for a coordinate")]
struct Args {
    /// Device latitude in degrees.
    #[arg(long, allow_hyphen_values = true)]
    latitude: f64,

    /// Device longitude in degrees.
    #[arg(long, allow_hyphen_values = true)]
    longitude: f64,

    /// Search radius in metres.
    #[arg(long, default_value_t = DEFAULT_QUERY_RADIUS_METERS)]
    radius: u32,

    /// Point-query endpoint.
    #[arg(long, default_value = DEFAULT_OVERPASS_ENDPOINT)]
    endpoint: Url,

    /// Request timeout in seconds.
    #[arg(long, default_value_t = 30)]
    timeout_seconds: u64,

    /// File persisting favourites between runs.
    #[arg(long, default_value = "dashboard-state.json")]
    state_file: PathBuf,

    /// Select the Nth visible stop (1-based), resolve a walking route to it.
    #[arg(long)]
    select: Option<usize>,

    /// Toggle the selected stop as a favourite.
    #[arg(long, requires = "select")]
    favorite: bool,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = Args::parse();
    let timeout = Duration::from_secs(args.timeout_seconds);

    let favorites = FavoritesStore::load(JsonFileStore::new(&args.state_file));
    let mut session = DashboardSession::new(favorites);
    let fix = session.begin_refresh(Coordinate::new(args.latitude, args.longitude));

    let source = OverpassHttpSource::new(args.endpoint.clone(), timeout)?;
    let refresh = fetch_catalog(&source, fix, args.radius, &CatalogConfig::default()).await;
    session.apply_refresh(refresh);

    render_panels(&session);

    if let Some(position) = args.select {
        let page = session.transport_page();
        let stop = page
            .items
            .get(position.checked_sub(1).ok_or_else(|| eyre!("--select is 1-based"))?)
            .ok_or_else(|| eyre!("no visible stop at position {position}"))?
            .clone();

        if args.favorite {
            session.dispatch(Action::ToggleFavorite(FavoriteRecord::from_transport_stop(
                &stop,
            )))?;
        }
        session.dispatch(Action::Select(Selection::from_transport_stop(&stop)))?;
        render_trip(&session);

        let resolver = HttpRouteResolver::with_default_endpoints(timeout)?;
        match resolver.fetch_route(fix.coordinate, stop.coordinate).await {
            Ok(geometry) => render_route(geometry.points().len()),
            Err(error) => {
                // Soft failure: the straight-line overlay stands in for the
                // curved route.
                warn!(%error, "walking route unavailable");
            }
        }
    }

    Ok(())
}

#[expect(clippy::print_stdout, reason = "CLI renders panels to stdout")]
fn render_panels<S: dashboard::domain::ports::KeyValueStore>(session: &DashboardSession<S>) {
    let page = session.transport_page();
    println!(
        "Transport (window {}/{}):",
        page.window.index + 1,
        page.window.total_windows
    );
    for (position, stop) in page.items.iter().enumerate() {
        println!(
            "  {}. [{}] {} - {} - {}",
            position + 1,
            stop.mode.label(),
            stop.title,
            stop.detail,
            stop.provider
        );
    }
    if page.items.is_empty() {
        println!("  Nothing nearby. Refresh location.");
    }

    for group in session.place_pages() {
        if group.items.is_empty() {
            continue;
        }
        println!(
            "{} - {} (window {}/{}):",
            group.category.label(),
            group.category.description(),
            group.window.index + 1,
            group.window.total_windows
        );
        for item in &group.items {
            println!(
                "  {} - {} - {}",
                item.name,
                dashboard::domain::format_distance(item.distance_meters),
                dashboard::domain::format_walk_eta(item.distance_meters)
            );
        }
    }

    if !session.favorites().records().is_empty() {
        println!("Favourites:");
        for record in session.favorites().records() {
            println!(
                "  {} - {} - {}",
                record.category_label, record.title, record.distance_label
            );
        }
    }
}

#[expect(clippy::print_stdout, reason = "CLI renders the trip summary to stdout")]
fn render_trip<S: dashboard::domain::ports::KeyValueStore>(session: &DashboardSession<S>) {
    if let Some(selection) = session.selection() {
        println!(
            "Trip: {} ({}) - {} - {}",
            selection.title, selection.category_label, selection.distance_label, selection.eta_label
        );
    }
}

#[expect(clippy::print_stdout, reason = "CLI renders the route summary to stdout")]
fn render_route(points: usize) {
    println!("Walking route resolved with {points} path points.");
}
