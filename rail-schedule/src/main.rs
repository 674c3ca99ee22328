use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use rail_schedule::favourites::JsonFileFavourites;
use rail_schedule::irishrail::{IrishRailClient, RailClientConfig};
use rail_schedule::schedule::ScheduleColumn;
use rail_schedule::search::SearchEvent;
use rail_schedule::session::{DEFAULT_LOOKAHEAD, ScheduleSession, SessionConfig, StationChange};

const USAGE: &str = "usage: rail-schedule <station> [lookahead-minutes]";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let Some(query) = args.next() else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };
    let lookahead = match args.next().map(|s| s.parse::<u16>()) {
        None => DEFAULT_LOOKAHEAD,
        Some(Ok(mins)) => mins,
        Some(Err(_)) => {
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    };

    let mut client_config = RailClientConfig::new();
    if let Ok(url) = std::env::var("IRISH_RAIL_BASE_URL") {
        client_config = client_config.with_base_url(url);
    }
    let client = IrishRailClient::new(client_config).expect("Failed to create API client");

    let favourites = std::env::var("RAIL_FAVOURITES_PATH")
        .map(JsonFileFavourites::new)
        .unwrap_or_default();
    info!(path = %favourites.path().display(), "using favourites file");

    let session = ScheduleSession::new(Arc::new(client), favourites, SessionConfig::default());

    let count = session
        .load_stations()
        .await
        .expect("Failed to load stations");
    println!("Loaded {count} stations");

    if lookahead != DEFAULT_LOOKAHEAD
        && let Err(e) = session.set_lookahead(lookahead).await
    {
        eprintln!("{e}");
        std::process::exit(2);
    }

    session
        .handle_search(SearchEvent::TextChanged(query.clone()))
        .await
        .ok();
    let candidates: Vec<String> = session
        .with_search(|s| {
            s.matches()
                .iter()
                .map(|m| format!("{} ({}) score {:.3}", m.item.name, m.item.code, m.score))
                .collect()
        })
        .await;
    if candidates.is_empty() {
        eprintln!("No station matches {query:?}");
        std::process::exit(1);
    }
    for line in &candidates {
        println!("  {line}");
    }

    // Take the best match.
    session.handle_search(SearchEvent::ArrowDown).await.ok();
    let station = match session.handle_search(SearchEvent::Enter).await {
        Ok(Some(StationChange::Applied { station, trains })) => {
            println!();
            println!("{} ({}): {trains} trains in the next {lookahead} minutes", station.name, station.code);
            station
        }
        Ok(_) => {
            eprintln!("No station selected");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    if session.is_favourite(&station.name).await {
        println!("(favourite)");
    }

    let (header, rows, first) = session
        .with_schedule(|view| {
            let header: Vec<String> = view
                .header()
                .into_iter()
                .map(|(label, _)| format!("{label:<20}"))
                .collect();
            let rows: Vec<String> = view
                .rows()
                .map(|train| {
                    ScheduleColumn::ALL
                        .iter()
                        .map(|column| format!("{:<20}", column.value(train)))
                        .collect()
                })
                .collect();
            (header.concat(), rows, view.rows().next().map(|t| t.code.clone()))
        })
        .await;

    println!();
    println!("{header}");
    for row in rows {
        println!("{row}");
    }

    let Some(code) = first else {
        return;
    };
    match session.journey(&code).await {
        Ok(journey) => {
            println!();
            println!("Train {} on {}:", journey.code, journey.date);
            for stop in journey.calling_points() {
                let marker = match (journey.current_stop(), journey.next_stop()) {
                    (Some(current), _) if current.order == stop.order => " <- here",
                    (_, Some(next)) if next.order == stop.order => " <- next",
                    _ => "",
                };
                let time = stop
                    .expected_departure
                    .as_deref()
                    .or(stop.expected_arrival.as_deref())
                    .unwrap_or("");
                println!("  {:<25} {time}{marker}", stop.location_name);
            }
        }
        Err(e) => warn!(error = %e, train = %code, "journey lookup failed"),
    }
}
