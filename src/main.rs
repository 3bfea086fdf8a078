use std::sync::Arc;

use homify_client::models::PropertyType;
use homify_client::{
    ClientConfig, FilterUpdate, HttpTransport, MessagesClient, PropertyCatalog, SearchController,
    Session, TokenStore,
};
use tracing::{info, warn, Level};

fn parse_type(value: &str) -> Option<PropertyType> {
    match value.to_uppercase().as_str() {
        "APARTMENT" => Some(PropertyType::Apartment),
        "HOUSE" => Some(PropertyType::House),
        "STUDIO" => Some(PropertyType::Studio),
        "ROOM" => Some(PropertyType::Room),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("Homify Client - property search");

    let config = ClientConfig::from_env();
    info!("API base URL: {}", config.base_url);

    let transport = Arc::new(HttpTransport::new(&config)?);
    let session = {
        let session = Session::new(transport.clone(), transport.auth_handle());
        match &config.token_path {
            Some(path) => session.with_store(TokenStore::new(path)),
            None => session,
        }
    };

    // Reuse a persisted session if one exists, otherwise log in when
    // credentials are provided; anonymous search works without either
    if session.restore() {
        info!("Restored saved session");
    } else if let (Ok(email), Ok(password)) = (
        std::env::var("HOMIFY_EMAIL"),
        std::env::var("HOMIFY_PASSWORD"),
    ) {
        session.login(&email, &password).await?;
    }

    let catalog = PropertyCatalog::new(transport.clone());
    let mut search = SearchController::spawn(catalog, config.debounce);

    // Filters from environment
    if let Ok(text) = std::env::var("HOMIFY_SEARCH") {
        search.update_filter(FilterUpdate::Search(text));
    }
    if let Ok(city) = std::env::var("HOMIFY_CITY") {
        search.update_filter(FilterUpdate::City(Some(city)));
    }
    if let Some(kind) = std::env::var("HOMIFY_TYPE").ok().as_deref().and_then(parse_type) {
        search.update_filter(FilterUpdate::PropertyType(Some(kind)));
    }
    if let Ok(Ok(min)) = std::env::var("HOMIFY_MIN_PRICE").map(|v| v.parse()) {
        search.update_filter(FilterUpdate::MinPrice(Some(min)));
    }
    if let Ok(Ok(max)) = std::env::var("HOMIFY_MAX_PRICE").map(|v| v.parse()) {
        search.update_filter(FilterUpdate::MaxPrice(Some(max)));
    }

    // Wait for the debounced fetch to settle
    let mut started = false;
    let snapshot = loop {
        let snap = search.changed().await;
        if snap.loading {
            started = true;
        } else if started {
            break snap;
        }
    };

    if let Some(error) = &snapshot.error {
        warn!("{}", error);
        return Ok(());
    }

    info!(
        "Found {} listings, showing {}",
        snapshot.count,
        snapshot.results.len()
    );
    println!();

    for (i, listing) in snapshot.results.iter().enumerate() {
        println!(
            "{}. {} ({} FCFA/month)",
            i + 1,
            listing.title,
            listing.monthly_rent
        );
        println!(
            "   {} - {}, {}",
            listing.address.district, listing.address.city, listing.address.street_address
        );
        println!(
            "   {} rooms, {} m², {}",
            listing.number_of_rooms,
            listing.surface,
            if listing.furnished { "furnished" } else { "unfurnished" }
        );
        println!("   ID: {}", listing.id);
        println!();
    }

    if snapshot.has_next_page {
        info!("More pages available");
    }

    if session.is_authenticated() {
        let messages = MessagesClient::new(transport.clone());
        match messages.unread_count().await {
            Ok(unread) => info!("{} unread messages", unread),
            Err(e) => warn!("Could not check messages: {}", e),
        }
    }

    search.stop();
    Ok(())
}
