//! Cheek Co. Storefront - catalog, checkout and order lifecycle backend

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cheekco_storefront::api::{self, AppState, WebhookVerifier};
use cheekco_storefront::config::Config;
use cheekco_storefront::remote::{SendGridClient, SquareClient};
use cheekco_storefront::services::{
    CatalogCache, CatalogService, CheckoutService, ContactService, EventPublisher, NotificationSettings,
    OrderLifecycleTracker,
};
use cheekco_storefront::store::PgOrderStore;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "cheekco_storefront=info,tower_http=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!(environment = %config.environment, location_id = %config.square.location_id, "Configuration loaded");

    let db = PgPoolOptions::new().max_connections(10).connect(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&db).await?;

    let nats = match &config.nats_url {
        Some(url) => match async_nats::connect(url.as_str()).await {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!(error = %e, url = %url, "NATS unavailable, order events disabled");
                None
            }
        },
        None => None,
    };
    let events = EventPublisher::new(nats);

    let square = Arc::new(SquareClient::new(&config.square, config.http_timeout)?);
    let email = Arc::new(SendGridClient::new(&config.email, config.http_timeout)?);
    let orders = Arc::new(PgOrderStore::new(db));

    let state = AppState {
        catalog: Arc::new(CatalogService::new(
            square.clone(),
            CatalogCache::new(config.catalog_cache_ttl),
            config.projection_options(),
        )),
        checkout: Arc::new(CheckoutService::new(
            square.clone(),
            orders.clone(),
            events.clone(),
            config.square.location_id.clone(),
            &config.store,
        )),
        lifecycle: Arc::new(OrderLifecycleTracker::new(
            square,
            orders,
            email.clone(),
            events,
            NotificationSettings::from_config(&config.email, &config.store),
        )),
        contact: Arc::new(ContactService::new(email, &config.email)),
        webhook: WebhookVerifier::new(config.square.webhook_signature_key.clone(), config.square.webhook_url.clone()),
    };

    let app = api::router(state);
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("🚀 Cheek Co. storefront listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(&addr).await?, app).await?;
    Ok(())
}
