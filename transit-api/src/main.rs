use std::net::SocketAddr;
use std::sync::Arc;

use transit_api::{
    app,
    state::{AppState, AuthConfig},
};
use transit_booking::ReservationService;
use transit_core::IdentityRepository;
use transit_fleet::InventoryRepository;
use transit_store::{
    DbClient, PostgresIdentityRepository, PostgresInventoryRepository,
    PostgresReservationRepository,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "transit_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = transit_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Transit API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    let inventory: Arc<dyn InventoryRepository> =
        Arc::new(PostgresInventoryRepository::new(db.pool.clone()));
    let identity: Arc<dyn IdentityRepository> =
        Arc::new(PostgresIdentityRepository::new(db.pool.clone()));
    let reservations = Arc::new(ReservationService::new(Arc::new(
        PostgresReservationRepository::new(db.pool.clone()),
    )));

    let app_state = AppState {
        inventory,
        identity,
        reservations,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app).await.expect("Server error");
}
