use std::net::SocketAddr;
use std::sync::Arc;

use railbook_api::{app, worker, AppState};
use railbook_catalog::repository::CatalogRepository;
use railbook_catalog::SeatInventoryManager;
use railbook_core::repository::BookingRepository;
use railbook_order::{BookingEngine, PaymentOrchestrator, SimulatedGateway};
use railbook_store::{BookingLedger, StationDirectory};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "railbook_api=debug,railbook_order=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = railbook_store::app_config::Config::load().expect("failed to load config");
    tracing::info!("starting railbook api on port {}", config.server.port);

    // Collaborators: in-memory reference implementations. A deployment
    // swaps these behind the same traits.
    let catalog: Arc<dyn CatalogRepository> = Arc::new(StationDirectory::new());
    let store: Arc<dyn BookingRepository> = Arc::new(BookingLedger::new());
    let inventory = Arc::new(SeatInventoryManager::new());
    let payments = PaymentOrchestrator::new(Arc::new(SimulatedGateway));

    let engine = Arc::new(BookingEngine::new(
        Arc::clone(&catalog),
        Arc::clone(&store),
        inventory,
        payments,
        config.business_rules.clone(),
    ));

    tokio::spawn(worker::run_event_log(engine.subscribe()));
    tokio::spawn(worker::run_expiry_sweep(
        Arc::clone(&engine),
        config.business_rules.sweep_interval_seconds,
    ));

    let app = app(AppState { engine, catalog, store });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await.expect("failed to bind");
    axum::serve(listener, app).await.expect("server error");
}
