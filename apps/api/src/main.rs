use std::sync::Arc;

use anyhow::Context;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::{info, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

mod router;

use shared_config::AppConfig;
use shared_database::{
    ClinicStore, InMemoryClinicStore, InMemoryPrescriptionStore, PrescriptionStore, SupabasePrescriptionStore,
};
use shared_models::entities::Admin;
use shared_utils::clock::SystemClock;
use shared_utils::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting clinic API server");

    let config = AppConfig::from_env();
    let bind_address = config.bind_address.clone();
    let state = build_state(config)?;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router::create_router(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors);

    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {}", bind_address))?;
    info!("Listening on {}", bind_address);

    axum::serve(listener, app).await.context("server terminated")?;
    Ok(())
}

fn build_state(config: AppConfig) -> anyhow::Result<AppState> {
    let prescriptions: Arc<dyn PrescriptionStore> = if config.is_document_store_configured() {
        info!("Prescriptions stored in Supabase at {}", config.supabase_url);
        Arc::new(SupabasePrescriptionStore::new(&config))
    } else {
        warn!("Document store not configured, prescriptions kept in memory");
        Arc::new(InMemoryPrescriptionStore::new())
    };

    let store: Arc<dyn ClinicStore> = Arc::new(InMemoryClinicStore::new());

    if let Some(username) = config.admin_username.as_deref() {
        let admin = store
            .insert_admin(Admin {
                id: Uuid::new_v4(),
                username: username.to_string(),
                credential: String::new(),
            })
            .with_context(|| format!("failed to seed admin {}", username))?;
        info!("Seeded admin {} with id {}", admin.username, admin.id);
    }

    Ok(AppState::new(Arc::new(config), store, prescriptions, Arc::new(SystemClock)))
}
