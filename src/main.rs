mod models;
mod service;
mod config;
mod dtos;
mod error;
mod db;
mod utils;
mod middleware;
mod handler;
mod routes;

use std::sync::Arc;

use axum::http::{header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE}, HeaderValue, Method};
use config::Config;
use db::{DBClient, UserExt};
use dotenv::dotenv;
use routes::create_router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::filter::LevelFilter;

use service::{
    admin_service::ensure_admin,
    chat_service::ChatService,
    listing_service::ListingService,
    report_service::ReportService,
    verification_service::VerificationService,
};
use utils::image_utils::ImageStore;

#[derive(Debug, Clone)]
pub struct AppState {
    pub env: Config,
    pub db_client: Arc<DBClient>,
    // Services
    pub listing_service: Arc<ListingService>,
    pub verification_service: Arc<VerificationService>,
    pub chat_service: Arc<ChatService>,
    pub report_service: Arc<ReportService>,
}

impl AppState {
    pub fn new(db_client: DBClient, config: Config) -> Self {
        let db_client_arc = Arc::new(db_client);
        let images = ImageStore::new(&config.upload_dir, config.max_image_size_mb);

        let listing_service = Arc::new(ListingService::new(
            db_client_arc.clone(),
            images.clone(),
            &config,
        ));
        let verification_service = Arc::new(VerificationService::new(db_client_arc.clone(), images));
        let chat_service = Arc::new(ChatService::new(db_client_arc.clone()));
        let report_service = Arc::new(ReportService::new(db_client_arc.clone()));

        Self {
            env: config,
            db_client: db_client_arc,
            listing_service,
            verification_service,
            chat_service,
            report_service,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::DEBUG)
        .init();

    dotenv().ok();

    let config = Config::init();

    let db_client = match DBClient::open(&config.data_dir).await {
        Ok(client) => {
            tracing::info!("Loaded data store from {}", client.data_dir().display());
            client
        }
        Err(err) => {
            tracing::error!("Failed to load data store: {}", err);
            std::process::exit(1);
        }
    };

    if let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) {
        if let Err(err) = ensure_admin(&db_client, email, password).await {
            tracing::error!("Failed to seed admin account: {}", err);
            std::process::exit(1);
        }
    } else {
        tracing::warn!("ADMIN_EMAIL/ADMIN_PASSWORD not set, no admin account will be seeded");
    }

    tracing::info!("{} registered users", db_client.get_user_count().await);

    let allowed_origins: Vec<HeaderValue> = ["http://localhost:5173", "http://localhost:8000"]
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE])
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE]);

    let port = config.port;
    let app_state = Arc::new(AppState::new(db_client, config));

    let app = create_router(app_state).layer(cors);

    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("Failed to bind port {}: {}", port, err);
            std::process::exit(1);
        }
    };

    tracing::info!("Server is running on http://localhost:{}", port);

    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", err);
    }
}
