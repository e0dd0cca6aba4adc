use actix_web::{web, App, HttpServer};
use std::io;
use tokio::signal;

mod api_error;
mod config;
mod db;
mod http;
mod middleware;
mod models;
mod rank;
mod rating;
mod service;
mod storage;
mod telemetry;

use crate::config::Config;
use crate::db::{create_pool, run_migrations};
use crate::middleware::cors_middleware;
use crate::service::MatchLifecycleService;
use crate::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> io::Result<()> {
    // Load configuration
    let config = Config::from_env().expect("Failed to load configuration");

    // Initialize telemetry
    init_telemetry();

    // Create database pool and apply migrations
    let db_pool = create_pool(&config)
        .await
        .expect("Failed to create database pool");
    run_migrations(&db_pool)
        .await
        .expect("Failed to run database migrations");

    let lifecycle_service = MatchLifecycleService::new(db_pool.clone());

    tracing::info!(
        "Starting league backend server on {}:{}",
        config.server.host,
        config.server.port
    );

    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(db_pool.clone()))
            .app_data(web::Data::new(lifecycle_service.clone()))
            .wrap(cors_middleware())
            .wrap(actix_web::middleware::Logger::default())
            .configure(http::match_handler::configure_routes)
            .configure(http::league_handler::configure_routes)
            .configure(http::player_handler::configure_routes)
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(http::health::health_check)),
            )
    })
    .bind((config.server.host.clone(), config.server.port))?
    .run();

    // Graceful shutdown
    let server_handle = server.handle();
    tokio::spawn(async move {
        signal::ctrl_c().await.expect("Failed to listen for shutdown signal");
        tracing::info!("Shutdown signal received, stopping server...");
        server_handle.stop(true).await;
    });

    server.await
}
