//! StayHub server entry point.

use std::sync::Arc;

use axum::{Router, middleware};
use stayhub_api::{AppState, auth_middleware, router as api_router};
use stayhub_common::Config;
use stayhub_core::{
    AdminUserService, ApprovalService, BookingService, CascadeService, NotificationService,
    PendingDeletionService, PropertyService, ReviewService, UserService,
};
use stayhub_db::repositories::{
    BookingRepository, CascadeRepository, NotificationRepository, PendingDeletionRepository,
    PropertyRepository, ReviewRepository, UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

/// Wire repositories into services.
fn build_state(db: &Arc<sea_orm::DatabaseConnection>, config: &Config) -> AppState {
    let user_repo = UserRepository::new(Arc::clone(db));
    let property_repo = PropertyRepository::new(Arc::clone(db));
    let booking_repo = BookingRepository::new(Arc::clone(db));
    let review_repo = ReviewRepository::new(Arc::clone(db));
    let notification_repo = NotificationRepository::new(Arc::clone(db));
    let pending_repo = PendingDeletionRepository::new(Arc::clone(db));
    let cascade_repo = CascadeRepository::new(Arc::clone(db));

    let notification_service = NotificationService::new(notification_repo, user_repo.clone());
    let cascade_service = CascadeService::new(cascade_repo);

    AppState {
        user_service: UserService::new(
            user_repo.clone(),
            notification_service.clone(),
            config.registration.auto_approve,
        ),
        admin_user_service: AdminUserService::new(user_repo.clone()),
        approval_service: ApprovalService::new(
            user_repo.clone(),
            property_repo.clone(),
            notification_service.clone(),
        ),
        pending_deletion_service: PendingDeletionService::new(
            pending_repo,
            user_repo.clone(),
            cascade_service.clone(),
            notification_service.clone(),
            config.auth.clone(),
        ),
        property_service: PropertyService::new(
            property_repo.clone(),
            user_repo,
            notification_service.clone(),
        ),
        booking_service: BookingService::new(
            booking_repo,
            property_repo.clone(),
            notification_service.clone(),
        ),
        review_service: ReviewService::new(
            review_repo,
            property_repo,
            notification_service.clone(),
        ),
        cascade_service,
        notification_service,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stayhub=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting stayhub server...");

    // Load configuration
    let config = Config::load()?;

    if config.registration.auto_approve {
        warn!("registration.auto_approve is on: new accounts can book without review");
    }
    if config.auth.super_admin_id.is_none() {
        warn!("auth.super_admin_id is unset: pending deletions cannot be resolved");
    }

    // Connect to database
    let db = stayhub_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    stayhub_db::migrate(&db).await?;
    info!("Migrations completed");

    let db = Arc::new(db);
    let state = build_state(&db, &config);

    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let listener =
        tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
