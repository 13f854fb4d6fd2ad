use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use grudge_api::auth::{self, AppState, AppStateInner};
use grudge_api::email::Mailer;
use grudge_api::middleware::require_auth;
use grudge_api::{events, friends, invites, search};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "grudge=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret =
        std::env::var("GRUDGE_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let db_path = std::env::var("GRUDGE_DB_PATH").unwrap_or_else(|_| "grudge.db".into());
    let host = std::env::var("GRUDGE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("GRUDGE_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;
    let app_url =
        std::env::var("GRUDGE_APP_URL").unwrap_or_else(|_| format!("http://localhost:{port}"));

    // Init database
    let db = grudge_db::Database::open(&PathBuf::from(&db_path))?;

    // Shared state
    let state: AppState = Arc::new(AppStateInner {
        db,
        jwt_secret,
        app_url,
        mailer: Mailer::from_env(),
    });

    // Routes
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route("/auth/reset-password", post(auth::reset_password))
        .route("/invites/{token}", get(invites::invite_info))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route(
            "/disrespects",
            get(events::list_disrespects).post(events::record_disrespect),
        )
        .route("/wins", get(events::list_wins).post(events::record_win))
        .route(
            "/friends",
            get(friends::get_friends)
                .post(friends::send_friend_request)
                .patch(friends::respond_friend_request),
        )
        .route(
            "/friends/{friend_id}/disrespects",
            get(friends::list_friend_disrespects),
        )
        .route("/friends/{friend_id}/wins", get(friends::list_friend_wins))
        .route("/invites", post(invites::create_invite))
        .route("/users/search", get(search::search_users))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Grudge server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
