//! Documentation of the raffle management server.
//!
//! An operator creates raffles, sells numbered tickets, marks payments, draws a winner and hands
//! buyers a payment QR code. Everything is kept in two JSON files next to the binary.
//!
//!
//!
//! # API
//!
//! | Method | Path | |
//! |---|---|---|
//! | GET, POST | `/api/raffles` | list, create (multipart) |
//! | GET, PUT, DELETE | `/api/raffles/{id}` | read, update (multipart), delete |
//! | GET, POST | `/api/buyers/{raffle_id}` | list, add (JSON) |
//! | GET, DELETE | `/api/buyers/{raffle_id}/{buyer_number}` | read, delete |
//! | POST | `/api/buyers/{raffle_id}/{buyer_number}/payment` | `{"paymentReceived": bool}` |
//! | POST | `/api/draw/{raffle_id}` | draw a winner |
//! | GET | `/api/winners/{raffle_id}` | winner contact details |
//! | GET | `/api/payment-qr/{raffle_id}/{buyer_number}` | QR code and payment summary |
//! | POST | `/api/open-chrome` | `{"url": "..."}` opens a local browser window |
//!
//! Errors are `{"error": "..."}` with 400, 404, 409 or 500.
//!
//! Raffle forms carry `name`, `drawDate`, `prize`, `ticketCost`, `paymentLink`, optionally
//! `bankingDetails` (a JSON string) and an `image` file.
//!
//!
//!
//! # Static Files
//! - `/`, `/manifest.json`, `/sw.js`, `/style.css`, `/script.js`, `/config.js` from `STATIC_DIR`
//! - `/icons/*` from `STATIC_DIR/icons`
//! - `/uploads/*` and `/uploads/thumbnails/*` from `UPLOAD_DIR`
//!
//! Every response is marked uncacheable so the service worker always sees fresh API data.
//!
//!
//!
//! # Notes
//!
//! ## Writes
//! Each mutating request loads the whole document, edits it and writes it back while holding
//! [`State::writes`](state::State::writes). Two servers pointed at the same files can still lose
//! updates.
//!
//! ## Raffle delete
//! The raffle file is written before the buyer file. A crash between the two leaves the buyer
//! list behind under an id that no longer exists.
//!
//!
//!
//! # Setup
//!
//! Run with logs.
//! ```sh
//! RUST_LOG=info cargo run -p raffle
//! ```
//!
//! Regenerate missing thumbnails.
//! ```sh
//! cargo run -p process
//! ```
use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{
        HeaderValue,
        header::{CACHE_CONTROL, EXPIRES, PRAGMA},
    },
    routing::{get, post},
};
use signal::ctrl_c;
#[cfg(unix)]
use signal::unix::{SignalKind, signal};
use tokio::{net::TcpListener, signal};
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

pub mod assets;
pub mod browser;
pub mod buyers;
pub mod config;
pub mod draw;
pub mod error;
pub mod forms;
pub mod payment;
pub mod raffles;
pub mod routes;
pub mod state;

use config::Config;
use routes::{
    add_buyer, create_raffle, delete_buyer, delete_raffle, draw_winner, get_buyer, get_raffle,
    list_buyers, list_raffles, open_browser, payment_qr, update_payment, update_raffle,
    winner_details,
};
use state::State;

pub async fn start_server() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    info!("Loading config...");
    let config = Config::load()?;

    info!("Initializing state...");
    let state = State::new(config)?;

    info!("Starting server...");
    let app = build_router(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutting down...");
    Ok(())
}

pub fn build_router(state: Arc<State>) -> Router {
    let api = Router::new()
        .route("/api/raffles", get(list_raffles).post(create_raffle))
        .route(
            "/api/raffles/{id}",
            get(get_raffle).put(update_raffle).delete(delete_raffle),
        )
        .route("/api/buyers/{raffle_id}", get(list_buyers).post(add_buyer))
        .route(
            "/api/buyers/{raffle_id}/{buyer_number}",
            get(get_buyer).delete(delete_buyer),
        )
        .route(
            "/api/buyers/{raffle_id}/{buyer_number}/payment",
            post(update_payment),
        )
        .route("/api/draw/{raffle_id}", post(draw_winner))
        .route("/api/winners/{raffle_id}", get(winner_details))
        .route(
            "/api/payment-qr/{raffle_id}/{buyer_number}",
            get(payment_qr),
        )
        .route("/api/open-chrome", post(open_browser))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes));

    api.merge(assets::routes(
        &state.config.static_dir,
        state.uploads.root(),
    ))
    .layer(SetResponseHeaderLayer::overriding(
        CACHE_CONTROL,
        HeaderValue::from_static("no-store, no-cache, must-revalidate, max-age=0"),
    ))
    .layer(SetResponseHeaderLayer::overriding(
        PRAGMA,
        HeaderValue::from_static("no-cache"),
    ))
    .layer(SetResponseHeaderLayer::overriding(
        EXPIRES,
        HeaderValue::from_static("-1"),
    ))
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::permissive())
    .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
