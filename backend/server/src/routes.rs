use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Multipart, Path, State as AxumState, multipart::MultipartRejection,
        rejection::JsonRejection,
    },
    http::StatusCode,
    response::IntoResponse,
};
use ledger::{Buyer, Raffle};
use serde_json::{Value, json};

use crate::{
    browser, buyers,
    draw::{self, WinnerDetails},
    error::AppError,
    forms::{NewBuyer, OpenBrowser, PaymentUpdate, RaffleForm, parse_buyer_number},
    payment::{self, PaymentQr},
    raffles,
    state::State,
};

type AppState = AxumState<Arc<State>>;

fn message(text: impl Into<String>) -> Json<Value> {
    Json(json!({ "message": text.into() }))
}

/// Runs file and image work on the blocking pool.
async fn blocking<T, F>(state: &Arc<State>, work: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce(&State) -> Result<T, AppError> + Send + 'static,
{
    let state = state.clone();

    tokio::task::spawn_blocking(move || work(&state))
        .await
        .map_err(|e| AppError::InternalError(e.into()))?
}

pub async fn list_raffles(AxumState(state): AppState) -> Result<Json<Vec<Raffle>>, AppError> {
    Ok(Json(raffles::list(&*state.store)?))
}

pub async fn get_raffle(
    AxumState(state): AppState,
    Path(id): Path<String>,
) -> Result<Json<Raffle>, AppError> {
    Ok(Json(raffles::get(&*state.store, &id)?))
}

pub async fn create_raffle(
    AxumState(state): AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, AppError> {
    let fields = RaffleForm::from_multipart(multipart?).await?.validate()?;

    let _guard = state.writes.lock().await;
    let raffle = blocking(&state, move |state| {
        raffles::create(&*state.store, &state.uploads, fields)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(raffle)))
}

pub async fn update_raffle(
    AxumState(state): AppState,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Raffle>, AppError> {
    let fields = RaffleForm::from_multipart(multipart?).await?.validate()?;

    let _guard = state.writes.lock().await;
    let raffle = blocking(&state, move |state| {
        raffles::update(&*state.store, &state.uploads, &id, fields)
    })
    .await?;

    Ok(Json(raffle))
}

pub async fn delete_raffle(
    AxumState(state): AppState,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let _guard = state.writes.lock().await;
    blocking(&state, move |state| raffles::delete(&*state.store, &id)).await?;

    Ok(message("Raffle deleted successfully"))
}

pub async fn list_buyers(
    AxumState(state): AppState,
    Path(raffle_id): Path<String>,
) -> Result<Json<Vec<Buyer>>, AppError> {
    Ok(Json(buyers::list(&*state.store, &raffle_id)?))
}

pub async fn add_buyer(
    AxumState(state): AppState,
    Path(raffle_id): Path<String>,
    payload: Result<Json<NewBuyer>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(request) = payload?;

    let _guard = state.writes.lock().await;
    let buyer = buyers::add(&*state.store, &raffle_id, request, &mut rand::thread_rng())?;

    Ok(Json(json!({
        "message": "Buyer added successfully",
        "buyer": buyer,
    })))
}

pub async fn get_buyer(
    AxumState(state): AppState,
    Path((raffle_id, buyer_number)): Path<(String, String)>,
) -> Result<Json<Buyer>, AppError> {
    let buyer_number = parse_buyer_number(&buyer_number)?;

    Ok(Json(buyers::get(&*state.store, &raffle_id, buyer_number)?))
}

pub async fn delete_buyer(
    AxumState(state): AppState,
    Path((raffle_id, buyer_number)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    let buyer_number = parse_buyer_number(&buyer_number)?;

    let _guard = state.writes.lock().await;
    buyers::delete(&*state.store, &raffle_id, buyer_number)?;

    Ok(message(format!("Buyer #{buyer_number} deleted successfully")))
}

pub async fn update_payment(
    AxumState(state): AppState,
    Path((raffle_id, buyer_number)): Path<(String, String)>,
    payload: Result<Json<PaymentUpdate>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let buyer_number = parse_buyer_number(&buyer_number)?;
    let received = payload?
        .payment_received
        .ok_or_else(|| AppError::BadRequest("Payment status required".to_string()))?;

    let _guard = state.writes.lock().await;
    buyers::set_payment(&*state.store, &raffle_id, buyer_number, received)?;

    Ok(message("Payment status updated successfully"))
}

pub async fn draw_winner(
    AxumState(state): AppState,
    Path(raffle_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let _guard = state.writes.lock().await;
    let winner = draw::draw(&*state.store, &raffle_id, &mut rand::thread_rng())?;

    Ok(Json(json!({ "winner": winner })))
}

pub async fn winner_details(
    AxumState(state): AppState,
    Path(raffle_id): Path<String>,
) -> Result<Json<WinnerDetails>, AppError> {
    Ok(Json(draw::winner_details(&*state.store, &raffle_id)?))
}

pub async fn payment_qr(
    AxumState(state): AppState,
    Path((raffle_id, buyer_number)): Path<(String, String)>,
) -> Result<Json<PaymentQr>, AppError> {
    let buyer_number = parse_buyer_number(&buyer_number)?;

    Ok(Json(payment::payment_qr(&*state.store, &raffle_id, buyer_number)?))
}

pub async fn open_browser(
    AxumState(state): AppState,
    payload: Result<Json<OpenBrowser>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(request) = payload?;
    browser::launch(state.config.browser_path.as_deref(), request.url.as_deref())?;

    Ok(message("Chrome launched successfully"))
}
