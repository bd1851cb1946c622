use ledger::{
    Store,
    draw::{pick_winner, winner_text, winning_ticket},
};
use rand::Rng;
use serde::Serialize;
use tracing::info;

use crate::error::AppError;

#[derive(Serialize, Debug, PartialEq)]
pub struct WinnerDetails {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub mobile: String,
    pub ticket: u32,
}

/// Picks a ticket and records the result on the raffle. Drawing again overwrites the winner.
pub fn draw<R: Rng + ?Sized>(
    store: &dyn Store,
    raffle_id: &str,
    rng: &mut R,
) -> Result<String, AppError> {
    let buyers = store.load_buyers()?.remove(raffle_id).unwrap_or_default();
    let entry = pick_winner(rng, &buyers).ok_or(AppError::NoTickets)?;

    let mut document = store.load_raffles()?;
    let raffle = document
        .find_mut(raffle_id)
        .ok_or_else(|| AppError::NotFound("Raffle not found".to_string()))?;

    let text = winner_text(&entry);
    raffle.winner = Some(text.clone());
    raffle.drawn = true;
    store.save_raffles(&document)?;

    info!("Raffle {raffle_id} drawn: {text}");
    Ok(text)
}

pub fn winner_details(store: &dyn Store, raffle_id: &str) -> Result<WinnerDetails, AppError> {
    let ticket = store
        .load_raffles()?
        .find(raffle_id)
        .and_then(|raffle| raffle.winner.as_deref().and_then(winning_ticket))
        .ok_or_else(|| AppError::NotFound("No winner found for this raffle".to_string()))?;

    let buyers = store.load_buyers()?.remove(raffle_id).unwrap_or_default();
    let winner = buyers
        .into_iter()
        .find(|buyer| buyer.ticket_numbers.contains(&ticket))
        .ok_or_else(|| AppError::NotFound("Winner details not found".to_string()))?;

    Ok(WinnerDetails {
        name: winner.name,
        surname: winner.surname,
        email: winner.email,
        mobile: winner.mobile,
        ticket,
    })
}
