//! # Buyers
//!
//! Per-raffle buyer lists. Buyer numbers are `len + 1` at insert time and are never compacted,
//! so deleting buyer 1 of 2 and adding another yields a second buyer number 2.
use ledger::{
    Buyer, Store,
    models::find_buyer,
    tickets::{allocate_tickets, issued_tickets},
};
use rand::Rng;
use tracing::info;

use crate::{error::AppError, forms::NewBuyer};

fn not_found(buyer_number: u32) -> AppError {
    AppError::NotFound(format!("Buyer #{buyer_number} not found"))
}

pub fn list(store: &dyn Store, raffle_id: &str) -> Result<Vec<Buyer>, AppError> {
    Ok(store.load_buyers()?.remove(raffle_id).unwrap_or_default())
}

pub fn get(store: &dyn Store, raffle_id: &str, buyer_number: u32) -> Result<Buyer, AppError> {
    let buyers = list(store, raffle_id)?;

    find_buyer(&buyers, buyer_number)
        .cloned()
        .ok_or_else(|| not_found(buyer_number))
}

pub fn add<R: Rng + ?Sized>(
    store: &dyn Store,
    raffle_id: &str,
    request: NewBuyer,
    rng: &mut R,
) -> Result<Buyer, AppError> {
    request.validate()?;

    let mut document = store.load_buyers()?;
    let buyers = document.entry(raffle_id.to_string()).or_default();

    let ticket_numbers = allocate_tickets(rng, &issued_tickets(buyers), request.tickets as usize)?;

    let buyer = Buyer {
        buyer_number: buyers.len() as u32 + 1,
        name: request.name,
        surname: request.surname,
        email: request.email,
        mobile: request.mobile,
        tickets: request.tickets,
        ticket_numbers,
        payment_received: request.payment_received,
        purchase_date: request.purchase_date,
    };

    buyers.push(buyer.clone());
    store.save_buyers(&document)?;

    info!(
        "Buyer #{} added to raffle {raffle_id} with {} tickets",
        buyer.buyer_number, buyer.tickets
    );
    Ok(buyer)
}

pub fn delete(store: &dyn Store, raffle_id: &str, buyer_number: u32) -> Result<(), AppError> {
    let mut document = store.load_buyers()?;
    let buyers = document
        .get_mut(raffle_id)
        .ok_or_else(|| not_found(buyer_number))?;

    let before = buyers.len();
    buyers.retain(|buyer| buyer.buyer_number != buyer_number);

    if buyers.len() == before {
        return Err(not_found(buyer_number));
    }

    store.save_buyers(&document)?;

    info!("Buyer #{buyer_number} removed from raffle {raffle_id}");
    Ok(())
}

/// Sets the payment flag. An unknown buyer number is not an error and writes nothing.
pub fn set_payment(
    store: &dyn Store,
    raffle_id: &str,
    buyer_number: u32,
    received: bool,
) -> Result<bool, AppError> {
    let mut document = store.load_buyers()?;
    let Some(buyer) = document
        .get_mut(raffle_id)
        .and_then(|buyers| buyers.iter_mut().find(|buyer| buyer.buyer_number == buyer_number))
    else {
        info!("Payment update for unknown buyer #{buyer_number} in raffle {raffle_id}");
        return Ok(false);
    };

    buyer.payment_received = received;
    store.save_buyers(&document)?;

    Ok(true)
}
