//! # Draw
//!
//! Every ticket is one entry in the pool, so a buyer holding more tickets has proportionally
//! better odds. The winner is stored on the raffle as display text, e.g.
//! `Winner: Ticket #004213 - Ann Lee`, and parsed back out when looking up winner details.
use std::sync::LazyLock;

use rand::{Rng, seq::SliceRandom};
use regex::Regex;

use crate::models::Buyer;

static WINNING_TICKET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#(\d+)").expect("winning ticket pattern"));

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolEntry {
    pub number: u32,
    pub holder: String,
}

pub fn ticket_pool(buyers: &[Buyer]) -> Vec<PoolEntry> {
    buyers
        .iter()
        .flat_map(|buyer| {
            let holder = buyer.full_name();

            buyer.ticket_numbers.iter().map(move |&number| PoolEntry {
                number,
                holder: holder.clone(),
            })
        })
        .collect()
}

/// Uniform pick over the pool, `None` when nobody holds a ticket.
pub fn pick_winner<R: Rng + ?Sized>(rng: &mut R, buyers: &[Buyer]) -> Option<PoolEntry> {
    ticket_pool(buyers).choose(rng).cloned()
}

pub fn winner_text(entry: &PoolEntry) -> String {
    format!("Winner: Ticket #{:06} - {}", entry.number, entry.holder)
}

pub fn winning_ticket(text: &str) -> Option<u32> {
    WINNING_TICKET
        .captures(text)
        .and_then(|captures| captures[1].parse().ok())
}
