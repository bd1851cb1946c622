//! # Ticket Numbers
//!
//! Six digit numbers, unique within one raffle across every buyer.
//!
//! Numbers are drawn at random and rejected if already issued in the raffle or earlier in the
//! same batch. The number of draws is capped at [`ATTEMPTS_PER_TICKET`] per requested ticket, and
//! a request larger than the free space left in the range is refused up front.
use std::{collections::HashSet, ops::RangeInclusive};

use rand::Rng;

use crate::{error::LedgerError, models::Buyer};

pub const TICKET_RANGE: RangeInclusive<u32> = 100_000..=999_999;

pub const ATTEMPTS_PER_TICKET: usize = 1_000;

/// Every ticket number already handed out to `buyers`.
pub fn issued_tickets(buyers: &[Buyer]) -> HashSet<u32> {
    buyers
        .iter()
        .flat_map(|buyer| buyer.ticket_numbers.iter().copied())
        .collect()
}

pub fn allocate_tickets<R: Rng + ?Sized>(
    rng: &mut R,
    issued: &HashSet<u32>,
    count: usize,
) -> Result<Vec<u32>, LedgerError> {
    allocate_in_range(rng, TICKET_RANGE, issued, count)
}

pub fn allocate_in_range<R: Rng + ?Sized>(
    rng: &mut R,
    range: RangeInclusive<u32>,
    issued: &HashSet<u32>,
    count: usize,
) -> Result<Vec<u32>, LedgerError> {
    let size = (*range.end() - *range.start()) as usize + 1;
    let used = issued.iter().filter(|number| range.contains(number)).count();
    let available = size - used;

    if count > available {
        return Err(LedgerError::TicketCapacity {
            requested: count,
            available,
        });
    }

    let budget = count.saturating_mul(ATTEMPTS_PER_TICKET);
    let mut batch = HashSet::with_capacity(count);
    let mut fresh = Vec::with_capacity(count);
    let mut attempts = 0;

    while fresh.len() < count {
        if attempts == budget {
            return Err(LedgerError::TicketExhausted { attempts });
        }
        attempts += 1;

        let number = rng.gen_range(range.clone());
        if !issued.contains(&number) && batch.insert(number) {
            fresh.push(number);
        }
    }

    Ok(fresh)
}
