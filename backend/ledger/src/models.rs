//! # Records
//!
//! Typed versions of the two JSON documents on disk.
//!
//! ## raffle_data.json
//! - `raffles`: list of [`Raffle`] in creation order
//! - `current_raffle`: kept for compatibility with the front end, never written by the server
//!
//! ## buyers.json
//! - Object keyed by raffle id, each value a list of [`Buyer`]
//!
//! Field names follow the front end (camelCase), except `ticket_numbers` which has always been snake case.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Buyers of every raffle, keyed by raffle id.
pub type BuyerDocument = BTreeMap<String, Vec<Buyer>>;

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct RaffleDocument {
    #[serde(default)]
    pub raffles: Vec<Raffle>,

    #[serde(default)]
    pub current_raffle: Option<String>,
}

impl RaffleDocument {
    /// Largest numeric id plus one. Ids that do not parse are skipped.
    pub fn next_id(&self) -> String {
        let max = self
            .raffles
            .iter()
            .filter_map(|raffle| raffle.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);

        (max + 1).to_string()
    }

    pub fn find(&self, id: &str) -> Option<&Raffle> {
        self.raffles.iter().find(|raffle| raffle.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Raffle> {
        self.raffles.iter_mut().find(|raffle| raffle.id == id)
    }

    /// Drops the raffle with `id`, returning whether anything was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.raffles.len();
        self.raffles.retain(|raffle| raffle.id != id);

        self.raffles.len() != before
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Raffle {
    pub id: String,
    pub name: String,
    pub draw_date: String,
    pub prize: String,
    pub ticket_cost: f64,
    pub payment_link: String,

    #[serde(default)]
    pub drawn: bool,

    #[serde(default)]
    pub winner: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banking_details: Option<BankingDetails>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct BankingDetails {
    pub account_owner: String,
    pub bank_name: String,
    pub branch_code: String,
    pub account_number: String,
    pub account_type: String,
}

impl BankingDetails {
    pub fn is_empty(&self) -> bool {
        [
            &self.account_owner,
            &self.bank_name,
            &self.branch_code,
            &self.account_number,
            &self.account_type,
        ]
        .iter()
        .all(|field| field.is_empty())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Buyer {
    pub buyer_number: u32,
    pub name: String,
    pub surname: String,
    pub email: String,

    #[serde(default)]
    pub mobile: String,

    pub tickets: u32,

    #[serde(rename = "ticket_numbers", default)]
    pub ticket_numbers: Vec<u32>,

    #[serde(default)]
    pub payment_received: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<String>,
}

impl Buyer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }
}

pub fn find_buyer(buyers: &[Buyer], buyer_number: u32) -> Option<&Buyer> {
    buyers
        .iter()
        .find(|buyer| buyer.buyer_number == buyer_number)
}
