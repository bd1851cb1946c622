//! # Ledger
//!
//! Shared raffle bookkeeping used by the server and the maintenance tools.
//!
//! ## Contents
//! - [`models`]: raffle and buyer records as stored on disk
//! - [`store`]: whole-document persistence behind the [`Store`] trait
//! - [`tickets`]: unique ticket number allocation
//! - [`draw`]: ticket pool and winner selection
//! - [`uploads`]: raffle images and thumbnails
//!
//! ## Files
//! - `raffle_data.json`: `{"raffles": [...], "current_raffle": null}`
//! - `buyers.json`: `{"<raffle id>": [buyer, ...]}`
//! - `uploads/raffle_<id>.<ext>` and `uploads/thumbnails/raffle_<id>_thumb.jpg`
pub mod draw;
pub mod error;
pub mod models;
pub mod store;
pub mod tickets;
pub mod uploads;

pub use error::LedgerError;
pub use models::{BankingDetails, Buyer, BuyerDocument, Raffle, RaffleDocument};
pub use store::{JsonFileStore, MemoryStore, Store};
pub use uploads::Uploads;
