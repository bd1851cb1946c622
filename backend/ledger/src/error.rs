use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Image processing failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("Not enough ticket numbers left: requested {requested}, available {available}")]
    TicketCapacity { requested: usize, available: usize },

    #[error("Gave up allocating ticket numbers after {attempts} attempts")]
    TicketExhausted { attempts: usize },

    #[error("Store lock poisoned")]
    Poisoned,
}

impl LedgerError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
