//! # Persistence
//!
//! Both documents are read and written whole. There is no partial update and no cross-document
//! transaction, so deleting a raffle writes `raffle_data.json` first and `buyers.json` second.
//!
//! ## Loading
//! - Missing file: the empty document is returned, nothing is written
//! - Unreadable or corrupt file: a warning is logged and the empty document is returned
//!
//! Loads never write. [`JsonFileStore::ensure_files`] creates the empty files once at startup.
//!
//! Corrupt files are left untouched on disk until the next save overwrites them.
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use serde::{Serialize, de::DeserializeOwned};
use tracing::{info, warn};

use crate::{
    error::LedgerError,
    models::{BuyerDocument, RaffleDocument},
};

pub trait Store: Send + Sync {
    fn load_raffles(&self) -> Result<RaffleDocument, LedgerError>;

    fn save_raffles(&self, document: &RaffleDocument) -> Result<(), LedgerError>;

    fn load_buyers(&self) -> Result<BuyerDocument, LedgerError>;

    fn save_buyers(&self, document: &BuyerDocument) -> Result<(), LedgerError>;
}

pub struct JsonFileStore {
    raffles_path: PathBuf,
    buyers_path: PathBuf,
}

impl JsonFileStore {
    pub fn new(raffles_path: impl Into<PathBuf>, buyers_path: impl Into<PathBuf>) -> Self {
        Self {
            raffles_path: raffles_path.into(),
            buyers_path: buyers_path.into(),
        }
    }

    pub fn raffles_path(&self) -> &Path {
        &self.raffles_path
    }

    pub fn buyers_path(&self) -> &Path {
        &self.buyers_path
    }

    /// Writes empty documents for any file that does not exist yet.
    pub fn ensure_files(&self) -> Result<(), LedgerError> {
        create_if_missing::<RaffleDocument>(&self.raffles_path)?;
        create_if_missing::<BuyerDocument>(&self.buyers_path)
    }
}

fn create_if_missing<T: Serialize + Default>(path: &Path) -> Result<(), LedgerError> {
    if path.exists() {
        return Ok(());
    }

    info!("{} not found, creating empty document", path.display());
    save_document(path, &T::default())
}

impl Store for JsonFileStore {
    fn load_raffles(&self) -> Result<RaffleDocument, LedgerError> {
        load_document(&self.raffles_path)
    }

    fn save_raffles(&self, document: &RaffleDocument) -> Result<(), LedgerError> {
        save_document(&self.raffles_path, document)
    }

    fn load_buyers(&self) -> Result<BuyerDocument, LedgerError> {
        load_document(&self.buyers_path)
    }

    fn save_buyers(&self, document: &BuyerDocument) -> Result<(), LedgerError> {
        save_document(&self.buyers_path, document)
    }
}

fn load_document<T>(path: &Path) -> Result<T, LedgerError>
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        return Ok(T::default());
    }

    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Failed to read {}: {e}", path.display());
            return Ok(T::default());
        }
    };

    Ok(serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        warn!("Corrupt document {}, using empty default: {e}", path.display());
        T::default()
    }))
}

fn save_document<T: Serialize>(path: &Path, document: &T) -> Result<(), LedgerError> {
    let bytes = serde_json::to_vec_pretty(document)?;

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| LedgerError::io(parent, e))?;
    }

    // staged next to the target, then renamed over it
    let staging = path.with_extension("json.tmp");
    fs::write(&staging, bytes).map_err(|e| LedgerError::io(&staging, e))?;
    fs::rename(&staging, path).map_err(|e| LedgerError::io(path, e))
}

/// In-memory [`Store`] for tests and throwaway runs.
#[derive(Default)]
pub struct MemoryStore {
    raffles: Mutex<RaffleDocument>,
    buyers: Mutex<BuyerDocument>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_documents(raffles: RaffleDocument, buyers: BuyerDocument) -> Self {
        Self {
            raffles: Mutex::new(raffles),
            buyers: Mutex::new(buyers),
        }
    }
}

impl Store for MemoryStore {
    fn load_raffles(&self) -> Result<RaffleDocument, LedgerError> {
        self.raffles
            .lock()
            .map(|document| document.clone())
            .map_err(|_| LedgerError::Poisoned)
    }

    fn save_raffles(&self, document: &RaffleDocument) -> Result<(), LedgerError> {
        *self.raffles.lock().map_err(|_| LedgerError::Poisoned)? = document.clone();

        Ok(())
    }

    fn load_buyers(&self) -> Result<BuyerDocument, LedgerError> {
        self.buyers
            .lock()
            .map(|document| document.clone())
            .map_err(|_| LedgerError::Poisoned)
    }

    fn save_buyers(&self, document: &BuyerDocument) -> Result<(), LedgerError> {
        *self.buyers.lock().map_err(|_| LedgerError::Poisoned)? = document.clone();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::models::Buyer;

    fn store_in(dir: &Path) -> JsonFileStore {
        JsonFileStore::new(dir.join("raffle_data.json"), dir.join("buyers.json"))
    }

    #[test]
    fn test_missing_files_load_without_writing() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());

        assert_eq!(store.load_raffles().unwrap(), RaffleDocument::default());
        assert!(store.load_buyers().unwrap().is_empty());

        assert!(!store.raffles_path().exists());
        assert!(!store.buyers_path().exists());
    }

    #[test]
    fn test_ensure_files_creates_only_missing() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());

        fs::write(store.buyers_path(), br#"{"1": []}"#).unwrap();
        store.ensure_files().unwrap();

        let written: serde_json::Value =
            serde_json::from_slice(&fs::read(store.raffles_path()).unwrap()).unwrap();
        assert_eq!(written, serde_json::json!({"raffles": [], "current_raffle": null}));
        assert_eq!(fs::read(store.buyers_path()).unwrap(), br#"{"1": []}"#);
    }

    #[test]
    fn test_corrupt_file_falls_back_to_default() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());

        fs::write(store.raffles_path(), b"{not json").unwrap();
        fs::write(store.buyers_path(), b"").unwrap();

        assert_eq!(store.load_raffles().unwrap(), RaffleDocument::default());
        assert!(store.load_buyers().unwrap().is_empty());
    }

    #[test]
    fn test_buyers_survive_save_and_load() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());

        let mut document = BuyerDocument::new();
        document.insert(
            "1".to_string(),
            vec![Buyer {
                buyer_number: 1,
                name: "Ann".to_string(),
                surname: "Lee".to_string(),
                email: "ann@example.com".to_string(),
                mobile: String::new(),
                tickets: 1,
                ticket_numbers: vec![100000],
                payment_received: true,
                purchase_date: None,
            }],
        );

        store.save_buyers(&document).unwrap();

        assert_eq!(store.load_buyers().unwrap(), document);
        assert!(!dir.path().join("buyers.json.tmp").exists());
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        let mut document = store.load_raffles().unwrap();
        document.current_raffle = Some("3".to_string());

        store.save_raffles(&document).unwrap();

        assert_eq!(store.load_raffles().unwrap().current_raffle.as_deref(), Some("3"));
    }
}
