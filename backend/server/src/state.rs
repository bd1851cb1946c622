use std::sync::Arc;

use ledger::{JsonFileStore, LedgerError, Store, Uploads};
use tokio::sync::Mutex;

use super::config::Config;

pub struct State {
    pub config: Config,
    pub store: Arc<dyn Store>,
    pub uploads: Uploads,
    /// Held across every read-modify-write of the JSON documents.
    pub writes: Mutex<()>,
}

impl State {
    pub fn new(config: Config) -> Result<Arc<Self>, LedgerError> {
        let store = JsonFileStore::new(config.raffles_file.clone(), config.buyers_file.clone());
        store.ensure_files()?;

        Self::with_store(config, Arc::new(store))
    }

    pub fn with_store(config: Config, store: Arc<dyn Store>) -> Result<Arc<Self>, LedgerError> {
        let uploads = Uploads::new(config.upload_dir.clone());
        uploads.ensure_dirs()?;

        Ok(Arc::new(Self {
            config,
            store,
            uploads,
            writes: Mutex::new(()),
        }))
    }
}
