use crate::interaction::InteractionHandler;
use crate::storage::FileStore;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

/// Every event holds `handler` for its whole run, so events never interleave.
#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<Mutex<InteractionHandler<FileStore>>>,
    pub assets_dir: PathBuf,
}

impl AppState {
    pub fn new(handler: InteractionHandler<FileStore>, assets_dir: PathBuf) -> Self {
        Self {
            handler: Arc::new(Mutex::new(handler)),
            assets_dir,
        }
    }
}
