use nb_core::{NewsProvider, Result};
use nb_storage::SharedStorage;
use std::sync::Arc;
use crate::reconciler::Reconciler;

pub struct AppState {
    pub storage: SharedStorage,
    /// Absent when no provider credential is configured.
    pub provider: Option<Arc<dyn NewsProvider>>,
}

impl AppState {
    pub fn new(storage: SharedStorage, provider: Option<Arc<dyn NewsProvider>>) -> Self {
        Self { storage, provider }
    }

    pub async fn reconciler(&self) -> Result<Reconciler> {
        let storage = self.storage.get().await?;
        Ok(Reconciler::new(storage, self.provider.clone()))
    }
}
