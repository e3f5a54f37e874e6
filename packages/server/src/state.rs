use std::sync::Arc;

use common::storage::OpenedStore;
use common::storage::filesystem::FilesystemObjectStore;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::repository::{NodeRepository, SeaOrmNodeRepository};
use crate::services::drawings::DrawingService;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub nodes: Arc<dyn NodeRepository>,
    pub drawings: DrawingService,
    /// Present only with the filesystem backend, whose download links this server serves.
    pub local_files: Option<Arc<FilesystemObjectStore>>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: AppConfig, opened: OpenedStore) -> Self {
        let nodes: Arc<dyn NodeRepository> = Arc::new(SeaOrmNodeRepository::new(db));
        let drawings =
            DrawingService::new(opened.store, nodes.clone(), (&config.drawings).into());
        Self {
            config,
            nodes,
            drawings,
            local_files: opened.local,
        }
    }
}
