//! Keeps each node's cached `drawing_files` in line with the object store.
//!
//! The object store is the source of truth for which drawings exist; the
//! relational copy is a cache that is only ever replaced wholesale.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use common::storage::{ObjectEntry, ObjectStore, StorageError};
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{info, instrument, warn};

use crate::models::drawing::DrawingFile;
use crate::repository::{NodeRef, NodeRepository, RepositoryError};

/// Suffix that marks an object as a drawing.
pub const DRAWING_SUFFIX: &str = ".pdf";

#[derive(Debug, Error)]
pub enum DrawingError {
    #[error("Node '{0}' not found")]
    NotFound(String),

    #[error("Node '{0}' has no primary artifact reference")]
    NoArtifactRef(String),

    #[error("Object store unavailable: {0}")]
    StoreUnavailable(#[source] StorageError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("{0}")]
    Validation(String),
}

/// Which node attribute is used as the storage prefix when scanning.
///
/// Single-node extraction scans under the node's primary artifact reference
/// while batch reconciliation scans under the raw node ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanScope {
    ArtifactRef,
    NodeId,
}

impl ScanScope {
    pub fn prefix(self, node: &NodeRef) -> &str {
        match self {
            Self::ArtifactRef => &node.pdf_url,
            Self::NodeId => &node.id,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DrawingSettings {
    pub suffix: String,
    pub default_url_ttl: Duration,
    pub max_url_ttl: Duration,
    /// Nodes reconciled at once. 1 processes them strictly in sequence.
    pub reconcile_concurrency: usize,
}

impl Default for DrawingSettings {
    fn default() -> Self {
        Self {
            suffix: DRAWING_SUFFIX.to_string(),
            default_url_ttl: Duration::from_secs(3600),
            max_url_ttl: Duration::from_secs(7 * 24 * 3600),
            reconcile_concurrency: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOutcome {
    pub extracted_count: usize,
    pub files: Vec<DrawingFile>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeFileCount {
    pub node_id: String,
    pub file_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileStage {
    List,
    Persist,
    /// The node's task panicked or was cancelled.
    Task,
}

impl fmt::Display for ReconcileStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => write!(f, "list"),
            Self::Persist => write!(f, "persist"),
            Self::Task => write!(f, "task"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeFailure {
    pub node_id: String,
    pub stage: ReconcileStage,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub processed_nodes: usize,
    pub total_files: usize,
    pub scanned_nodes: usize,
    /// In node enumeration order.
    pub details: Vec<NodeFileCount>,
    /// In node enumeration order.
    pub failures: Vec<NodeFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub success: bool,
    pub artifact_removed: bool,
    pub artifact_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUrl {
    pub url: String,
    pub ttl: Duration,
}

enum NodeOutcome {
    /// Scanned, nothing matched, row left untouched.
    Empty,
    Reconciled(NodeFileCount),
    Failed(NodeFailure),
}

/// Keep only drawing objects, preserving store order.
pub fn derive_drawing_files(entries: Vec<ObjectEntry>, suffix: &str) -> Vec<DrawingFile> {
    entries
        .into_iter()
        .filter(|entry| entry.key.ends_with(suffix))
        .map(|entry| DrawingFile {
            filename: entry.file_name().to_string(),
            path: entry.key,
        })
        .collect()
}

#[derive(Clone)]
pub struct DrawingService {
    store: Arc<dyn ObjectStore>,
    nodes: Arc<dyn NodeRepository>,
    settings: Arc<DrawingSettings>,
}

impl DrawingService {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        nodes: Arc<dyn NodeRepository>,
        settings: DrawingSettings,
    ) -> Self {
        Self {
            store,
            nodes,
            settings: Arc::new(settings),
        }
    }

    async fn scan(&self, node: &NodeRef, scope: ScanScope) -> Result<Vec<DrawingFile>, StorageError> {
        let entries = self.store.list(scope.prefix(node), true).await?;
        Ok(derive_drawing_files(entries, &self.settings.suffix))
    }

    /// Rescan one node's artifact prefix and replace its drawing list.
    ///
    /// The list is written even when empty. A listing failure leaves the
    /// stored list untouched. A blank reference is rejected before the store
    /// is touched: an empty prefix matches every object.
    #[instrument(skip(self))]
    pub async fn extract_drawings(&self, node_id: &str) -> Result<ExtractOutcome, DrawingError> {
        let node = self
            .nodes
            .get_ref(node_id)
            .await?
            .ok_or_else(|| DrawingError::NotFound(node_id.to_string()))?;

        if node.pdf_url.trim().is_empty() {
            return Err(DrawingError::NoArtifactRef(node.id));
        }

        let files = self
            .scan(&node, ScanScope::ArtifactRef)
            .await
            .map_err(DrawingError::StoreUnavailable)?;

        self.nodes.set_drawing_files(&node.id, &files).await?;

        info!(
            node_id,
            prefix = %node.pdf_url,
            extracted = files.len(),
            "Extracted drawings"
        );
        Ok(ExtractOutcome {
            extracted_count: files.len(),
            files,
        })
    }

    /// Rescan every node under its ID prefix.
    ///
    /// Nodes without any drawing are neither written nor counted. A failing
    /// node is recorded in `failures` and does not stop the others; only
    /// failing to enumerate nodes fails the call.
    #[instrument(skip(self))]
    pub async fn reconcile_all_drawings(&self) -> Result<ReconcileReport, DrawingError> {
        let all = self.nodes.list_refs().await?;
        let scanned_nodes = all.len();
        let semaphore = Arc::new(Semaphore::new(self.settings.reconcile_concurrency.max(1)));

        // One task per node so a panic stays contained to that node.
        let mut tasks = FuturesUnordered::new();
        for (index, node) in all.into_iter().enumerate() {
            let service = self.clone();
            let semaphore = semaphore.clone();
            let node_id = node.id.clone();
            let handle = tokio::spawn(async move {
                let _permit = semaphore.acquire().await;
                service.reconcile_node(node).await
            });
            tasks.push(async move { (index, node_id, handle.await) });
        }

        let mut outcomes = Vec::with_capacity(scanned_nodes);
        while let Some((index, node_id, joined)) = tasks.next().await {
            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(node_id = %node_id, error = %e, "Reconcile task aborted");
                    NodeOutcome::Failed(NodeFailure {
                        node_id,
                        stage: ReconcileStage::Task,
                        error: e.to_string(),
                    })
                }
            };
            outcomes.push((index, outcome));
        }

        outcomes.sort_by_key(|(index, _)| *index);

        let mut report = ReconcileReport {
            scanned_nodes,
            ..Default::default()
        };
        for (_, outcome) in outcomes {
            match outcome {
                NodeOutcome::Empty => {}
                NodeOutcome::Reconciled(count) => {
                    report.total_files += count.file_count;
                    report.details.push(count);
                }
                NodeOutcome::Failed(failure) => report.failures.push(failure),
            }
        }
        report.processed_nodes = report.details.len();

        info!(
            scanned = report.scanned_nodes,
            processed = report.processed_nodes,
            total_files = report.total_files,
            failed = report.failures.len(),
            "Drawing reconciliation finished"
        );
        Ok(report)
    }

    async fn reconcile_node(&self, node: NodeRef) -> NodeOutcome {
        let files = match self.scan(&node, ScanScope::NodeId).await {
            Ok(files) => files,
            Err(e) => {
                warn!(node_id = %node.id, error = %e, "Listing failed, skipping node");
                return NodeOutcome::Failed(NodeFailure {
                    node_id: node.id,
                    stage: ReconcileStage::List,
                    error: e.to_string(),
                });
            }
        };

        if files.is_empty() {
            return NodeOutcome::Empty;
        }

        if let Err(e) = self.nodes.set_drawing_files(&node.id, &files).await {
            warn!(node_id = %node.id, error = %e, "Persisting drawings failed, skipping node");
            return NodeOutcome::Failed(NodeFailure {
                node_id: node.id,
                stage: ReconcileStage::Persist,
                error: e.to_string(),
            });
        }

        NodeOutcome::Reconciled(NodeFileCount {
            node_id: node.id,
            file_count: files.len(),
        })
    }

    /// Remove the node's primary artifact (best-effort), then its row (must succeed).
    #[instrument(skip(self))]
    pub async fn delete_node(&self, node_id: &str) -> Result<DeleteOutcome, DrawingError> {
        let node = self
            .nodes
            .get_ref(node_id)
            .await?
            .ok_or_else(|| DrawingError::NotFound(node_id.to_string()))?;

        let (artifact_removed, artifact_error) = if node.pdf_url.is_empty() {
            (false, None)
        } else {
            match self.store.remove(&node.pdf_url).await {
                Ok(()) => (true, None),
                Err(e) => {
                    warn!(
                        node_id,
                        artifact = %node.pdf_url,
                        error = %e,
                        "Artifact removal failed, deleting node anyway"
                    );
                    (false, Some(e.to_string()))
                }
            }
        };

        self.nodes.delete(&node.id).await?;

        info!(node_id, artifact_removed, "Node deleted");
        Ok(DeleteOutcome {
            success: true,
            artifact_removed,
            artifact_error,
        })
    }

    /// Issue a time-limited download URL for an object key.
    #[instrument(skip(self))]
    pub async fn issue_download_url(
        &self,
        path: &str,
        ttl_secs: Option<u64>,
    ) -> Result<SignedUrl, DrawingError> {
        if path.trim().is_empty() {
            return Err(DrawingError::Validation("Path must not be empty".into()));
        }
        let ttl = ttl_secs
            .map(Duration::from_secs)
            .unwrap_or(self.settings.default_url_ttl);
        if ttl.is_zero() || ttl > self.settings.max_url_ttl {
            return Err(DrawingError::Validation(format!(
                "TTL must be 1-{} seconds",
                self.settings.max_url_ttl.as_secs()
            )));
        }

        let url = self
            .store
            .signed_url(path, ttl)
            .await
            .map_err(|e| match e {
                StorageError::InvalidKey(msg) => DrawingError::Validation(msg),
                other => DrawingError::StoreUnavailable(other),
            })?;

        Ok(SignedUrl { url, ttl })
    }
}
