use serde::{Deserialize, Serialize};

use crate::services::drawings::{
    DeleteOutcome, ExtractOutcome, NodeFailure, NodeFileCount, ReconcileReport,
};

/// One drawing found under a node's storage prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DrawingFile {
    /// Last path segment of the object key.
    #[schema(example = "bracket-rev-b.pdf")]
    pub filename: String,
    /// Full object key as reported by the store.
    #[schema(example = "N-1042/drawings/bracket-rev-b.pdf")]
    pub path: String,
}

/// Response for a single-node extraction.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ExtractDrawingsResponse {
    #[schema(example = 2)]
    pub extracted_count: usize,
    pub files: Vec<DrawingFile>,
}

impl From<ExtractOutcome> for ExtractDrawingsResponse {
    fn from(outcome: ExtractOutcome) -> Self {
        Self {
            extracted_count: outcome.extracted_count,
            files: outcome.files,
        }
    }
}

/// Per-node line of a reconciliation summary.
#[derive(Serialize, utoipa::ToSchema)]
pub struct NodeDrawingCount {
    #[schema(example = "N-1042")]
    pub node_id: String,
    #[schema(example = 3)]
    pub file_count: usize,
}

/// A node the reconciler could not process.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ReconcileFailure {
    #[schema(example = "N-1043")]
    pub node_id: String,
    /// Which step failed. One of: `list`, `persist`, `task`.
    #[schema(example = "list")]
    pub stage: String,
    pub error: String,
}

/// Summary of a whole-catalog reconciliation.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ReconcileResponse {
    /// Nodes with at least one drawing, whose list was rewritten.
    #[schema(example = 12)]
    pub processed_nodes: usize,
    #[schema(example = 40)]
    pub total_files: usize,
    /// Nodes examined, including those with no drawings and those that failed.
    #[schema(example = 30)]
    pub scanned_nodes: usize,
    pub details: Vec<NodeDrawingCount>,
    pub failures: Vec<ReconcileFailure>,
}

impl From<NodeFileCount> for NodeDrawingCount {
    fn from(count: NodeFileCount) -> Self {
        Self {
            node_id: count.node_id,
            file_count: count.file_count,
        }
    }
}

impl From<NodeFailure> for ReconcileFailure {
    fn from(failure: NodeFailure) -> Self {
        Self {
            node_id: failure.node_id,
            stage: failure.stage.to_string(),
            error: failure.error,
        }
    }
}

impl From<ReconcileReport> for ReconcileResponse {
    fn from(report: ReconcileReport) -> Self {
        Self {
            processed_nodes: report.processed_nodes,
            total_files: report.total_files,
            scanned_nodes: report.scanned_nodes,
            details: report.details.into_iter().map(Into::into).collect(),
            failures: report.failures.into_iter().map(Into::into).collect(),
        }
    }
}

/// Response for node deletion.
#[derive(Serialize, utoipa::ToSchema)]
pub struct DeleteNodeResponse {
    #[schema(example = true)]
    pub success: bool,
    /// Whether the primary PDF was removed from the object store.
    #[schema(example = true)]
    pub artifact_removed: bool,
    /// Store error from the best-effort artifact removal, if any.
    pub artifact_error: Option<String>,
}

impl From<DeleteOutcome> for DeleteNodeResponse {
    fn from(outcome: DeleteOutcome) -> Self {
        Self {
            success: outcome.success,
            artifact_removed: outcome.artifact_removed,
            artifact_error: outcome.artifact_error,
        }
    }
}

/// Query parameters for issuing a download URL.
#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SignedUrlQuery {
    /// Object key, typically a `DrawingFile.path`.
    pub path: String,
    /// Link lifetime in seconds. Defaults to the configured TTL (3600).
    pub ttl: Option<u64>,
}

/// A time-limited download link.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SignedUrlResponse {
    pub url: String,
    /// Seconds until the link stops working.
    #[schema(example = 3600)]
    pub expires_in: u64,
}

/// Signature parameters carried by filesystem-backend download links.
#[derive(Deserialize)]
pub struct DownloadQuery {
    pub expires: i64,
    pub signature: String,
}
