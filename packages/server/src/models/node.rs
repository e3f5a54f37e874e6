use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::drawing::DrawingFile;
use crate::repository::{NewNode, Node};

const MAX_ID_LEN: usize = 128;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateNodeRequest {
    /// Node identifier. Also the storage prefix scanned by batch reconciliation.
    #[schema(example = "N-1042")]
    pub id: String,
    #[schema(example = "Front bracket assembly")]
    pub name: String,
    /// Object key of the node's primary PDF.
    #[schema(example = "N-1042/main.pdf")]
    pub pdf_url: String,
}

impl CreateNodeRequest {
    pub fn validate(self) -> Result<NewNode, AppError> {
        let id = self.id.trim();
        if id.is_empty() || id.chars().count() > MAX_ID_LEN {
            return Err(AppError::Validation(format!(
                "Node ID must be 1-{MAX_ID_LEN} characters"
            )));
        }
        if id.chars().any(|c| c.is_control()) {
            return Err(AppError::Validation(
                "Node ID must not contain control characters".into(),
            ));
        }
        let name = self.name.trim();
        if name.is_empty() || name.chars().count() > 256 {
            return Err(AppError::Validation("Name must be 1-256 characters".into()));
        }
        let pdf_url = self.pdf_url.trim();
        if pdf_url.is_empty() {
            return Err(AppError::Validation("pdf_url must not be empty".into()));
        }
        Ok(NewNode {
            id: id.to_string(),
            name: name.to_string(),
            pdf_url: pdf_url.to_string(),
        })
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct NodeResponse {
    #[schema(example = "N-1042")]
    pub id: String,
    pub name: String,
    pub pdf_url: String,
    /// Cached drawing list; refreshed only by extraction or reconciliation.
    pub drawing_files: Vec<DrawingFile>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Node> for NodeResponse {
    fn from(node: Node) -> Self {
        Self {
            id: node.id,
            name: node.name,
            pdf_url: node.pdf_url,
            drawing_files: node.drawing_files,
            created_at: node.created_at,
            updated_at: node.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct NodeListResponse {
    pub nodes: Vec<NodeResponse>,
    pub total: u64,
}
