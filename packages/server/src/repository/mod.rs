mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{DbErr, FromQueryResult};
use thiserror::Error;

use crate::entity::node;
use crate::models::drawing::DrawingFile;

pub use postgres::SeaOrmNodeRepository;

/// A node as read from the repository, with its drawing list decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    pub name: String,
    pub pdf_url: String,
    pub drawing_files: Vec<DrawingFile>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The columns drawing sync reads. `drawing_files` is never decoded here.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct NodeRef {
    pub id: String,
    pub pdf_url: String,
}

/// Fields supplied when creating a node. The drawing list always starts empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNode {
    pub id: String,
    pub name: String,
    pub pdf_url: String,
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Db(#[from] DbErr),

    #[error("Node '{id}' has malformed drawing_files: {source}")]
    Decode {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode drawing_files: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Node '{0}' does not exist")]
    Missing(String),

    #[error("Node '{0}' already exists")]
    Conflict(String),
}

/// Relational storage for nodes.
#[async_trait]
pub trait NodeRepository: Send + Sync {
    /// Point lookup. `Ok(None)` when no row has this ID.
    async fn get(&self, id: &str) -> Result<Option<Node>, RepositoryError>;

    /// Every node, in a stable enumeration order.
    async fn list_all(&self) -> Result<Vec<Node>, RepositoryError>;

    /// Point lookup of the sync columns only.
    async fn get_ref(&self, id: &str) -> Result<Option<NodeRef>, RepositoryError>;

    /// Sync columns of every node, in the same order as [`list_all`](Self::list_all).
    async fn list_refs(&self) -> Result<Vec<NodeRef>, RepositoryError>;

    async fn create(&self, node: NewNode) -> Result<Node, RepositoryError>;

    /// Replace the node's drawing list wholesale.
    ///
    /// Fails with [`RepositoryError::Missing`] if the row no longer exists.
    async fn set_drawing_files(&self, id: &str, files: &[DrawingFile])
    -> Result<(), RepositoryError>;

    /// Delete the row. Deleting an already-absent row succeeds.
    async fn delete(&self, id: &str) -> Result<(), RepositoryError>;
}

impl TryFrom<node::Model> for Node {
    type Error = RepositoryError;

    fn try_from(model: node::Model) -> Result<Self, Self::Error> {
        let drawing_files = match model.drawing_files {
            serde_json::Value::Null => Vec::new(),
            value => serde_json::from_value(value).map_err(|source| RepositoryError::Decode {
                id: model.id.clone(),
                source,
            })?,
        };
        Ok(Self {
            id: model.id,
            name: model.name,
            pdf_url: model.pdf_url,
            drawing_files,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
