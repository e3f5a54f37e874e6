use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Select, Set, SqlErr,
};

use super::{NewNode, Node, NodeRef, NodeRepository, RepositoryError};
use crate::entity::node;
use crate::models::drawing::DrawingFile;

/// [`NodeRepository`] over the `node` table.
#[derive(Clone)]
pub struct SeaOrmNodeRepository {
    db: DatabaseConnection,
}

impl SeaOrmNodeRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn select_refs() -> Select<node::Entity> {
        node::Entity::find()
            .select_only()
            .column(node::Column::Id)
            .column(node::Column::PdfUrl)
    }
}

#[async_trait]
impl NodeRepository for SeaOrmNodeRepository {
    async fn get(&self, id: &str) -> Result<Option<Node>, RepositoryError> {
        node::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await?
            .map(Node::try_from)
            .transpose()
    }

    async fn list_all(&self) -> Result<Vec<Node>, RepositoryError> {
        node::Entity::find()
            .order_by_asc(node::Column::CreatedAt)
            .order_by_asc(node::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Node::try_from)
            .collect()
    }

    async fn get_ref(&self, id: &str) -> Result<Option<NodeRef>, RepositoryError> {
        let node_ref = Self::select_refs()
            .filter(node::Column::Id.eq(id))
            .into_model::<NodeRef>()
            .one(&self.db)
            .await?;
        Ok(node_ref)
    }

    async fn list_refs(&self) -> Result<Vec<NodeRef>, RepositoryError> {
        let refs = Self::select_refs()
            .order_by_asc(node::Column::CreatedAt)
            .order_by_asc(node::Column::Id)
            .into_model::<NodeRef>()
            .all(&self.db)
            .await?;
        Ok(refs)
    }

    async fn create(&self, new: NewNode) -> Result<Node, RepositoryError> {
        let now = Utc::now();
        let model = node::ActiveModel {
            id: Set(new.id.clone()),
            name: Set(new.name),
            pdf_url: Set(new.pdf_url),
            drawing_files: Set(serde_json::json!([])),
            created_at: Set(now),
            updated_at: Set(now),
        };

        match model.insert(&self.db).await {
            Ok(inserted) => Node::try_from(inserted),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(RepositoryError::Conflict(new.id))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn set_drawing_files(
        &self,
        id: &str,
        files: &[DrawingFile],
    ) -> Result<(), RepositoryError> {
        let value = serde_json::to_value(files).map_err(RepositoryError::Encode)?;
        let result = node::Entity::update_many()
            .col_expr(node::Column::DrawingFiles, Expr::value(value))
            .col_expr(node::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(node::Column::Id.eq(id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::Missing(id.to_string()));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        node::Entity::delete_by_id(id.to_string())
            .exec(&self.db)
            .await?;
        Ok(())
    }
}
