use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A manufacturing node (sub-assembly) and its cached drawing list.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "node")]
pub struct Model {
    /// Opaque identifier, also the batch reconciliation storage prefix.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub name: String,

    /// Object key of the node's primary PDF. Single-node extraction scans under it.
    #[sea_orm(column_type = "Text")]
    pub pdf_url: String,

    /// Derived from the object store: [{filename, path}]. Always written whole.
    #[sea_orm(column_type = "JsonBinary")]
    pub drawing_files: Json,

    pub created_at: DateTimeUtc,

    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
