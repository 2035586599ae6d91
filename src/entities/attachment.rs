//! Attachment metadata entity. Files live elsewhere; only the name and
//! location are stored, keyed by the promotion code (cover or regular).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Attachment metadata database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pwp_attachments")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Code of the promotion the file belongs to
    pub pwp_code: String,
    /// Original file name
    pub file_name: String,
    /// Where the file can be fetched from
    pub url: String,
    /// Operator who attached the file
    pub uploaded_by: String,
    /// When the file was attached
    pub uploaded_at: DateTime,
}

/// `Attachment` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
