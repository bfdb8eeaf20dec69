use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A reported conversation partner. One row per (reported user, reporter).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "chat_reports")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub chat_user_id: i32,
    pub reporter_id: i32,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ChatUserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    ChatUser,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ReporterId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Reporter,
}

impl ActiveModelBehavior for ActiveModel {}
