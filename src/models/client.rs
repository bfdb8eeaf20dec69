use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// An institution whose mail domain is allowed to register personal accounts.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "clients")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub domain: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::client_ban::Entity")]
    ClientBan,
}

impl Related<super::client_ban::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClientBan.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
