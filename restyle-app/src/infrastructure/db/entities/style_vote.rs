use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "style_votes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub filter_name: String,
    pub thumbs_up: i32,
    pub thumbs_down: i32,
    pub total_votes: i32,
    pub last_modified: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
