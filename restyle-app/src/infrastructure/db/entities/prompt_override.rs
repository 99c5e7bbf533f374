use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "prompt_overrides")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub filter_name: String,
    #[sea_orm(column_type = "Text")]
    pub original_prompt: String,
    #[sea_orm(column_type = "Text")]
    pub refined_prompt: String,
    #[sea_orm(column_type = "Text")]
    pub reason: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
