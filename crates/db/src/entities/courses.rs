//! `SeaORM` Entity for courses table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::course_materials::Entity")]
    CourseMaterials,
}

impl Related<super::course_materials::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CourseMaterials.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
