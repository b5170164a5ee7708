use common::{ManufacturerDto, Searchable};
use sea_orm::entity::prelude::*;
use std::fmt;

/// A car manufacturer, e.g. "Toyota" based in "Japan".
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "manufacturers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub country: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Cars built by this manufacturer. Cars reference a manufacturer,
    /// they are not owned by it.
    #[sea_orm(has_many = "super::car::Entity")]
    Car,
}

impl Related<super::car::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Car.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.country)
    }
}

impl Searchable for Model {
    const QUERY_PARAM: &'static str = "name";

    fn search_field(&self) -> &str {
        &self.name
    }
}

impl From<Model> for ManufacturerDto {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            country: model.country,
        }
    }
}
