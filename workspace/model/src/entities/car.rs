use common::Searchable;
use sea_orm::entity::prelude::*;
use std::fmt;

/// A car in the fleet. Every car references exactly one manufacturer and
/// may be assigned to any number of drivers.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "cars")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub model: String,
    pub manufacturer_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::manufacturer::Entity",
        from = "Column::ManufacturerId",
        to = "super::manufacturer::Column::Id",
        on_delete = "Restrict"
    )]
    Manufacturer,
    /// Relation for the many-to-many assignment of drivers.
    #[sea_orm(has_many = "super::car_driver::Entity")]
    CarDriver,
}

impl Related<super::manufacturer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Manufacturer.def()
    }
}

impl Related<super::driver::Entity> for Entity {
    fn to() -> RelationDef {
        super::car_driver::Relation::Driver.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::car_driver::Relation::Car.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.model)
    }
}

impl Searchable for Model {
    const QUERY_PARAM: &'static str = "model";

    fn search_field(&self) -> &str {
        &self.model
    }
}
