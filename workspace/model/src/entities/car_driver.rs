use super::{car, driver};
use sea_orm::entity::prelude::*;

/// Join table assigning drivers to cars.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "cars_drivers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub car_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub driver_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "car::Entity",
        from = "Column::CarId",
        to = "car::Column::Id",
        on_delete = "Cascade"
    )]
    Car,
    #[sea_orm(
        belongs_to = "driver::Entity",
        from = "Column::DriverId",
        to = "driver::Column::AccountId",
        on_delete = "Cascade"
    )]
    Driver,
}

impl Related<car::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Car.def()
    }
}

impl Related<driver::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Driver.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
