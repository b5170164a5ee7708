use sea_orm::entity::prelude::*;

/// Driver-specific attributes stored next to an account.
/// The primary key is the account id, so a driver's id is its account's id.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "drivers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub account_id: i32,
    pub license_number: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::AccountId",
        to = "super::account::Column::Id",
        on_delete = "Cascade"
    )]
    Account,
    #[sea_orm(has_many = "super::car_driver::Entity")]
    CarDriver,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl Related<super::car::Entity> for Entity {
    fn to() -> RelationDef {
        super::car_driver::Relation::Car.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::car_driver::Relation::Driver.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
