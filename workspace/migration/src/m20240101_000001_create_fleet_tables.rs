use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create manufacturers table
        manager
            .create_table(
                Table::create()
                    .table(Manufacturers::Table)
                    .if_not_exists()
                    .col(pk_auto(Manufacturers::Id))
                    .col(string(Manufacturers::Name))
                    .col(string(Manufacturers::Country))
                    .to_owned(),
            )
            .await?;

        // Create cars table
        manager
            .create_table(
                Table::create()
                    .table(Cars::Table)
                    .if_not_exists()
                    .col(pk_auto(Cars::Id))
                    .col(string(Cars::Model))
                    .col(integer(Cars::ManufacturerId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_car_manufacturer")
                            .from(Cars::Table, Cars::ManufacturerId)
                            .to(Manufacturers::Table, Manufacturers::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create accounts table
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(pk_auto(Accounts::Id))
                    .col(string_len(Accounts::Username, 150).unique_key())
                    .col(string(Accounts::Password))
                    .col(string(Accounts::FirstName).default(""))
                    .col(string(Accounts::LastName).default(""))
                    .col(string(Accounts::Email).default(""))
                    .col(boolean(Accounts::IsStaff).default(false))
                    .col(boolean(Accounts::IsSuperuser).default(false))
                    .col(boolean(Accounts::IsActive).default(true))
                    .col(timestamp_with_time_zone(Accounts::DateJoined))
                    .to_owned(),
            )
            .await?;

        // Create drivers table (one-to-one extension of accounts)
        manager
            .create_table(
                Table::create()
                    .table(Drivers::Table)
                    .if_not_exists()
                    .col(integer(Drivers::AccountId).primary_key())
                    .col(string(Drivers::LicenseNumber).default(""))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_driver_account")
                            .from(Drivers::Table, Drivers::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create cars_drivers table (join table)
        manager
            .create_table(
                Table::create()
                    .table(CarsDrivers::Table)
                    .if_not_exists()
                    .col(integer(CarsDrivers::CarId))
                    .col(integer(CarsDrivers::DriverId))
                    .primary_key(
                        Index::create()
                            .name("pk_cars_drivers")
                            .col(CarsDrivers::CarId)
                            .col(CarsDrivers::DriverId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cars_drivers_car")
                            .from(CarsDrivers::Table, CarsDrivers::CarId)
                            .to(Cars::Table, Cars::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cars_drivers_driver")
                            .from(CarsDrivers::Table, CarsDrivers::DriverId)
                            .to(Drivers::Table, Drivers::AccountId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CarsDrivers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Drivers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Cars::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Manufacturers::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Manufacturers {
    Table,
    Id,
    Name,
    Country,
}

#[derive(DeriveIden)]
enum Cars {
    Table,
    Id,
    Model,
    ManufacturerId,
}

#[derive(DeriveIden)]
enum Accounts {
    Table,
    Id,
    Username,
    Password,
    FirstName,
    LastName,
    Email,
    IsStaff,
    IsSuperuser,
    IsActive,
    DateJoined,
}

#[derive(DeriveIden)]
enum Drivers {
    Table,
    AccountId,
    LicenseNumber,
}

#[derive(DeriveIden)]
enum CarsDrivers {
    Table,
    CarId,
    DriverId,
}
