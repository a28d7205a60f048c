//! Initial database migration.
//!
//! Creates the users, inventory and transactions tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Username).string().not_null().primary_key())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::Role).string_len(16).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Inventory::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Inventory::Item).string().not_null().primary_key())
                    .col(ColumnDef::new(Inventory::Category).string_len(32).not_null())
                    .col(ColumnDef::new(Inventory::Type).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Inventory::Quantity)
                            .big_integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(Inventory::Quantity).gte(0)),
                    )
                    .col(
                        ColumnDef::new(Inventory::CostPrice)
                            .decimal_len(12, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Inventory::SellPrice)
                            .decimal_len(12, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Inventory::LowStockLimit)
                            .integer()
                            .not_null()
                            .default(10),
                    )
                    .to_owned(),
            )
            .await?;

        // item and username are plain text: no foreign keys, no cascades
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::Item).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::Quantity)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(Transactions::Quantity).gt(0)),
                    )
                    .col(ColumnDef::new(Transactions::Total).decimal_len(14, 2).not_null())
                    .col(ColumnDef::new(Transactions::Cost).decimal_len(14, 2).not_null())
                    .col(ColumnDef::new(Transactions::Username).string().not_null())
                    .col(ColumnDef::new(Transactions::Action).string_len(8).not_null())
                    .col(
                        ColumnDef::new(Transactions::RecordedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_transactions_username")
                    .table(Transactions::Table)
                    .col(Transactions::Username)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_transactions_recorded_at")
                    .table(Transactions::Table)
                    .col(Transactions::RecordedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Transactions::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Inventory::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Username,
    PasswordHash,
    Role,
}

#[derive(DeriveIden)]
enum Inventory {
    Table,
    Item,
    Category,
    Type,
    Quantity,
    CostPrice,
    SellPrice,
    LowStockLimit,
}

#[derive(DeriveIden)]
enum Transactions {
    Table,
    Id,
    Item,
    Quantity,
    Total,
    Cost,
    Username,
    Action,
    RecordedAt,
}
