use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CasbinRules::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CasbinRules::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CasbinRules::Ptype).string_len(100).not_null())
                    .col(ColumnDef::new(CasbinRules::V0).string_len(100))
                    .col(ColumnDef::new(CasbinRules::V1).string_len(100))
                    .col(ColumnDef::new(CasbinRules::V2).string_len(100))
                    .col(ColumnDef::new(CasbinRules::V3).string_len(100))
                    .col(ColumnDef::new(CasbinRules::V4).string_len(100))
                    .col(ColumnDef::new(CasbinRules::V5).string_len(100))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CasbinRules::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CasbinRules {
    Table,
    Id,
    Ptype,
    V0,
    V1,
    V2,
    V3,
    V4,
    V5,
}
