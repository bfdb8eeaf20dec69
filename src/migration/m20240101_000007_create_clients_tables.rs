use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Clients {
    Table,
    Id,
    Name,
    Domain,
}

#[derive(DeriveIden)]
enum ClientBans {
    Table,
    Id,
    ClientId,
    Name,
    Mail,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Clients::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Clients::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Clients::Name).string_len(100).not_null())
                    .col(
                        ColumnDef::new(Clients::Domain)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ClientBans::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClientBans::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ClientBans::ClientId).integer().not_null())
                    .col(ColumnDef::new(ClientBans::Name).string_len(100).not_null())
                    .col(ColumnDef::new(ClientBans::Mail).string_len(255).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_client_bans_client_id")
                            .from(ClientBans::Table, ClientBans::ClientId)
                            .to(Clients::Table, Clients::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ClientBans::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Clients::Table).to_owned())
            .await
    }
}
