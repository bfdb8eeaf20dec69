use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum UserReports {
    Table,
    Id,
    UserId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum PostReports {
    Table,
    Id,
    PostId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum OfferReports {
    Table,
    Id,
    OfferId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ChatReports {
    Table,
    Id,
    ChatUserId,
    ReporterId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ReportReporters {
    Table,
    ReportKind,
    ReportId,
    UserId,
}

#[derive(DeriveIden)]
enum BusinessRequests {
    Table,
    Id,
    UserId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum StaffRequests {
    Table,
    Id,
    UserId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Posts {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Offers {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserReports::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserReports::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UserReports::UserId)
                            .integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(UserReports::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_reports_user_id")
                            .from(UserReports::Table, UserReports::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PostReports::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PostReports::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PostReports::PostId)
                            .integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(PostReports::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_reports_post_id")
                            .from(PostReports::Table, PostReports::PostId)
                            .to(Posts::Table, Posts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OfferReports::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OfferReports::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(OfferReports::OfferId)
                            .integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(OfferReports::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_offer_reports_offer_id")
                            .from(OfferReports::Table, OfferReports::OfferId)
                            .to(Offers::Table, Offers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ChatReports::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ChatReports::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ChatReports::ChatUserId).integer().not_null())
                    .col(ColumnDef::new(ChatReports::ReporterId).integer().not_null())
                    .col(
                        ColumnDef::new(ChatReports::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_chat_reports_chat_user_id")
                            .from(ChatReports::Table, ChatReports::ChatUserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_chat_reports_reporter_id")
                            .from(ChatReports::Table, ChatReports::ReporterId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_chat_reports_pair")
                    .table(ChatReports::Table)
                    .col(ChatReports::ChatUserId)
                    .col(ChatReports::ReporterId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ReportReporters::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ReportReporters::ReportKind)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ReportReporters::ReportId).integer().not_null())
                    .col(ColumnDef::new(ReportReporters::UserId).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(ReportReporters::ReportKind)
                            .col(ReportReporters::ReportId)
                            .col(ReportReporters::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_report_reporters_user_id")
                            .from(ReportReporters::Table, ReportReporters::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BusinessRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BusinessRequests::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BusinessRequests::UserId)
                            .integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(BusinessRequests::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_business_requests_user_id")
                            .from(BusinessRequests::Table, BusinessRequests::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(StaffRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StaffRequests::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(StaffRequests::UserId)
                            .integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(StaffRequests::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_staff_requests_user_id")
                            .from(StaffRequests::Table, StaffRequests::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(StaffRequests::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BusinessRequests::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ReportReporters::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ChatReports::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OfferReports::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PostReports::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserReports::Table).to_owned())
            .await
    }
}
