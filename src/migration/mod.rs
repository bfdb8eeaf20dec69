use sea_orm_migration::prelude::*;

mod m20240101_000001_create_users_table;
mod m20240101_000002_create_relationship_tables;
mod m20240101_000003_create_messages_table;
mod m20240101_000004_create_content_tables;
mod m20240101_000005_create_notifications_table;
mod m20240101_000006_create_moderation_tables;
mod m20240101_000007_create_clients_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users_table::Migration),
            Box::new(m20240101_000002_create_relationship_tables::Migration),
            Box::new(m20240101_000003_create_messages_table::Migration),
            Box::new(m20240101_000004_create_content_tables::Migration),
            Box::new(m20240101_000005_create_notifications_table::Migration),
            Box::new(m20240101_000006_create_moderation_tables::Migration),
            Box::new(m20240101_000007_create_clients_tables::Migration),
        ]
    }
}
