pub use sea_orm_migration::prelude::*;

pub mod entities;
mod m20250615_000001_initial_tables;
mod m20250620_000001_accounts;
mod m20250702_000001_access_analytics;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250615_000001_initial_tables::Migration),
            Box::new(m20250620_000001_accounts::Migration),
            Box::new(m20250702_000001_access_analytics::Migration),
        ]
    }
}
