pub use sea_orm_migration::prelude::*;

pub mod entities;
mod m20260101_000001_platform_tables;
mod m20260101_000002_counter_tables;
mod m20260115_000001_broadcast_status_trigger;

pub use m20260115_000001_broadcast_status_trigger::TRIGGER_NAME;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260101_000001_platform_tables::Migration),
            Box::new(m20260101_000002_counter_tables::Migration),
            Box::new(m20260115_000001_broadcast_status_trigger::Migration),
        ]
    }
}
