use sea_orm_migration::prelude::*;

mod m20250301_000001_create_shelters_and_dogs;
mod m20250301_000002_create_dog_records;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_shelters_and_dogs::Migration),
            Box::new(m20250301_000002_create_dog_records::Migration),
        ]
    }
}
