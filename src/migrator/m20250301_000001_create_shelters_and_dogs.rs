use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create Operators Table
        manager
            .create_table(
                Table::create()
                    .table(Operators::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Operators::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Operators::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Operators::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Operators::CreatedAt).date_time().not_null())
                    .to_owned(),
            )
            .await?;

        // Create Shelters Table
        manager
            .create_table(
                Table::create()
                    .table(Shelters::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Shelters::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Shelters::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Shelters::Address).string_len(200).not_null())
                    .col(ColumnDef::new(Shelters::City).string_len(100).not_null())
                    .col(ColumnDef::new(Shelters::Phone).string_len(20).not_null())
                    .col(ColumnDef::new(Shelters::Email).string().not_null())
                    .col(ColumnDef::new(Shelters::MaxCapacity).integer().not_null())
                    .to_owned(),
            )
            .await?;

        // Create Dogs Table
        manager
            .create_table(
                Table::create()
                    .table(Dogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Dogs::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Dogs::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Dogs::Breed).string_len(100).not_null())
                    .col(ColumnDef::new(Dogs::BirthDate).date())
                    .col(ColumnDef::new(Dogs::IntakeDate).date().not_null())
                    .col(ColumnDef::new(Dogs::Sex).string_len(1).not_null())
                    .col(ColumnDef::new(Dogs::Size).string_len(20))
                    .col(ColumnDef::new(Dogs::Weight).double())
                    .col(ColumnDef::new(Dogs::Microchip).string_len(15).unique_key())
                    .col(
                        ColumnDef::new(Dogs::Sterilized)
                            .boolean()
                            .default(false)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Dogs::GoodWithChildren)
                            .boolean()
                            .default(true)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Dogs::GoodWithAnimals)
                            .boolean()
                            .default(true)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Dogs::Description).text().not_null())
                    .col(
                        ColumnDef::new(Dogs::Status)
                            .string_len(20)
                            .default("available")
                            .not_null(),
                    )
                    .col(ColumnDef::new(Dogs::ShelterId).integer().not_null())
                    .col(ColumnDef::new(Dogs::Photo).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-dog-shelter_id")
                            .from(Dogs::Table, Dogs::ShelterId)
                            .to(Shelters::Table, Shelters::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_dogs_status_intake_date")
                    .table(Dogs::Table)
                    .col(Dogs::Status)
                    .col(Dogs::IntakeDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Dogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Shelters::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Operators::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Operators {
    Table,
    Id,
    Username,
    PasswordHash,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Shelters {
    Table,
    Id,
    Name,
    Address,
    City,
    Phone,
    Email,
    MaxCapacity,
}

#[derive(DeriveIden)]
enum Dogs {
    Table,
    Id,
    Name,
    Breed,
    BirthDate,
    IntakeDate,
    Sex,
    Size,
    Weight,
    Microchip,
    Sterilized,
    GoodWithChildren,
    GoodWithAnimals,
    Description,
    Status,
    ShelterId,
    Photo,
}
