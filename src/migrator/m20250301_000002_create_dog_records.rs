use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(HealthRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(HealthRecords::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(HealthRecords::DogId).integer().not_null())
                    .col(ColumnDef::new(HealthRecords::Date).date().not_null())
                    .col(
                        ColumnDef::new(HealthRecords::InterventionType)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(ColumnDef::new(HealthRecords::Description).text().not_null())
                    .col(
                        ColumnDef::new(HealthRecords::Veterinarian)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(HealthRecords::PrescribedMedications)
                            .text()
                            .not_null(),
                    )
                    .col(ColumnDef::new(HealthRecords::NextCheckup).date())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-health_record-dog_id")
                            .from(HealthRecords::Table, HealthRecords::DogId)
                            .to(Dogs::Table, Dogs::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AdoptionRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AdoptionRequests::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AdoptionRequests::TrackingCode)
                            .string_len(10)
                            .unique_key(),
                    )
                    .col(ColumnDef::new(AdoptionRequests::DogId).integer().not_null())
                    .col(
                        ColumnDef::new(AdoptionRequests::AdopterFirstName)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AdoptionRequests::AdopterLastName)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(ColumnDef::new(AdoptionRequests::AdopterEmail).string().not_null())
                    .col(
                        ColumnDef::new(AdoptionRequests::AdopterPhone)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AdoptionRequests::AdopterAddress)
                            .string_len(200)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AdoptionRequests::HousingType)
                            .string_len(20)
                            .default("apartment")
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AdoptionRequests::Experience)
                            .string_len(20)
                            .default("none")
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AdoptionRequests::HasChildren)
                            .boolean()
                            .default(false)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AdoptionRequests::HasOtherAnimals)
                            .boolean()
                            .default(false)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AdoptionRequests::OtherAnimalsDescription)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AdoptionRequests::EmailUpdates)
                            .boolean()
                            .default(false)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AdoptionRequests::SmsUpdates)
                            .boolean()
                            .default(false)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AdoptionRequests::TermsAccepted)
                            .boolean()
                            .default(false)
                            .not_null(),
                    )
                    .col(ColumnDef::new(AdoptionRequests::RequestDate).date().not_null())
                    .col(ColumnDef::new(AdoptionRequests::CompletionDate).date())
                    .col(
                        ColumnDef::new(AdoptionRequests::Status)
                            .string_len(20)
                            .default("requested")
                            .not_null(),
                    )
                    .col(ColumnDef::new(AdoptionRequests::Notes).text().not_null())
                    .col(ColumnDef::new(AdoptionRequests::OperatorId).integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-adoption_request-dog_id")
                            .from(AdoptionRequests::Table, AdoptionRequests::DogId)
                            .to(Dogs::Table, Dogs::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-adoption_request-operator_id")
                            .from(AdoptionRequests::Table, AdoptionRequests::OperatorId)
                            .to(Operators::Table, Operators::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Activities::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Activities::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Activities::DogId).integer().not_null())
                    .col(ColumnDef::new(Activities::Kind).string_len(20).not_null())
                    .col(ColumnDef::new(Activities::Date).date().not_null())
                    .col(ColumnDef::new(Activities::StartTime).time().not_null())
                    .col(ColumnDef::new(Activities::EndTime).time())
                    .col(ColumnDef::new(Activities::OperatorId).integer().not_null())
                    .col(ColumnDef::new(Activities::Note).text().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-activity-dog_id")
                            .from(Activities::Table, Activities::DogId)
                            .to(Dogs::Table, Dogs::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-activity-operator_id")
                            .from(Activities::Table, Activities::OperatorId)
                            .to(Operators::Table, Operators::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create indexes
        manager
            .create_index(
                Index::create()
                    .name("idx_health_records_dog_id")
                    .table(HealthRecords::Table)
                    .col(HealthRecords::DogId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_adoption_requests_status")
                    .table(AdoptionRequests::Table)
                    .col(AdoptionRequests::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_activities_date")
                    .table(Activities::Table)
                    .col(Activities::Date)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Activities::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AdoptionRequests::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(HealthRecords::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum HealthRecords {
    Table,
    Id,
    DogId,
    Date,
    InterventionType,
    Description,
    Veterinarian,
    PrescribedMedications,
    NextCheckup,
}

#[derive(DeriveIden)]
enum AdoptionRequests {
    Table,
    Id,
    TrackingCode,
    DogId,
    AdopterFirstName,
    AdopterLastName,
    AdopterEmail,
    AdopterPhone,
    AdopterAddress,
    HousingType,
    Experience,
    HasChildren,
    HasOtherAnimals,
    OtherAnimalsDescription,
    EmailUpdates,
    SmsUpdates,
    TermsAccepted,
    RequestDate,
    CompletionDate,
    Status,
    Notes,
    OperatorId,
}

#[derive(DeriveIden)]
enum Activities {
    Table,
    Id,
    DogId,
    Kind,
    Date,
    StartTime,
    EndTime,
    OperatorId,
    Note,
}

#[derive(DeriveIden)]
enum Dogs {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Operators {
    Table,
    Id,
}
