//! Bulk dog import from CSV uploads.
//!
//! Columns are positional: `name, breed, birth_date, sex, weight, microchip,
//! sterilized, shelter_id`. The first line is a header and is never read as
//! data. Every data row produces a [`RowOutcome`]; rows are committed one by
//! one, so a database failure part-way leaves earlier rows in place.

use std::fmt;

use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Set,
};
use serde::Serialize;

use crate::entities::{
    dog::{self, DogStatus, Sex},
    parse_choice, Dog, Shelter,
};

pub const REQUIRED_FIELDS: usize = 8;
const MAX_MICROCHIP_LEN: usize = 15;
const STERILIZED_TRUTHY: &[&str] = &["si", "sì", "yes", "true", "1"];

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("The file must be a CSV file.")]
    NotCsv,
    #[error("The file could not be read as UTF-8 text.")]
    NotText,
    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Database(#[from] DbErr),
}

/// Why a row did not become a dog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    TooFewFields { found: usize },
    InvalidField { field: &'static str, value: String },
    UnknownShelter { shelter_id: i32 },
    DuplicateMicrochip { microchip: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::TooFewFields { found } => {
                write!(f, "expected {REQUIRED_FIELDS} fields, found {found}")
            }
            SkipReason::InvalidField { field, value } => write!(f, "invalid {field} {value:?}"),
            SkipReason::UnknownShelter { shelter_id } => write!(f, "no shelter with id {shelter_id}"),
            SkipReason::DuplicateMicrochip { microchip } => {
                write!(f, "microchip {microchip} is already registered")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RowOutcome {
    Imported { dog_id: i32 },
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowResult {
    /// Line number in the uploaded file, header included.
    pub line: u64,
    pub outcome: RowOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
    pub rows: Vec<RowResult>,
}

impl ImportReport {
    fn push(&mut self, line: u64, outcome: RowOutcome) {
        match outcome {
            RowOutcome::Imported { .. } => self.imported += 1,
            RowOutcome::Skipped(_) => self.skipped += 1,
        }
        self.rows.push(RowResult { line, outcome });
    }
}

/// One data row with every field parsed. Blank optional fields are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct DogRow {
    pub name: String,
    pub breed: String,
    pub birth_date: Option<NaiveDate>,
    pub sex: Sex,
    pub weight: Option<f64>,
    pub microchip: Option<String>,
    pub sterilized: bool,
    pub shelter_id: i32,
}

impl DogRow {
    pub fn parse(record: &csv::StringRecord) -> Result<Self, SkipReason> {
        if record.len() < REQUIRED_FIELDS {
            return Err(SkipReason::TooFewFields {
                found: record.len(),
            });
        }
        let field = |i: usize| record.get(i).unwrap_or_default().trim();

        let birth_date = optional(field(2))
            .map(|raw| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| invalid("birth_date", raw))
            })
            .transpose()?;
        let sex = parse_choice::<Sex>(&field(3).to_uppercase()).ok_or_else(|| invalid("sex", field(3)))?;
        let weight = optional(field(4))
            .map(|raw| {
                raw.parse::<f64>()
                    .ok()
                    .filter(|w| w.is_finite() && *w >= 0.0)
                    .ok_or_else(|| invalid("weight", raw))
            })
            .transpose()?;
        let microchip = optional(field(5)).map(str::to_string);
        if let Some(chip) = &microchip {
            if chip.chars().count() > MAX_MICROCHIP_LEN {
                return Err(invalid("microchip", chip));
            }
        }
        let shelter_id = field(7)
            .parse::<i32>()
            .map_err(|_| invalid("shelter_id", field(7)))?;

        Ok(Self {
            name: field(0).to_string(),
            breed: field(1).to_string(),
            birth_date,
            sex,
            weight,
            microchip,
            sterilized: is_truthy(field(6)),
            shelter_id,
        })
    }

    fn into_active_model(self, today: NaiveDate) -> dog::ActiveModel {
        dog::ActiveModel {
            name: Set(self.name),
            breed: Set(self.breed),
            birth_date: Set(self.birth_date),
            intake_date: Set(today),
            sex: Set(self.sex),
            size: Set(None),
            weight: Set(self.weight),
            microchip: Set(self.microchip),
            sterilized: Set(self.sterilized),
            good_with_children: Set(true),
            good_with_animals: Set(true),
            description: Set(String::new()),
            status: Set(DogStatus::Available),
            shelter_id: Set(self.shelter_id),
            photo: Set(None),
            ..Default::default()
        }
    }
}

pub fn is_truthy(raw: &str) -> bool {
    let raw = raw.trim().to_lowercase();
    STERILIZED_TRUTHY.contains(&raw.as_str())
}

/// Uploads are accepted by file name only.
pub fn check_file_name(file_name: &str) -> Result<(), ImportError> {
    if file_name.ends_with(".csv") {
        Ok(())
    } else {
        Err(ImportError::NotCsv)
    }
}

pub fn decode(bytes: &[u8]) -> Result<&str, ImportError> {
    let text = std::str::from_utf8(bytes).map_err(|_| ImportError::NotText)?;
    Ok(text.strip_prefix('\u{feff}').unwrap_or(text))
}

pub async fn import_dogs<C: ConnectionTrait>(
    db: &C,
    text: &str,
    today: NaiveDate,
) -> Result<ImportReport, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut report = ImportReport::default();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(index as u64 + 2);
        let outcome = import_row(db, &record, today).await?;
        if let RowOutcome::Skipped(reason) = &outcome {
            tracing::debug!(line, %reason, "Skipping CSV row");
        }
        report.push(line, outcome);
    }

    crate::metrics::record_import(report.imported, report.skipped);

    Ok(report)
}

async fn import_row<C: ConnectionTrait>(
    db: &C,
    record: &csv::StringRecord,
    today: NaiveDate,
) -> Result<RowOutcome, DbErr> {
    let row = match DogRow::parse(record) {
        Ok(row) => row,
        Err(reason) => return Ok(RowOutcome::Skipped(reason)),
    };

    if Shelter::find_by_id(row.shelter_id).one(db).await?.is_none() {
        return Ok(RowOutcome::Skipped(SkipReason::UnknownShelter {
            shelter_id: row.shelter_id,
        }));
    }

    if let Some(chip) = &row.microchip {
        let taken = Dog::find()
            .filter(dog::Column::Microchip.eq(chip.as_str()))
            .count(db)
            .await?
            > 0;
        if taken {
            return Ok(RowOutcome::Skipped(SkipReason::DuplicateMicrochip {
                microchip: chip.clone(),
            }));
        }
    }

    let dog = row.into_active_model(today).insert(db).await?;
    Ok(RowOutcome::Imported { dog_id: dog.id })
}

fn optional(raw: &str) -> Option<&str> {
    (!raw.is_empty()).then_some(raw)
}

fn invalid(field: &'static str, value: &str) -> SkipReason {
    SkipReason::InvalidField {
        field,
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use sea_orm::{EntityTrait, QueryOrder};

    const HEADER: &str = "Nome,Razza,Data di nascita,Sesso,Peso,Microchip,Sterilizzato,ID Canile\n";

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn record(fields: &[&str]) -> csv::StringRecord {
        csv::StringRecord::from(fields.to_vec())
    }

    #[test]
    fn sterilized_flag_accepts_known_truthy_words() {
        for yes in ["Si", "sì", "SÌ", "yes", "TRUE", "1", " si "] {
            assert!(is_truthy(yes), "{yes:?} should be truthy");
        }
        for no in ["No", "0", "", "false", "y", "oui"] {
            assert!(!is_truthy(no), "{no:?} should be falsy");
        }
    }

    #[test]
    fn blank_optional_fields_become_none() {
        let row = DogRow::parse(&record(&["Fido", "Mixed", "", "m", "", "", "no", "4"])).unwrap();
        assert_eq!(row.birth_date, None);
        assert_eq!(row.weight, None);
        assert_eq!(row.microchip, None);
        assert_eq!(row.sex, Sex::Male);
        assert!(!row.sterilized);
        assert_eq!(row.shelter_id, 4);
    }

    #[test]
    fn short_and_malformed_rows_report_a_reason() {
        assert_eq!(
            DogRow::parse(&record(&["Fido", "Mixed", "2020-01-01"])),
            Err(SkipReason::TooFewFields { found: 3 })
        );
        assert_eq!(
            DogRow::parse(&record(&["Fido", "Mixed", "01/02/2020", "M", "", "", "", "1"])),
            Err(SkipReason::InvalidField {
                field: "birth_date",
                value: "01/02/2020".to_string()
            })
        );
        assert!(matches!(
            DogRow::parse(&record(&["Fido", "Mixed", "", "M", "", "", "", "one"])),
            Err(SkipReason::InvalidField { field: "shelter_id", .. })
        ));
        assert!(matches!(
            DogRow::parse(&record(&["Fido", "Mixed", "", "X", "", "", "", "1"])),
            Err(SkipReason::InvalidField { field: "sex", .. })
        ));
    }

    #[test]
    fn only_csv_names_and_utf8_bodies_are_accepted() {
        assert!(check_file_name("dogs.csv").is_ok());
        assert!(matches!(check_file_name("dogs.xlsx"), Err(ImportError::NotCsv)));
        assert!(matches!(decode(&[0xff, 0xfe, 0x00]), Err(ImportError::NotText)));
        assert_eq!(decode("\u{feff}a,b".as_bytes()).unwrap(), "a,b");
    }

    #[tokio::test]
    async fn imports_valid_rows_with_parsed_fields() {
        let db = testing::db().await;
        let shelter = testing::shelter(&db).await;
        let csv = format!(
            "{HEADER}Rex,Pastore Tedesco,2020-05-15,M,30.5,123456789012345,Si,{id}\n\
             Luna,Labrador,2019-10-20,F,25.2,987654321098765,No,{id}\n",
            id = shelter.id
        );

        let report = import_dogs(&db, &csv, today()).await.unwrap();

        assert_eq!(report.imported, 2);
        assert_eq!(report.skipped, 0);
        let dogs = Dog::find()
            .order_by_asc(dog::Column::Id)
            .all(&db)
            .await
            .unwrap();
        assert_eq!(dogs.len(), 2);

        let rex = &dogs[0];
        assert_eq!(rex.name, "Rex");
        assert_eq!(rex.breed, "Pastore Tedesco");
        assert_eq!(rex.birth_date, NaiveDate::from_ymd_opt(2020, 5, 15));
        assert_eq!(rex.sex, Sex::Male);
        assert_eq!(rex.weight, Some(30.5));
        assert_eq!(rex.microchip.as_deref(), Some("123456789012345"));
        assert!(rex.sterilized);
        assert_eq!(rex.status, DogStatus::Available);
        assert_eq!(rex.intake_date, today());

        let luna = &dogs[1];
        assert_eq!(luna.sex, Sex::Female);
        assert_eq!(luna.weight, Some(25.2));
        assert!(!luna.sterilized);
    }

    #[tokio::test]
    async fn skips_rows_and_keeps_going() {
        let db = testing::db().await;
        let shelter = testing::shelter(&db).await;
        let existing = testing::dog(&db, shelter.id, "Old").await;
        testing::set_microchip(&db, existing.id, "111111111111111").await;

        let csv = format!(
            "{HEADER}Short,Row\n\
             Ghost,Beagle,,M,,,no,{missing}\n\
             Twin,Beagle,,M,,111111111111111,no,{id}\n\
             Fresh,Beagle,,F,,222222222222222,no,{id}\n\
             Again,Beagle,,F,,222222222222222,no,{id}\n",
            id = shelter.id,
            missing = shelter.id + 100
        );

        let report = import_dogs(&db, &csv, today()).await.unwrap();

        assert_eq!(report.imported, 1);
        assert_eq!(report.skipped, 4);
        let outcomes: Vec<_> = report.rows.iter().map(|r| &r.outcome).collect();
        assert_eq!(
            outcomes[0],
            &RowOutcome::Skipped(SkipReason::TooFewFields { found: 2 })
        );
        assert_eq!(
            outcomes[1],
            &RowOutcome::Skipped(SkipReason::UnknownShelter {
                shelter_id: shelter.id + 100
            })
        );
        assert!(matches!(
            outcomes[2],
            RowOutcome::Skipped(SkipReason::DuplicateMicrochip { .. })
        ));
        assert!(matches!(outcomes[3], RowOutcome::Imported { .. }));
        assert!(matches!(
            outcomes[4],
            RowOutcome::Skipped(SkipReason::DuplicateMicrochip { .. })
        ));
        assert_eq!(report.rows[0].line, 2);
        assert_eq!(Dog::find().count(&db).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn header_only_file_imports_nothing() {
        let db = testing::db().await;
        let report = import_dogs(&db, HEADER, today()).await.unwrap();
        assert_eq!(report, ImportReport::default());
    }
}
