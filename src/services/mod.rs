pub mod adoption;
pub mod catalog;
pub mod csv_import;
pub mod demo;
pub mod dogs;
pub mod pagination;
pub mod tracking;

/// The calendar date used for intake dates, request dates and age filters.
pub fn today() -> chrono::NaiveDate {
    chrono::Utc::now().date_naive()
}
