use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, Iterable, PaginatorTrait, QueryFilter};

use crate::entities::{
    dog::{self, DogStatus},
    Dog,
};

/// Seeds the dog gauges from the database at startup.
pub async fn init_metrics<C: ConnectionTrait>(db: &C) {
    refresh_dog_gauges(db).await;
    tracing::info!("Initialized dog gauges");
}

/// Recomputes `shelter_dogs_total` and the per-status breakdown.
///
/// Called after every write that adds, removes or re-statuses dogs. Counting
/// failures are logged and leave the previous values in place.
pub async fn refresh_dog_gauges<C: ConnectionTrait>(db: &C) {
    match Dog::find().count(db).await {
        Ok(total) => metrics::gauge!("shelter_dogs_total").set(total as f64),
        Err(e) => {
            tracing::warn!("Failed to count dogs: {}", e);
            return;
        }
    }

    for status in DogStatus::iter() {
        let count = Dog::find()
            .filter(dog::Column::Status.eq(status))
            .count(db)
            .await
            .unwrap_or(0);
        let label: &'static str = match status {
            DogStatus::Available => "available",
            DogStatus::InAdoption => "in_adoption",
            DogStatus::Adopted => "adopted",
            DogStatus::InCare => "in_care",
            DogStatus::NotAdoptable => "not_adoptable",
        };
        metrics::gauge!("shelter_dogs_by_status", "status" => label).set(count as f64);
    }
}

pub fn increment_adoption_requests() {
    metrics::counter!("shelter_adoption_requests_submitted_total").increment(1);
}

pub fn increment_adoptions_completed() {
    metrics::counter!("shelter_adoptions_completed_total").increment(1);
}

pub fn record_import(imported: usize, skipped: usize) {
    metrics::counter!("shelter_import_rows_total", "outcome" => "imported").increment(imported as u64);
    metrics::counter!("shelter_import_rows_total", "outcome" => "skipped").increment(skipped as u64);
}
