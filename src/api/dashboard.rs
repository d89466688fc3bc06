use axum::{extract::Extension, response::Html};
use chrono::Duration;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use serde_json::json;

use super::session::Session;
use crate::entities::{
    activity,
    adoption_request::{self, AdoptionStatus},
    dog::{self, DogStatus},
    health_record, operator, Activity, AdoptionRequest, Choice, Dog, HealthRecord, Operator,
};
use crate::error::AppResult;
use crate::services::today;
use crate::views::{self, Templates};

const CHECKUP_WINDOW_DAYS: i64 = 7;
const RECENT_ACTIVITY_DAYS: i64 = 7;
const LATEST_ADOPTIONS: u64 = 5;

pub async fn dashboard(
    Extension(db): Extension<DatabaseConnection>,
    Extension(templates): Extension<Templates>,
    mut session: Session,
) -> AppResult<Html<String>> {
    let today = today();

    let dogs_total = Dog::find().count(&db).await?;
    let dogs_available = Dog::find()
        .filter(dog::Column::Status.eq(DogStatus::Available))
        .count(&db)
        .await?;
    let adoptions_in_progress = AdoptionRequest::find()
        .filter(adoption_request::Column::Status.is_in([
            AdoptionStatus::Requested,
            AdoptionStatus::UnderReview,
            AdoptionStatus::Approved,
        ]))
        .count(&db)
        .await?;
    let adoptions_completed = AdoptionRequest::find()
        .filter(adoption_request::Column::Status.eq(AdoptionStatus::Completed))
        .count(&db)
        .await?;

    // Overdue checkups stay listed until someone records the visit.
    let checkups = HealthRecord::find()
        .find_also_related(Dog)
        .filter(health_record::Column::NextCheckup.is_not_null())
        .filter(
            health_record::Column::NextCheckup.lte(today + Duration::days(CHECKUP_WINDOW_DAYS)),
        )
        .order_by_asc(health_record::Column::NextCheckup)
        .all(&db)
        .await?;

    let latest_adoptions = AdoptionRequest::find()
        .find_also_related(Dog)
        .order_by_desc(adoption_request::Column::RequestDate)
        .order_by_desc(adoption_request::Column::Id)
        .limit(LATEST_ADOPTIONS)
        .all(&db)
        .await?;

    let activities = Activity::find()
        .find_also_related(Dog)
        .filter(activity::Column::Date.gte(today - Duration::days(RECENT_ACTIVITY_DAYS)))
        .order_by_desc(activity::Column::Date)
        .order_by_desc(activity::Column::StartTime)
        .all(&db)
        .await?;
    let operators = Operator::find().all(&db).await?;
    let operator_name = |id: i32| -> Option<String> {
        operators
            .iter()
            .find(|o: &&operator::Model| o.id == id)
            .map(|o| o.username.clone())
    };

    let context = json!({
        "dogs_total": dogs_total,
        "dogs_available": dogs_available,
        "adoptions_in_progress": adoptions_in_progress,
        "adoptions_completed": adoptions_completed,
        "checkups": checkups
            .iter()
            .map(|(record, dog)| json!({
                "record": record,
                "dog_id": record.dog_id,
                "dog_name": dog.as_ref().map(|d| d.name.as_str()),
                "overdue": record.next_checkup.is_some_and(|d| d < today),
            }))
            .collect::<Vec<_>>(),
        "latest_adoptions": latest_adoptions
            .iter()
            .map(|(request, dog)| views::adoption_json(request, dog.as_ref()))
            .collect::<Vec<_>>(),
        "activities": activities
            .iter()
            .map(|(entry, dog)| json!({
                "activity": entry,
                "kind_label": entry.kind.label(),
                "dog_name": dog.as_ref().map(|d| d.name.as_str()),
                "operator": operator_name(entry.operator_id),
            }))
            .collect::<Vec<_>>(),
    });
    templates.page("dashboard", &mut session, context)
}
