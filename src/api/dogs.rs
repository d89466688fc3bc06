use axum::{
    extract::{Extension, Path, Query},
    response::{Html, IntoResponse, Redirect, Response},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, QueryOrder};
use serde_json::{json, Value};

use super::session::{Level, Session};
use crate::entities::{
    dog::{self, DogSize, DogStatus, Sex},
    health_record, shelter, Dog, Shelter,
};
use crate::error::{AppError, AppResult};
use crate::services::{
    catalog::{self, CatalogFilter},
    demo,
    pagination::{self, CATALOG_PAGE_SIZE},
    today,
};
use crate::views::{self, Templates};

/// Shelter id to name, for labelling dog cards without a join per row.
pub(crate) async fn shelter_names(
    db: &DatabaseConnection,
) -> Result<Vec<shelter::Model>, sea_orm::DbErr> {
    Shelter::find().order_by_asc(shelter::Column::Name).all(db).await
}

pub(crate) fn shelter_name(shelters: &[shelter::Model], id: i32) -> Option<&str> {
    shelters
        .iter()
        .find(|s| s.id == id)
        .map(|s| s.name.as_str())
}

pub async fn list(
    Extension(db): Extension<DatabaseConnection>,
    Extension(templates): Extension<Templates>,
    mut session: Session,
    Query(filter): Query<CatalogFilter>,
) -> AppResult<Html<String>> {
    let today = today();
    let shelters = shelter_names(&db).await?;
    let available = Dog::find()
        .filter(dog::Column::Status.eq(DogStatus::Available))
        .order_by_asc(dog::Column::Name)
        .all(&db)
        .await?;
    let page = pagination::fetch_page(
        &db,
        filter.query(today),
        CATALOG_PAGE_SIZE,
        pagination::page_number(&filter.page),
    )
    .await?
    .map(|d| views::dog_json(&d, shelter_name(&shelters, d.shelter_id), today));

    tracing::Span::current()
        .record("table", "dogs")
        .record("action", "list_catalog");

    let context = json!({
        "filter": filter,
        "query": pagination::query_without_page(&filter),
        "page": page,
        "shelters": shelter_options(&shelters, &filter.shelter),
        "dogs": dog_options(&available, &filter.dog),
        "sizes": views::choices::<DogSize>(&filter.size),
        "sexes": views::choices::<Sex>(&filter.sex),
        "sort_options": sort_options(&filter.sort),
    });
    templates.page("dog_list", &mut session, context)
}

pub async fn detail(
    Extension(db): Extension<DatabaseConnection>,
    Extension(templates): Extension<Templates>,
    mut session: Session,
    Path(dog_id): Path<i32>,
) -> AppResult<Response> {
    let dog = Dog::find_by_id(dog_id)
        .one(&db)
        .await?
        .ok_or(AppError::NotFound("Dog"))?;

    tracing::Span::current()
        .record("table", "dogs")
        .record("action", "view_dog")
        .record("dog_id", dog.id);

    if dog.status != DogStatus::Available && !session.is_staff() {
        session.flash(
            Level::Warning,
            "This dog is not currently available for adoption.",
        );
        return Ok(Redirect::to("/dogs").into_response());
    }

    let shelter = dog.find_related(Shelter).one(&db).await?;
    let health_records = if session.is_staff() {
        dog.find_related(health_record::Entity)
            .order_by_desc(health_record::Column::Date)
            .order_by_desc(health_record::Column::Id)
            .all(&db)
            .await?
    } else {
        Vec::new()
    };

    let context = json!({
        "dog": views::dog_json(&dog, shelter.as_ref().map(|s| s.name.as_str()), today()),
        "shelter": shelter,
        "health_records": health_records,
    });
    Ok(templates
        .page("dog_detail", &mut session, context)?
        .into_response())
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct PhotoQuery {
    page: String,
}

/// Photo gallery. When the shelter has no dogs at all the demo dogs are shown instead.
pub async fn photos(
    Extension(db): Extension<DatabaseConnection>,
    Extension(templates): Extension<Templates>,
    mut session: Session,
    Query(query): Query<PhotoQuery>,
) -> AppResult<Html<String>> {
    let today = today();
    let shelters = shelter_names(&db).await?;
    let gallery = catalog::photo_gallery(&db).await?;
    let page = pagination::fetch_page(
        &db,
        gallery,
        CATALOG_PAGE_SIZE,
        pagination::page_number(&query.page),
    )
    .await?
    .map(|d| views::dog_json(&d, shelter_name(&shelters, d.shelter_id), today));

    let demo_dogs = if page.total == 0 { demo::all() } else { Vec::new() };
    let context = json!({
        "page": page,
        "query": "",
        "demo_dogs": demo_dogs,
    });
    templates.page("photos", &mut session, context)
}

pub(crate) fn shelter_options(shelters: &[shelter::Model], selected: &str) -> Value {
    shelters
        .iter()
        .map(|s| {
            json!({
                "value": s.id,
                "label": s.name,
                "selected": s.id.to_string() == selected.trim(),
            })
        })
        .collect()
}

fn dog_options(dogs: &[dog::Model], selected: &str) -> Value {
    dogs.iter()
        .map(|d| {
            json!({
                "value": d.id,
                "label": d.name,
                "selected": d.id.to_string() == selected.trim(),
            })
        })
        .collect()
}

pub(crate) fn sort_options(selected: &str) -> Value {
    const KEYS: &[(&str, &str)] = &[
        ("-intake_date", "Newest arrivals"),
        ("intake_date", "Oldest arrivals"),
        ("name", "Name A-Z"),
        ("-name", "Name Z-A"),
        ("breed", "Breed"),
        ("-birth_date", "Youngest first"),
        ("birth_date", "Oldest first"),
        ("weight", "Lightest first"),
        ("-weight", "Heaviest first"),
    ];
    KEYS.iter()
        .map(|(value, label)| json!({"value": value, "label": label, "selected": *value == selected}))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shelter_options_select_by_id() {
        let shelters = vec![shelter::Model {
            id: 3,
            name: "North".into(),
            address: String::new(),
            city: String::new(),
            phone: String::new(),
            email: String::new(),
            max_capacity: 10,
        }];
        let options = shelter_options(&shelters, " 3 ");
        assert_eq!(options[0]["selected"], json!(true));
        assert_eq!(shelter_name(&shelters, 3), Some("North"));
        assert_eq!(shelter_name(&shelters, 4), None);
    }

    #[test]
    fn sort_options_mark_the_active_key() {
        let options = sort_options("-weight");
        let selected: Vec<_> = options
            .as_array()
            .unwrap()
            .iter()
            .filter(|o| o["selected"] == json!(true))
            .collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0]["value"], json!("-weight"));
    }
}
