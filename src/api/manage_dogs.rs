use std::path::Path as FsPath;
use std::sync::Arc;

use axum::{
    extract::{Extension, Form, Multipart, Path, Query},
    response::{Html, Redirect},
};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde_json::json;

use super::dogs::{shelter_name, shelter_names, shelter_options, sort_options};
use super::session::{Level, Session};
use crate::config::Config;
use crate::entities::{
    dog::{DogSize, DogStatus, Sex},
    parse_choice, Choice, Dog,
};
use crate::error::{AppError, AppResult};
use crate::services::{
    catalog::ManageDogsFilter,
    csv_import::{self, ImportError},
    dogs::{self, DogForm, DogFormError, StatusChangeError},
    pagination::{self, STAFF_PAGE_SIZE},
    today,
};
use crate::views::{self, Templates};

const PHOTO_DIR: &str = "dogs";

pub async fn list(
    Extension(db): Extension<DatabaseConnection>,
    Extension(templates): Extension<Templates>,
    mut session: Session,
    Query(filter): Query<ManageDogsFilter>,
) -> AppResult<Html<String>> {
    let today = today();
    let shelters = shelter_names(&db).await?;
    let page = pagination::fetch_page(
        &db,
        filter.query(),
        STAFF_PAGE_SIZE,
        pagination::page_number(&filter.page),
    )
    .await?
    .map(|d| views::dog_json(&d, shelter_name(&shelters, d.shelter_id), today));

    let context = json!({
        "filter": filter,
        "query": pagination::query_without_page(&filter),
        "page": page,
        "shelters": shelter_options(&shelters, &filter.shelter),
        "statuses": views::choices::<DogStatus>(&filter.status),
        "sort_options": sort_options(&filter.sort),
        "new_dog": {
            "today": today.format("%Y-%m-%d").to_string(),
            "shelters": shelter_options(&shelters, ""),
            "sexes": views::choices::<Sex>(""),
            "sizes": views::choices::<DogSize>(""),
            "statuses": views::choices::<DogStatus>("available"),
        },
    });
    templates.page("manage_dogs", &mut session, context)
}

pub async fn create(
    Extension(db): Extension<DatabaseConnection>,
    mut session: Session,
    Form(form): Form<DogForm>,
) -> AppResult<Redirect> {
    match dogs::create(&db, form, today()).await {
        Ok(dog) => {
            tracing::Span::current()
                .record("table", "dogs")
                .record("action", "create_dog")
                .record("dog_id", dog.id)
                .record("business_event", "Dog created successfully");
            crate::metrics::refresh_dog_gauges(&db).await;
            session.flash(Level::Success, format!("{} has been added.", dog.name));
        }
        Err(DogFormError::Database(e)) => return Err(e.into()),
        Err(e) => {
            tracing::Span::current()
                .record("action", "create_dog_failed")
                .record("error", tracing::field::display(&e));
            session.flash(Level::Error, e.to_string());
        }
    }
    Ok(Redirect::to("/manage/dogs"))
}

pub async fn delete(
    Extension(db): Extension<DatabaseConnection>,
    Extension(config): Extension<Arc<Config>>,
    mut session: Session,
    Path(dog_id): Path<i32>,
) -> AppResult<Redirect> {
    let dog = Dog::find_by_id(dog_id)
        .one(&db)
        .await?
        .ok_or(AppError::NotFound("Dog"))?;
    dogs::delete(&db, dog.id).await?;

    if let Some(photo) = &dog.photo {
        remove_photo(&config.media_dir, photo).await;
    }

    tracing::Span::current()
        .record("table", "dogs")
        .record("action", "delete_dog")
        .record("dog_id", dog.id)
        .record("business_event", "Dog deleted");
    crate::metrics::refresh_dog_gauges(&db).await;

    session.flash(Level::Success, format!("{} has been deleted.", dog.name));
    Ok(Redirect::to("/manage/dogs"))
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct StatusForm {
    status: String,
}

pub async fn change_status(
    Extension(db): Extension<DatabaseConnection>,
    mut session: Session,
    Path(dog_id): Path<i32>,
    Form(form): Form<StatusForm>,
) -> AppResult<Redirect> {
    let back = Redirect::to("/manage/dogs");
    let Some(status) = parse_choice::<DogStatus>(&form.status) else {
        session.flash(Level::Error, "Choose a valid status.");
        return Ok(back);
    };

    tracing::Span::current()
        .record("table", "dogs")
        .record("action", "change_dog_status")
        .record("dog_id", dog_id);

    match dogs::set_status(&db, dog_id, status).await {
        Ok(dog) => {
            tracing::Span::current().record("business_event", "Dog status changed");
            crate::metrics::refresh_dog_gauges(&db).await;
            session.flash(
                Level::Success,
                format!("{} is now {}.", dog.name, status.label().to_lowercase()),
            );
            Ok(back)
        }
        Err(StatusChangeError::NotFound) => Err(AppError::NotFound("Dog")),
        Err(e @ StatusChangeError::OpenRequest { .. }) => {
            tracing::Span::current().record("error", "open_adoption_request");
            session.flash(Level::Error, e.to_string());
            Ok(back)
        }
        Err(StatusChangeError::Database(e)) => Err(e.into()),
    }
}

/// Stores an uploaded image under the media directory with a random name.
pub async fn upload_photo(
    Extension(db): Extension<DatabaseConnection>,
    Extension(config): Extension<Arc<Config>>,
    mut session: Session,
    Path(dog_id): Path<i32>,
    mut multipart: Multipart,
) -> AppResult<Redirect> {
    let back = Redirect::to(&format!("/dogs/{dog_id}"));

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("photo") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        upload = Some((file_name, content_type, data));
    }

    let Some((file_name, content_type, data)) = upload.filter(|(_, _, data)| !data.is_empty())
    else {
        session.flash(Level::Error, "Choose an image to upload.");
        return Ok(back);
    };
    let Some(extension) = image_extension(&file_name, content_type.as_deref()) else {
        session.flash(Level::Error, "The photo must be an image file.");
        return Ok(back);
    };

    let dir = config.media_dir.join(PHOTO_DIR);
    let stored = format!("{}.{}", uuid::Uuid::new_v4(), extension);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| AppError::Internal(format!("create {}: {e}", dir.display())))?;
    tokio::fs::write(dir.join(&stored), &data)
        .await
        .map_err(|e| AppError::Internal(format!("write photo: {e}")))?;

    let relative = format!("{PHOTO_DIR}/{stored}");
    match dogs::set_photo(&db, dog_id, relative.clone()).await? {
        Some(previous) => {
            if let Some(previous) = previous {
                remove_photo(&config.media_dir, &previous).await;
            }
            tracing::Span::current()
                .record("table", "dogs")
                .record("action", "upload_photo")
                .record("dog_id", dog_id);
            session.flash(Level::Success, "Photo updated.");
            Ok(back)
        }
        None => {
            remove_photo(&config.media_dir, &relative).await;
            Err(AppError::NotFound("Dog"))
        }
    }
}

/// File extension for an upload when it is an image, judged by the declared
/// content type or else by the file name.
fn image_extension(file_name: &str, content_type: Option<&str>) -> Option<String> {
    let mime = content_type
        .and_then(|ct| ct.parse::<mime_guess::Mime>().ok())
        .filter(|m| m.type_() != mime_guess::mime::APPLICATION)
        .or_else(|| mime_guess::from_path(file_name).first())?;
    if mime.type_() != mime_guess::mime::IMAGE {
        return None;
    }

    let from_name = FsPath::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .filter(|ext| {
            mime_guess::from_ext(ext)
                .first()
                .is_some_and(|guessed| guessed == mime)
        });
    from_name.or_else(|| {
        mime_guess::get_mime_extensions(&mime)
            .and_then(|exts| exts.first())
            .map(|ext| ext.to_string())
    })
}

async fn remove_photo(media_dir: &FsPath, photo: &str) {
    if let Err(e) = tokio::fs::remove_file(media_dir.join(photo)).await {
        tracing::warn!("Failed to remove photo {}: {}", photo, e);
    }
}

pub async fn import_page(
    Extension(db): Extension<DatabaseConnection>,
    Extension(templates): Extension<Templates>,
    mut session: Session,
) -> AppResult<Html<String>> {
    let shelters = shelter_names(&db).await?;
    templates.page("import", &mut session, json!({ "shelters": shelters }))
}

/// Imports an uploaded CSV and renders the page again with the per-row report.
pub async fn import(
    Extension(db): Extension<DatabaseConnection>,
    Extension(templates): Extension<Templates>,
    mut session: Session,
    mut multipart: Multipart,
) -> AppResult<Html<String>> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("csv_file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        upload = Some((file_name, data));
    }

    tracing::Span::current()
        .record("table", "dogs")
        .record("action", "import_dogs");

    let mut report = None;
    match upload {
        None => session.flash(Level::Error, "Choose a CSV file to import."),
        Some((file_name, data)) => {
            let outcome = match csv_import::check_file_name(&file_name)
                .and_then(|()| csv_import::decode(&data))
            {
                Ok(text) => csv_import::import_dogs(&db, text, today()).await,
                Err(e) => Err(e),
            };
            match outcome {
                Ok(done) => {
                    tracing::Span::current().record(
                        "business_event",
                        tracing::field::display(format!(
                            "Imported {} dogs, skipped {}",
                            done.imported, done.skipped
                        )),
                    );
                    if done.imported > 0 {
                        session.flash(
                            Level::Success,
                            format!(
                                "Import complete: {} dogs imported, {} skipped.",
                                done.imported, done.skipped
                            ),
                        );
                        crate::metrics::refresh_dog_gauges(&db).await;
                    } else {
                        session.flash(
                            Level::Warning,
                            format!("No dogs imported. {} skipped.", done.skipped),
                        );
                    }
                    report = Some(done);
                }
                Err(e @ (ImportError::NotCsv | ImportError::NotText)) => {
                    session.flash(Level::Error, e.to_string());
                }
                Err(e) => {
                    tracing::error!("Dog import failed: {}", e);
                    tracing::Span::current().record("error", tracing::field::display(&e));
                    session.flash(Level::Error, "The import failed. Please try again.");
                    crate::metrics::refresh_dog_gauges(&db).await;
                }
            }
        }
    }

    let shelters = shelter_names(&db).await?;
    let rows = report.as_ref().map(|r| {
        r.rows
            .iter()
            .map(|row| match &row.outcome {
                csv_import::RowOutcome::Imported { dog_id } => {
                    json!({"line": row.line, "imported": true, "dog_id": dog_id})
                }
                csv_import::RowOutcome::Skipped(reason) => {
                    json!({"line": row.line, "imported": false, "reason": reason.to_string()})
                }
            })
            .collect::<Vec<_>>()
    });
    let context = json!({ "shelters": shelters, "report": report, "rows": rows });
    templates.page("import", &mut session, context)
}
