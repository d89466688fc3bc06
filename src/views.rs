//! Handlebars page registry. Templates are compiled into the binary and
//! share the `layout` partial.

use std::sync::Arc;

use axum::response::Html;
use chrono::NaiveDate;
use handlebars::Handlebars;
use sea_orm::ActiveEnum;
use serde_json::{json, Value};

use crate::api::session::Session;
use crate::entities::{adoption_request, dog, Choice};
use crate::error::AppResult;

const TEMPLATES: &[(&str, &str)] = &[
    ("layout", include_str!("../templates/layout.hbs")),
    ("pagination", include_str!("../templates/pagination.hbs")),
    ("dog_card", include_str!("../templates/dog_card.hbs")),
    ("home", include_str!("../templates/home.hbs")),
    ("dog_list", include_str!("../templates/dog_list.hbs")),
    ("dog_detail", include_str!("../templates/dog_detail.hbs")),
    ("photos", include_str!("../templates/photos.hbs")),
    ("adopt", include_str!("../templates/adopt.hbs")),
    ("adoption_form", include_str!("../templates/adoption_form.hbs")),
    ("confirmation", include_str!("../templates/confirmation.hbs")),
    ("track", include_str!("../templates/track.hbs")),
    ("demo_dog", include_str!("../templates/demo_dog.hbs")),
    ("demo_adopt", include_str!("../templates/demo_adopt.hbs")),
    ("about", include_str!("../templates/about.hbs")),
    ("contact", include_str!("../templates/contact.hbs")),
    ("login", include_str!("../templates/login.hbs")),
    ("dashboard", include_str!("../templates/dashboard.hbs")),
    ("manage_dogs", include_str!("../templates/manage_dogs.hbs")),
    ("import", include_str!("../templates/import.hbs")),
    ("manage_adoptions", include_str!("../templates/manage_adoptions.hbs")),
    ("health", include_str!("../templates/health.hbs")),
    ("activities", include_str!("../templates/activities.hbs")),
    ("shelters", include_str!("../templates/shelters.hbs")),
];

#[derive(Clone)]
pub struct Templates {
    registry: Arc<Handlebars<'static>>,
}

impl Templates {
    pub fn new() -> Result<Self, handlebars::TemplateError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(false);
        for (name, source) in TEMPLATES {
            registry.register_template_string(name, source)?;
        }
        Ok(Self {
            registry: Arc::new(registry),
        })
    }

    pub fn render(&self, name: &str, context: &Value) -> AppResult<String> {
        Ok(self.registry.render(name, context)?)
    }

    /// Renders a full page. Pending flashes are consumed and the signed-in
    /// operator, if any, is exposed to the layout.
    pub fn page(&self, name: &str, session: &mut Session, context: Value) -> AppResult<Html<String>> {
        let mut context = match context {
            Value::Object(map) => map,
            Value::Null => serde_json::Map::new(),
            other => {
                let mut map = serde_json::Map::new();
                map.insert("data".to_string(), other);
                map
            }
        };
        context.insert("messages".to_string(), json!(session.take_flashes()));
        context.insert("is_staff".to_string(), json!(session.is_staff()));
        context.insert("operator".to_string(), json!(session.operator()));

        self.render(name, &Value::Object(context)).map(Html)
    }
}

/// `{value, label, selected}` for every variant of `T`, for `<select>` options.
pub fn choices<T: Choice>(selected: &str) -> Value {
    T::iter()
        .map(|choice| {
            let value = choice.to_value();
            json!({
                "selected": value == selected,
                "value": value,
                "label": choice.label(),
            })
        })
        .collect()
}

/// A dog as templates see it: stored fields plus display labels and age.
pub fn dog_json(dog: &dog::Model, shelter_name: Option<&str>, today: NaiveDate) -> Value {
    let mut value = json!(dog);
    if let Value::Object(map) = &mut value {
        map.insert("age".into(), json!(dog.age_on(today)));
        map.insert("status_label".into(), json!(dog.status.label()));
        map.insert("sex_label".into(), json!(dog.sex.label()));
        map.insert("size_label".into(), json!(dog.size.map(Choice::label)));
        map.insert("available".into(), json!(dog.status == dog::DogStatus::Available));
        map.insert(
            "photo_url".into(),
            json!(dog.photo.as_ref().map(|photo| format!("/media/{photo}"))),
        );
        map.insert("shelter_name".into(), json!(shelter_name));
    }
    value
}

pub fn adoption_json(request: &adoption_request::Model, dog: Option<&dog::Model>) -> Value {
    let mut value = json!(request);
    if let Value::Object(map) = &mut value {
        map.insert("status_label".into(), json!(request.status.label()));
        map.insert("housing_label".into(), json!(request.housing_type.label()));
        map.insert("experience_label".into(), json!(request.experience.label()));
        map.insert(
            "next_statuses".into(),
            request
                .status
                .next_allowed()
                .iter()
                .map(|s| json!({"value": s.to_value(), "label": s.label()}))
                .collect(),
        );
        map.insert("dog_name".into(), json!(dog.map(|d| d.name.as_str())));
        map.insert("dog_breed".into(), json!(dog.map(|d| d.breed.as_str())));
        map.insert(
            "dog_photo_url".into(),
            json!(dog.and_then(|d| d.photo.as_ref()).map(|p| format!("/media/{p}"))),
        );
    }
    value
}
