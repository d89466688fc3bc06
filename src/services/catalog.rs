//! Filter, sort and tiered-fallback queries over dogs and adoption requests.

use chrono::{Months, NaiveDate};
use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, IntoSimpleExpr, Order,
    PaginatorTrait, QueryFilter, QueryOrder, Select, SelectTwo,
};
use serde::{Deserialize, Serialize};

use crate::entities::{adoption_request, dog, dog::DogStatus, Dog};

/// Query-string filters of the public catalog. Every field is kept as raw
/// text so the form can be echoed back; blank fields are ignored.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogFilter {
    pub q: String,
    pub shelter: String,
    pub dog: String,
    pub size: String,
    pub sex: String,
    pub min_age: String,
    pub max_age: String,
    pub good_with_children: String,
    pub good_with_animals: String,
    pub sort: String,
    pub page: String,
}

impl CatalogFilter {
    /// Available dogs narrowed by every non-blank filter, in the requested order.
    pub fn query(&self, today: NaiveDate) -> Select<dog::Entity> {
        let mut query = Dog::find().filter(dog::Column::Status.eq(DogStatus::Available));

        if let Some(q) = non_blank(&self.q) {
            query = query.filter(
                Condition::any()
                    .add(icontains(dog::Column::Name, q))
                    .add(icontains(dog::Column::Breed, q))
                    .add(icontains(dog::Column::Description, q)),
            );
        }
        if let Some(shelter_id) = parse_id(&self.shelter) {
            query = query.filter(dog::Column::ShelterId.eq(shelter_id));
        }
        if let Some(dog_id) = parse_id(&self.dog) {
            query = query.filter(dog::Column::Id.eq(dog_id));
        }
        if let Some(size) = non_blank(&self.size) {
            query = query.filter(dog::Column::Size.eq(size));
        }
        if let Some(sex) = non_blank(&self.sex) {
            query = query.filter(dog::Column::Sex.eq(sex));
        }
        if let Some(years) = parse_years(&self.min_age) {
            query = query.filter(dog::Column::BirthDate.lte(years_before(today, years)));
        }
        if let Some(years) = parse_years(&self.max_age) {
            let oldest = years_before(today, years.saturating_add(1));
            query = query.filter(dog::Column::BirthDate.gt(oldest));
        }
        if non_blank(&self.good_with_children).is_some() {
            query = query.filter(dog::Column::GoodWithChildren.eq(true));
        }
        if non_blank(&self.good_with_animals).is_some() {
            query = query.filter(dog::Column::GoodWithAnimals.eq(true));
        }

        sort_dogs(query, &self.sort)
    }
}

/// Filters of the staff dog list, which covers every status.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ManageDogsFilter {
    pub q: String,
    pub status: String,
    pub shelter: String,
    pub sort: String,
    pub page: String,
}

impl ManageDogsFilter {
    pub fn query(&self) -> Select<dog::Entity> {
        let mut query = Dog::find();

        if let Some(q) = non_blank(&self.q) {
            query = query.filter(
                Condition::any()
                    .add(icontains(dog::Column::Name, q))
                    .add(icontains(dog::Column::Breed, q))
                    .add(icontains(dog::Column::Microchip, q)),
            );
        }
        if let Some(status) = non_blank(&self.status) {
            query = query.filter(dog::Column::Status.eq(status));
        }
        if let Some(shelter_id) = parse_id(&self.shelter) {
            query = query.filter(dog::Column::ShelterId.eq(shelter_id));
        }

        sort_dogs(query, &self.sort)
    }
}

/// Filters of the staff adoption list.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ManageAdoptionsFilter {
    pub q: String,
    pub status: String,
    pub sort: String,
    pub page: String,
}

impl ManageAdoptionsFilter {
    pub fn query(&self) -> SelectTwo<adoption_request::Entity, dog::Entity> {
        let mut query = adoption_request::Entity::find().find_also_related(Dog);

        if let Some(q) = non_blank(&self.q) {
            query = query.filter(
                Condition::any()
                    .add(icontains(dog::Column::Name, q))
                    .add(icontains(adoption_request::Column::AdopterLastName, q))
                    .add(icontains(adoption_request::Column::AdopterFirstName, q))
                    .add(icontains(adoption_request::Column::AdopterEmail, q)),
            );
        }
        if let Some(status) = non_blank(&self.status) {
            query = query.filter(adoption_request::Column::Status.eq(status));
        }

        let (column, order) = match self.sort.trim() {
            "request_date" => (adoption_request::Column::RequestDate, Order::Asc),
            "status" => (adoption_request::Column::Status, Order::Asc),
            "-status" => (adoption_request::Column::Status, Order::Desc),
            "last_name" => (adoption_request::Column::AdopterLastName, Order::Asc),
            "-last_name" => (adoption_request::Column::AdopterLastName, Order::Desc),
            _ => (adoption_request::Column::RequestDate, Order::Desc),
        };
        query
            .order_by(column, order)
            .order_by_desc(adoption_request::Column::Id)
    }
}

/// Orders dogs by a sort key such as `name` or `-intake_date`.
/// Unknown keys use the default, newest intake first.
pub fn sort_dogs(query: Select<dog::Entity>, key: &str) -> Select<dog::Entity> {
    let key = key.trim();
    let (field, order) = match key.strip_prefix('-') {
        Some(field) => (field, Order::Desc),
        None => (key, Order::Asc),
    };
    let column = match field {
        "name" => dog::Column::Name,
        "breed" => dog::Column::Breed,
        "birth_date" => dog::Column::BirthDate,
        "intake_date" => dog::Column::IntakeDate,
        "weight" => dog::Column::Weight,
        _ => {
            return query
                .order_by_desc(dog::Column::IntakeDate)
                .order_by_desc(dog::Column::Id)
        }
    };
    query.order_by(column, order).order_by_desc(dog::Column::Id)
}

/// Dogs for the unfiltered photo gallery: available dogs, or when there are
/// none every dog not yet adopted, or failing that every dog.
pub async fn photo_gallery<C: ConnectionTrait>(db: &C) -> Result<Select<dog::Entity>, DbErr> {
    let tiers = [
        Dog::find().filter(dog::Column::Status.eq(DogStatus::Available)),
        Dog::find().filter(dog::Column::Status.ne(DogStatus::Adopted)),
    ];
    for tier in tiers {
        if tier.clone().count(db).await? > 0 {
            return Ok(newest_first(tier));
        }
    }
    Ok(newest_first(Dog::find()))
}

fn newest_first(query: Select<dog::Entity>) -> Select<dog::Entity> {
    query
        .order_by_desc(dog::Column::IntakeDate)
        .order_by_desc(dog::Column::Id)
}

/// `today` moved back by whole years. Feb 29 lands on Feb 28 in non-leap years.
pub fn years_before(today: NaiveDate, years: u32) -> NaiveDate {
    today
        .checked_sub_months(Months::new(years.saturating_mul(12)))
        .unwrap_or(NaiveDate::MIN)
}

fn non_blank(raw: &str) -> Option<&str> {
    let raw = raw.trim();
    (!raw.is_empty()).then_some(raw)
}

fn parse_id(raw: &str) -> Option<i32> {
    non_blank(raw)?.parse().ok()
}

fn parse_years(raw: &str) -> Option<u32> {
    let raw = non_blank(raw)?;
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Case-insensitive substring match, `LOWER(column) LIKE '%needle%'`.
fn icontains<C: ColumnTrait>(column: C, needle: &str) -> SimpleExpr {
    let escaped = needle
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    Expr::expr(Func::lower(IntoSimpleExpr::into_simple_expr(column)))
        .like(LikeExpr::new(format!("%{escaped}%")).escape('\\'))
}
