use sea_orm::{ConnectionTrait, DbErr, PaginatorTrait, SelectorTrait};
use serde::Serialize;
use serde_json::Value;

pub const CATALOG_PAGE_SIZE: u64 = 12;
pub const STAFF_PAGE_SIZE: u64 = 20;

/// One page of results plus the numbers the templates need for navigation.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub total: u64,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous: u64,
    pub next: u64,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            total: self.total,
            has_previous: self.has_previous,
            has_next: self.has_next,
            previous: self.previous,
            next: self.next,
        }
    }
}

/// 1-based page number from a query string value. Anything unparsable is page 1.
pub fn page_number(raw: &str) -> u64 {
    raw.trim().parse::<u64>().ok().filter(|n| *n >= 1).unwrap_or(1)
}

/// The non-blank filters of `filter` as a query string, without `page`, so
/// pagination links keep the current filters.
pub fn query_without_page<T: Serialize>(filter: &T) -> String {
    let Ok(Value::Object(fields)) = serde_json::to_value(filter) else {
        return String::new();
    };
    let pairs: Vec<(String, String)> = fields
        .into_iter()
        .filter(|(name, _)| name != "page")
        .filter_map(|(name, value)| match value {
            Value::String(s) if !s.trim().is_empty() => Some((name, s)),
            _ => None,
        })
        .collect();
    serde_urlencoded::to_string(pairs).unwrap_or_default()
}

/// Fetches page `requested` (1-based), clamped to the last page. An empty
/// result still has one (empty) page.
pub async fn fetch_page<'db, C, Q>(
    db: &'db C,
    query: Q,
    per_page: u64,
    requested: u64,
) -> Result<Page<<Q::Selector as SelectorTrait>::Item>, DbErr>
where
    C: ConnectionTrait,
    Q: PaginatorTrait<'db, C>,
{
    let paginator = query.paginate(db, per_page);
    let counts = paginator.num_items_and_pages().await?;
    let num_pages = counts.number_of_pages.max(1);
    let number = requested.clamp(1, num_pages);
    let items = paginator.fetch_page(number - 1).await?;

    Ok(Page {
        items,
        number,
        num_pages,
        total: counts.number_of_items,
        has_previous: number > 1,
        has_next: number < num_pages,
        previous: number.saturating_sub(1),
        next: number + 1,
    })
}
