use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Clamp client paging input to `(page, limit, offset)`.
///
/// Query structs keep `page`/`limit` as direct fields: `serde(flatten)` does
/// not play well with url-encoded numbers.
pub fn normalize_page(page: Option<i64>, limit: Option<i64>) -> (i64, i64, i64) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(10).clamp(1, 100);
    let offset = (page - 1) * limit;
    (page, limit, offset)
}

#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StoreSortBy {
    #[default]
    Name,
    Email,
    Address,
    CreatedAt,
    AverageRating,
    TotalRatings,
}

impl StoreSortBy {
    pub fn as_sql(&self) -> &'static str {
        match self {
            StoreSortBy::Name => "s.name",
            StoreSortBy::Email => "s.email",
            StoreSortBy::Address => "s.address",
            StoreSortBy::CreatedAt => "s.created_at",
            StoreSortBy::AverageRating => "COALESCE(AVG(r.rating), 0)",
            StoreSortBy::TotalRatings => "COUNT(r.id)",
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub owner_id: Option<Uuid>,
    pub sort_by: Option<StoreSortBy>,
    pub sort_order: Option<SortOrder>,
}

impl StoreListQuery {
    pub fn normalize(&self) -> (i64, i64, i64) {
        normalize_page(self.page, self.limit)
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UserListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub role: Option<String>,
    pub search: Option<String>,
}

impl UserListQuery {
    pub fn normalize(&self) -> (i64, i64, i64) {
        normalize_page(self.page, self.limit)
    }
}

/// `%term%` for ILIKE, with the LIKE wildcards in the term escaped.
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
