/// Filter / sort / paginate query building shared by every list endpoint
///
/// Column names only ever come from the static allow-lists below; client
/// text reaches SQL as bound parameters.
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow, SqlitePool};
use std::time::Duration;

use crate::db::with_timeout;
use crate::error::ApiResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// `desc` in any case is descending; everything else ascends
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(s) if s.trim().eq_ignore_ascii_case("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Static description of one listable table
#[derive(Debug)]
pub struct Listing {
    pub table: &'static str,
    pub select: &'static str,
    /// Logical sort name -> physical column
    pub sort_columns: &'static [(&'static str, &'static str)],
    /// Columns matched by the search text (OR-ed together)
    pub search_columns: &'static [&'static str],
    pub default_limit: i64,
}

/// Raw, untrusted list parameters as they arrive from a request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    #[serde(rename = "sortOrder")]
    pub sort_order: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

/// Bound value for a generated statement
#[derive(Debug, Clone, PartialEq)]
pub enum Bind {
    Text(String),
    Int(i64),
}

/// Fully resolved list request
#[derive(Debug, Clone)]
pub struct ListQuery {
    pub search: String,
    pub sort_column: &'static str,
    pub order: SortOrder,
    pub limit: i64,
    pub offset: i64,
    /// Exact-match integer filters; column names are static
    pub filters: Vec<(&'static str, i64)>,
}

impl Listing {
    /// Map a requested sort name to a column, falling back to `id`
    pub fn sort_column(&self, requested: Option<&str>) -> &'static str {
        requested
            .and_then(|name| {
                self.sort_columns
                    .iter()
                    .find(|(logical, _)| *logical == name)
                    .map(|(_, physical)| *physical)
            })
            .unwrap_or("id")
    }

    pub fn resolve(&self, params: &ListParams, max_limit: i64) -> ListQuery {
        let limit = params
            .limit
            .as_deref()
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(self.default_limit)
            .min(max_limit);
        let offset = params
            .offset
            .as_deref()
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|v| *v >= 0)
            .unwrap_or(0);

        ListQuery {
            search: params.search.clone().unwrap_or_default(),
            sort_column: self.sort_column(params.sort_by.as_deref()),
            order: SortOrder::parse(params.sort_order.as_deref()),
            limit,
            offset,
            filters: Vec::new(),
        }
    }
}

/// Escape LIKE wildcards so search text is matched literally
fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

impl ListQuery {
    pub fn with_filter(mut self, column: &'static str, value: i64) -> Self {
        self.filters.push((column, value));
        self
    }

    /// WHERE clause (possibly empty) and its bind values
    pub fn where_clause(&self, listing: &Listing) -> (String, Vec<Bind>) {
        let mut predicates = Vec::new();
        let mut binds = Vec::new();

        if !self.search.is_empty() && !listing.search_columns.is_empty() {
            let pattern = like_pattern(&self.search);
            let matches: Vec<String> = listing
                .search_columns
                .iter()
                .map(|col| format!("{} LIKE ? ESCAPE '\\'", col))
                .collect();
            for _ in listing.search_columns {
                binds.push(Bind::Text(pattern.clone()));
            }
            predicates.push(format!("({})", matches.join(" OR ")));
        }

        for (column, value) in &self.filters {
            predicates.push(format!("{} = ?", column));
            binds.push(Bind::Int(*value));
        }

        if predicates.is_empty() {
            (String::new(), binds)
        } else {
            (format!(" WHERE {}", predicates.join(" AND ")), binds)
        }
    }

    pub fn select_sql(&self, listing: &Listing) -> (String, Vec<Bind>) {
        let (where_sql, mut binds) = self.where_clause(listing);
        let sql = format!(
            "SELECT {} FROM {}{} ORDER BY {} {}, id ASC LIMIT ? OFFSET ?",
            listing.select,
            listing.table,
            where_sql,
            self.sort_column,
            self.order.as_sql(),
        );
        binds.push(Bind::Int(self.limit));
        binds.push(Bind::Int(self.offset));
        (sql, binds)
    }

    pub fn count_sql(&self, listing: &Listing) -> (String, Vec<Bind>) {
        let (where_sql, binds) = self.where_clause(listing);
        (
            format!("SELECT COUNT(*) FROM {}{}", listing.table, where_sql),
            binds,
        )
    }
}

/// Position of a page within the full result set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: i64,
    pub start: i64,
    pub end: i64,
    pub current_page: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn compute(total: i64, offset: i64, limit: i64) -> Self {
        // offset comes straight from the client and may be near i64::MAX
        let (start, end) = if total > offset {
            (offset + 1, offset.saturating_add(limit).min(total))
        } else {
            (0, 0)
        };
        let limit = limit.max(1);
        let full_pages = total / limit + i64::from(total % limit != 0);

        Self {
            total,
            start,
            end,
            current_page: (offset / limit).saturating_add(1),
            total_pages: full_pages.max(1),
        }
    }
}

/// One page of rows plus its pagination
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub pagination: Pagination,
}

impl<T: Serialize> Page<T> {
    /// Response body with the rows under `key`
    pub fn to_json(&self, key: &str) -> serde_json::Value {
        let mut body = serde_json::json!({
            "total": self.pagination.total,
            "start": self.pagination.start,
            "end": self.pagination.end,
            "currentPage": self.pagination.current_page,
            "totalPages": self.pagination.total_pages,
        });
        body[key] = serde_json::json!(self.rows);
        body
    }
}

/// Run the count and page queries for a resolved list request.
///
/// The two statements are not wrapped in a transaction, so under concurrent
/// writes the total may disagree with the returned page.
pub async fn fetch_page<T>(
    db: &SqlitePool,
    timeout: Duration,
    listing: &Listing,
    query: &ListQuery,
) -> ApiResult<Page<T>>
where
    T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    let (count_sql, count_binds) = query.count_sql(listing);
    let mut count = sqlx::query_scalar::<_, i64>(&count_sql);
    for bind in count_binds {
        count = match bind {
            Bind::Text(s) => count.bind(s),
            Bind::Int(i) => count.bind(i),
        };
    }
    let total = with_timeout(timeout, count.fetch_one(db)).await?;

    let (select_sql, select_binds) = query.select_sql(listing);
    let mut select = sqlx::query_as::<_, T>(&select_sql);
    for bind in select_binds {
        select = match bind {
            Bind::Text(s) => select.bind(s),
            Bind::Int(i) => select.bind(i),
        };
    }
    let rows = with_timeout(timeout, select.fetch_all(db)).await?;

    tracing::debug!(
        table = listing.table,
        total,
        returned = rows.len(),
        "Listed rows"
    );

    Ok(Page {
        rows,
        pagination: Pagination::compute(total, query.offset, query.limit),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIDGETS: Listing = Listing {
        table: "widget",
        select: "id, name",
        sort_columns: &[("id", "id"), ("name", "name"), ("date", "made_on")],
        search_columns: &["name"],
        default_limit: 20,
    };

    const KEYS: Listing = Listing {
        table: "sns_key",
        select: "id",
        sort_columns: &[("id", "id")],
        search_columns: &["sns_id", "api_key"],
        default_limit: 50,
    };

    fn params(pairs: &[(&str, &str)]) -> ListParams {
        let mut p = ListParams::default();
        for (k, v) in pairs {
            let v = Some(v.to_string());
            match *k {
                "search" => p.search = v,
                "sortBy" => p.sort_by = v,
                "sortOrder" => p.sort_order = v,
                "limit" => p.limit = v,
                "offset" => p.offset = v,
                _ => unreachable!(),
            }
        }
        p
    }

    #[test]
    fn test_unknown_sort_falls_back_to_id() {
        let q = WIDGETS.resolve(&params(&[("sortBy", "name; DROP TABLE widget")]), 500);
        assert_eq!(q.sort_column, "id");

        let (sql, _) = q.select_sql(&WIDGETS);
        assert!(sql.contains("ORDER BY id ASC, id ASC"));
        assert!(!sql.contains("DROP"));
    }

    #[test]
    fn test_logical_sort_maps_to_physical() {
        let q = WIDGETS.resolve(&params(&[("sortBy", "date"), ("sortOrder", "DeSc")]), 500);
        let (sql, _) = q.select_sql(&WIDGETS);
        assert!(sql.contains("ORDER BY made_on DESC, id ASC"));
    }

    #[test]
    fn test_sort_order_defaults_to_asc() {
        assert_eq!(SortOrder::parse(None), SortOrder::Asc);
        assert_eq!(SortOrder::parse(Some("descending")), SortOrder::Asc);
        assert_eq!(SortOrder::parse(Some("DESC")), SortOrder::Desc);
    }

    #[test]
    fn test_limit_and_offset_defaults_and_cap() {
        let q = WIDGETS.resolve(&params(&[("limit", "abc"), ("offset", "-3")]), 500);
        assert_eq!((q.limit, q.offset), (20, 0));

        let q = WIDGETS.resolve(&params(&[("limit", "0")]), 500);
        assert_eq!(q.limit, 20);

        let q = WIDGETS.resolve(&params(&[("limit", "100000"), ("offset", "40")]), 500);
        assert_eq!((q.limit, q.offset), (500, 40));
    }

    #[test]
    fn test_search_is_bound_not_interpolated() {
        let q = WIDGETS.resolve(&params(&[("search", "o'neil 50%")]), 500);
        let (sql, binds) = q.select_sql(&WIDGETS);

        assert!(sql.contains("WHERE (name LIKE ? ESCAPE '\\')"));
        assert!(!sql.contains("neil"));
        assert_eq!(binds[0], Bind::Text("%o'neil 50\\%%".to_string()));
        assert_eq!(binds[1..], [Bind::Int(20), Bind::Int(0)]);
    }

    #[test]
    fn test_empty_search_has_no_predicate() {
        let q = WIDGETS.resolve(&ListParams::default(), 500);
        let (sql, binds) = q.count_sql(&WIDGETS);
        assert_eq!(sql, "SELECT COUNT(*) FROM widget");
        assert!(binds.is_empty());
    }

    #[test]
    fn test_multi_column_search_and_filter() {
        let q = KEYS
            .resolve(&params(&[("search", "tw")]), 500)
            .with_filter("user_id", 9);
        let (sql, binds) = q.count_sql(&KEYS);

        assert_eq!(
            sql,
            "SELECT COUNT(*) FROM sns_key WHERE (sns_id LIKE ? ESCAPE '\\' OR api_key LIKE ? ESCAPE '\\') AND user_id = ?"
        );
        assert_eq!(binds.len(), 3);
        assert_eq!(binds[2], Bind::Int(9));
    }

    #[test]
    fn test_pagination_window() {
        let p = Pagination::compute(45, 40, 20);
        assert_eq!((p.start, p.end), (41, 45));
        assert_eq!(p.end - p.start + 1, 20.min(45 - 40));
        assert_eq!((p.current_page, p.total_pages), (3, 3));

        let p = Pagination::compute(100, 0, 20);
        assert_eq!((p.start, p.end), (1, 20));
        assert_eq!(p.total_pages, 5);
    }

    #[test]
    fn test_pagination_empty() {
        let p = Pagination::compute(0, 0, 20);
        assert_eq!((p.start, p.end), (0, 0));
        assert_eq!((p.current_page, p.total_pages), (1, 1));
    }

    #[test]
    fn test_pagination_window_property() {
        for total in 0..60 {
            for offset in (0..70).step_by(7) {
                for limit in [1, 5, 20, 50] {
                    let p = Pagination::compute(total, offset, limit);
                    if total > offset {
                        assert_eq!(p.end - p.start + 1, limit.min(total - offset));
                    } else {
                        assert_eq!((p.start, p.end), (0, 0));
                    }
                    assert!(p.total_pages >= 1);
                }
            }
        }
    }

    #[test]
    fn test_pagination_huge_offset() {
        let p = Pagination::compute(0, i64::MAX, 1);
        assert_eq!((p.start, p.end), (0, 0));
        assert_eq!(p.current_page, i64::MAX);
        assert_eq!(p.total_pages, 1);

        let p = Pagination::compute(i64::MAX, i64::MAX - 1, 500);
        assert_eq!((p.start, p.end), (i64::MAX, i64::MAX));
        assert!(p.current_page > 0);
    }

    #[test]
    fn test_page_json_shape() {
        let page = Page {
            rows: vec![1, 2],
            pagination: Pagination::compute(2, 0, 20),
        };
        let body = page.to_json("items");
        assert_eq!(body["items"], serde_json::json!([1, 2]));
        assert_eq!(body["total"], 2);
        assert_eq!(body["currentPage"], 1);
        assert_eq!(body["totalPages"], 1);
    }
}
