//! Paging, search and ordering for the file list.

use serde::Serialize;

/// Uploads per page.
pub const PAGE_SIZE: i64 = 25;

/// Column the list is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SortColumn {
    /// Default ordering when no `order` is given.
    CreatedAt,
    Label,
    Size,
    Date,
    Expire,
}

impl SortColumn {
    /// SQL column for this sort key.
    pub fn sql(self) -> &'static str {
        match self {
            SortColumn::CreatedAt | SortColumn::Date => "created_at",
            SortColumn::Label => "label",
            SortColumn::Size => "bytes",
            SortColumn::Expire => "expire_at",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// A parsed `order` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FileOrder {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl Default for FileOrder {
    fn default() -> Self {
        Self {
            column: SortColumn::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

impl FileOrder {
    /// Parse `{file|size|date|expire}{as|ds}`.
    ///
    /// An unknown field sorts by creation time; any suffix other than `as`
    /// sorts descending.
    pub fn parse(order: &str) -> Self {
        let split = order.len().saturating_sub(2);
        let (field, suffix) = match (order.get(..split), order.get(split..)) {
            (Some(field), Some(suffix)) => (field, suffix),
            _ => (order, ""),
        };

        let column = match field {
            "file" => SortColumn::Label,
            "size" => SortColumn::Size,
            "date" => SortColumn::Date,
            "expire" => SortColumn::Expire,
            _ => SortColumn::CreatedAt,
        };
        let direction = if suffix == "as" {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        };

        Self { column, direction }
    }

    /// `ORDER BY` clause body. Only fixed identifiers are ever produced.
    pub fn to_sql(self) -> String {
        format!("{} {}, id ASC", self.column.sql(), self.direction.sql())
    }
}

/// Query for one page of a user's uploads.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    /// Requested page (1-based; values below 1 mean 1).
    pub page: i64,
    /// Case-insensitive substring of the label or id.
    pub search: Option<String>,
    pub order: FileOrder,
}

impl ListQuery {
    /// Normalized search text, or `None` when empty.
    pub fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::to_lowercase)
            .filter(|s| !s.is_empty())
    }
}

/// Escape `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` pattern.
pub fn like_pattern(search: &str) -> String {
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

/// Number of pages for `total` items. Never less than one.
pub fn last_page(total: i64) -> i64 {
    ((total + PAGE_SIZE - 1) / PAGE_SIZE).max(1)
}

/// Clamp a requested page into `1..=last_page`.
pub fn clamp_page(page: i64, total: i64) -> i64 {
    page.max(1).min(last_page(total))
}
