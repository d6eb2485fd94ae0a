//! PostgreSQL access. Every function takes a connection so it can run inside a transaction.

pub mod activity;
pub mod catalog;
pub mod models;
pub mod orders;
pub mod settings;
pub mod users;

pub use settings::PgSettings;

/// Page window shared by the list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page { pub page: i64, pub limit: i64 }

impl Page {
    pub const MAX_LIMIT: i64 = 100;

    pub fn new(page: Option<i64>, limit: Option<i64>, default_limit: i64) -> Self {
        Self { page: page.unwrap_or(1).max(1), limit: limit.unwrap_or(default_limit).clamp(1, Self::MAX_LIMIT) }
    }
    pub fn offset(&self) -> i64 { (self.page - 1).saturating_mul(self.limit) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir { Asc, Desc }

impl SortDir {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()) { Some(s) if s == "asc" => Self::Asc, _ => Self::Desc }
    }
    pub fn as_sql(&self) -> &'static str { match self { Self::Asc => "ASC", Self::Desc => "DESC" } }
}

/// Resolves a caller supplied sort column against an allow-list; anything else falls back to `default`.
pub fn sort_column(requested: Option<&str>, allowed: &[&'static str], default: &'static str) -> &'static str {
    let requested = requested.map(str::trim).unwrap_or_default();
    allowed.iter().copied().find(|c| *c == requested).unwrap_or(default)
}

/// Escapes `LIKE` wildcards and wraps the term for a substring match.
pub fn like_pattern(term: &str) -> String {
    let escaped = term.trim().replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    format!("%{escaped}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_offset_and_clamp() {
        assert_eq!(Page::new(Some(3), Some(10), 9).offset(), 20);
        assert_eq!(Page::new(None, None, 9), Page { page: 1, limit: 9 });
        assert_eq!(Page::new(Some(-2), Some(5000), 9), Page { page: 1, limit: 100 });
    }

    #[test]
    fn test_page_offset_saturates_on_huge_page() {
        assert_eq!(Page::new(Some(i64::MAX), Some(100), 9).offset(), i64::MAX);
        assert_eq!(Page::new(Some(i64::MAX), None, 9).offset(), i64::MAX);
    }

    #[test]
    fn test_sort_column_allow_list() {
        let allowed = ["id", "price"];
        assert_eq!(sort_column(Some("price"), &allowed, "id"), "price");
        assert_eq!(sort_column(Some("price; DROP TABLE orders"), &allowed, "id"), "id");
        assert_eq!(sort_column(None, &allowed, "id"), "id");
    }

    #[test]
    fn test_sort_dir() {
        assert_eq!(SortDir::parse(Some("ASC")), SortDir::Asc);
        assert_eq!(SortDir::parse(Some("sideways")), SortDir::Desc);
        assert_eq!(SortDir::parse(None).as_sql(), "DESC");
    }

    #[test]
    fn test_like_pattern_escapes() {
        assert_eq!(like_pattern(" 100%_off "), "%100\\%\\_off%");
    }
}
