//! Search and pagination shared by the list panels.

use sea_orm::{
    ColumnTrait,
    sea_query::{Expr, Func, LikeExpr, SimpleExpr},
};

/// What a list panel asks for: an optional search term and a 1-based page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    search: Option<String>,
    page: u64,
    per_page: u64,
}

impl ListQuery {
    /// Builds a query; page and page size are clamped to at least 1.
    #[must_use]
    pub fn new(search: Option<String>, page: u64, per_page: u64) -> Self {
        let search = search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Self {
            search,
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    /// Trimmed search term, `None` when blank.
    #[must_use]
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u64 {
        self.page
    }

    /// Rows per page.
    #[must_use]
    pub const fn per_page(&self) -> u64 {
        self.per_page
    }

    /// 0-based page index as used by `SeaORM` paginators.
    #[must_use]
    pub const fn page_index(&self) -> u64 {
        self.page - 1
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Rows on this page
    pub items: Vec<T>,
    /// 1-based page number
    pub page: u64,
    /// Rows per page
    pub per_page: u64,
    /// Rows matching the search across all pages
    pub total_items: u64,
    /// Number of pages
    pub total_pages: u64,
}

impl<T> Page<T> {
    /// Slices an already filtered, ordered list.
    pub fn from_items(all: Vec<T>, query: &ListQuery) -> crate::errors::Result<Self> {
        let total_items = u64::try_from(all.len())?;
        let total_pages = total_items.div_ceil(query.per_page());
        let skip = usize::try_from(query.page_index().saturating_mul(query.per_page()))?;
        let take = usize::try_from(query.per_page())?;
        let items = all.into_iter().skip(skip).take(take).collect();

        Ok(Self {
            items,
            page: query.page(),
            per_page: query.per_page(),
            total_items,
            total_pages,
        })
    }

    /// True when there are no rows on this page.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// `%term%` lower-cased, with LIKE wildcards in the term escaped by `\`.
fn search_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.to_lowercase().chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// `LOWER(column) LIKE '%term%'`, so matching ignores case on every backend.
pub(crate) fn contains_ignoring_case<C: ColumnTrait>(column: C, term: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col((column.entity_name(), column))))
        .like(LikeExpr::new(search_pattern(term)).escape('\\'))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::{ReferenceRecord, reference_record};
    use sea_orm::{DbBackend, EntityTrait, QueryFilter, QueryTrait};

    #[test]
    fn test_search_lowers_both_sides() {
        let sql = ReferenceRecord::find()
            .filter(contains_ignoring_case(reference_record::Column::Name, "Cola"))
            .build(DbBackend::Postgres)
            .to_string();
        assert!(
            sql.contains(r#"LOWER("reference_records"."name") LIKE '%cola%'"#),
            "{sql}"
        );
    }

    #[test]
    fn test_search_pattern_escapes_wildcards() {
        assert_eq!(search_pattern("COLA"), "%cola%");
        assert_eq!(search_pattern("50%_off"), r"%50\%\_off%");
    }

    #[test]
    fn test_query_normalisation() {
        let query = ListQuery::new(Some("   ".to_string()), 0, 0);
        assert_eq!(query.search(), None);
        assert_eq!(query.page(), 1);
        assert_eq!(query.per_page(), 1);

        let query = ListQuery::new(Some(" cola ".to_string()), 3, 10);
        assert_eq!(query.search(), Some("cola"));
        assert_eq!(query.page_index(), 2);
    }

    #[test]
    fn test_from_items_slices_pages() {
        let rows: Vec<u32> = (1..=23).collect();

        let page = Page::from_items(rows.clone(), &ListQuery::new(None, 3, 10)).unwrap();
        assert_eq!(page.items, vec![21, 22, 23]);
        assert_eq!(page.total_items, 23);
        assert_eq!(page.total_pages, 3);

        let page = Page::from_items(rows, &ListQuery::new(None, 4, 10)).unwrap();
        assert!(page.is_empty());
    }
}
