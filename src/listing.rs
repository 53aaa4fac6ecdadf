//! Ordering and filtering of directory listings.

use std::cmp::Ordering;

use crate::storage::DirEntry;

/// Field a listing is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderBy {
    LastModified,
    Size,
    /// Used when no field, or an unknown one, is requested.
    #[default]
    FileName,
}

impl OrderBy {
    /// Parse the `orderBy` query value. Unknown values fall back to file name.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("lastModified") => OrderBy::LastModified,
            Some("size") => OrderBy::Size,
            _ => OrderBy::FileName,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    #[default]
    Ascending,
    Descending,
}

impl OrderDirection {
    /// Parse the `orderByDirection` query value. Only `Descending` reverses.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("Descending") => OrderDirection::Descending,
            _ => OrderDirection::Ascending,
        }
    }
}

/// Query parameters accepted when listing a directory
#[derive(Debug, Default)]
pub struct ListingQuery {
    pub order_by: Option<String>,
    pub order_by_direction: Option<String>,
    pub filter_by_name: Option<String>,
}

/// Collects raw query pairs. A repeated parameter keeps its last value and
/// unknown parameters are ignored.
impl FromIterator<(String, String)> for ListingQuery {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(pairs: I) -> Self {
        let mut query = ListingQuery::default();
        for (key, value) in pairs {
            match key.as_str() {
                "orderBy" => query.order_by = Some(value),
                "orderByDirection" => query.order_by_direction = Some(value),
                "filterByName" => query.filter_by_name = Some(value),
                _ => {}
            }
        }
        query
    }
}

/// Parsed ordering and filtering for one listing request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingOptions {
    pub order_by: OrderBy,
    pub direction: OrderDirection,
    pub filter: Option<String>,
}

impl From<&ListingQuery> for ListingOptions {
    fn from(query: &ListingQuery) -> Self {
        Self {
            order_by: OrderBy::parse(query.order_by.as_deref()),
            direction: OrderDirection::parse(query.order_by_direction.as_deref()),
            filter: query
                .filter_by_name
                .as_ref()
                .filter(|f| !f.is_empty())
                .cloned(),
        }
    }
}

fn compare(order_by: OrderBy, a: &DirEntry, b: &DirEntry) -> Ordering {
    match order_by {
        OrderBy::LastModified => a.modified.cmp(&b.modified),
        OrderBy::Size => a.size.cmp(&b.size),
        OrderBy::FileName => a.name.cmp(&b.name),
    }
}

/// Filter and order `entries`, returning only the file names.
///
/// The filter is a case-insensitive substring match on the name. Sorting is
/// stable in both directions, so entries with equal keys keep their
/// enumeration order.
pub fn arrange(mut entries: Vec<DirEntry>, options: &ListingOptions) -> Vec<String> {
    if let Some(filter) = &options.filter {
        let needle = filter.to_lowercase();
        entries.retain(|entry| entry.name.to_lowercase().contains(&needle));
    }

    if entries.len() > 1 {
        let order_by = options.order_by;
        match options.direction {
            OrderDirection::Ascending => entries.sort_by(|a, b| compare(order_by, a, b)),
            OrderDirection::Descending => entries.sort_by(|a, b| compare(order_by, b, a)),
        }
    }

    entries.into_iter().map(|entry| entry.name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    fn entry(name: &str, size: u64, age_secs: u64) -> DirEntry {
        let modified = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000 - age_secs);
        DirEntry::new(name, size, Some(modified))
    }

    fn sample() -> Vec<DirEntry> {
        vec![
            entry("newdoc.txt", 25, 10),
            entry("doc3.txt", 10, 20),
            entry("doc1.txt", 16, 40),
            entry("doc2.txt", 2, 30),
        ]
    }

    fn options(order_by: Option<&str>, direction: Option<&str>, filter: Option<&str>) -> ListingOptions {
        ListingOptions::from(&ListingQuery {
            order_by: order_by.map(String::from),
            order_by_direction: direction.map(String::from),
            filter_by_name: filter.map(String::from),
        })
    }

    #[test]
    fn test_parse_defaults() {
        assert_eq!(OrderBy::parse(None), OrderBy::FileName);
        assert_eq!(OrderBy::parse(Some("bogus")), OrderBy::FileName);
        assert_eq!(OrderBy::parse(Some("size")), OrderBy::Size);
        assert_eq!(OrderBy::parse(Some("lastModified")), OrderBy::LastModified);
        assert_eq!(OrderDirection::parse(None), OrderDirection::Ascending);
        assert_eq!(OrderDirection::parse(Some("descending")), OrderDirection::Ascending);
        assert_eq!(OrderDirection::parse(Some("Descending")), OrderDirection::Descending);
    }

    #[test]
    fn test_query_keeps_last_repeated_value() {
        let query: ListingQuery = [
            ("orderBy", "size"),
            ("orderBy", "lastModified"),
            ("page", "2"),
            ("filterByName", "doc"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        assert_eq!(query.order_by.as_deref(), Some("lastModified"));
        assert_eq!(query.order_by_direction, None);
        assert_eq!(query.filter_by_name.as_deref(), Some("doc"));
    }

    #[test]
    fn test_default_orders_by_name_ascending() {
        let names = arrange(sample(), &ListingOptions::default());
        assert_eq!(names, ["doc1.txt", "doc2.txt", "doc3.txt", "newdoc.txt"]);
    }

    #[test]
    fn test_unknown_field_orders_by_name() {
        let names = arrange(sample(), &options(Some("color"), Some("Descending"), None));
        assert_eq!(names, ["newdoc.txt", "doc3.txt", "doc2.txt", "doc1.txt"]);
    }

    #[test]
    fn test_order_by_size_reverses_with_direction() {
        let ascending = arrange(sample(), &options(Some("size"), Some("Ascending"), None));
        let descending = arrange(sample(), &options(Some("size"), Some("Descending"), None));

        assert_eq!(ascending, ["doc2.txt", "doc3.txt", "doc1.txt", "newdoc.txt"]);
        let mut reversed = descending.clone();
        reversed.reverse();
        assert_eq!(ascending, reversed);
    }

    #[test]
    fn test_order_by_last_modified() {
        let names = arrange(sample(), &options(Some("lastModified"), None, None));
        assert_eq!(names, ["doc1.txt", "doc2.txt", "doc3.txt", "newdoc.txt"]);
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let names = arrange(sample(), &options(None, None, Some("NEW")));
        assert_eq!(names, ["newdoc.txt"]);
    }

    #[test]
    fn test_filter_without_match_is_empty() {
        let names = arrange(sample(), &options(None, None, Some("nonexistent")));
        assert!(names.is_empty());
    }

    #[test]
    fn test_empty_filter_is_ignored() {
        let names = arrange(sample(), &options(None, None, Some("")));
        assert_eq!(names.len(), 4);
    }

    #[test]
    fn test_descending_sort_is_stable_for_ties() {
        let entries = vec![entry("b", 1, 0), entry("a", 1, 0), entry("c", 2, 0)];
        let names = arrange(entries, &options(Some("size"), Some("Descending"), None));
        assert_eq!(names, ["c", "b", "a"]);
    }
}
