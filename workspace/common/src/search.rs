//! Case-insensitive substring search over in-memory record lists.
//!
//! List pages narrow their records with a single query string taken from the
//! URL. The filtering itself lives here, away from any storage, so the same
//! rules hold no matter where the records came from:
//!
//! * an absent or empty query keeps every record;
//! * otherwise a record is kept when its searchable field contains the query,
//!   ignoring case;
//! * the query is a literal string, characters such as `.` or `*` match
//!   themselves;
//! * records keep their original relative order.

use tracing::trace;

/// A record kind that can be narrowed by a text query.
pub trait Searchable {
    /// Name of the URL query parameter carrying the search text.
    const QUERY_PARAM: &'static str;

    /// The field the query is matched against.
    fn search_field(&self) -> &str;
}

/// Keeps the records whose search field contains `query`, ignoring case.
pub fn search<T, I>(records: I, query: Option<&str>) -> Vec<T>
where
    T: Searchable,
    I: IntoIterator<Item = T>,
{
    let needle = match query {
        Some(q) if !q.is_empty() => q.to_lowercase(),
        _ => return records.into_iter().collect(),
    };

    trace!(param = T::QUERY_PARAM, query = %needle, "Filtering records");
    records
        .into_iter()
        .filter(|record| record.search_field().to_lowercase().contains(&needle))
        .collect()
}
