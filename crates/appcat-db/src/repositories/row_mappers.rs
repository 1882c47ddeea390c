//! Shared helpers for mapping between `SQLite` rows and catalog types.

use std::str::FromStr;

use appcat_core::domain::UnknownVariant;
use appcat_core::{FieldFilter, RepositoryError};
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

/// Map `SQLx` errors to `RepositoryError`.
///
/// Primary key and unique violations become `AlreadyExists`; everything else
/// is a storage failure.
pub fn map_sqlx_error(e: sqlx::Error) -> RepositoryError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() || db_err.message().contains("UNIQUE constraint failed") {
            return RepositoryError::AlreadyExists(db_err.message().to_string());
        }
    }
    RepositoryError::Storage(e.to_string())
}

/// Encode a string list for a JSON text column.
pub fn encode_list(items: &[String]) -> Result<String, RepositoryError> {
    serde_json::to_string(items).map_err(|e| RepositoryError::Serialization(e.to_string()))
}

/// Decode a JSON text column written by [`encode_list`].
pub fn decode_list(raw: &str) -> Result<Vec<String>, RepositoryError> {
    serde_json::from_str(raw).map_err(|e| RepositoryError::Serialization(e.to_string()))
}

/// Parse a stored enum tag.
pub fn parse_tag<T>(raw: &str) -> Result<T, RepositoryError>
where
    T: FromStr<Err = UnknownVariant>,
{
    raw.parse()
        .map_err(|e: UnknownVariant| RepositoryError::Serialization(e.to_string()))
}

pub fn parse_optional_tag<T>(raw: Option<&str>) -> Result<Option<T>, RepositoryError>
where
    T: FromStr<Err = UnknownVariant>,
{
    raw.map(parse_tag).transpose()
}

/// Timestamps are stored as RFC 3339 text with millisecond precision.
pub fn format_timestamp(ts: Option<DateTime<Utc>>) -> Option<String> {
    ts.map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
}

pub fn parse_timestamp(raw: Option<&str>) -> Result<Option<DateTime<Utc>>, RepositoryError> {
    raw.map(|s| {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| RepositoryError::Serialization(format!("bad timestamp '{s}': {e}")))
    })
    .transpose()
}

/// Child rows keep the caller's order through this column.
pub fn position(index: usize) -> i64 {
    i64::try_from(index).unwrap_or(i64::MAX)
}

/// Append `WHERE col = ? AND ...` for validated filters.
///
/// Column names come from the `FilterField` allow-list, never from callers.
pub fn push_filters<'a>(query: &mut QueryBuilder<'a, Sqlite>, filters: &'a [FieldFilter]) {
    for (i, filter) in filters.iter().enumerate() {
        query.push(if i == 0 { " WHERE " } else { " AND " });
        query.push(filter.field.column());
        query.push(" = ");
        query.push_bind(filter.value.as_str());
    }
}

/// Append `col IN (?, ?, ...)`. `values` must not be empty.
pub fn push_in_list<'a>(query: &mut QueryBuilder<'a, Sqlite>, column: &str, values: &'a [String]) {
    query.push(column);
    query.push(" IN (");
    let mut separated = query.separated(", ");
    for value in values {
        separated.push_bind(value.as_str());
    }
    separated.push_unseparated(")");
}

/// Stored keys of one child collection, in position order.
///
/// `sql` selects a single text column and takes the parent key binds.
pub async fn stored_keys(
    conn: &mut SqliteConnection,
    sql: &str,
    parent: &[&str],
) -> Result<Vec<String>, RepositoryError> {
    let mut query = sqlx::query_scalar::<_, String>(sql);
    for key in parent {
        query = query.bind(*key);
    }
    query.fetch_all(conn).await.map_err(map_sqlx_error)
}

/// Run a `SELECT EXISTS(...)` query.
pub async fn row_exists(
    conn: &mut SqliteConnection,
    sql: &str,
    binds: &[&str],
) -> Result<bool, RepositoryError> {
    let mut query = sqlx::query_scalar::<_, bool>(sql);
    for value in binds {
        query = query.bind(*value);
    }
    query.fetch_one(conn).await.map_err(map_sqlx_error)
}

/// `NotFound` for a write that matched no row.
pub fn ensure_affected(rows: u64, what: impl FnOnce() -> String) -> Result<(), RepositoryError> {
    if rows == 0 {
        Err(RepositoryError::NotFound(what()))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appcat_core::domain::SecurityProtocol;
    use chrono::TimeZone;

    #[test]
    fn test_list_round_trip() {
        let items = vec!["a.example.org".to_string(), "b.example.org".to_string()];
        let raw = encode_list(&items).unwrap();
        assert_eq!(decode_list(&raw).unwrap(), items);
        assert!(decode_list("not json").is_err());
    }

    #[test]
    fn test_unknown_tag_is_serialization_error() {
        let err = parse_tag::<SecurityProtocol>("PLAINTEXT").unwrap_err();
        assert!(matches!(err, RepositoryError::Serialization(_)));
        assert_eq!(
            parse_optional_tag::<SecurityProtocol>(Some("SSH_KEYS")).unwrap(),
            Some(SecurityProtocol::SshKeys)
        );
        assert_eq!(parse_optional_tag::<SecurityProtocol>(None).unwrap(), None);
    }

    #[test]
    fn test_timestamp_keeps_milliseconds() {
        let ts = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let raw = format_timestamp(Some(ts)).unwrap();
        assert_eq!(raw, "2023-11-14T22:13:20.123Z");
        assert_eq!(parse_timestamp(Some(&raw)).unwrap(), Some(ts));
    }
}
