//! Child-collection replacement planning.
//!
//! Updating an aggregate replaces each owned collection wholesale. Storage
//! adapters apply that as a diff against what is stored: rows whose key is
//! gone are deleted, rows whose key survives are rewritten in place, and new
//! keys are inserted. Each collection is planned on its own so that one
//! collection's orphan pass never touches another's rows.

use std::collections::HashSet;

use thiserror::Error;

/// The incoming collection named the same key twice.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("duplicate key '{0}' in replacement collection")]
pub struct DuplicateKey(pub String);

/// Writes needed to turn the stored collection into the incoming one.
#[derive(Debug, PartialEq, Eq)]
pub struct SyncPlan<'a, T> {
    /// Stored keys absent from the incoming collection.
    pub delete: Vec<String>,
    /// Incoming items whose key is already stored, with their position.
    pub update: Vec<(usize, &'a T)>,
    /// Incoming items with a new key, with their position.
    pub insert: Vec<(usize, &'a T)>,
}

impl<T> SyncPlan<'_, T> {
    pub fn is_noop(&self) -> bool {
        self.delete.is_empty() && self.update.is_empty() && self.insert.is_empty()
    }
}

/// Plan the replacement of `stored_keys` by `incoming`.
///
/// Positions are indexes into `incoming`, so persisting them keeps the
/// caller's order.
pub fn plan<'a, T, F>(
    stored_keys: &[String],
    incoming: &'a [T],
    key_of: F,
) -> Result<SyncPlan<'a, T>, DuplicateKey>
where
    F: Fn(&T) -> &str,
{
    let stored: HashSet<&str> = stored_keys.iter().map(String::as_str).collect();
    let mut seen: HashSet<&str> = HashSet::with_capacity(incoming.len());
    let mut update = Vec::new();
    let mut insert = Vec::new();

    for (position, item) in incoming.iter().enumerate() {
        let key = key_of(item);
        if !seen.insert(key) {
            return Err(DuplicateKey(key.to_string()));
        }
        if stored.contains(key) {
            update.push((position, item));
        } else {
            insert.push((position, item));
        }
    }

    let delete = stored_keys
        .iter()
        .filter(|k| !seen.contains(k.as_str()))
        .cloned()
        .collect();

    Ok(SyncPlan {
        delete,
        update,
        insert,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_missing_keys_are_deleted() {
        let incoming = vec!["c1".to_string()];
        let plan = plan(&keys(&["c1", "c2"]), &incoming, String::as_str).unwrap();

        assert_eq!(plan.delete, keys(&["c2"]));
        assert_eq!(plan.update, vec![(0, &incoming[0])]);
        assert!(plan.insert.is_empty());
    }

    #[test]
    fn test_new_keys_are_inserted_with_position() {
        let incoming = keys(&["c1", "c3"]);
        let plan = plan(&keys(&["c1"]), &incoming, String::as_str).unwrap();

        assert!(plan.delete.is_empty());
        assert_eq!(plan.insert, vec![(1, &incoming[1])]);
    }

    #[test]
    fn test_empty_incoming_deletes_everything() {
        let incoming: Vec<String> = Vec::new();
        let plan = plan(&keys(&["a", "b"]), &incoming, String::as_str).unwrap();
        assert_eq!(plan.delete, keys(&["a", "b"]));
    }

    #[test]
    fn test_duplicate_incoming_key_is_an_error() {
        let incoming = keys(&["a", "a"]);
        let err = plan(&[], &incoming, String::as_str).unwrap_err();
        assert_eq!(err, DuplicateKey("a".to_string()));
    }

    #[test]
    fn test_identical_collections_only_update() {
        let incoming = keys(&["a", "b"]);
        let plan = plan(&incoming, &incoming, String::as_str).unwrap();
        assert!(plan.delete.is_empty());
        assert!(plan.insert.is_empty());
        assert_eq!(plan.update.len(), 2);
        assert!(!plan.is_noop());
    }
}
