//! Identity generation for catalog entities.
//!
//! Ids not supplied by a caller are derived from the entity's name field:
//! a slug of the name followed by a random suffix, so the id always starts
//! with the slug and two calls for the same name never collide.

use uuid::Uuid;

/// Sentinel older clients send in place of an id they want generated.
pub const DEFAULT_ID: &str = "DO_NOT_SET_AT_CLIENTS";

/// Whether `candidate` should be replaced by a generated id.
pub fn is_unset(candidate: &str) -> bool {
    candidate.trim().is_empty() || candidate == DEFAULT_ID
}

/// Use `candidate` verbatim if set, otherwise derive an id from `name`.
pub fn generate_id(candidate: &str, name: &str) -> String {
    if is_unset(candidate) {
        name_based_id(name)
    } else {
        candidate.to_string()
    }
}

/// A fresh `{slug}_{uuid}` id for `name`.
pub fn name_based_id(name: &str) -> String {
    let slug = slugify(name);
    let suffix = Uuid::new_v4().simple();
    if slug.is_empty() {
        suffix.to_string()
    } else {
        format!("{slug}_{suffix}")
    }
}

/// A surrogate id for rows with no natural name, such as policies.
pub fn surrogate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Lower-case `name` and collapse every run of non-alphanumeric characters
/// into a single underscore. Leading and trailing separators are dropped.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_sep = false;
    for ch in name.trim().chars() {
        if ch.is_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_sep = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("localhost"), "localhost");
        assert_eq!(slugify("  Stampede 2.tacc  "), "stampede_2_tacc");
        assert_eq!(slugify("a -- b"), "a_b");
        assert_eq!(slugify("--"), "");
    }

    #[test]
    fn test_generated_id_starts_with_slug() {
        let id = generate_id("", "Comet SDSC");
        assert!(id.starts_with("comet_sdsc_"));
    }

    #[test]
    fn test_generated_ids_are_distinct() {
        let a = generate_id("", "host");
        let b = generate_id("", "host");
        assert_ne!(a, b);
    }

    #[test]
    fn test_supplied_id_is_kept_verbatim() {
        assert_eq!(generate_id("My-Id", "host"), "My-Id");
    }

    #[test]
    fn test_sentinel_is_treated_as_unset() {
        let id = generate_id(DEFAULT_ID, "queue");
        assert_ne!(id, DEFAULT_ID);
        assert!(id.starts_with("queue_"));
    }

    #[test]
    fn test_empty_name_still_yields_an_id() {
        let id = generate_id("", "");
        assert!(!id.is_empty());
    }

    #[test]
    fn test_surrogate_ids_are_uuids() {
        let id = surrogate_id();
        assert!(Uuid::parse_str(&id).is_ok());
    }
}
