//! Identifier generation for repositories, collections and files.
//!
//! Namespace identifiers are short random tokens so they cannot be enumerated and can
//! coexist with identifiers supplied by callers. File identifiers are versioned UUIDs.

use rand::distr::Alphanumeric;
use rand::Rng;
use uuid::Uuid;

use crate::constants::{
    COLLECTION_ID_PREFIX, FILE_ID_PREFIX, MAX_IDENTIFIER_LEN, NAMESPACE_ID_RANDOM_LEN,
    REPOSITORY_ID_PREFIX,
};
use crate::error::AppError;

fn random_token(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// New repository identifier, e.g. `di_4fQz81Ka`.
pub fn new_repository_id() -> String {
    format!("{}{}", REPOSITORY_ID_PREFIX, random_token(NAMESPACE_ID_RANDOM_LEN))
}

/// New collection identifier, e.g. `bi_Tr0pX2mb`.
pub fn new_collection_id() -> String {
    format!("{}{}", COLLECTION_ID_PREFIX, random_token(NAMESPACE_ID_RANDOM_LEN))
}

/// New file identifier: `v1-` followed by a random UUID.
pub fn new_file_id() -> String {
    format!("{}{}", FILE_ID_PREFIX, Uuid::new_v4())
}

/// Check an identifier supplied by a caller.
///
/// Identifiers become segments of object keys (joined with `/`) and of staging keys
/// (joined with `:`). Only ASCII letters, digits, `-`, `_` and `.` are accepted, and the
/// segments `.` and `..` are refused.
pub fn validate_identifier(field: &str, id: &str) -> Result<(), AppError> {
    if id.is_empty() {
        return Err(AppError::InvalidInput(format!("{} must not be empty", field)));
    }

    if id.len() > MAX_IDENTIFIER_LEN {
        return Err(AppError::InvalidInput(format!(
            "{} must be at most {} characters",
            field, MAX_IDENTIFIER_LEN
        )));
    }

    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.');
    if id == "." || id == ".." || !id.chars().all(allowed) {
        return Err(AppError::InvalidInput(format!(
            "{} may only contain ASCII letters, digits, '-', '_' and '.', got {:?}",
            field, id
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_id_shape() {
        let id = new_repository_id();
        assert!(id.starts_with("di_"));
        assert_eq!(id.len(), 3 + NAMESPACE_ID_RANDOM_LEN);
        assert!(id[3..].chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_collection_id_shape() {
        let id = new_collection_id();
        assert!(id.starts_with("bi_"));
        assert_eq!(id.len(), 3 + NAMESPACE_ID_RANDOM_LEN);
    }

    #[test]
    fn test_file_id_is_versioned_uuid() {
        let id = new_file_id();
        let uuid_part = id.strip_prefix("v1-").expect("missing version prefix");
        assert!(Uuid::parse_str(uuid_part).is_ok());
        assert_ne!(new_file_id(), id);
    }

    #[test]
    fn test_generated_ids_pass_validation() {
        assert!(validate_identifier("repository_id", &new_repository_id()).is_ok());
        assert!(validate_identifier("collection_id", &new_collection_id()).is_ok());
        assert!(validate_identifier("fid", &new_file_id()).is_ok());
        assert!(validate_identifier("fid", "photo.v2_final-1").is_ok());
    }

    #[test]
    fn test_separators_and_dot_segments_rejected() {
        for id in [
            "", "/", "a/b", "b/c", "a:b", "a\\b", ".", "..", "a b", "tab\there", "nul\0",
            "caf\u{e9}",
        ] {
            assert!(
                matches!(validate_identifier("fid", id), Err(AppError::InvalidInput(_))),
                "{:?} should be rejected",
                id
            );
        }
    }

    #[test]
    fn test_overlong_identifier_rejected() {
        let id = "a".repeat(MAX_IDENTIFIER_LEN + 1);
        assert!(validate_identifier("collection_id", &id).is_err());
        assert!(validate_identifier("collection_id", &id[1..]).is_ok());
    }
}
