//! Object key derivation.

/// Object key for a file: `{repository_id}/{collection_id}/{fid}`.
///
/// Empty segments are skipped, so a record without a repository still maps to
/// `{collection_id}/{fid}`.
pub fn object_key(repository_id: &str, collection_id: &str, fid: &str) -> String {
    [repository_id, collection_id, fid]
        .iter()
        .map(|segment| segment.trim_matches('/'))
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_layout() {
        assert_eq!(
            object_key("default", "default", "v1-1234"),
            "default/default/v1-1234"
        );
        assert_eq!(object_key("di_a1", "bi_b2", "f"), "di_a1/bi_b2/f");
    }

    #[test]
    fn test_object_key_skips_empty_segments() {
        assert_eq!(object_key("", "bi_b2", "f"), "bi_b2/f");
        assert_eq!(object_key("di_a1/", "/bi_b2", "f"), "di_a1/bi_b2/f");
    }
}
