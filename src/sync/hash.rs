//! Content hashing for change detection.
//!
//! The store hashes the serialized JSON body of every entity and compares it
//! with the hash recorded at the last save, so unchanged rows are never
//! rewritten.

use sha2::{Digest, Sha256};

/// SHA256 hex digest of a string.
#[must_use]
pub fn hash_str(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Check if an entity has changed since it was last persisted.
///
/// Returns `true` if there is no stored hash or the hashes differ.
#[must_use]
pub fn has_changed(current_hash: &str, stored_hash: Option<&str>) -> bool {
    stored_hash.is_none_or(|h| h != current_hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_str_deterministic() {
        let body = r#"{"uid":"r1","servings":4}"#;
        assert_eq!(hash_str(body), hash_str(body));
        assert_eq!(hash_str(body).len(), 64); // SHA256 produces 64 hex chars
    }

    #[test]
    fn test_hash_str_changes_with_content() {
        assert_ne!(
            hash_str(r#"{"uid":"r1","servings":4}"#),
            hash_str(r#"{"uid":"r1","servings":6}"#)
        );
    }

    #[test]
    fn test_has_changed() {
        assert!(has_changed("abc123", None));
        assert!(has_changed("abc123", Some("xyz789")));
        assert!(!has_changed("abc123", Some("abc123")));
    }
}
