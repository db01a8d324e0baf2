//! Client-side identifier allocation.
//!
//! Entities are keyed by IDs allocated on the client at the moment of
//! creation, with no network round-trip. The ID travels in the creation
//! request body, so the server persists the same key the client is already
//! displaying and nothing ever needs to be renamed after the fact.

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{Error, Result};

/// ID prefix for projects (e.g., "pr-a1b2c3d4e5f6").
pub const PROJECT_PREFIX: &str = "pr";
/// ID prefix for notes.
pub const NOTE_PREFIX: &str = "nt";
/// ID prefix for commands.
pub const COMMAND_PREFIX: &str = "cm";
/// ID prefix for links.
pub const LINK_PREFIX: &str = "lk";

/// Number of hex characters in the ID suffix.
const SUFFIX_LEN: usize = 12;

/// Allocate a new entity ID.
///
/// Format: `<prefix>-<12 hex chars>`, derived from a v4 UUID plus the
/// current nanosecond timestamp. Statistically unique, suitable as a
/// permanent durable key.
pub fn allocate(prefix: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(Uuid::new_v4().as_bytes());
    hasher.update(
        chrono::Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or(0)
            .to_le_bytes(),
    );
    let hash = hasher.finalize();
    let hash_hex = format!("{:x}", hash);
    format!("{}-{}", prefix, &hash_hex[..SUFFIX_LEN])
}

/// Validate that an ID matches the expected format.
pub fn validate_id(id: &str, prefix: &str) -> Result<()> {
    if !id.starts_with(&format!("{}-", prefix)) {
        return Err(Error::InvalidId(format!(
            "ID must start with '{}-', got: {}",
            prefix, id
        )));
    }

    let suffix = &id[prefix.len() + 1..];
    if suffix.len() != SUFFIX_LEN || !suffix.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::InvalidId(format!(
            "ID suffix must be {} hex characters, got: {}",
            SUFFIX_LEN, suffix
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_allocate_format() {
        let id = allocate(PROJECT_PREFIX);
        assert!(id.starts_with("pr-"));
        validate_id(&id, PROJECT_PREFIX).unwrap();
    }

    #[test]
    fn test_allocate_unique() {
        let ids: HashSet<String> = (0..1000).map(|_| allocate(NOTE_PREFIX)).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_validate_rejects_wrong_prefix() {
        let id = allocate(NOTE_PREFIX);
        assert!(validate_id(&id, PROJECT_PREFIX).is_err());
    }

    #[test]
    fn test_validate_rejects_short_suffix() {
        assert!(validate_id("pr-abc", PROJECT_PREFIX).is_err());
        assert!(validate_id("pr-zzzzzzzzzzzz", PROJECT_PREFIX).is_err());
    }
}
