/// Share slug generation
///
/// Slugs are the unguessable tokens in public share URLs: fixed-length,
/// alphanumeric, drawn from a space large enough (62^12, ~71 bits) that
/// random collisions are negligible at any realistic record count. The
/// UNIQUE column constraint stays the final authority either way.
use crate::error::{PinoryError, PinoryResult};
use rand::{distributions::Alphanumeric, Rng};

/// Fixed slug length
pub const SLUG_LEN: usize = 12;

/// Retry budget for collision resolution
pub const MAX_ATTEMPTS: usize = 5;

/// Generate a random slug
pub fn generate() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SLUG_LEN)
        .map(char::from)
        .collect()
}

/// Generate a slug that does not collide per the given predicate
///
/// Retries up to MAX_ATTEMPTS times; if every draw collides the caller gets
/// SlugExhausted, to be surfaced as a retryable server error.
pub fn generate_unique(mut exists: impl FnMut(&str) -> bool) -> PinoryResult<String> {
    for _ in 0..MAX_ATTEMPTS {
        let candidate = generate();
        if !exists(&candidate) {
            return Ok(candidate);
        }
    }

    Err(PinoryError::SlugExhausted)
}

/// Whether a string looks like a slug this module produced
pub fn is_valid_format(value: &str) -> bool {
    value.len() == SLUG_LEN && value.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_format() {
        let slug = generate();
        assert_eq!(slug.len(), SLUG_LEN);
        assert!(slug.chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(is_valid_format(&slug));
    }

    #[test]
    fn test_generated_slugs_are_unique() {
        let mut seen = HashSet::new();
        for _ in 0..1000 {
            seen.insert(generate());
        }
        // 62^12 space; 1000 draws colliding would point at a broken RNG
        assert_eq!(seen.len(), 1000);
    }

    #[test]
    fn test_generate_unique_skips_collisions() {
        let mut taken = HashSet::new();
        taken.insert(generate());

        let slug = generate_unique(|candidate| taken.contains(candidate)).unwrap();
        assert!(!taken.contains(&slug));
    }

    #[test]
    fn test_generate_unique_exhausts() {
        let mut attempts = 0;
        let err = generate_unique(|_| {
            attempts += 1;
            true
        })
        .unwrap_err();

        assert!(matches!(err, PinoryError::SlugExhausted));
        assert_eq!(attempts, MAX_ATTEMPTS);
    }

    #[test]
    fn test_format_validation() {
        assert!(!is_valid_format("short"));
        assert!(!is_valid_format("has spaces in"));
        assert!(!is_valid_format("with/slashes"));
        assert!(!is_valid_format(&"x".repeat(SLUG_LEN + 1)));
    }
}
