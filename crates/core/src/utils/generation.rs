//! Fetch-generation guard for whole-collection replacement.
//!
//! Several operations replace an entire cached collection when their
//! response arrives (a sections-summary refresh, a breakdown fetch). There
//! is no request cancellation: when a newer fetch of the same kind starts,
//! the older response must be detected as superseded and discarded instead
//! of applied. `FetchGeneration` issues a [`GenerationToken`] per fetch;
//! the response is only applied while its token is still current.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic generation counter for one kind of whole-collection fetch.
#[derive(Debug, Default)]
pub struct FetchGeneration {
    current: AtomicU64,
}

/// Token captured when a fetch starts. Compare with
/// [`FetchGeneration::is_current`] before applying the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationToken(u64);

impl FetchGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new fetch: advances the generation and returns its token.
    /// Any token issued earlier is no longer current after this call.
    pub fn begin(&self) -> GenerationToken {
        GenerationToken(self.current.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Returns true while `token` belongs to the most recent fetch.
    pub fn is_current(&self, token: GenerationToken) -> bool {
        self.current.load(Ordering::SeqCst) == token.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_current_until_superseded() {
        let generation = FetchGeneration::new();

        let first = generation.begin();
        assert!(generation.is_current(first));

        let second = generation.begin();
        assert!(!generation.is_current(first), "older fetch is superseded");
        assert!(generation.is_current(second));
    }

    #[test]
    fn tokens_from_different_generations_are_distinct() {
        let generation = FetchGeneration::new();
        let a = generation.begin();
        let b = generation.begin();
        assert_ne!(a, b);
    }
}
