use std::collections::HashMap;

use parking_lot::Mutex;

/// Identifies one request for a logical key. Tokens for the same key
/// increase monotonically.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestToken {
    key: String,
    generation: u64,
}

impl RequestToken {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Hands out request tokens and answers whether a token is still the most
/// recent one for its key. A response carrying an outdated token belongs to
/// a superseded request and should be discarded.
#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: Mutex<HashMap<String, u64>>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request for `key`, superseding any earlier one.
    pub fn begin(&self, key: &str) -> RequestToken {
        let mut latest = self.latest.lock();
        let generation = latest.entry(key.to_string()).or_insert(0);
        *generation += 1;
        RequestToken {
            key: key.to_string(),
            generation: *generation,
        }
    }

    pub fn is_latest(&self, token: &RequestToken) -> bool {
        self.latest
            .lock()
            .get(&token.key)
            .is_some_and(|g| *g == token.generation)
    }
}
