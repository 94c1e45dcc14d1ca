//! # Subscription tokens.
//!
//! A [`Token`] identifies exactly one subscription. Tokens come from a
//! [`TokenSource`] owned by a registry: the counter only moves forward, so a
//! token is never handed out twice by the same registry, even after removal
//! or [`reset_all`](crate::Eventbox::reset_all).

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque subscription identity.
///
/// Ordered by issue time: a smaller token was minted earlier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Token(u64);

impl Token {
    /// Raw numeric value, for logs and diagnostics.
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic token counter. The first token is `#1`.
#[derive(Debug, Default)]
pub struct TokenSource {
    last: AtomicU64,
}

impl TokenSource {
    /// Creates a fresh counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mints the next token.
    pub fn next(&self) -> Token {
        Token(self.last.fetch_add(1, Ordering::Relaxed) + 1)
    }
}
