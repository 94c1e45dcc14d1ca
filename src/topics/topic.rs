//! # Topic names.
//!
//! A [`Topic`] is a non-empty string. There is no hierarchy and no wildcard
//! matching: two topics are the same only if their strings are equal.
//!
//! ## Example
//! ```rust
//! use eventbox::Topic;
//!
//! let t = Topic::new("orders.created").unwrap();
//! assert_eq!(t.as_str(), "orders.created");
//! assert!(Topic::new("").is_err());
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use crate::error::EventboxError;

/// Validated topic name.
///
/// Backed by `Arc<str>`, so clones handed to emissions and diagnostic events
/// share one allocation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Topic(Arc<str>);

impl Topic {
    /// Validates and wraps a topic name.
    ///
    /// Returns [`EventboxError::InvalidTopic`] for an empty string.
    pub fn new(name: impl AsRef<str>) -> Result<Self, EventboxError> {
        let name = name.as_ref();
        if name.is_empty() {
            return Err(EventboxError::InvalidTopic { reason: "empty" });
        }
        Ok(Self(Arc::from(name)))
    }

    /// Returns the topic name.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the shared name, for attaching to events without copying.
    #[inline]
    pub(crate) fn shared(&self) -> Arc<str> {
        Arc::clone(&self.0)
    }
}

impl AsRef<str> for Topic {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Topic {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for Topic {
    type Error = EventboxError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Topic::new(value)
    }
}

impl TryFrom<String> for Topic {
    type Error = EventboxError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Topic::new(value)
    }
}
