//! # Topics and subscription identity.
//!
//! - [`Topic`] - validated, cheaply cloneable topic name
//! - [`Token`] - opaque identity of one subscription
//! - [`Selector`] - what an unsubscribe call removes

mod selector;
mod token;
mod topic;

pub use selector::Selector;
pub use token::{Token, TokenSource};
pub use topic::Topic;
