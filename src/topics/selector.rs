//! # Unsubscribe selectors.
//!
//! A [`Selector`] tells an unsubscribe call which subscriptions of a topic to drop:
//!
//! | Selector                 | Removes                                              |
//! |--------------------------|------------------------------------------------------|
//! | `Selector::All`          | every subscription of the topic                      |
//! | `Selector::Token(t)`     | exactly the subscription issued as `t`               |
//! | `Selector::Handler(h)`   | **every** subscription of the topic whose handler is `h` |
//!
//! `None::<Token>` converts to `All`, so an "empty" selector clears the topic.

use std::fmt;
use std::sync::Arc;

use crate::handlers::HandlerRef;
use crate::topics::Token;

/// Which subscriptions an unsubscribe call removes.
pub enum Selector<T> {
    /// All handlers of the topic.
    All,
    /// The single subscription issued with this token.
    Token(Token),
    /// All subscriptions of the topic holding this handler (pointer identity).
    Handler(HandlerRef<T>),
}

impl<T> From<Token> for Selector<T> {
    fn from(token: Token) -> Self {
        Selector::Token(token)
    }
}

impl<T> From<Option<Token>> for Selector<T> {
    fn from(token: Option<Token>) -> Self {
        token.map_or(Selector::All, Selector::Token)
    }
}

impl<T> From<HandlerRef<T>> for Selector<T> {
    fn from(handler: HandlerRef<T>) -> Self {
        Selector::Handler(handler)
    }
}

impl<T> From<&HandlerRef<T>> for Selector<T> {
    fn from(handler: &HandlerRef<T>) -> Self {
        Selector::Handler(Arc::clone(handler))
    }
}

impl<T> Clone for Selector<T> {
    fn clone(&self) -> Self {
        match self {
            Selector::All => Selector::All,
            Selector::Token(t) => Selector::Token(*t),
            Selector::Handler(h) => Selector::Handler(Arc::clone(h)),
        }
    }
}

impl<T: 'static> fmt::Debug for Selector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::All => f.write_str("All"),
            Selector::Token(t) => f.debug_tuple("Token").field(t).finish(),
            Selector::Handler(h) => f.debug_tuple("Handler").field(&h.name()).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HandlerError;
    use crate::handlers::{HandlerFn, Payload};
    use crate::topics::TokenSource;

    #[test]
    fn test_none_means_all() {
        let sel: Selector<u8> = None::<Token>.into();
        assert!(matches!(sel, Selector::All));
    }

    #[test]
    fn test_token_conversions() {
        let t = TokenSource::new().next();
        let a: Selector<u8> = t.into();
        let b: Selector<u8> = Some(t).into();
        assert!(matches!(a, Selector::Token(x) if x == t));
        assert!(matches!(b, Selector::Token(x) if x == t));
        assert_eq!(format!("{a:?}"), "Token(Token(1))");
    }

    #[test]
    fn test_handler_selector_debug_shows_name() {
        let h: HandlerRef<String> =
            HandlerFn::arc("audit", |_p: Payload<String>| async { Ok::<_, HandlerError>(()) });
        let sel: Selector<String> = (&h).into();
        assert_eq!(format!("{sel:?}"), "Handler(\"audit\")");
        assert_eq!(format!("{:?}", Selector::<String>::All), "All");
    }
}
