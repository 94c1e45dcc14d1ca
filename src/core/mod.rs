//! Eventbox core: registry, dispatcher and configuration.
//!
//! The public API from this module is [`Eventbox`], its [`EventboxBuilder`]
//! and [`Config`].
//!
//! Internal modules:
//! - [`registry`]: topic → subscriptions store with token identity;
//! - [`eventbox`]: fan-out dispatcher and emitter selection;
//! - [`builder`]: wires config, scheduler, emitter and diagnostics bus;
//! - [`config`]: instance settings.

mod builder;
mod config;
mod eventbox;
mod registry;

pub use builder::EventboxBuilder;
pub use config::Config;
pub use eventbox::Eventbox;
