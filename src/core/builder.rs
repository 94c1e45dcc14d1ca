use std::sync::Arc;

use crate::{
    core::Config,
    emit::{Deferred, EmitterRef, Scheduler, TokioScheduler},
    error::EventboxError,
    events::Bus,
};
use super::eventbox::Eventbox;

/// Builder for constructing an [`Eventbox`] with optional overrides.
pub struct EventboxBuilder<T> {
    cfg: Config,
    scheduler: Option<Arc<dyn Scheduler>>,
    emitter: Option<EmitterRef<T>>,
}

impl<T> EventboxBuilder<T>
where
    T: Send + Sync + 'static,
{
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            scheduler: None,
            emitter: None,
        }
    }

    /// Sets the scheduler behind the built-in deferred emitter.
    ///
    /// Without one, [`build`](Self::build) captures the current tokio runtime.
    /// Pass [`TokioScheduler::parallel`] here to run on a multi-thread runtime.
    pub fn with_scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Starts the eventbox with `emitter` as its default instead of the
    /// built-in deferred one.
    ///
    /// `set_default_emitter(None)` still restores the built-in emitter.
    pub fn with_emitter(mut self, emitter: EmitterRef<T>) -> Self {
        self.emitter = Some(emitter);
        self
    }

    /// Builds and returns the Eventbox instance.
    ///
    /// When no scheduler was set, fails with [`EventboxError::RuntimeUnavailable`]
    /// outside a tokio runtime and with [`EventboxError::MultiThreadRuntime`]
    /// inside a multi-thread one.
    pub fn build(self) -> Result<Eventbox<T>, EventboxError> {
        let scheduler: Arc<dyn Scheduler> = match self.scheduler {
            Some(s) => s,
            None => Arc::new(TokioScheduler::try_current()?),
        };
        let builtin: EmitterRef<T> = Arc::new(Deferred::new(scheduler));
        let initial = self.emitter.unwrap_or_else(|| Arc::clone(&builtin));

        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        Ok(Eventbox::from_parts(self.cfg, bus, builtin, initial))
    }
}
