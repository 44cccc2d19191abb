//! Host readiness.
//!
//! When the batch is launched before the modeling host has finished starting,
//! the batch start is registered as a one-shot handler and run when the host
//! signals readiness. Handlers fire at most once, in subscription order.

use recast_core::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

/// Handle returned by [`ReadinessRegistry::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Raw value
    #[must_use]
    pub fn as_raw(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "subscription_{}", self.0)
    }
}

type Handler<'a> = Box<dyn FnOnce() + 'a>;

/// One-shot registry of host readiness handlers
#[derive(Default)]
pub struct ReadinessRegistry<'a> {
    handlers: Vec<(SubscriptionId, Handler<'a>)>,
    next_id: u64,
    fired: bool,
}

impl<'a> ReadinessRegistry<'a> {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
            next_id: 0,
            fired: false,
        }
    }

    /// Register `handler` to run when the host becomes ready
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::RegistrySpent`] if readiness was already signalled
    pub fn subscribe(&mut self, handler: impl FnOnce() + 'a) -> CoreResult<SubscriptionId> {
        if self.fired {
            return Err(CoreError::RegistrySpent);
        }
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, Box::new(handler)));
        tracing::debug!(subscription = %id, "Subscribed to host readiness");
        Ok(id)
    }

    /// Remove a handler before it fires; false if it is unknown or already ran
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(handler_id, _)| *handler_id != id);
        self.handlers.len() != before
    }

    /// Signal readiness, running every pending handler once
    ///
    /// Returns the number of handlers run. Later calls run nothing.
    pub fn notify_ready(&mut self) -> usize {
        if self.fired {
            return 0;
        }
        self.fired = true;

        let handlers = std::mem::take(&mut self.handlers);
        let count = handlers.len();
        tracing::info!(handlers = count, "Host ready");
        for (_, handler) in handlers {
            handler();
        }
        count
    }

    /// Whether readiness was already signalled
    #[must_use]
    pub fn is_spent(&self) -> bool {
        self.fired
    }

    /// Handlers waiting for readiness
    #[must_use]
    pub fn pending(&self) -> usize {
        self.handlers.len()
    }
}

impl std::fmt::Debug for ReadinessRegistry<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadinessRegistry")
            .field("pending", &self.handlers.len())
            .field("next_id", &self.next_id)
            .field("fired", &self.fired)
            .finish()
    }
}

/// How a batch start was scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Launch {
    /// The host was ready and the start ran immediately
    Immediate,
    /// The start waits for host readiness
    Deferred(SubscriptionId),
}

impl Launch {
    /// Run `start` now if the host is ready, else defer it to `registry`
    ///
    /// # Errors
    ///
    /// Returns error if the start must be deferred but the registry is spent
    pub fn start<'a>(
        host_ready: bool,
        registry: &mut ReadinessRegistry<'a>,
        start: impl FnOnce() + 'a,
    ) -> CoreResult<Self> {
        if host_ready {
            start();
            return Ok(Self::Immediate);
        }
        let id = registry.subscribe(start)?;
        tracing::info!(subscription = %id, "Waiting for host to become ready");
        Ok(Self::Deferred(id))
    }

    /// Whether the start already ran
    #[must_use]
    pub fn is_immediate(&self) -> bool {
        matches!(self, Self::Immediate)
    }
}
