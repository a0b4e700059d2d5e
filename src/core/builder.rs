use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::poller::Poller;
use crate::{
    config::Config,
    stages::Stage,
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for constructing a [`Poller`] with optional features.
pub struct PollerBuilder {
    cfg: Config,
    interrupt: Option<CancellationToken>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl PollerBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            interrupt: None,
            subscribers: Vec::new(),
        }
    }

    /// Replaces the stage plan from the configuration.
    ///
    /// Stages are not checked here; every `poll` validates them first.
    pub fn with_stages(mut self, stages: impl Into<Vec<Stage>>) -> Self {
        self.cfg.stages = stages.into();
        self
    }

    /// Sets the external interruption signal.
    ///
    /// The same token is observed by every poll made with the built poller;
    /// once cancelled, each later poll ends as interrupted after its first probe.
    pub fn with_interrupt(mut self, token: CancellationToken) -> Self {
        self.interrupt = Some(token);
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive poll events through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds and returns the poller.
    ///
    /// Spawns one worker per subscriber, so it must run inside a tokio runtime
    /// when any subscriber is configured.
    pub fn build(self) -> Poller {
        let subs = SubscriberSet::new(self.subscribers);
        Poller::new_internal(self.cfg, self.interrupt, subs)
    }
}
