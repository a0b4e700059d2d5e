//! # Subscribe: watching a poll from the outside.
//!
//! A subscriber receives a poll's [`Event`]s in publication order on a worker task
//! of its own. It is strictly an observer: a poll never waits for it and its
//! behavior never changes an [`Outcome`](crate::Outcome).
//!
//! A subscriber that is slower than the poll loses events once its queue is full.
//! Every lane is then offered a [`SubscriberOverflow`](crate::EventKind::SubscriberOverflow)
//! naming it, so the other subscribers can see the gap. The lagging subscriber usually
//! misses its own report too, since its queue is the one that is full.
//! A poll emits a handful of events per probe call, so size the queue from the number
//! of calls a poll can make between two of your `on_event` completions.

use async_trait::async_trait;

use crate::events::Event;

const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Observer of poll lifecycle events.
///
/// `on_event` should not block the executor. A panic inside it is caught,
/// logged and reported to the other subscribers; the worker keeps running.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event.
    async fn on_event(&self, event: &Event);

    /// Name used in logs and in delivery reports.
    ///
    /// Defaults to the type name.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Number of events that may wait for this subscriber (at least 1).
    fn queue_capacity(&self) -> usize {
        DEFAULT_QUEUE_CAPACITY
    }
}
