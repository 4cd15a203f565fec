use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
};

use strum::{AsRefStr, Display};
use thiserror::Error;

use crate::subsystem::realtime::payload::{MonitoringUpdate, Notification};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "camelCase")]
pub enum ChannelName {
    Notifications,
    Monitoring,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub(super) const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("listener {id:?} on {channel} failed: {cause:?}")]
    ListenerFailed {
        channel: ChannelName,
        id: SubscriptionId,
        cause: anyhow::Error,
    },
    #[error("listener {id:?} on {channel} panicked: {message}")]
    ListenerPanicked {
        channel: ChannelName,
        id: SubscriptionId,
        message: String,
    },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PublishReport {
    pub delivered: usize,
    pub failed: usize,
}

pub type Listener<P> = Box<dyn FnMut(&P) -> anyhow::Result<()>>;

/// Listeners of one channel, in subscription order.
pub struct Topic<P> {
    listeners: Vec<(SubscriptionId, Listener<P>)>,
}

impl<P> Default for Topic<P> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }
}

impl<P> Topic<P> {
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub(super) fn add(&mut self, id: SubscriptionId, listener: Listener<P>) {
        self.listeners.push((id, listener));
    }

    pub(super) fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(l, _)| *l != id);
        before != self.listeners.len()
    }

    /// Runs every listener with `payload`. A listener that errors or panics
    /// is logged and counted; the rest still run.
    pub(super) fn dispatch(&mut self, channel: ChannelName, payload: &P) -> PublishReport {
        let mut report = PublishReport::default();

        for (id, listener) in &mut self.listeners {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| listener(payload)));
            let err = match outcome {
                Ok(Ok(())) => {
                    report.delivered += 1;
                    continue;
                }
                Ok(Err(cause)) => DispatchError::ListenerFailed {
                    channel,
                    id: *id,
                    cause,
                },
                Err(panic) => DispatchError::ListenerPanicked {
                    channel,
                    id: *id,
                    message: panic_message(panic.as_ref()),
                },
            };
            // panics already went through the log-panics hook with a backtrace
            log::warn!("{err}");
            report.failed += 1;
        }

        report
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[derive(Default)]
pub struct Subscribers {
    notifications: Topic<Notification>,
    monitoring: Topic<MonitoringUpdate>,
}

/// A pub/sub channel with a fixed payload type.
pub trait Channel: 'static {
    type Payload: 'static;
    const NAME: ChannelName;

    fn topic(subscribers: &Subscribers) -> &Topic<Self::Payload>;
    fn topic_mut(subscribers: &mut Subscribers) -> &mut Topic<Self::Payload>;
}

/// New notification records.
pub enum Notifications {}

impl Channel for Notifications {
    type Payload = Notification;
    const NAME: ChannelName = ChannelName::Notifications;

    fn topic(subscribers: &Subscribers) -> &Topic<Notification> {
        &subscribers.notifications
    }
    fn topic_mut(subscribers: &mut Subscribers) -> &mut Topic<Notification> {
        &mut subscribers.notifications
    }
}

/// Replacement monitoring datasets.
pub enum Monitoring {}

impl Channel for Monitoring {
    type Payload = MonitoringUpdate;
    const NAME: ChannelName = ChannelName::Monitoring;

    fn topic(subscribers: &Subscribers) -> &Topic<MonitoringUpdate> {
        &subscribers.monitoring
    }
    fn topic_mut(subscribers: &mut Subscribers) -> &mut Topic<MonitoringUpdate> {
        &mut subscribers.monitoring
    }
}
