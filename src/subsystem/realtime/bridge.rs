use std::time::Duration;

use chrono::{DateTime, Utc};
use smallvec::SmallVec;
use strum::Display;

use crate::{
    backend::task::{Scheduler, TaskType, TimerHandle},
    config::GeneralConfig,
    subsystem::realtime::{
        mock::MockFeed,
        registry::{Channel, Monitoring, Notifications, PublishReport, Subscribers, SubscriptionId},
    },
};

/// Which simulated update a timer produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "camelCase")]
pub enum TickKind {
    Notifications,
    Monitoring,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeConfig {
    pub notification_interval: Duration,
    pub monitoring_interval: Duration,
}

impl BridgeConfig {
    pub const fn from_general(config: &GeneralConfig) -> Self {
        Self {
            notification_interval: config.notification_interval(),
            monitoring_interval: config.monitoring_interval(),
        }
    }
}

/// Publish/subscribe hub that turns timer ticks into simulated push updates.
///
/// `init` and `stop` only arm and disarm the timers. Subscriptions are kept
/// across restarts.
pub struct RealtimeBridge {
    config: BridgeConfig,
    subscribers: Subscribers,
    feed: MockFeed,
    timers: SmallVec<[TimerHandle; 2]>,
    running: bool,
    next_subscription: u64,
}

impl RealtimeBridge {
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            config,
            subscribers: Subscribers::default(),
            feed: MockFeed::new(),
            timers: SmallVec::new(),
            running: false,
            next_subscription: 0,
        }
    }

    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Arms one repeating timer per update class. Calling it again while
    /// running does nothing.
    pub fn init(&mut self, scheduler: &mut dyn Scheduler) {
        if self.running {
            log::debug!("Realtime bridge already running");
            return;
        }

        for (kind, interval) in [
            (TickKind::Notifications, self.config.notification_interval),
            (TickKind::Monitoring, self.config.monitoring_interval),
        ] {
            let handle = scheduler.schedule_repeating(interval, TaskType::Realtime(kind));
            log::debug!("Scheduled {kind} ticks every {interval:?}");
            self.timers.push(handle);
        }

        self.running = true;
        log::info!("Realtime bridge started");
    }

    /// Cancels every timer. Once this returns, no tick from this run will
    /// reach a subscriber.
    pub fn stop(&mut self, scheduler: &mut dyn Scheduler) {
        for handle in self.timers.drain(..) {
            if !scheduler.cancel(handle) {
                log::warn!("Timer {handle:?} was already gone");
            }
        }

        if std::mem::replace(&mut self.running, false) {
            log::info!("Realtime bridge stopped");
        }
    }

    /// Adds a listener on channel `C`. Every call is a separate registration.
    pub fn subscribe<C: Channel>(
        &mut self,
        listener: impl FnMut(&C::Payload) -> anyhow::Result<()> + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId::new(self.next_subscription);
        self.next_subscription += 1;

        C::topic_mut(&mut self.subscribers).add(id, Box::new(listener));
        log::debug!("{}: added listener {id:?}", C::NAME);
        id
    }

    pub fn unsubscribe<C: Channel>(&mut self, id: SubscriptionId) -> bool {
        let removed = C::topic_mut(&mut self.subscribers).remove(id);
        if removed {
            log::debug!("{}: removed listener {id:?}", C::NAME);
        }
        removed
    }

    pub fn listener_count<C: Channel>(&self) -> usize {
        C::topic(&self.subscribers).len()
    }

    pub fn publish<C: Channel>(&mut self, payload: &C::Payload) -> PublishReport {
        C::topic_mut(&mut self.subscribers).dispatch(C::NAME, payload)
    }

    /// Handles a due timer. Ticks that arrive after `stop` are dropped.
    pub fn on_tick(&mut self, kind: TickKind, now: DateTime<Utc>) -> PublishReport {
        if !self.running {
            log::trace!("Dropping {kind} tick, bridge is stopped");
            return PublishReport::default();
        }

        let report = match kind {
            TickKind::Notifications => {
                let notification = self.feed.next_notification(now);
                self.publish::<Notifications>(&notification)
            }
            TickKind::Monitoring => {
                let update = self.feed.next_monitoring(now);
                self.publish::<Monitoring>(&update)
            }
        };

        if report.failed > 0 {
            log::warn!(
                "{kind} tick: {} of {} listeners failed",
                report.failed,
                report.failed + report.delivered
            );
        }
        report
    }
}
