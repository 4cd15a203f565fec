//! Listeners installed at boot: one keeps the query cache fresh, the other
//! feeds the notification list and raises toasts.

use std::{sync::mpsc::SyncSender, time::Duration};

use anyhow::Context;

use crate::{
    overlays::toast::{Toast, ToastTopic},
    subsystem::{
        cache::QueryCache,
        notifications::NotificationFeed,
        realtime::{
            RealtimeBridge,
            payload::{Notification, NotificationKind},
            registry::{Monitoring, Notifications, SubscriptionId},
        },
    },
};

pub fn attach_monitoring_cache(bridge: &mut RealtimeBridge, cache: QueryCache) -> SubscriptionId {
    bridge.subscribe::<Monitoring>(move |update| {
        let key = update.cache_key();
        let version = cache
            .apply(update)
            .with_context(|| format!("updating cache key {key}"))?;
        log::debug!("Monitoring: {key} now at v{version}");
        Ok(())
    })
}

pub fn attach_notification_feed(
    bridge: &mut RealtimeBridge,
    feed: NotificationFeed,
    toasts: SyncSender<Toast>,
    toast_timeout: Duration,
) -> SubscriptionId {
    bridge.subscribe::<Notifications>(move |notification| {
        feed.push(notification.clone());

        let _ = toasts
            .try_send(toast_for(notification).with_timeout(toast_timeout))
            .inspect_err(|e| log::error!("Failed to send notification: {e:?}"));
        Ok(())
    })
}

fn toast_for(notification: &Notification) -> Toast {
    let topic = match notification.kind {
        NotificationKind::Alert => ToastTopic::Alert,
        _ => ToastTopic::Notification,
    };
    Toast::new(
        topic,
        notification.title.clone(),
        notification.description.clone(),
    )
}
