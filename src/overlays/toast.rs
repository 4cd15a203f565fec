use std::{collections::VecDeque, time::Duration};

use idmap_derive::IntegerId;
use serde::{Deserialize, Serialize};

use crate::{
    backend::task::{TaskContainer, TaskType},
    state::AppState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToastDisplayMethod {
    Hide,
    Show,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, IntegerId, Serialize, Deserialize)]
pub enum ToastTopic {
    System,
    Notification,
    Alert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ToastId(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub title: String,
    pub body: String,
    pub timeout: Duration,
    pub topic: ToastTopic,
}

impl Toast {
    pub const fn new(topic: ToastTopic, title: String, body: String) -> Self {
        Self {
            title,
            body,
            timeout: Duration::from_secs(3),
            topic,
        }
    }
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
    pub fn submit(self, app: &mut AppState) {
        let method = app
            .session
            .toast_topics
            .get(self.topic)
            .copied()
            .unwrap_or(ToastDisplayMethod::Hide);

        if method == ToastDisplayMethod::Hide {
            log::debug!("Toast hidden by topic {:?}: {}", self.topic, self.title);
            return;
        }

        app.toasts.push(self, &mut app.tasks);
    }
}

/// Waiting toasts beyond this push out the oldest one.
const MAX_PENDING: usize = 10;

struct ShownToast {
    id: ToastId,
    toast: Toast,
}

/// One toast on screen at a time; the rest wait in line.
pub struct ToastManager {
    current: Option<ShownToast>,
    queue: VecDeque<Toast>,
    next_id: u64,
}

impl ToastManager {
    pub const fn new() -> Self {
        Self {
            current: None,
            queue: VecDeque::new(),
            next_id: 0,
        }
    }

    pub fn current(&self) -> Option<&Toast> {
        self.current.as_ref().map(|s| &s.toast)
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn push(&mut self, toast: Toast, tasks: &mut TaskContainer) {
        if self.queue.len() >= MAX_PENDING {
            if let Some(dropped) = self.queue.pop_front() {
                log::warn!("Toast queue full, dropping: {}", dropped.title);
            }
        }
        self.queue.push_back(toast);
        if self.current.is_none() {
            self.show_next(tasks);
        }
    }

    /// Called when a toast's display time runs out.
    /// Stale ids (a toast that was already replaced) are ignored.
    pub fn dismiss(&mut self, id: ToastId, tasks: &mut TaskContainer) {
        if self.current.as_ref().is_none_or(|s| s.id != id) {
            return;
        }
        self.current = None;
        self.show_next(tasks);
    }

    fn show_next(&mut self, tasks: &mut TaskContainer) {
        let Some(toast) = self.queue.pop_front() else {
            return;
        };
        let now = tasks.now();

        let id = ToastId(self.next_id);
        self.next_id += 1;

        log::info!("Toast: {} - {}", toast.title, toast.body);
        let until = now.checked_add(toast.timeout).unwrap_or_else(|| {
            log::warn!("Toast timeout {:?} out of range, dismissing at once", toast.timeout);
            now
        });
        tasks.enqueue_at(TaskType::DismissToast(id), until);
        self.current = Some(ShownToast { id, toast });
    }
}
