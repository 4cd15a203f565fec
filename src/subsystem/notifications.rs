use std::{
    cell::{Ref, RefCell},
    collections::VecDeque,
    rc::Rc,
    sync::mpsc,
};

use uuid::Uuid;

use crate::{overlays::toast::Toast, state::AppState, subsystem::realtime::Notification};

/// Collects toasts raised by listeners and hands them to the toast queue
/// once per loop iteration.
pub struct NotificationManager {
    rx_toast: mpsc::Receiver<Toast>,
    tx_toast: mpsc::SyncSender<Toast>,
}

impl NotificationManager {
    pub fn new() -> Self {
        let (tx_toast, rx_toast) = mpsc::sync_channel(10);
        Self { rx_toast, tx_toast }
    }

    pub fn sender(&self) -> mpsc::SyncSender<Toast> {
        self.tx_toast.clone()
    }

    pub fn submit_pending(&self, app: &mut AppState) {
        if app.session.config.notifications_enabled {
            self.rx_toast.try_iter().for_each(|toast| {
                toast.submit(app);
            });
        } else {
            // consume without submitting
            self.rx_toast.try_iter().last();
        }
    }
}

/// Client-held notification list, newest first. Clones share the same list.
#[derive(Debug, Clone, Default)]
pub struct NotificationFeed {
    items: Rc<RefCell<VecDeque<Notification>>>,
}

impl NotificationFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, notification: Notification) {
        self.items.borrow_mut().push_front(notification);
    }

    pub fn items(&self) -> Ref<'_, VecDeque<Notification>> {
        self.items.borrow()
    }

    pub fn latest(&self) -> Option<Notification> {
        self.items.borrow().front().cloned()
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    pub fn unread_count(&self) -> usize {
        self.items.borrow().iter().filter(|n| !n.read).count()
    }

    /// Returns false if no notification has that id.
    pub fn mark_read(&self, id: Uuid) -> bool {
        let mut items = self.items.borrow_mut();
        let Some(n) = items.iter_mut().find(|n| n.id == id) else {
            return false;
        };
        n.read = true;
        true
    }

    /// Returns how many notifications changed.
    pub fn mark_all_read(&self) -> usize {
        let mut changed = 0;
        for n in self.items.borrow_mut().iter_mut().filter(|n| !n.read) {
            n.read = true;
            changed += 1;
        }
        changed
    }
}
