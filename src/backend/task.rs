use std::{
    cmp,
    collections::{BinaryHeap, VecDeque},
    rc::Rc,
    sync::atomic::{self, AtomicUsize},
    time::{Duration, Instant},
};

use crate::{
    backend::clock::{Clock, SystemClock},
    overlays::toast::ToastId,
    subsystem::realtime::TickKind,
};

static TASK_AUTO_INCREMENT: AtomicUsize = AtomicUsize::new(0);

/// Shortest interval a repeating task may use.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(usize);

struct AppTask {
    pub not_before: Instant,
    pub id: usize,
    pub handle: TimerHandle,
    pub interval: Option<Duration>,
    pub task: TaskType,
}

impl PartialEq<Self> for AppTask {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == cmp::Ordering::Equal
    }
}
impl PartialOrd<Self> for AppTask {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Eq for AppTask {}
impl Ord for AppTask {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        self.not_before
            .cmp(&other.not_before)
            .then(self.id.cmp(&other.id))
            .reverse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskType {
    Realtime(TickKind),
    DismissToast(ToastId),
}

pub trait Scheduler {
    /// Schedule `task` to come due every `interval`, starting one interval from now.
    fn schedule_repeating(&mut self, interval: Duration, task: TaskType) -> TimerHandle;

    /// Remove every pending occurrence of `handle`. Returns false if nothing was scheduled.
    fn cancel(&mut self, handle: TimerHandle) -> bool;
}

pub struct TaskContainer {
    tasks: BinaryHeap<AppTask>,
    clock: Rc<dyn Clock>,
}

impl TaskContainer {
    pub fn new() -> Self {
        Self::with_clock(Rc::new(SystemClock))
    }

    pub fn with_clock(clock: Rc<dyn Clock>) -> Self {
        Self {
            tasks: BinaryHeap::new(),
            clock,
        }
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Enqueue a task to be executed at a specific time.
    /// If the time is in the past, the task will be executed immediately.
    /// Multiple tasks enqueued for the same instant will be executed in order of submission.
    pub fn enqueue_at(&mut self, task: TaskType, not_before: Instant) -> TimerHandle {
        self.push(task, not_before, None)
    }

    fn push(&mut self, task: TaskType, not_before: Instant, interval: Option<Duration>) -> TimerHandle {
        let id = TASK_AUTO_INCREMENT.fetch_add(1, atomic::Ordering::Relaxed);
        let handle = TimerHandle(id);
        self.tasks.push(AppTask {
            not_before,
            id,
            handle,
            interval,
            task,
        });
        handle
    }

    /// Moves every due task into `dest_buf`, in due order.
    /// Repeating tasks are re-armed before they are handed out, so whatever
    /// the caller does with a tick cannot stop the next one from coming.
    pub fn retrieve_due(&mut self, dest_buf: &mut VecDeque<TaskType>) {
        let now = self.now();

        while let Some(task) = self.tasks.peek() {
            if task.not_before > now {
                break;
            }

            let Some(mut task) = self.tasks.pop() else {
                break;
            };
            dest_buf.push_back(task.task);

            if let Some(interval) = task.interval {
                task.not_before = next_deadline(task.not_before, interval, now);
                task.id = TASK_AUTO_INCREMENT.fetch_add(1, atomic::Ordering::Relaxed);
                self.tasks.push(task);
            }
        }
    }
}

impl Scheduler for TaskContainer {
    fn schedule_repeating(&mut self, interval: Duration, task: TaskType) -> TimerHandle {
        let interval = interval.max(MIN_INTERVAL);
        let first = self.now() + interval;
        self.push(task, first, Some(interval))
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.handle != handle);
        before != self.tasks.len()
    }
}

/// Next deadline strictly after `now`, on the grid started by `prev`.
/// Missed occurrences are skipped instead of fired in a burst.
fn next_deadline(prev: Instant, interval: Duration, now: Instant) -> Instant {
    let next = prev + interval;
    if next > now {
        return next;
    }
    let missed = (now - prev).as_nanos() / interval.as_nanos();
    let steps = u32::try_from(missed + 1).unwrap_or(u32::MAX);
    prev + interval.saturating_mul(steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::clock::ManualClock;

    fn container() -> (ManualClock, TaskContainer) {
        let clock = ManualClock::new();
        let tasks = TaskContainer::with_clock(Rc::new(clock.clone()));
        (clock, tasks)
    }

    fn due(tasks: &mut TaskContainer) -> Vec<TaskType> {
        let mut buf = VecDeque::new();
        tasks.retrieve_due(&mut buf);
        buf.into()
    }

    const NOTIFY: TaskType = TaskType::Realtime(TickKind::Notifications);
    const MONITOR: TaskType = TaskType::Realtime(TickKind::Monitoring);

    #[test]
    fn repeating_task_fires_once_per_interval() {
        let (clock, mut tasks) = container();
        tasks.schedule_repeating(Duration::from_secs(1), NOTIFY);

        assert!(due(&mut tasks).is_empty());
        clock.advance(Duration::from_millis(999));
        assert!(due(&mut tasks).is_empty());
        clock.advance(Duration::from_millis(1));
        assert_eq!(due(&mut tasks), vec![NOTIFY]);
        assert!(due(&mut tasks).is_empty());
        clock.advance(Duration::from_secs(1));
        assert_eq!(due(&mut tasks), vec![NOTIFY]);
    }

    #[test]
    fn late_poll_does_not_burst() {
        let (clock, mut tasks) = container();
        tasks.schedule_repeating(Duration::from_secs(1), NOTIFY);

        clock.advance(Duration::from_millis(3500));
        assert_eq!(due(&mut tasks), vec![NOTIFY]);

        // back on the original grid: next at 4s
        clock.advance(Duration::from_millis(400));
        assert!(due(&mut tasks).is_empty());
        clock.advance(Duration::from_millis(100));
        assert_eq!(due(&mut tasks), vec![NOTIFY]);
    }

    #[test]
    fn cancel_removes_pending_occurrence() {
        let (clock, mut tasks) = container();
        let handle = tasks.schedule_repeating(Duration::from_secs(1), NOTIFY);
        tasks.schedule_repeating(Duration::from_secs(2), MONITOR);

        assert!(tasks.cancel(handle));
        assert!(!tasks.cancel(handle));

        clock.advance(Duration::from_secs(10));
        assert_eq!(due(&mut tasks), vec![MONITOR]);
        assert_eq!(tasks.len(), 1);
    }

    #[test]
    fn same_instant_keeps_submission_order() {
        let (clock, mut tasks) = container();
        let at = tasks.now() + Duration::from_millis(5);
        tasks.enqueue_at(MONITOR, at);
        tasks.enqueue_at(NOTIFY, at);

        clock.advance(Duration::from_millis(5));
        assert_eq!(due(&mut tasks), vec![MONITOR, NOTIFY]);
        assert!(tasks.is_empty());
    }

    #[test]
    fn zero_interval_is_clamped() {
        let (clock, mut tasks) = container();
        tasks.schedule_repeating(Duration::ZERO, NOTIFY);

        assert!(due(&mut tasks).is_empty());
        clock.advance(MIN_INTERVAL);
        assert_eq!(due(&mut tasks), vec![NOTIFY]);
    }
}
