//! Simulated push source. Every tick produces a fresh payload; nothing here
//! talks to a real backend.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use strum::{EnumCount, IntoEnumIterator};
use uuid::Uuid;

use crate::subsystem::{
    cache::CacheKey,
    realtime::payload::{
        Incident, IncidentStatus, LogEntry, LogLevel, MonitoringUpdate, Notification,
        NotificationKind, ServiceHealth, ServiceStatus, Severity, SystemAlert,
    },
};

const NOTIFICATION_TEMPLATES: [(&str, &str); 5] = [
    (
        "New enrollment request",
        "A guardian submitted an enrollment form for review.",
    ),
    ("Invoice paid", "Tuition invoice was settled online."),
    (
        "Attendance below threshold",
        "A class dropped under 85% attendance this week.",
    ),
    (
        "Support ticket escalated",
        "A ticket has been waiting for more than 24 hours.",
    ),
    ("Timetable updated", "Next week's timetable was published."),
];

const NOTIFICATION_KINDS: [NotificationKind; 4] = [
    NotificationKind::Info,
    NotificationKind::Success,
    NotificationKind::Warning,
    NotificationKind::Alert,
];

const SERVICES: [&str; 5] = ["api-gateway", "auth", "billing", "notifications", "storage"];

const LOG_MESSAGES: [(LogLevel, &str); 4] = [
    (LogLevel::Info, "request served"),
    (LogLevel::Debug, "cache refreshed"),
    (LogLevel::Warn, "slow upstream response"),
    (LogLevel::Error, "upstream connection reset"),
];

/// Latency above this marks a service degraded.
const DEGRADED_LATENCY_MS: u32 = 110;

#[derive(Debug, Default)]
pub struct MockFeed {
    notification_seq: usize,
    monitoring_seq: usize,
}

impl MockFeed {
    pub const fn new() -> Self {
        Self {
            notification_seq: 0,
            monitoring_seq: 0,
        }
    }

    pub fn next_notification(&mut self, now: DateTime<Utc>) -> Notification {
        let seq = self.notification_seq;
        self.notification_seq = self.notification_seq.wrapping_add(1);

        let (title, description) = NOTIFICATION_TEMPLATES[seq % NOTIFICATION_TEMPLATES.len()];
        Notification {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: description.to_string(),
            timestamp: now,
            read: false,
            kind: NOTIFICATION_KINDS[seq % NOTIFICATION_KINDS.len()],
        }
    }

    /// Cycles through the monitoring datasets, one per call.
    pub fn next_monitoring(&mut self, now: DateTime<Utc>) -> MonitoringUpdate {
        let seq = self.monitoring_seq;
        self.monitoring_seq = self.monitoring_seq.wrapping_add(1);

        let key = CacheKey::iter()
            .nth(seq % CacheKey::COUNT)
            .unwrap_or(CacheKey::ServiceStatus);

        match key {
            CacheKey::ServiceStatus => MonitoringUpdate::ServiceStatus(service_status(seq)),
            CacheKey::Incidents => MonitoringUpdate::Incidents(incidents(seq, now)),
            CacheKey::Logs => MonitoringUpdate::Logs(logs(seq, now)),
            CacheKey::Alerts => MonitoringUpdate::Alerts(alerts(seq, now)),
        }
    }
}

fn service_status(seq: usize) -> Vec<ServiceStatus> {
    SERVICES
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let latency_ms = 40 + ((seq + i) * 37 % 90) as u32;
            let status = if latency_ms > DEGRADED_LATENCY_MS {
                ServiceHealth::Degraded
            } else {
                ServiceHealth::Operational
            };
            let uptime_percent = (99.99 - ((seq + i) % 7) as f32 * 0.05).min(99.99);
            ServiceStatus {
                name: (*name).to_string(),
                status,
                uptime_percent,
                latency_ms,
            }
        })
        .collect()
}

fn incidents(seq: usize, now: DateTime<Utc>) -> Vec<Incident> {
    let service = SERVICES[seq % SERVICES.len()];
    let mut out = vec![Incident {
        id: format!("INC-{:04}", 1000 + seq % 9000),
        title: format!("Elevated error rate on {service}"),
        severity: if seq % 3 == 0 {
            Severity::High
        } else {
            Severity::Medium
        },
        status: IncidentStatus::Investigating,
        opened_at: now - ChronoDuration::minutes(5),
    }];

    if seq % 2 == 1 {
        out.push(Incident {
            id: format!("INC-{:04}", 999 + seq % 9000),
            title: "Scheduled storage maintenance".to_string(),
            severity: Severity::Low,
            status: IncidentStatus::Resolved,
            opened_at: now - ChronoDuration::hours(2),
        });
    }
    out
}

fn logs(seq: usize, now: DateTime<Utc>) -> Vec<LogEntry> {
    (0..LOG_MESSAGES.len())
        .map(|i| {
            let (level, message) = LOG_MESSAGES[(seq + i) % LOG_MESSAGES.len()];
            LogEntry {
                timestamp: now - ChronoDuration::seconds(i as i64),
                level,
                service: SERVICES[(seq + i) % SERVICES.len()].to_string(),
                message: message.to_string(),
            }
        })
        .collect()
}

fn alerts(seq: usize, now: DateTime<Utc>) -> Vec<SystemAlert> {
    if seq % 3 == 2 {
        return Vec::new();
    }
    vec![SystemAlert {
        id: format!("ALR-{:04}", seq % 10_000),
        message: format!(
            "{} disk usage above 80%",
            SERVICES[seq % SERVICES.len()]
        ),
        severity: Severity::Critical,
        raised_at: now,
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn epoch() -> DateTime<Utc> {
        DateTime::from_timestamp(0, 0).unwrap()
    }

    #[test]
    fn notifications_rotate_and_get_fresh_ids() {
        let mut feed = MockFeed::new();
        let a = feed.next_notification(epoch());
        let b = feed.next_notification(epoch());

        assert_ne!(a.id, b.id);
        assert_ne!(a.title, b.title);
        assert_ne!(a.kind, b.kind);
        assert!(!a.read);
        assert_eq!(a.timestamp, epoch());
    }

    #[test]
    fn monitoring_visits_every_key_in_turn() {
        let mut feed = MockFeed::new();
        let keys: Vec<_> = (0..CacheKey::COUNT * 2)
            .map(|_| feed.next_monitoring(epoch()).cache_key())
            .collect();
        let expected: Vec<_> = CacheKey::iter().chain(CacheKey::iter()).collect();
        assert_eq!(keys, expected);
    }

    #[test]
    fn service_values_stay_in_range() {
        for seq in 0..50 {
            for s in service_status(seq) {
                assert!((40..130).contains(&s.latency_ms));
                assert!(s.uptime_percent <= 99.99);
                assert_eq!(
                    s.status == ServiceHealth::Degraded,
                    s.latency_ms > DEGRADED_LATENCY_MS
                );
            }
        }
    }
}
