use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;
use uuid::Uuid;

use crate::subsystem::cache::CacheKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Alert,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ServiceHealth {
    Operational,
    Degraded,
    Outage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    pub name: String,
    pub status: ServiceHealth,
    pub uptime_percent: f32,
    pub latency_ms: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IncidentStatus {
    Investigating,
    Monitoring,
    Resolved,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub id: String,
    pub title: String,
    pub severity: Severity,
    pub status: IncidentStatus,
    pub opened_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub service: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemAlert {
    pub id: String,
    pub message: String,
    pub severity: Severity,
    pub raised_at: DateTime<Utc>,
}

/// A replacement value for one monitoring dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum MonitoringUpdate {
    ServiceStatus(Vec<ServiceStatus>),
    Incidents(Vec<Incident>),
    Logs(Vec<LogEntry>),
    Alerts(Vec<SystemAlert>),
}

impl MonitoringUpdate {
    pub const fn cache_key(&self) -> CacheKey {
        match self {
            Self::ServiceStatus(_) => CacheKey::ServiceStatus,
            Self::Incidents(_) => CacheKey::Incidents,
            Self::Logs(_) => CacheKey::Logs,
            Self::Alerts(_) => CacheKey::Alerts,
        }
    }

    /// The dataset alone, without the tag.
    pub fn dataset(&self) -> serde_json::Result<serde_json::Value> {
        match self {
            Self::ServiceStatus(v) => serde_json::to_value(v),
            Self::Incidents(v) => serde_json::to_value(v),
            Self::Logs(v) => serde_json::to_value(v),
            Self::Alerts(v) => serde_json::to_value(v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_uses_dashboard_field_names() {
        let notification = Notification {
            id: Uuid::nil(),
            title: "Invoice paid".into(),
            description: String::new(),
            timestamp: DateTime::from_timestamp(0, 0).unwrap(),
            read: false,
            kind: NotificationKind::Success,
        };
        let value = serde_json::to_value(&notification).unwrap();
        assert_eq!(value["type"], "success");
        assert_eq!(value["read"], false);
    }

    #[test]
    fn monitoring_update_is_tagged() {
        let update = MonitoringUpdate::Alerts(Vec::new());
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value["type"], "alerts");
        assert_eq!(update.cache_key(), CacheKey::Alerts);
        assert_eq!(update.dataset().unwrap(), serde_json::json!([]));
    }
}
