pub mod bridge;
pub mod consumers;
pub mod mock;
pub mod payload;
pub mod registry;

pub use bridge::{BridgeConfig, RealtimeBridge, TickKind};
pub use payload::{MonitoringUpdate, Notification};
pub use registry::{Channel, Monitoring, Notifications, PublishReport, SubscriptionId};
