pub mod cache;
pub mod notifications;
pub mod realtime;
