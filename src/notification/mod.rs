//! Outbound alerts. Email is a side channel: the notification store is the
//! record of who was notified.

pub mod alert;
pub mod cooldown;
pub mod email;

pub use alert::{Alert, AlertKind};
pub use cooldown::CooldownCache;
pub use email::EmailRelay;
