//! The notification lifecycle engine. Every operation takes the store
//! explicitly plus the acting user where one exists; nothing reads ambient
//! request state.

pub mod events;
pub mod ledger;
pub mod lifecycle;
pub mod scheduler;

pub use events::{notify_comment, notify_reassignment, notify_task_updated, Fanout};
pub use lifecycle::{apply_task_event, LifecycleOutcome, TaskEvent};
pub use scheduler::{
    recompute_reminders, remove_all_for_task, update_for_due_date_change, ReconcileReport,
};
