//! Task notification engine: due-date reminders, activity notifications and
//! the read/unread ledger for the team task tracker.
//!
//! The CRUD layer loads a [`models::task::TaskSnapshot`], performs its
//! mutation on a transaction from [`store::postgres::PgStore::begin`], calls
//! into [`engine`] on that same transaction, commits, and only then hands any
//! returned [`notification::Alert`] to the [`notification::EmailRelay`].

pub mod api;
pub mod cli;
pub mod clock;
pub mod config;
pub mod engine;
pub mod errors;
pub mod models;
pub mod notification;
pub mod store;

use notification::EmailRelay;
use store::postgres::PgStore;

/// Shared application state passed to handlers.
pub struct AppState {
    pub db: PgStore,
    pub relay: EmailRelay,
    pub config: config::Config,
}
