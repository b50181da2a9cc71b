use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use uuid::Uuid;

type SendLog = DashMap<(Uuid, String), Instant>;

/// Per-(task, recipient) send throttle owned by the relay instance.
///
/// Entries are admitted once per window. Expired entries are overwritten on
/// the next admit and removed by the sweeper from `spawn_sweeper`.
#[derive(Clone)]
pub struct CooldownCache {
    last_sent: Arc<SendLog>,
    window: Duration,
}

impl CooldownCache {
    pub fn new(window: Duration) -> Self {
        Self {
            last_sent: Arc::new(DashMap::new()),
            window,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record a send to `recipient` for `task_id` unless one happened within
    /// the window. Returns whether the send may proceed.
    pub fn admit_at(&self, task_id: Uuid, recipient: &str, now: Instant) -> bool {
        match self.last_sent.entry((task_id, recipient.to_string())) {
            Entry::Occupied(mut entry) => {
                if now.saturating_duration_since(*entry.get()) < self.window {
                    return false;
                }
                entry.insert(now);
                true
            }
            Entry::Vacant(entry) => {
                entry.insert(now);
                true
            }
        }
    }

    /// Keep the recipients that are out of cooldown, recording them as sent.
    pub fn filter_at(&self, task_id: Uuid, recipients: &[String], now: Instant) -> Vec<String> {
        recipients
            .iter()
            .filter(|r| self.admit_at(task_id, r, now))
            .cloned()
            .collect()
    }

    pub fn evict_expired(&self) -> usize {
        evict(&self.last_sent, self.window, Instant::now())
    }

    /// Sweep expired entries every `every` on a background task. The task
    /// ends once the last clone of this cache is dropped.
    pub fn spawn_sweeper(&self, every: Duration) -> JoinHandle<()> {
        let log = Arc::downgrade(&self.last_sent);
        let window = self.window;
        let every = every.max(Duration::from_millis(1));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                let Some(log) = log.upgrade() else { break };
                let evicted = evict(&log, window, Instant::now());
                if evicted > 0 {
                    tracing::debug!(evicted, remaining = log.len(), "cooldown entries expired");
                }
            }
        })
    }

    pub fn len(&self) -> usize {
        self.last_sent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_sent.is_empty()
    }
}

fn evict(log: &SendLog, window: Duration, now: Instant) -> usize {
    let before = log.len();
    log.retain(|_, last| now.saturating_duration_since(*last) < window);
    before - log.len()
}
