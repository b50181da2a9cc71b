use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    /// Outbound email webhook. When unset the alert relay is disabled.
    /// Set via TASKNOTIFY_EMAIL_WEBHOOK_URL.
    pub email_webhook_url: Option<String>,
    /// Seconds before the same (task, recipient) pair may be emailed again.
    /// Set via TASKNOTIFY_EMAIL_COOLDOWN_SECS. Default: 300.
    pub email_cooldown_secs: u64,
    /// HTTP timeout for a single relay attempt.
    /// Set via TASKNOTIFY_EMAIL_TIMEOUT_SECS. Default: 10.
    pub email_timeout_secs: u64,
    /// Base URL of the web app, used for task links in alert bodies.
    pub app_url: String,
}

impl Config {
    pub fn relay_enabled(&self) -> bool {
        self.email_webhook_url.is_some()
    }
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();
    Ok(from_lookup(|key| std::env::var(key).ok()))
}

/// Build a config from an arbitrary key lookup. `load` passes the process
/// environment; tests pass a map.
pub fn from_lookup<F>(lookup: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    Config {
        port: lookup("TASKNOTIFY_PORT")
            .and_then(|v| v.parse().ok())
            .unwrap_or(8080),
        database_url: lookup("DATABASE_URL")
            .unwrap_or_else(|| "postgres://localhost/tasknotify".into()),
        email_webhook_url: lookup("TASKNOTIFY_EMAIL_WEBHOOK_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()),
        email_cooldown_secs: lookup("TASKNOTIFY_EMAIL_COOLDOWN_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(300),
        email_timeout_secs: lookup("TASKNOTIFY_EMAIL_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(10),
        app_url: lookup("TASKNOTIFY_APP_URL")
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or_else(|| "http://localhost:5173".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let cfg = from_lookup(lookup_from(&[]));
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.email_cooldown_secs, 300);
        assert_eq!(cfg.email_timeout_secs, 10);
        assert_eq!(cfg.app_url, "http://localhost:5173");
        assert!(!cfg.relay_enabled());
    }

    #[test]
    fn test_malformed_numbers_fall_back() {
        let cfg = from_lookup(lookup_from(&[
            ("TASKNOTIFY_PORT", "not-a-port"),
            ("TASKNOTIFY_EMAIL_COOLDOWN_SECS", "-5"),
        ]));
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.email_cooldown_secs, 300);
    }

    #[test]
    fn test_blank_webhook_disables_relay() {
        let cfg = from_lookup(lookup_from(&[("TASKNOTIFY_EMAIL_WEBHOOK_URL", "   ")]));
        assert!(!cfg.relay_enabled());

        let cfg = from_lookup(lookup_from(&[
            ("TASKNOTIFY_EMAIL_WEBHOOK_URL", "https://hooks.example.com/mail"),
            ("TASKNOTIFY_APP_URL", "https://tasks.example.com/"),
        ]));
        assert!(cfg.relay_enabled());
        assert_eq!(cfg.app_url, "https://tasks.example.com");
    }
}
