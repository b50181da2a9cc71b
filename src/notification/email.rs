use serde::Serialize;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::alert::{Alert, AlertKind};
use super::cooldown::CooldownCache;
use crate::config::Config;

/// JSON body posted to the email webhook (a Power Automate style flow that
/// turns it into a mail).
#[derive(Debug, Serialize)]
struct EmailRequest<'a> {
    recipients: &'a [String],
    subject: &'a str,
    message: &'a str,
    task_title: &'a str,
    task_id: Uuid,
    notification_type: AlertKind,
    app_url: String,
}

/// Best-effort email relay.
///
/// Never returns an error: a disabled relay, recipients in cooldown, a network
/// failure or a non-2xx answer all come back as `false` and are only logged.
/// Notification rows are never affected by what happens here.
#[derive(Clone)]
pub struct EmailRelay {
    client: reqwest::Client,
    webhook_url: Option<String>,
    app_url: String,
    cooldown: CooldownCache,
}

impl EmailRelay {
    pub fn new(
        webhook_url: Option<String>,
        app_url: impl Into<String>,
        cooldown: CooldownCache,
        timeout: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("tasknotify-relay/1.0")
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "failed to build relay HTTP client, using defaults");
                reqwest::Client::new()
            });
        Self {
            client,
            webhook_url,
            app_url: app_url.into(),
            cooldown,
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(
            cfg.email_webhook_url.clone(),
            cfg.app_url.clone(),
            CooldownCache::new(Duration::from_secs(cfg.email_cooldown_secs)),
            Duration::from_secs(cfg.email_timeout_secs),
        )
    }

    pub fn is_enabled(&self) -> bool {
        self.webhook_url.is_some()
    }

    pub fn cooldown(&self) -> &CooldownCache {
        &self.cooldown
    }

    pub fn task_link(&self, task_id: Uuid) -> String {
        format!("{}/tasks/{}", self.app_url, task_id)
    }

    /// Try to deliver `alert` once. Returns whether the webhook accepted it.
    pub async fn attempt_send(&self, alert: &Alert) -> bool {
        let url = match &self.webhook_url {
            Some(u) => u,
            None => {
                debug!(task_id = %alert.task_id, "email relay disabled, skipping alert");
                return false;
            }
        };
        if alert.recipients.is_empty() {
            return false;
        }

        let recipients = self
            .cooldown
            .filter_at(alert.task_id, &alert.recipients, Instant::now());
        if recipients.is_empty() {
            debug!(task_id = %alert.task_id, "all recipients are in cooldown");
            return false;
        }

        let body = EmailRequest {
            recipients: &recipients,
            subject: &alert.subject,
            message: &alert.body,
            task_title: &alert.task_title,
            task_id: alert.task_id,
            notification_type: alert.kind,
            app_url: self.task_link(alert.task_id),
        };

        match self.client.post(url).json(&body).send().await {
            Ok(resp) if matches!(resp.status().as_u16(), 200 | 202) => {
                info!(
                    task_id = %alert.task_id,
                    kind = ?alert.kind,
                    recipients = recipients.len(),
                    status = %resp.status(),
                    "email alert accepted"
                );
                true
            }
            Ok(resp) => {
                let status = resp.status();
                let text = resp.text().await.unwrap_or_default();
                warn!(
                    task_id = %alert.task_id,
                    kind = ?alert.kind,
                    status = %status,
                    body = %text,
                    "email webhook rejected alert"
                );
                false
            }
            Err(e) => {
                warn!(
                    task_id = %alert.task_id,
                    kind = ?alert.kind,
                    error = %e,
                    "email webhook request failed"
                );
                false
            }
        }
    }

    /// Fire-and-forget: send on a background task so the caller's request is
    /// never held up by the webhook.
    pub fn dispatch(&self, alert: Alert) -> Option<JoinHandle<bool>> {
        if !self.is_enabled() {
            return None;
        }
        let relay = self.clone();
        Some(tokio::spawn(async move { relay.attempt_send(&alert).await }))
    }

    /// Dispatch every alert of a fan-out or lifecycle outcome. Takes an
    /// `Option<Alert>` as well as a `Vec<Alert>`.
    pub fn dispatch_all(&self, alerts: impl IntoIterator<Item = Alert>) {
        for alert in alerts {
            self.dispatch(alert);
        }
    }
}
