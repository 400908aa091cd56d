//! Chat-room notification.
//!
//! A single announcement is sent after the release artifacts are already
//! pushed. Delivery is best-effort: the orchestrator logs a failed
//! notification but never fails the run over it.

use serde_json::json;

use crate::config::NotifyConfig;
use crate::error::{ReleaseError, Result};

/// Delivers one message to a chat destination.
pub trait Notifier: Send + Sync {
    fn notify(&self, room: &str, message: &str) -> Result<()>;
}

/// Posts the announcement as JSON to a configured HTTP endpoint.
pub struct HttpNotifier {
    client: reqwest::blocking::Client,
    url: String,
    token: Option<String>,
}

impl HttpNotifier {
    pub fn new(config: &NotifyConfig) -> Self {
        HttpNotifier {
            client: reqwest::blocking::Client::new(),
            url: config.url.clone(),
            token: config.token.clone(),
        }
    }
}

impl Notifier for HttpNotifier {
    fn notify(&self, room: &str, message: &str) -> Result<()> {
        let body = json!({
            "room": room,
            "message": message,
            "notify": true,
        });

        let mut request = self.client.post(&self.url).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .map_err(|e| ReleaseError::notification(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReleaseError::notification(format!(
                "endpoint answered HTTP {}",
                status.as_u16()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notifier_built_from_config() {
        let config = NotifyConfig {
            url: "http://127.0.0.1:1/notify".to_string(),
            room: "releases".to_string(),
            token: Some("secret".to_string()),
        };
        let notifier = HttpNotifier::new(&config);

        // Nothing listens on port 1, the send itself must fail cleanly
        let err = notifier.notify("releases", "New version 1.2.0").unwrap_err();
        assert!(err.to_string().starts_with("Notification failed"));
    }
}
