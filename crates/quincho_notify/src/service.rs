// --- File: crates/quincho_notify/src/service.rs ---
//! Email notification dispatch.
//!
//! Implements the [`NotificationService`] contract against the external
//! send-email HTTP function. Dispatch is best-effort by contract: the
//! booking service spawns these calls and only logs failures.

use serde::Serialize;
use tracing::debug;

use quincho_common::error::QuinchoError;
use quincho_common::models::{NotificationResult, ReservationEmail};
use quincho_common::services::{BoxFuture, NotificationService};
use quincho_config::EmailConfig;

use crate::templates::render;

/// Wire shape accepted by the send-email function.
#[derive(Debug, Serialize)]
struct OutgoingEmail<'a> {
    to: &'a str,
    subject: &'a str,
    html: &'a str,
    kind: &'static str,
}

pub struct EmailNotifier {
    client: reqwest::Client,
    function_url: String,
    api_key: Option<String>,
}

impl EmailNotifier {
    pub fn new(config: &EmailConfig) -> Self {
        EmailNotifier {
            client: reqwest::Client::new(),
            function_url: config.function_url.clone(),
            api_key: config.api_key.clone(),
        }
    }
}

impl NotificationService for EmailNotifier {
    fn send_reservation_email(
        &self,
        email: ReservationEmail,
    ) -> BoxFuture<'_, NotificationResult, QuinchoError> {
        Box::pin(async move {
            let rendered = render(&email);
            let body = OutgoingEmail {
                to: &email.recipient,
                subject: &rendered.subject,
                html: &rendered.html,
                kind: email.kind.as_str(),
            };

            let mut request = self.client.post(&self.function_url).json(&body);
            if let Some(api_key) = &self.api_key {
                request = request.bearer_auth(api_key);
            }

            let response = request
                .send()
                .await
                .map_err(|e| QuinchoError::Notification(e.to_string()))?;

            if !response.status().is_success() {
                return Err(QuinchoError::Notification(format!(
                    "send-email function returned {}",
                    response.status()
                )));
            }

            debug!(kind = email.kind.as_str(), recipient = %email.recipient, "email dispatched");
            Ok(NotificationResult {
                status: "sent".to_string(),
            })
        })
    }
}
