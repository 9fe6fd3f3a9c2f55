// --- File: crates/services/quincho_backend/src/service_factory.rs ---
//! Service factory implementation.
//!
//! Wires the concrete collaborators (in-memory store, email notifier,
//! session auth) once at startup and hands them out behind the
//! `ServiceFactory` trait.

use std::sync::Arc;

use tracing::{info, warn};

use quincho_auth::SessionAuthService;
use quincho_common::error::{config_error, QuinchoError};
use quincho_common::services::{
    AuthService, NotificationService, ReservationStore, ServiceFactory,
};
use quincho_config::AppConfig;
use quincho_notify::EmailNotifier;
use quincho_store::InMemoryStore;

pub struct QuinchoServiceFactory {
    store: Arc<InMemoryStore>,
    notifier: Option<Arc<dyn NotificationService>>,
    auth: Arc<SessionAuthService>,
}

impl QuinchoServiceFactory {
    pub fn new(config: &AppConfig) -> Result<Self, QuinchoError> {
        let auth_config = config
            .auth
            .as_ref()
            .ok_or_else(|| config_error("auth configuration missing"))?;
        if auth_config.admins.is_empty() {
            warn!("no admin accounts configured; admin endpoints will reject every login");
        }

        let notifier: Option<Arc<dyn NotificationService>> = match (config.use_email, &config.email)
        {
            (true, Some(email)) => {
                info!(url = %email.function_url, "email notifications enabled");
                Some(Arc::new(EmailNotifier::new(email)))
            }
            (true, None) => {
                warn!("use_email set but email configuration missing; notifications disabled");
                None
            }
            _ => {
                info!("email notifications disabled");
                None
            }
        };

        Ok(QuinchoServiceFactory {
            store: Arc::new(InMemoryStore::new()),
            notifier,
            auth: Arc::new(SessionAuthService::new(auth_config)),
        })
    }
}

impl ServiceFactory for QuinchoServiceFactory {
    fn reservation_store(&self) -> Arc<dyn ReservationStore> {
        self.store.clone()
    }

    fn notification_service(&self) -> Option<Arc<dyn NotificationService>> {
        self.notifier.clone()
    }

    fn auth_service(&self) -> Arc<dyn AuthService> {
        self.auth.clone()
    }
}
