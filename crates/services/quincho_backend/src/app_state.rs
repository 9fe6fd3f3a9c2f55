// --- File: crates/services/quincho_backend/src/app_state.rs ---
use std::sync::Arc;

use quincho_booking::BookingService;
use quincho_common::error::QuinchoError;
use quincho_common::services::{AuthService, ServiceFactory};
use quincho_config::AppConfig;

use crate::service_factory::QuinchoServiceFactory;

/// Application state shared across all routes: the loaded configuration,
/// the wired service factory, and the booking service that owns the
/// reservation snapshot.
#[derive(Clone)]
pub struct AppState {
    #[allow(dead_code)]
    pub config: Arc<AppConfig>,
    pub service_factory: Arc<dyn ServiceFactory>,
    pub booking: Arc<BookingService>,
}

impl AppState {
    /// Wire the services, perform the initial data load and start the
    /// change-feed listener.
    pub async fn new(config: Arc<AppConfig>) -> Result<Self, QuinchoError> {
        let service_factory = Arc::new(QuinchoServiceFactory::new(&config)?);

        let booking = Arc::new(BookingService::new(
            service_factory.reservation_store(),
            service_factory.notification_service(),
            &config,
        ));
        booking.load_initial().await?;
        booking.spawn_refresh_task();

        Ok(AppState {
            config,
            service_factory,
            booking,
        })
    }

    pub fn auth_service(&self) -> Arc<dyn AuthService> {
        self.service_factory.auth_service()
    }
}
