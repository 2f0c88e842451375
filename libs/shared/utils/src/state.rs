use std::sync::Arc;

use shared_config::AppConfig;
use shared_database::SupabaseClient;
use shared_notifications::NotificationDispatcher;

/// Process-wide collaborators, built once at startup and handed to every router.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: Arc<SupabaseClient>,
    pub notifier: NotificationDispatcher,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, notifier: NotificationDispatcher) -> Self {
        let db = Arc::new(SupabaseClient::new(&config));
        Self { config, db, notifier }
    }
}
