use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::services::backend::BookingBackend;

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub backend: Box<dyn BookingBackend>,
    /// Held for a whole load-transition-save cycle so concurrent turns don't overwrite
    /// each other. Separate from `db`, which the backend locks on its own.
    pub session: tokio::sync::Mutex<()>,
}

impl AppState {
    pub fn conn(&self) -> Result<MutexGuard<'_, Connection>, AppError> {
        self.db
            .lock()
            .map_err(|_| AppError::Backend("database connection lock poisoned".to_string()))
    }
}
