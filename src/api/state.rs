use std::sync::Arc;

use tokio_rusqlite::Connection;

use crate::core::AppConfig;
use crate::meetings::{BoxedProvisioner, Finalizer, GoogleMeetProvisioner, MeetingLocks};

pub struct AppState {
    pub db: Connection,
    pub config: AppConfig,
    pub provisioner: BoxedProvisioner,
    // Shared by every request so finalize attempts on one meeting queue up
    pub locks: MeetingLocks,
}

impl AppState {
    pub fn new(db: Connection, config: AppConfig) -> Self {
        let provisioner = Arc::new(GoogleMeetProvisioner::new(db.clone(), config.clone()));
        Self::with_provisioner(db, config, provisioner)
    }

    pub fn with_provisioner(db: Connection, config: AppConfig, provisioner: BoxedProvisioner) -> Self {
        Self {
            db,
            config,
            provisioner,
            locks: MeetingLocks::new(),
        }
    }

    pub fn finalizer(&self) -> Finalizer {
        Finalizer::new(
            self.db.clone(),
            Arc::clone(&self.provisioner),
            self.locks.clone(),
            self.config.provision_timeout,
        )
    }
}
