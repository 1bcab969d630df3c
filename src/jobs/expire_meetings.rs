use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio_rusqlite::Connection;

use super::PeriodicJob;
use crate::core::AppConfig;
use crate::meetings::db::expire_overdue;

/// Marks open meetings whose response deadline has passed as expired.
#[derive(Debug)]
pub struct ExpireMeetings {
    interval: Duration,
}

impl ExpireMeetings {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            interval: config.expiry_interval,
        }
    }
}

#[async_trait]
impl PeriodicJob for ExpireMeetings {
    fn interval(&self) -> Duration {
        self.interval
    }

    async fn run_job(&self, _config: &AppConfig, db: &Connection) {
        match expire_overdue(db, Utc::now()).await {
            Ok(expired) if expired.is_empty() => {}
            Ok(expired) => {
                tracing::info!("Expired {} meeting(s): {}", expired.len(), expired.join(", "))
            }
            Err(e) => tracing::error!("Failed to expire overdue meetings: {}", e),
        }
    }
}
