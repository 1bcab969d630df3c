//! Background jobs that run on a fixed interval alongside the server.

use std::time::Duration;

use async_trait::async_trait;
use tokio_rusqlite::Connection;

use crate::core::AppConfig;

mod expire_meetings;
pub use expire_meetings::ExpireMeetings;

#[async_trait]
pub trait PeriodicJob: Send + Sync + 'static {
    fn interval(&self) -> Duration;

    /// Run one pass. Failures are logged by the job itself so a bad run
    /// never stops the loop.
    async fn run_job(&self, config: &AppConfig, db: &Connection);
}

/// Run `job` forever in its own tokio task, once per interval.
pub fn spawn_periodic_job<J: PeriodicJob>(config: AppConfig, db: Connection, job: J) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(job.interval());
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            job.run_job(&config, &db).await;
        }
    });
}
