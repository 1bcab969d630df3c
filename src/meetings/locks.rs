use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Per-meeting async locks that serialize finalize attempts within this
/// process. Cloning shares the same lock table.
#[derive(Clone, Default)]
pub struct MeetingLocks {
    inner: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl MeetingLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `meeting_id`. The lock is released
    /// when the guard drops.
    pub async fn lock(&self, meeting_id: &str) -> OwnedMutexGuard<()> {
        let entry = {
            let mut table = match self.inner.lock() {
                Ok(table) => table,
                Err(poisoned) => poisoned.into_inner(),
            };
            // Drop entries nobody is holding or waiting on
            table.retain(|id, lock| id == meeting_id || Arc::strong_count(lock) > 1);
            table
                .entry(meeting_id.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        entry.lock_owned().await
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner.lock().map(|t| t.len()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn it_serializes_the_same_meeting() {
        let locks = MeetingLocks::new();
        let guard = locks.lock("m1").await;

        let contender = locks.clone();
        let waiting = tokio::spawn(async move {
            let _guard = contender.lock("m1").await;
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiting.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), waiting)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn it_does_not_block_other_meetings() {
        let locks = MeetingLocks::new();
        let _first = locks.lock("m1").await;
        tokio::time::timeout(Duration::from_secs(1), locks.lock("m2"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn it_prunes_released_entries() {
        let locks = MeetingLocks::new();
        drop(locks.lock("m1").await);
        drop(locks.lock("m2").await);
        let _held = locks.lock("m3").await;
        assert_eq!(locks.len(), 1);
    }
}
