//! Per-interview turn locks.
//!
//! Turns for one interview are strictly serialized: the lock is taken
//! before the first store read of a turn and held until the reply (or the
//! failure) is final, so a second submission can never interleave its
//! evaluation or generation steps with a turn already in flight. Turns
//! for different interviews share nothing and run concurrently.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

#[derive(Default)]
pub struct TurnLocks {
    turns: std::sync::Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl TurnLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the exclusive section for one interview. The guard owns an
    /// `Arc` to its mutex, so a held or contended lock always has a strong
    /// count above one; entries back at one are stale and get dropped on
    /// the way in, keeping the map bounded by the number of live turns.
    pub async fn acquire(&self, interview_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut turns = self.turns.lock().expect("turn lock map poisoned");
            turns.retain(|_, lock| Arc::strong_count(lock) > 1);
            turns.entry(interview_id).or_default().clone()
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.turns.lock().expect("turn lock map poisoned").len()
    }
}
