use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

use super::events::UserId;

pub type ConnectionId = Uuid;

#[derive(Default)]
struct Connections {
    by_user: HashMap<UserId, HashSet<ConnectionId>>,
    owner: HashMap<ConnectionId, UserId>,
}

/// Live connections per user.
///
/// One lock covers both maps; connect/disconnect callbacks are short and
/// never await while holding it.
#[derive(Default)]
pub struct PresenceRegistry {
    inner: Mutex<Connections>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent. A connection id already owned by another user is moved.
    pub fn add_connection(&self, user_id: UserId, connection_id: ConnectionId) {
        let mut inner = self.lock();
        if let Some(previous) = inner.owner.insert(connection_id, user_id) {
            if previous != user_id {
                tracing::warn!(
                    %connection_id,
                    previous,
                    user_id,
                    "Connection re-registered to another user"
                );
                detach(&mut inner.by_user, previous, connection_id);
            }
        }
        inner
            .by_user
            .entry(user_id)
            .or_default()
            .insert(connection_id);
    }

    pub fn remove_connection(&self, user_id: UserId, connection_id: ConnectionId) {
        let mut inner = self.lock();
        if inner.owner.get(&connection_id) == Some(&user_id) {
            inner.owner.remove(&connection_id);
        }
        detach(&mut inner.by_user, user_id, connection_id);
    }

    pub fn connections_for(&self, user_id: UserId) -> HashSet<ConnectionId> {
        self.lock()
            .by_user
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn online_users(&self) -> Vec<UserId> {
        let mut users: Vec<UserId> = self.lock().by_user.keys().copied().collect();
        users.sort_unstable();
        users
    }

    pub fn connection_count(&self) -> usize {
        self.lock().owner.len()
    }

    fn lock(&self) -> MutexGuard<'_, Connections> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn detach(
    by_user: &mut HashMap<UserId, HashSet<ConnectionId>>,
    user_id: UserId,
    connection_id: ConnectionId,
) {
    if let Some(set) = by_user.get_mut(&user_id) {
        set.remove(&connection_id);
        if set.is_empty() {
            by_user.remove(&user_id);
        }
    }
}
