use crate::connection::{ConnectionId, UserId};
use log::*;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct Entries {
    /// Primary index used for routing: identity -> live connections.
    by_user: HashMap<UserId, HashSet<ConnectionId>>,

    /// Reverse index so a connection id is owned by at most one identity.
    owners: HashMap<ConnectionId, UserId>,
}

/// In-memory mapping from user identity to that user's live connections.
///
/// Both indices live behind a single mutex, so every operation is one critical
/// section and callers never observe a half-applied mutation. An identity is
/// present only while it has at least one connection.
#[derive(Debug, Default)]
pub struct Registry {
    entries: Mutex<Entries>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        // None of the critical sections can leave the maps inconsistent, so a
        // poisoned lock is still safe to use.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add `connection_id` to `user_id`'s connection set. Re-adding is a no-op.
    pub fn add(&self, user_id: &str, connection_id: &ConnectionId) {
        let mut entries = self.lock();

        if let Some(previous) = entries.owners.get(connection_id).cloned() {
            if previous == user_id {
                return;
            }
            warn!(
                "Connection {} moved from user {} to user {}",
                connection_id, previous, user_id
            );
            Self::detach(&mut entries, &previous, connection_id);
        }

        entries
            .owners
            .insert(connection_id.clone(), user_id.to_owned());
        entries
            .by_user
            .entry(user_id.to_owned())
            .or_default()
            .insert(connection_id.clone());
    }

    /// Remove `connection_id` from `user_id`'s set, dropping the entry once it is empty.
    /// Absent identities or pairs are ignored.
    ///
    /// Returns `true` when, after the call, no identity owns `connection_id`. A
    /// `false` means the id now belongs to another identity and must be left alone.
    pub fn remove(&self, user_id: &str, connection_id: &ConnectionId) -> bool {
        let mut entries = self.lock();

        match entries.owners.get(connection_id) {
            Some(owner) if owner == user_id => {}
            Some(_) => return false,
            None => return true,
        }

        entries.owners.remove(connection_id);
        Self::detach(&mut entries, user_id, connection_id);
        true
    }

    fn detach(entries: &mut Entries, user_id: &str, connection_id: &ConnectionId) {
        if let Some(connections) = entries.by_user.get_mut(user_id) {
            connections.remove(connection_id);
            if connections.is_empty() {
                entries.by_user.remove(user_id);
            }
        }
    }

    /// Snapshot of `user_id`'s live connections; empty when the user is unknown.
    pub fn connections_for(&self, user_id: &str) -> HashSet<ConnectionId> {
        self.lock().by_user.get(user_id).cloned().unwrap_or_default()
    }

    pub fn identity_of(&self, connection_id: &ConnectionId) -> Option<UserId> {
        self.lock().owners.get(connection_id).cloned()
    }

    pub fn is_online(&self, user_id: &str) -> bool {
        self.lock().by_user.contains_key(user_id)
    }

    pub fn user_count(&self) -> usize {
        self.lock().by_user.len()
    }

    pub fn connection_count(&self) -> usize {
        self.lock().owners.len()
    }
}
