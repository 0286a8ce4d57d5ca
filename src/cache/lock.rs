//! Lock helpers that survive poisoning.
//!
//! Cache and session state stays usable after a panic elsewhere; the next
//! fetch or invalidation repairs anything left half-updated.

use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::warn;

pub(crate) fn rw_read<'a, T>(
    lock: &'a RwLock<T>,
    owner: &'static str,
    op: &'static str,
) -> RwLockReadGuard<'a, T> {
    lock.read().unwrap_or_else(|poisoned| {
        report_poisoned(owner, op, "rwlock.read");
        poisoned.into_inner()
    })
}

pub(crate) fn rw_write<'a, T>(
    lock: &'a RwLock<T>,
    owner: &'static str,
    op: &'static str,
) -> RwLockWriteGuard<'a, T> {
    lock.write().unwrap_or_else(|poisoned| {
        report_poisoned(owner, op, "rwlock.write");
        poisoned.into_inner()
    })
}

pub(crate) fn mutex_lock<'a, T>(
    lock: &'a Mutex<T>,
    owner: &'static str,
    op: &'static str,
) -> MutexGuard<'a, T> {
    lock.lock().unwrap_or_else(|poisoned| {
        report_poisoned(owner, op, "mutex.lock");
        poisoned.into_inner()
    })
}

fn report_poisoned(owner: &'static str, op: &'static str, lock_kind: &'static str) {
    warn!(
        op,
        owner,
        lock_kind,
        result = "poisoned_recovered",
        "Recovered from poisoned lock"
    );
}
