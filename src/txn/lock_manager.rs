//! Per-RID shared/exclusive locks. A correctness primitive for a future
//! multi-session design: in this single-threaded model conflicts are
//! immediate errors, never blocks or waits.

use crate::error::{MiniDbError, MiniDbResult};
use crate::storage::rid::Rid;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    Shared,
    Exclusive,
}

struct LockEntry {
    mode: LockMode,
    holders: HashSet<u64>,
}

#[derive(Default)]
pub struct LockManager {
    entries: HashMap<Rid, LockEntry>,
}

impl LockManager {
    pub fn new() -> Self {
        LockManager {
            entries: HashMap::new(),
        }
    }

    pub fn acquire(&mut self, txn: u64, rid: Rid, mode: LockMode) -> MiniDbResult<()> {
        match self.entries.get_mut(&rid) {
            None => {
                let mut holders = HashSet::new();
                holders.insert(txn);
                self.entries.insert(rid, LockEntry { mode, holders });
                Ok(())
            }
            Some(entry) if entry.holders.contains(&txn) => Ok(()),
            Some(entry) if entry.mode == LockMode::Shared && mode == LockMode::Shared => {
                entry.holders.insert(txn);
                Ok(())
            }
            Some(_) => Err(MiniDbError::LockConflict(rid)),
        }
    }

    pub fn release(&mut self, txn: u64, rid: Rid) {
        if let Some(entry) = self.entries.get_mut(&rid) {
            entry.holders.remove(&txn);
            if entry.holders.is_empty() {
                self.entries.remove(&rid);
            }
        }
    }

    pub fn release_all(&mut self, txn: u64) {
        self.entries.retain(|_, entry| {
            entry.holders.remove(&txn);
            !entry.holders.is_empty()
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_shared_locks_coexist() {
        let mut lm = LockManager::new();
        let rid = Rid::new(0, 0);
        assert!(lm.acquire(1, rid, LockMode::Shared).is_ok());
        assert!(lm.acquire(2, rid, LockMode::Shared).is_ok());
    }

    #[test]
    fn exclusive_conflicts_with_anything() {
        let mut lm = LockManager::new();
        let rid = Rid::new(0, 0);
        assert!(lm.acquire(1, rid, LockMode::Exclusive).is_ok());
        assert!(lm.acquire(2, rid, LockMode::Shared).is_err());
        assert!(lm.acquire(2, rid, LockMode::Exclusive).is_err());
    }

    #[test]
    fn reentrant_for_same_txn() {
        let mut lm = LockManager::new();
        let rid = Rid::new(0, 0);
        assert!(lm.acquire(1, rid, LockMode::Exclusive).is_ok());
        assert!(lm.acquire(1, rid, LockMode::Shared).is_ok());
    }

    #[test]
    fn release_empties_entry() {
        let mut lm = LockManager::new();
        let rid = Rid::new(0, 0);
        lm.acquire(1, rid, LockMode::Exclusive).unwrap();
        lm.release(1, rid);
        assert!(lm.acquire(2, rid, LockMode::Exclusive).is_ok());
    }
}
