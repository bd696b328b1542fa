//! Transaction lifecycle. Ids are monotonic per `TransactionManager`
//! instance, starting at 1.

use crate::error::{MiniDbError, MiniDbResult};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnState {
    Active,
    Committed,
    Aborted,
}

pub struct TransactionManager {
    next_id: u64,
    states: HashMap<u64, TxnState>,
}

impl TransactionManager {
    pub fn new() -> Self {
        TransactionManager {
            next_id: 1,
            states: HashMap::new(),
        }
    }

    pub fn begin(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.states.insert(id, TxnState::Active);
        id
    }

    pub fn commit(&mut self, txn: u64) -> MiniDbResult<()> {
        match self.states.get_mut(&txn) {
            Some(state) if *state == TxnState::Active => {
                *state = TxnState::Committed;
                Ok(())
            }
            Some(_) => Err(MiniDbError::TransactionNotActive),
            None => Err(MiniDbError::TransactionNotFound),
        }
    }

    pub fn abort(&mut self, txn: u64) -> MiniDbResult<()> {
        match self.states.get_mut(&txn) {
            Some(state) if *state == TxnState::Active => {
                *state = TxnState::Aborted;
                Ok(())
            }
            Some(_) => Err(MiniDbError::TransactionNotActive),
            None => Err(MiniDbError::TransactionNotFound),
        }
    }

    pub fn state(&self, txn: u64) -> Option<TxnState> {
        self.states.get(&txn).copied()
    }
}

impl Default for TransactionManager {
    fn default() -> Self {
        Self::new()
    }
}
