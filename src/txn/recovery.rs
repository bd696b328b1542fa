//! Idempotent WAL replay against a fresh catalog. Aborted and in-doubt
//! (no commit record) transactions contribute nothing.

use super::wal::{LogRecord, Wal};
use crate::catalog::Catalog;
use crate::error::MiniDbResult;
use crate::storage::tuple::Tuple;
use std::collections::HashSet;
use std::sync::Arc;

pub fn replay(wal: &Wal, catalog: &mut Catalog) -> MiniDbResult<()> {
    let mut committed: HashSet<u64> = HashSet::new();
    for record in wal.get_records() {
        if let LogRecord::Commit(id) = record {
            committed.insert(*id);
        }
    }

    for record in wal.get_records() {
        if let LogRecord::Insert {
            txn_id,
            table_name,
            values,
        } = record
        {
            if !committed.contains(txn_id) {
                continue;
            }
            if let Some(table) = catalog.get_table(table_name) {
                let mut table = table.borrow_mut();
                let schema = Arc::new(table.schema().clone());
                let tuple = Tuple::new(schema, values.clone());
                table.insert(tuple)?;
            }
        }
    }
    Ok(())
}
