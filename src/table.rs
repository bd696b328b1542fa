//! A table owns its heap file and every index built over it, keeping
//! indexes in sync on insert.

use crate::btree::BTree;
use crate::error::MiniDbResult;
use crate::storage::heap_file::HeapFile;
use crate::storage::rid::Rid;
use crate::storage::schema::{DataType, Schema};
use crate::storage::tuple::{Tuple, Value};
use crate::txn::lock_manager::LockManager;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

pub struct Table {
    schema: Arc<Schema>,
    heap: HeapFile,
    indexes: HashMap<String, BTree>,
}

impl Table {
    pub fn create<P: AsRef<Path>>(
        path: P,
        schema: Schema,
        pool_size: usize,
        lock_manager: Rc<RefCell<LockManager>>,
    ) -> MiniDbResult<Self> {
        let heap = HeapFile::open(path, pool_size, lock_manager)?;
        Ok(Table {
            schema: Arc::new(schema),
            heap,
            indexes: HashMap::new(),
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn bind_txn(&mut self, txn: Option<u64>) {
        self.heap.bind_txn(txn);
    }

    pub fn insert(&mut self, tuple: Tuple) -> MiniDbResult<Rid> {
        let bytes = tuple.serialize();
        let rid = self.heap.insert(&bytes)?;
        for (col_name, tree) in self.indexes.iter_mut() {
            let idx = self.schema.column_index(col_name).expect("indexed column exists");
            if let Value::Integer(key) = tuple.values[idx] {
                tree.insert(key, rid);
            }
        }
        Ok(rid)
    }

    pub fn get(&mut self, rid: Rid) -> MiniDbResult<Option<Tuple>> {
        let schema = self.schema.clone();
        Ok(self
            .heap
            .get(rid)?
            .map(|bytes| Tuple::deserialize(&bytes, schema)))
    }

    /// Scans all live tuples in heap order, deserializing each record.
    pub fn scan(&mut self) -> MiniDbResult<Vec<(Rid, Tuple)>> {
        let schema = self.schema.clone();
        let rows: Vec<(Rid, Tuple)> = self
            .heap
            .scan()
            .map(|(rid, bytes)| (rid, Tuple::deserialize(&bytes, schema.clone())))
            .collect();
        Ok(rows)
    }

    pub fn index(&self, column: &str) -> Option<&BTree> {
        self.indexes.get(column)
    }

    pub fn has_index(&self, column: &str) -> bool {
        self.indexes.contains_key(column)
    }

    /// Builds a new empty B+Tree on `column` by scanning the heap. A
    /// no-op if the column's declared type is not integer.
    pub fn create_index(&mut self, column: &str) -> MiniDbResult<()> {
        let idx = match self.schema.column_index(column) {
            Some(i) => i,
            None => return Ok(()),
        };
        if self.schema.columns[idx].data_type != DataType::Integer {
            return Ok(());
        }

        let mut tree = BTree::new();
        for (rid, tuple) in self.scan()? {
            if let Value::Integer(key) = tuple.values[idx] {
                tree.insert(key, rid);
            }
        }
        self.indexes.insert(column.to_string(), tree);
        Ok(())
    }
}
