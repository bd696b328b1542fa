//! Name-to-table registry, owning every table's schema. Instance-scoped
//! rather than a process-wide singleton.

use crate::error::{MiniDbError, MiniDbResult};
use crate::storage::schema::Schema;
use crate::table::Table;
use crate::txn::lock_manager::LockManager;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

pub struct Catalog {
    data_dir: PathBuf,
    buffer_pool_size: usize,
    lock_manager: Rc<RefCell<LockManager>>,
    tables: HashMap<String, Rc<RefCell<Table>>>,
}

impl Catalog {
    pub fn new(data_dir: PathBuf, buffer_pool_size: usize) -> Self {
        Catalog {
            data_dir,
            buffer_pool_size,
            lock_manager: Rc::new(RefCell::new(LockManager::new())),
            tables: HashMap::new(),
        }
    }

    /// Deep-copies `schema` (it is owned by the table, not the caller)
    /// and registers a table under `name`. Duplicate names overwrite.
    pub fn create_table(&mut self, name: &str, schema: Schema) -> MiniDbResult<()> {
        let path = self.data_dir.join(format!("{}.db", name));
        let table = Table::create(
            path,
            schema,
            self.buffer_pool_size,
            Rc::clone(&self.lock_manager),
        )?;
        self.tables
            .insert(name.to_string(), Rc::new(RefCell::new(table)));
        Ok(())
    }

    pub fn get_table(&self, name: &str) -> Option<Rc<RefCell<Table>>> {
        self.tables.get(name).cloned()
    }

    pub fn require_table(&self, name: &str) -> MiniDbResult<Rc<RefCell<Table>>> {
        self.tables
            .get(name)
            .cloned()
            .ok_or_else(|| MiniDbError::TableNotFound(name.to_string()))
    }

    pub fn lock_manager(&self) -> Rc<RefCell<LockManager>> {
        Rc::clone(&self.lock_manager)
    }
}
