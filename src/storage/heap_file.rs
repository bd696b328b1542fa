//! Multi-page record store with a forward iterator: a page-then-slot
//! cursor over a slotted-page heap, instance-scoped (its own buffer pool
//! and disk manager per table file, no process-wide singleton).

use super::buffer_pool::BufferPool;
use super::disk_manager::DiskManager;
use super::rid::Rid;
use super::slotted_page::SlottedPage;
use crate::error::{MiniDbError, MiniDbResult};
use crate::txn::lock_manager::{LockManager, LockMode};
use log::debug;
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

pub struct HeapFile {
    pool: BufferPool,
    page_count: u16,
    lock_manager: Rc<RefCell<LockManager>>,
    bound_txn: Option<u64>,
}

impl HeapFile {
    pub fn open<P: AsRef<Path>>(
        path: P,
        pool_size: usize,
        lock_manager: Rc<RefCell<LockManager>>,
    ) -> MiniDbResult<Self> {
        let disk = DiskManager::open(path)?;
        let mut pool = BufferPool::new(disk, pool_size);

        // Page 0 always exists after initialization.
        let page = pool.new_page(0)?;
        SlottedPage::init(page);
        pool.unpin_page(0, true);

        Ok(HeapFile {
            pool,
            page_count: 1,
            lock_manager,
            bound_txn: None,
        })
    }

    pub fn bind_txn(&mut self, txn: Option<u64>) {
        self.bound_txn = txn;
    }

    pub fn page_count(&self) -> u16 {
        self.page_count
    }

    pub fn insert(&mut self, bytes: &[u8]) -> MiniDbResult<Rid> {
        for page_id in 0..self.page_count {
            let page = self.pool.fetch_page(page_id)?;
            let mut sp = SlottedPage::new(page);
            match sp.insert(bytes) {
                Ok(slot_id) => {
                    self.pool.unpin_page(page_id, true);
                    let rid = Rid::new(page_id, slot_id);
                    if let Some(txn) = self.bound_txn {
                        self.lock_manager
                            .borrow_mut()
                            .acquire(txn, rid, LockMode::Exclusive)?;
                    }
                    return Ok(rid);
                }
                Err(MiniDbError::NotEnoughFreeSpace) => {
                    self.pool.unpin_page(page_id, false);
                    continue;
                }
                Err(e) => {
                    self.pool.unpin_page(page_id, false);
                    return Err(e);
                }
            }
        }

        // Every existing page is full; append a new one.
        let new_page_id = self.page_count;
        let page = self.pool.new_page(new_page_id)?;
        SlottedPage::init(page);
        let mut sp = SlottedPage::new(page);
        let slot_id = sp.insert(bytes)?;
        self.pool.unpin_page(new_page_id, true);
        self.page_count += 1;
        debug!("heap file grew to {} pages", self.page_count);

        let rid = Rid::new(new_page_id, slot_id);
        if let Some(txn) = self.bound_txn {
            self.lock_manager
                .borrow_mut()
                .acquire(txn, rid, LockMode::Exclusive)?;
        }
        Ok(rid)
    }

    pub fn get(&mut self, rid: Rid) -> MiniDbResult<Option<Vec<u8>>> {
        if rid.page_id >= self.page_count {
            return Ok(None);
        }
        if let Some(txn) = self.bound_txn {
            // Lock conflicts on reads are deliberately ignored: the lock
            // manager's rejection does not fail the read.
            let _ = self
                .lock_manager
                .borrow_mut()
                .acquire(txn, rid, LockMode::Shared);
        }
        let page = self.pool.fetch_page(rid.page_id)?;
        let sp = SlottedPage::new(page);
        let bytes = sp.get(rid.slot_id);
        self.pool.unpin_page(rid.page_id, false);
        Ok(bytes)
    }

    pub fn delete(&mut self, rid: Rid) -> MiniDbResult<()> {
        if rid.page_id >= self.page_count {
            return Ok(());
        }
        let page = self.pool.fetch_page(rid.page_id)?;
        let mut sp = SlottedPage::new(page);
        sp.delete(rid.slot_id);
        self.pool.unpin_page(rid.page_id, true);
        Ok(())
    }

    /// Yields `(rid, bytes)` pairs page-order then slot-order, skipping
    /// dead slots. Pins the current page while yielding from it.
    pub fn scan(&mut self) -> HeapFileIter<'_> {
        HeapFileIter {
            heap: self,
            page_id: 0,
            slot_id: 0,
            current_page_pinned: false,
        }
    }
}

pub struct HeapFileIter<'a> {
    heap: &'a mut HeapFile,
    page_id: u16,
    slot_id: u16,
    current_page_pinned: bool,
}

impl<'a> Iterator for HeapFileIter<'a> {
    type Item = (Rid, Vec<u8>);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.page_id >= self.heap.page_count {
                return None;
            }

            if !self.current_page_pinned {
                if self.heap.pool.fetch_page(self.page_id).is_err() {
                    return None;
                }
                self.current_page_pinned = true;
            }

            let page = self.heap.pool.peek_page(self.page_id).expect("pinned");
            let max_slot = super::slotted_page::max_slot_id(page);

            if self.slot_id >= max_slot {
                self.heap.pool.unpin_page(self.page_id, false);
                self.current_page_pinned = false;
                self.page_id += 1;
                self.slot_id = 0;
                continue;
            }

            let bytes = super::slotted_page::get(page, self.slot_id);
            let rid = Rid::new(self.page_id, self.slot_id);
            self.slot_id += 1;
            if let Some(bytes) = bytes {
                return Some((rid, bytes));
            }
        }
    }
}

impl<'a> Drop for HeapFileIter<'a> {
    fn drop(&mut self) {
        if self.current_page_pinned {
            self.heap.pool.unpin_page(self.page_id, false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::txn::lock_manager::LockManager;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn heap_file() -> (tempfile::TempDir, HeapFile) {
        let dir = tempfile::tempdir().expect("tempdir");
        let lock_manager = Rc::new(RefCell::new(LockManager::new()));
        let heap = HeapFile::open(dir.path().join("heap.db"), 4, lock_manager)
            .expect("open heap file");
        (dir, heap)
    }

    #[test]
    fn delete_clears_its_record_and_leaves_others_untouched() {
        let (_dir, mut heap) = heap_file();
        let rid_a = heap.insert(b"alice").unwrap();
        let rid_b = heap.insert(b"bob").unwrap();
        let rid_c = heap.insert(b"carol").unwrap();

        heap.delete(rid_b).unwrap();

        assert_eq!(heap.get(rid_b).unwrap(), None);
        assert_eq!(heap.get(rid_a).unwrap(), Some(b"alice".to_vec()));
        assert_eq!(heap.get(rid_c).unwrap(), Some(b"carol".to_vec()));
    }
}
