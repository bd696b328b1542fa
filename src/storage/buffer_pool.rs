//! Frame cache with pin counts and dirty flags, fronting one
//! [`DiskManager`]. Instance-scoped rather than a global singleton.

use super::disk_manager::DiskManager;
use super::page::Page;
use crate::error::{MiniDbError, MiniDbResult};
use log::debug;

struct Frame {
    page_id: Option<u16>,
    page: Page,
    pin_count: u32,
    dirty: bool,
}

impl Frame {
    fn empty() -> Self {
        Frame {
            page_id: None,
            page: Page::new(),
            pin_count: 0,
            dirty: false,
        }
    }
}

pub struct BufferPool {
    frames: Vec<Frame>,
    page_table: std::collections::HashMap<u16, usize>,
    disk: DiskManager,
}

impl BufferPool {
    pub fn new(disk: DiskManager, pool_size: usize) -> Self {
        let mut frames = Vec::with_capacity(pool_size);
        for _ in 0..pool_size {
            frames.push(Frame::empty());
        }
        BufferPool {
            frames,
            page_table: std::collections::HashMap::new(),
            disk,
        }
    }

    fn find_victim(&self) -> Option<usize> {
        self.frames.iter().position(|f| f.pin_count == 0)
    }

    /// Returns a mutable reference to the page, pinning it. Evicts an
    /// unpinned frame and flushes it first if dirty.
    pub fn fetch_page(&mut self, page_id: u16) -> MiniDbResult<&mut Page> {
        if let Some(&idx) = self.page_table.get(&page_id) {
            self.frames[idx].pin_count += 1;
            debug!(
                "fetch_page {} hit, pin_count={}",
                page_id, self.frames[idx].pin_count
            );
            return Ok(&mut self.frames[idx].page);
        }

        let idx = self.find_victim().ok_or(MiniDbError::NoFreeFrame)?;

        if let Some(old_id) = self.frames[idx].page_id {
            if self.frames[idx].dirty {
                self.disk.write_page(old_id, &self.frames[idx].page)?;
            }
            self.page_table.remove(&old_id);
        }

        let page = self.disk.read_page(page_id)?;
        self.frames[idx] = Frame {
            page_id: Some(page_id),
            page,
            pin_count: 1,
            dirty: false,
        };
        self.page_table.insert(page_id, idx);
        debug!("fetch_page {} loaded into frame {}", page_id, idx);
        Ok(&mut self.frames[idx].page)
    }

    /// Allocates and writes a fresh zero-filled page at `page_id`,
    /// installing it into the pool pinned once, without reading from disk.
    pub fn new_page(&mut self, page_id: u16) -> MiniDbResult<&mut Page> {
        self.disk.write_page(page_id, &Page::new())?;
        if let Some(&idx) = self.page_table.get(&page_id) {
            self.frames[idx].pin_count += 1;
            return Ok(&mut self.frames[idx].page);
        }
        let idx = self.find_victim().ok_or(MiniDbError::NoFreeFrame)?;
        if let Some(old_id) = self.frames[idx].page_id {
            if self.frames[idx].dirty {
                self.disk.write_page(old_id, &self.frames[idx].page)?;
            }
            self.page_table.remove(&old_id);
        }
        self.frames[idx] = Frame {
            page_id: Some(page_id),
            page: Page::new(),
            pin_count: 1,
            dirty: false,
        };
        self.page_table.insert(page_id, idx);
        Ok(&mut self.frames[idx].page)
    }

    /// Returns a view of an already-resident page without touching its
    /// pin count. Used by iterators that pin once and then re-read the
    /// same page across several logical steps.
    pub fn peek_page(&self, page_id: u16) -> Option<&Page> {
        self.page_table.get(&page_id).map(|&idx| &self.frames[idx].page)
    }

    /// Decrements the pin count and ORs in the dirty flag. A no-op if the
    /// page is not resident.
    pub fn unpin_page(&mut self, page_id: u16, dirty: bool) {
        if let Some(&idx) = self.page_table.get(&page_id) {
            let frame = &mut self.frames[idx];
            debug_assert!(frame.pin_count > 0, "unpin underflow on page {}", page_id);
            frame.pin_count = frame.pin_count.saturating_sub(1);
            frame.dirty = frame.dirty || dirty;
        }
    }

    /// Writes the resident frame to disk. Does not clear the dirty flag.
    pub fn flush_page(&mut self, page_id: u16) -> MiniDbResult<()> {
        let idx = *self
            .page_table
            .get(&page_id)
            .ok_or(MiniDbError::PageNotFound(page_id as u32))?;
        self.disk.write_page(page_id, &self.frames[idx].page)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disk_manager() -> (tempfile::TempDir, DiskManager) {
        let dir = tempfile::tempdir().expect("tempdir");
        let disk = DiskManager::open(dir.path().join("pool.db")).expect("open disk manager");
        (dir, disk)
    }

    #[test]
    fn eviction_flushes_dirty_page_before_reuse() {
        let (_dir, disk) = disk_manager();
        let mut pool = BufferPool::new(disk, 1);

        pool.new_page(0).unwrap();
        pool.unpin_page(0, false);

        pool.fetch_page(0).unwrap().write(0, b"hello");
        pool.unpin_page(0, true);

        // pool_size=1: this new_page can only proceed by evicting page 0's
        // frame, which is dirty and must be flushed first.
        pool.new_page(1).unwrap();
        pool.unpin_page(1, false);

        let page = pool.fetch_page(0).unwrap();
        assert_eq!(page.read(0, 5), b"hello");
    }
}
