//! Page-granular seek/read/write against a backing file. Writes are
//! symmetric with reads and routed through a dedicated type instead of
//! being inlined in the buffer pool.

use super::page::{Page, PAGE_SIZE};
use crate::error::MiniDbResult;
use log::trace;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

pub struct DiskManager {
    file: File,
}

impl DiskManager {
    pub fn open<P: AsRef<Path>>(path: P) -> MiniDbResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;
        Ok(DiskManager { file })
    }

    fn offset(page_id: u16) -> u64 {
        page_id as u64 * PAGE_SIZE as u64
    }

    /// Reads the full page at `page_id` from disk, failing the caller's
    /// responsibility to stay within the file's current extent.
    pub fn read_page(&mut self, page_id: u16) -> MiniDbResult<Page> {
        trace!("disk read page {}", page_id);
        self.file.seek(SeekFrom::Start(Self::offset(page_id)))?;
        let mut buf = [0u8; PAGE_SIZE];
        self.file.read_exact(&mut buf)?;
        Ok(Page::from_bytes(buf))
    }

    /// Writes the full page at `page_id`, extending the file if needed.
    pub fn write_page(&mut self, page_id: u16, page: &Page) -> MiniDbResult<()> {
        trace!("disk write page {}", page_id);
        self.file.seek(SeekFrom::Start(Self::offset(page_id)))?;
        self.file.write_all(page.as_bytes())?;
        Ok(())
    }
}
