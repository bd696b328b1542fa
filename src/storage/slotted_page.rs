//! Slotted page layout: a directory of (offset, length) slots growing
//! forward from the header, records growing backward from the page end.

use super::page::{Page, PAGE_SIZE};
use crate::error::{MiniDbError, MiniDbResult};

pub const HEADER_SIZE: usize = 6;
const SLOT_SIZE: usize = 4;

/// A thin byte-layout view over a `Page`. Does not own the page; callers
/// fetch the page from the buffer pool and wrap it for the duration of an
/// operation.
pub struct SlottedPage<'a> {
    page: &'a mut Page,
}

impl<'a> SlottedPage<'a> {
    pub fn new(page: &'a mut Page) -> Self {
        SlottedPage { page }
    }

    /// Initializes a fresh page's header: zero slots, free space spanning
    /// the whole body.
    pub fn init(page: &mut Page) {
        let mut sp = SlottedPage { page };
        sp.set_num_slots(0);
        sp.set_free_space_start(HEADER_SIZE as u16);
        sp.set_free_space_end(PAGE_SIZE as u16);
    }

    fn num_slots(&self) -> u16 {
        u16::from_le_bytes(self.page.read(0, 2).try_into().unwrap())
    }
    fn set_num_slots(&mut self, v: u16) {
        self.page.write(0, &v.to_le_bytes());
    }
    fn free_space_start(&self) -> u16 {
        u16::from_le_bytes(self.page.read(2, 2).try_into().unwrap())
    }
    fn set_free_space_start(&mut self, v: u16) {
        self.page.write(2, &v.to_le_bytes());
    }
    fn free_space_end(&self) -> u16 {
        u16::from_le_bytes(self.page.read(4, 2).try_into().unwrap())
    }
    fn set_free_space_end(&mut self, v: u16) {
        self.page.write(4, &v.to_le_bytes());
    }

    fn slot_offset(slot_id: u16) -> usize {
        HEADER_SIZE + slot_id as usize * SLOT_SIZE
    }

    fn slot_count(&self) -> u16 {
        // Number of directory entries, i.e. directory capacity, derived
        // from how far free_space_start has advanced past the header.
        (self.free_space_start() - HEADER_SIZE as u16) / SLOT_SIZE as u16
    }

    fn read_slot(&self, slot_id: u16) -> (u16, u16) {
        let off = Self::slot_offset(slot_id);
        let record_offset = u16::from_le_bytes(self.page.read(off, 2).try_into().unwrap());
        let record_length = u16::from_le_bytes(self.page.read(off + 2, 2).try_into().unwrap());
        (record_offset, record_length)
    }

    fn write_slot(&mut self, slot_id: u16, record_offset: u16, record_length: u16) {
        let off = Self::slot_offset(slot_id);
        self.page.write(off, &record_offset.to_le_bytes());
        self.page.write(off + 2, &record_length.to_le_bytes());
    }

    pub fn free_space(&self) -> usize {
        (self.free_space_end() - self.free_space_start()) as usize
    }

    /// Rewrites live records contiguously against the page end, updating
    /// their slot offsets, and resets `free_space_end`. Slot ids are
    /// preserved across compaction.
    fn compact(&mut self) {
        let slot_count = self.slot_count();
        let mut live: Vec<(u16, Vec<u8>)> = Vec::new();
        for slot_id in 0..slot_count {
            let (offset, len) = self.read_slot(slot_id);
            if offset != 0 {
                let bytes = self.page.read(offset as usize, len as usize).to_vec();
                live.push((slot_id, bytes));
            }
        }
        // Preserve slot directory order while packing records from the
        // page end inward, widest-first order does not matter for
        // correctness; we pack in directory order for determinism.
        let mut cursor = PAGE_SIZE as u16;
        for (slot_id, bytes) in live {
            cursor -= bytes.len() as u16;
            self.page.write(cursor as usize, &bytes);
            self.write_slot(slot_id, cursor, bytes.len() as u16);
        }
        self.set_free_space_end(cursor);
    }

    /// Inserts `bytes`, returning the assigned slot id.
    pub fn insert(&mut self, bytes: &[u8]) -> MiniDbResult<u16> {
        let needed = bytes.len() + SLOT_SIZE;
        if needed > self.free_space() {
            self.compact();
            if needed > self.free_space() {
                return Err(MiniDbError::NotEnoughFreeSpace);
            }
        }

        let slot_count = self.slot_count();
        let mut reuse_slot = None;
        for slot_id in 0..slot_count {
            let (offset, _) = self.read_slot(slot_id);
            if offset == 0 {
                reuse_slot = Some(slot_id);
                break;
            }
        }

        let new_end = self.free_space_end() - bytes.len() as u16;
        self.page.write(new_end as usize, bytes);
        self.set_free_space_end(new_end);

        let slot_id = match reuse_slot {
            Some(id) => id,
            None => {
                let id = slot_count;
                self.set_free_space_start(self.free_space_start() + SLOT_SIZE as u16);
                id
            }
        };
        self.write_slot(slot_id, new_end, bytes.len() as u16);
        self.set_num_slots(self.num_slots() + 1);
        Ok(slot_id)
    }

    pub fn get(&self, slot_id: u16) -> Option<Vec<u8>> {
        if slot_id >= self.slot_count() {
            return None;
        }
        let (offset, len) = self.read_slot(slot_id);
        if offset == 0 {
            return None;
        }
        Some(self.page.read(offset as usize, len as usize).to_vec())
    }

    /// Zeroes the slot entry. Retreats `free_space_start` if this was the
    /// final directory entry. Record payload bytes are reclaimed only at
    /// the next compaction.
    pub fn delete(&mut self, slot_id: u16) {
        let slot_count = self.slot_count();
        if slot_id >= slot_count {
            return;
        }
        let (offset, _) = self.read_slot(slot_id);
        if offset == 0 {
            return;
        }
        self.write_slot(slot_id, 0, 0);
        self.set_num_slots(self.num_slots() - 1);
        if slot_id + 1 == slot_count {
            self.set_free_space_start(self.free_space_start() - SLOT_SIZE as u16);
        }
    }

    pub fn max_slot_id(&self) -> u16 {
        self.slot_count()
    }
}

fn slot_count_of(page: &Page) -> u16 {
    let free_space_start = u16::from_le_bytes(page.read(2, 2).try_into().unwrap());
    (free_space_start - HEADER_SIZE as u16) / SLOT_SIZE as u16
}

fn read_slot_of(page: &Page, slot_id: u16) -> (u16, u16) {
    let off = HEADER_SIZE + slot_id as usize * SLOT_SIZE;
    let record_offset = u16::from_le_bytes(page.read(off, 2).try_into().unwrap());
    let record_length = u16::from_le_bytes(page.read(off + 2, 2).try_into().unwrap());
    (record_offset, record_length)
}

/// Read-only directory length, for callers holding a shared `&Page`
/// (e.g. a heap iterator re-reading an already-pinned page).
pub fn max_slot_id(page: &Page) -> u16 {
    slot_count_of(page)
}

/// Read-only record fetch, mirroring `SlottedPage::get` but against a
/// shared `&Page`.
pub fn get(page: &Page, slot_id: u16) -> Option<Vec<u8>> {
    if slot_id >= slot_count_of(page) {
        return None;
    }
    let (offset, len) = read_slot_of(page, slot_id);
    if offset == 0 {
        return None;
    }
    Some(page.read(offset as usize, len as usize).to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_get_delete_roundtrip() {
        let mut page = Page::new();
        SlottedPage::init(&mut page);
        let mut sp = SlottedPage::new(&mut page);

        let s0 = sp.insert(b"hello").unwrap();
        let s1 = sp.insert(b"world!!").unwrap();
        assert_eq!(sp.get(s0).unwrap(), b"hello");
        assert_eq!(sp.get(s1).unwrap(), b"world!!");

        sp.delete(s0);
        assert_eq!(sp.get(s0), None);
        assert_eq!(sp.get(s1).unwrap(), b"world!!");

        let s2 = sp.insert(b"reused").unwrap();
        assert_eq!(s2, s0);
        assert_eq!(sp.get(s2).unwrap(), b"reused");
    }

    #[test]
    fn compaction_preserves_slot_ids() {
        let mut page = Page::new();
        SlottedPage::init(&mut page);
        let mut sp = SlottedPage::new(&mut page);

        let mut slots = Vec::new();
        for i in 0..5u8 {
            let bytes = vec![i; 100];
            slots.push(sp.insert(&bytes).unwrap());
        }
        // delete a middle record to create a hole, then force compaction
        // by inserting something requiring the reclaimed space.
        sp.delete(slots[2]);
        let filler = vec![9u8; 150];
        let new_slot = sp.insert(&filler).unwrap();

        assert_eq!(sp.get(new_slot).unwrap(), filler);
        for (i, &slot_id) in slots.iter().enumerate() {
            if i == 2 {
                continue;
            }
            assert_eq!(sp.get(slot_id).unwrap(), vec![i as u8; 100]);
        }
    }
}
