//! Fixed-size page buffer. A `Page` imposes no internal structure of its
//! own; `SlottedPage` and the B+Tree node layout interpret its bytes.

pub const PAGE_SIZE: usize = 4096;

#[derive(Clone)]
pub struct Page {
    bytes: [u8; PAGE_SIZE],
}

impl Page {
    /// A freshly created page is zero-filled.
    pub fn new() -> Self {
        Page {
            bytes: [0u8; PAGE_SIZE],
        }
    }

    pub fn from_bytes(bytes: [u8; PAGE_SIZE]) -> Self {
        Page { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; PAGE_SIZE] {
        &self.bytes
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8; PAGE_SIZE] {
        &mut self.bytes
    }

    pub fn read(&self, offset: usize, len: usize) -> &[u8] {
        &self.bytes[offset..offset + len]
    }

    pub fn write(&mut self, offset: usize, data: &[u8]) {
        self.bytes[offset..offset + data.len()].copy_from_slice(data);
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}
