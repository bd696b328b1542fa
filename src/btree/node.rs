//! B+Tree node byte layout. Internal nodes hold separator keys and child
//! page ids; leaves hold key/RID pairs plus a sibling link. Kept purely
//! in-memory (no buffer-pool pinning) — B+Tree pages are never
//! persisted, only rebuilt from the heap on `create_index`.

use crate::storage::page::Page;
use crate::storage::rid::Rid;

const TAG_INTERNAL: u8 = 0;
const TAG_LEAF: u8 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BTreeNode {
    Internal {
        keys: Vec<i64>,
        /// len == keys.len() + 1
        children: Vec<u16>,
    },
    Leaf {
        keys: Vec<i64>,
        rids: Vec<Rid>,
        next: Option<u16>,
    },
}

impl BTreeNode {
    pub fn new_leaf() -> Self {
        BTreeNode::Leaf {
            keys: Vec::new(),
            rids: Vec::new(),
            next: None,
        }
    }

    pub fn num_keys(&self) -> usize {
        match self {
            BTreeNode::Internal { keys, .. } => keys.len(),
            BTreeNode::Leaf { keys, .. } => keys.len(),
        }
    }

    pub fn to_page(&self) -> Page {
        let mut page = Page::new();
        let mut cursor = 0usize;
        match self {
            BTreeNode::Internal { keys, children } => {
                page.write(0, &[TAG_INTERNAL]);
                page.write(1, &(keys.len() as u16).to_le_bytes());
                cursor = 3;
                for (i, key) in keys.iter().enumerate() {
                    page.write(cursor, &children[i].to_le_bytes());
                    cursor += 2;
                    page.write(cursor, &key.to_le_bytes());
                    cursor += 8;
                }
                page.write(cursor, &children[keys.len()].to_le_bytes());
            }
            BTreeNode::Leaf { keys, rids, next } => {
                page.write(0, &[TAG_LEAF]);
                page.write(1, &(keys.len() as u16).to_le_bytes());
                page.write(3, &next.unwrap_or(0).to_le_bytes());
                cursor = 5;
                for (i, key) in keys.iter().enumerate() {
                    page.write(cursor, &key.to_le_bytes());
                    cursor += 8;
                    page.write(cursor, &rids[i].page_id.to_le_bytes());
                    cursor += 2;
                    page.write(cursor, &rids[i].slot_id.to_le_bytes());
                    cursor += 2;
                }
            }
        }
        page
    }

    pub fn from_page(page: &Page) -> Self {
        let tag = page.read(0, 1)[0];
        let num_keys = u16::from_le_bytes(page.read(1, 2).try_into().unwrap()) as usize;
        match tag {
            TAG_INTERNAL => {
                let mut keys = Vec::with_capacity(num_keys);
                let mut children = Vec::with_capacity(num_keys + 1);
                let mut cursor = 3usize;
                for _ in 0..num_keys {
                    let child = u16::from_le_bytes(page.read(cursor, 2).try_into().unwrap());
                    cursor += 2;
                    let key = i64::from_le_bytes(page.read(cursor, 8).try_into().unwrap());
                    cursor += 8;
                    children.push(child);
                    keys.push(key);
                }
                let last_child = u16::from_le_bytes(page.read(cursor, 2).try_into().unwrap());
                children.push(last_child);
                BTreeNode::Internal { keys, children }
            }
            TAG_LEAF => {
                let next_raw = u16::from_le_bytes(page.read(3, 2).try_into().unwrap());
                let next = if next_raw == 0 { None } else { Some(next_raw) };
                let mut keys = Vec::with_capacity(num_keys);
                let mut rids = Vec::with_capacity(num_keys);
                let mut cursor = 5usize;
                for _ in 0..num_keys {
                    let key = i64::from_le_bytes(page.read(cursor, 8).try_into().unwrap());
                    cursor += 8;
                    let page_id = u16::from_le_bytes(page.read(cursor, 2).try_into().unwrap());
                    cursor += 2;
                    let slot_id = u16::from_le_bytes(page.read(cursor, 2).try_into().unwrap());
                    cursor += 2;
                    keys.push(key);
                    rids.push(Rid::new(page_id, slot_id));
                }
                BTreeNode::Leaf { keys, rids, next }
            }
            other => panic!("invalid btree node tag: {}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_roundtrips_through_bytes() {
        let node = BTreeNode::Leaf {
            keys: vec![10, 20, 30],
            rids: vec![Rid::new(0, 0), Rid::new(0, 1), Rid::new(1, 0)],
            next: Some(7),
        };
        let page = node.to_page();
        assert_eq!(BTreeNode::from_page(&page), node);
    }

    #[test]
    fn internal_roundtrips_through_bytes() {
        let node = BTreeNode::Internal {
            keys: vec![20, 40],
            children: vec![0, 1, 2],
        };
        let page = node.to_page();
        assert_eq!(BTreeNode::from_page(&page), node);
    }
}
