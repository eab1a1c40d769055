//! Fixed-capacity sign buffer (oldest evicted on overflow)

use std::collections::VecDeque;

use crate::types::SymbolId;

/// Bounded ring of symbol ids in insertion order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignBuffer {
    signs: VecDeque<SymbolId>,
    capacity: usize,
}

impl SignBuffer {
    /// Create an empty buffer; capacity is clamped to at least 1
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            signs: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append, evicting the oldest sign when full
    pub fn push(&mut self, sign: SymbolId) {
        if self.signs.len() == self.capacity {
            self.signs.pop_front();
        }
        self.signs.push_back(sign);
    }

    /// Most recently appended sign
    pub fn last(&self) -> Option<SymbolId> {
        self.signs.back().copied()
    }

    pub fn clear(&mut self) {
        self.signs.clear();
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = SymbolId> + ExactSizeIterator + '_ {
        self.signs.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.signs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signs.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn to_vec(&self) -> Vec<SymbolId> {
        self.signs.iter().copied().collect()
    }
}
