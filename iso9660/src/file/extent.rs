//! File extent management
//!
//! Extents represent contiguous data regions on disk.

use crate::utils::sector;

/// File extent (contiguous data region)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    /// Starting LBA
    pub lba: u32,

    /// Length in bytes
    pub length: u32,
}

impl Extent {
    /// Create new extent
    pub fn new(lba: u32, length: u32) -> Self {
        Self { lba, length }
    }

    /// Absolute byte offset of the first data byte
    pub fn byte_offset(&self, block_size: u32) -> u64 {
        sector::block_to_byte(self.lba, block_size)
    }

    /// Number of logical blocks covered
    pub fn block_count(&self, block_size: u32) -> u32 {
        sector::blocks_for_bytes(self.length, block_size)
    }

    /// End LBA (exclusive)
    pub fn end_lba(&self, block_size: u32) -> u64 {
        u64::from(self.lba) + u64::from(self.block_count(block_size))
    }
}
