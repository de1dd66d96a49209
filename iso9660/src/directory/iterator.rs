//! Directory iteration
//!
//! Iterator for reading directory entries sequentially.

use crate::directory::record::{decode_record, DirectoryRecord, RecordSlot};
use crate::error::Result;
use crate::source::ImageSource;
use crate::types::NameEncoding;
use crate::utils::sector;
use alloc::vec::Vec;
use core::iter::FusedIterator;
use gpt_disk_io::BlockIo;

/// Directory iterator
///
/// Yields every record of one directory extent in on-disk order, including
/// the self and parent entries. Each logical block is read once; a zero
/// length byte or a tail too short for a record moves on to the next block.
/// After an error the iterator is exhausted.
pub struct DirectoryIterator<'a, B: BlockIo> {
    source: &'a mut ImageSource<B>,
    extent_start: u64,
    extent_len: u64,
    block_size: u64,
    encoding: NameEncoding,
    offset: u64,
    block: Vec<u8>,
    current_block: Option<u64>,
    done: bool,
}

impl<'a, B: BlockIo> DirectoryIterator<'a, B> {
    /// Create new directory iterator
    pub fn new(
        source: &'a mut ImageSource<B>,
        extent_lba: u32,
        extent_len: u32,
        block_size: u32,
        encoding: NameEncoding,
    ) -> Self {
        Self {
            source,
            extent_start: sector::block_to_byte(extent_lba, block_size),
            extent_len: u64::from(extent_len),
            block_size: u64::from(block_size),
            encoding,
            offset: 0,
            block: Vec::new(),
            current_block: None,
            done: false,
        }
    }

    fn load_block(&mut self, index: u64) -> Result<()> {
        if self.current_block == Some(index) {
            return Ok(());
        }

        // The window never extends past the directory's data length
        let start = index * self.block_size;
        let len = self.block_size.min(self.extent_len - start);
        self.block.resize(len as usize, 0);
        self.source
            .read_exact_into(self.extent_start + start, &mut self.block)?;
        self.current_block = Some(index);
        Ok(())
    }
}

impl<'a, B: BlockIo> Iterator for DirectoryIterator<'a, B> {
    type Item = Result<DirectoryRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            if self.offset >= self.extent_len {
                self.done = true;
                break;
            }

            let index = self.offset / self.block_size;
            let offset_in_block = (self.offset % self.block_size) as usize;

            if let Err(e) = self.load_block(index) {
                self.done = true;
                return Some(Err(e));
            }

            let block_start = self.extent_start + index * self.block_size;
            match decode_record(&self.block, offset_in_block, block_start, self.encoding) {
                Ok(RecordSlot::EndOfBlock) => {
                    self.offset = (index + 1) * self.block_size;
                }
                Ok(RecordSlot::Record(record)) => {
                    self.offset += u64::from(record.length);
                    return Some(Ok(record));
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }

        None
    }
}

impl<'a, B: BlockIo> FusedIterator for DirectoryIterator<'a, B> {}
