//! File reader implementation

use crate::directory::record::DirectoryRecord;
use crate::error::{Iso9660Error, Result};
use crate::source::ImageSource;
use gpt_disk_io::BlockIo;

/// Positioned reader over one file's extent
///
/// Provides a seek/read interface for files that may be too large
/// to load entirely into memory.
pub struct FileReader<'a, B: BlockIo> {
    source: &'a mut ImageSource<B>,
    file: DirectoryRecord,
    data_offset: u64,
    position: u64,
}

impl<'a, B: BlockIo> FileReader<'a, B> {
    /// Create new file reader
    ///
    /// Fails with [`Iso9660Error::IsADirectory`] for directory records.
    pub fn new(source: &'a mut ImageSource<B>, block_size: u32, file: DirectoryRecord) -> Result<Self> {
        if file.is_directory() {
            return Err(Iso9660Error::IsADirectory { name: file.name });
        }

        let data_offset = file.extent().byte_offset(block_size);
        Ok(Self {
            source,
            file,
            data_offset,
            position: 0,
        })
    }

    /// Read bytes from current position
    ///
    /// Returns number of bytes read (0 at end of file)
    pub fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let to_read = buffer.len().min(self.remaining() as usize);
        if to_read == 0 {
            return Ok(0);
        }

        self.source
            .read_exact_into(self.data_offset + self.position, &mut buffer[..to_read])?;
        self.position += to_read as u64;
        Ok(to_read)
    }

    /// Seek to absolute position
    pub fn seek(&mut self, pos: u64) {
        self.position = pos.min(self.size());
    }

    /// Seek relative to current position
    pub fn seek_relative(&mut self, offset: i64) {
        let new_pos = if offset < 0 {
            self.position.saturating_sub(offset.unsigned_abs())
        } else {
            self.position.saturating_add(offset as u64)
        };
        self.position = new_pos.min(self.size());
    }

    /// Get current position
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Get file size
    pub fn size(&self) -> u64 {
        u64::from(self.file.data_length)
    }

    /// Check if at end of file
    pub fn is_eof(&self) -> bool {
        self.position >= self.size()
    }

    /// Get remaining bytes
    pub fn remaining(&self) -> u64 {
        self.size().saturating_sub(self.position)
    }

    /// The record being read
    pub fn record(&self) -> &DirectoryRecord {
        &self.file
    }
}

#[cfg(feature = "std")]
impl<'a, B: BlockIo> std::io::Read for FileReader<'a, B> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        FileReader::read(self, buf).map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }
}

#[cfg(feature = "std")]
impl<'a, B: BlockIo> std::io::Seek for FileReader<'a, B> {
    fn seek(&mut self, pos: std::io::SeekFrom) -> std::io::Result<u64> {
        use std::io::SeekFrom;

        let target = match pos {
            SeekFrom::Start(n) => Some(n),
            SeekFrom::End(delta) => self.size().checked_add_signed(delta),
            SeekFrom::Current(delta) => self.position.checked_add_signed(delta),
        };

        match target {
            Some(n) => {
                FileReader::seek(self, n);
                Ok(self.position)
            }
            None => Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "seek before start of file",
            )),
        }
    }
}
