//! Random-access byte reader over an image
//!
//! [`ImageSource`] turns any [`BlockIo`] device into an absolute
//! `offset + length` reader. Reads are mapped onto whole device blocks;
//! nothing is cached between calls.

use crate::error::{Iso9660Error, Result};
use alloc::vec;
use alloc::vec::Vec;
use gpt_disk_io::BlockIo;
use gpt_disk_types::Lba;

/// Byte-addressable view over a block device holding an ISO image
pub struct ImageSource<B: BlockIo> {
    block_io: B,
    block_size: u64,
    len: u64,
}

impl<B: BlockIo> ImageSource<B> {
    /// Wrap a block device
    ///
    /// The image size is taken from the device's block count.
    pub fn new(mut block_io: B) -> Result<Self> {
        let block_size = u64::from(block_io.block_size().to_u32());
        let num_blocks = block_io.num_blocks().map_err(Iso9660Error::io)?;

        Ok(Self {
            block_io,
            block_size,
            len: num_blocks.saturating_mul(block_size),
        })
    }

    /// Wrap a block device whose image ends inside its last block
    ///
    /// `len` is the image size in bytes, clamped to the device size.
    pub fn with_len(block_io: B, len: u64) -> Result<Self> {
        let mut source = Self::new(block_io)?;
        source.len = source.len.min(len);
        Ok(source)
    }

    /// Image size in bytes
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether the image holds no bytes at all
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Release the underlying device
    pub fn into_inner(self) -> B {
        self.block_io
    }

    /// Fail with [`Iso9660Error::TruncatedRead`] unless `requested` bytes
    /// exist from `offset` on
    pub fn ensure_available(&self, offset: u64, requested: u64) -> Result<()> {
        let available = self.len.saturating_sub(offset);
        if requested > available {
            return Err(Iso9660Error::TruncatedRead {
                offset,
                requested,
                available,
            });
        }
        Ok(())
    }

    /// Read exactly `length` bytes starting at `offset`
    ///
    /// The range is checked against the image size before anything is
    /// allocated.
    pub fn read_exact(&mut self, offset: u64, length: u32) -> Result<Vec<u8>> {
        self.ensure_available(offset, u64::from(length))?;
        let mut buffer = vec![0u8; length as usize];
        self.read_exact_into(offset, &mut buffer)?;
        Ok(buffer)
    }

    /// Fill `dst` with the bytes starting at `offset`
    ///
    /// Fails with [`Iso9660Error::TruncatedRead`] when the image ends before
    /// `dst` is full; nothing is read in that case.
    pub fn read_exact_into(&mut self, offset: u64, dst: &mut [u8]) -> Result<()> {
        let requested = dst.len() as u64;
        if requested == 0 {
            return Ok(());
        }

        self.ensure_available(offset, requested)?;

        let first_block = offset / self.block_size;
        let head = (offset % self.block_size) as usize;

        // Block-aligned reads go straight into the caller's buffer
        if head == 0 && requested % self.block_size == 0 {
            return self
                .block_io
                .read_blocks(Lba(first_block), dst)
                .map_err(Iso9660Error::io);
        }

        let last_block = (offset + requested - 1) / self.block_size;
        let block_count = last_block - first_block + 1;
        let mut scratch = vec![0u8; (block_count * self.block_size) as usize];
        self.block_io
            .read_blocks(Lba(first_block), &mut scratch)
            .map_err(Iso9660Error::io)?;

        dst.copy_from_slice(&scratch[head..head + dst.len()]);
        Ok(())
    }
}

#[cfg(feature = "std")]
pub use self::file_image::FileImage;

#[cfg(feature = "std")]
mod file_image {
    use super::ImageSource;
    use crate::error::{Iso9660Error, Result};
    use crate::types::SECTOR_SIZE;
    use gpt_disk_io::BlockIo;
    use gpt_disk_types::{BlockSize, Lba};
    use std::fs::File;
    use std::io::{self, Read, Seek, SeekFrom};
    use std::path::Path;

    /// Read-only block device over an image file
    ///
    /// Blocks are 2048 bytes. A trailing partial block reads back
    /// zero-padded; [`ImageSource::open`] still bounds reads by the real
    /// file length.
    #[derive(Debug)]
    pub struct FileImage {
        file: File,
        block_size: BlockSize,
        len: u64,
    }

    impl FileImage {
        /// Open an image file for reading
        pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
            let path = path.as_ref();
            let describe =
                |e: io::Error| Iso9660Error::Io(std::format!("{}: {}", path.display(), e));

            let file = File::open(path).map_err(describe)?;
            let len = file.metadata().map_err(describe)?.len();
            let block_size = BlockSize::new(SECTOR_SIZE as u32)
                .ok_or_else(|| Iso9660Error::Io("unsupported device block size".into()))?;

            log::debug!("opened {} ({} bytes)", path.display(), len);
            Ok(Self {
                file,
                block_size,
                len,
            })
        }

        /// Image file length in bytes
        pub fn len(&self) -> u64 {
            self.len
        }

        /// Whether the file is empty
        pub fn is_empty(&self) -> bool {
            self.len == 0
        }
    }

    impl BlockIo for FileImage {
        type Error = io::Error;

        fn block_size(&self) -> BlockSize {
            self.block_size
        }

        fn num_blocks(&mut self) -> core::result::Result<u64, Self::Error> {
            Ok(self.len.div_ceil(u64::from(self.block_size.to_u32())))
        }

        fn read_blocks(
            &mut self,
            start_lba: Lba,
            dst: &mut [u8],
        ) -> core::result::Result<(), Self::Error> {
            let block_size = u64::from(self.block_size.to_u32());
            let offset = start_lba.0 * block_size;
            if offset + dst.len() as u64 > self.len.div_ceil(block_size) * block_size {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "read beyond end of image",
                ));
            }

            let present = self.len.saturating_sub(offset).min(dst.len() as u64) as usize;
            self.file.seek(SeekFrom::Start(offset))?;
            self.file.read_exact(&mut dst[..present])?;
            dst[present..].fill(0);
            Ok(())
        }

        fn write_blocks(&mut self, _start_lba: Lba, _src: &[u8]) -> core::result::Result<(), Self::Error> {
            Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "ISO image is opened read-only",
            ))
        }

        fn flush(&mut self) -> core::result::Result<(), Self::Error> {
            Ok(())
        }
    }

    impl ImageSource<FileImage> {
        /// Open an image file
        ///
        /// Fails with [`Iso9660Error::Io`] if the path does not exist or
        /// cannot be opened.
        pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
            let image = FileImage::open(path)?;
            let len = image.len();
            Self::with_len(image, len)
        }
    }
}
