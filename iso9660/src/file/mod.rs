//! File reading and extent management
//!
//! Payloads are returned byte-exact: `data_length` bytes starting at
//! `extent_lba * block_size`, with no transformation.

pub mod extent;
pub mod metadata;
pub mod reader;

pub use reader::FileReader;

use crate::directory::record::DirectoryRecord;
use crate::error::{Iso9660Error, Result};
use crate::source::ImageSource;
use alloc::vec::Vec;
use gpt_disk_io::BlockIo;

/// Chunk size used when streaming a file to a sink
pub const EXTRACT_CHUNK_SIZE: usize = 64 * 1024;

fn ensure_file(record: &DirectoryRecord) -> Result<()> {
    if record.is_directory() {
        return Err(Iso9660Error::IsADirectory {
            name: record.name.clone(),
        });
    }
    Ok(())
}

/// Read file contents into `buffer`
///
/// # Returns
/// Number of bytes read (the file's data length)
pub fn read_file<B: BlockIo>(
    source: &mut ImageSource<B>,
    block_size: u32,
    file: &DirectoryRecord,
    buffer: &mut [u8],
) -> Result<usize> {
    ensure_file(file)?;

    let file_size = file.data_length as usize;
    if buffer.len() < file_size {
        return Err(Iso9660Error::ShortWrite {
            written: 0,
            expected: file_size as u64,
        });
    }

    source.read_exact_into(file.extent().byte_offset(block_size), &mut buffer[..file_size])?;
    Ok(file_size)
}

/// Read a whole file into a new Vec
///
/// Fails with [`Iso9660Error::IsADirectory`] for directory records and with
/// [`Iso9660Error::TruncatedRead`], before allocating, when the extent runs
/// past the end of the image.
pub fn extract<B: BlockIo>(
    source: &mut ImageSource<B>,
    block_size: u32,
    file: &DirectoryRecord,
) -> Result<Vec<u8>> {
    ensure_file(file)?;
    source.read_exact(file.extent().byte_offset(block_size), file.data_length)
}

#[cfg(feature = "std")]
pub use self::sink::{extract_to, extract_to_dir};

#[cfg(feature = "std")]
mod sink {
    use super::{ensure_file, FileReader, EXTRACT_CHUNK_SIZE};
    use crate::directory::record::DirectoryRecord;
    use crate::error::{Iso9660Error, Result};
    use crate::source::ImageSource;
    use gpt_disk_io::BlockIo;
    use std::fs::OpenOptions;
    use std::io::{self, Write};
    use std::path::{Path, PathBuf};

    /// Stream a file into `sink` in fixed-size chunks
    ///
    /// Returns the number of bytes written, always the file's data length.
    /// A sink that stops accepting bytes fails with
    /// [`Iso9660Error::ShortWrite`].
    pub fn extract_to<B: BlockIo, W: Write + ?Sized>(
        source: &mut ImageSource<B>,
        block_size: u32,
        file: &DirectoryRecord,
        sink: &mut W,
    ) -> Result<u64> {
        ensure_file(file)?;

        let expected = u64::from(file.data_length);
        let mut reader = FileReader::new(source, block_size, file.clone())?;
        let mut chunk = std::vec![0u8; EXTRACT_CHUNK_SIZE.min(expected as usize)];
        let mut written = 0u64;

        while !reader.is_eof() {
            let n = reader.read(&mut chunk)?;
            write_chunk(sink, &chunk[..n], &mut written, expected)?;
        }

        sink.flush().map_err(Iso9660Error::io)?;
        log::debug!("extracted '{}' ({} bytes)", file.name, written);
        Ok(written)
    }

    fn write_chunk<W: Write + ?Sized>(
        sink: &mut W,
        mut data: &[u8],
        written: &mut u64,
        expected: u64,
    ) -> Result<()> {
        while !data.is_empty() {
            match sink.write(data) {
                Ok(0) => {
                    return Err(Iso9660Error::ShortWrite {
                        written: *written,
                        expected,
                    })
                }
                Ok(n) => {
                    data = &data[n..];
                    *written += n as u64;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) if matches!(e.kind(), io::ErrorKind::WriteZero | io::ErrorKind::StorageFull) => {
                    return Err(Iso9660Error::ShortWrite {
                        written: *written,
                        expected,
                    })
                }
                Err(e) => return Err(Iso9660Error::io(e)),
            }
        }
        Ok(())
    }

    /// Extract a file to `dest_dir/<name>`
    ///
    /// The destination must not exist yet. On failure the partially written
    /// file is removed.
    pub fn extract_to_dir<B: BlockIo>(
        source: &mut ImageSource<B>,
        block_size: u32,
        file: &DirectoryRecord,
        dest_dir: &Path,
    ) -> Result<PathBuf> {
        ensure_file(file)?;

        let name = file.name.as_str();
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(Iso9660Error::Io(std::format!(
                "refusing to extract entry named {:?}",
                name
            )));
        }

        let dest = dest_dir.join(name);
        let describe = |e: io::Error| Iso9660Error::Io(std::format!("{}: {}", dest.display(), e));
        let mut out = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&dest)
            .map_err(describe)?;

        match extract_to(source, block_size, file, &mut out) {
            Ok(_) => Ok(dest),
            Err(e) => {
                drop(out);
                if let Err(cleanup) = std::fs::remove_file(&dest) {
                    log::warn!("could not remove partial {}: {}", dest.display(), cleanup);
                }
                Err(e)
            }
        }
    }
}
