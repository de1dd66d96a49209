//! Directory record parsing and navigation

pub mod iterator;
pub mod record;
pub mod tree;

pub use tree::{walk_all, DirectoryTree, NodeId, TreeNode};

use crate::directory::iterator::DirectoryIterator;
use crate::directory::record::DirectoryRecord;
use crate::error::{Iso9660Error, Result};
use crate::source::ImageSource;
use crate::types::{RootDirectory, VolumeInfo};
use alloc::string::ToString;
use alloc::vec::Vec;
use core::iter::FusedIterator;
use gpt_disk_io::BlockIo;

/// Children of one directory, without the self and parent entries
///
/// Created by [`list_children`]. Nothing is cached: each call starts a
/// fresh pass over the extent.
pub struct Children<'a, B: BlockIo> {
    inner: DirectoryIterator<'a, B>,
}

impl<'a, B: BlockIo> Iterator for Children<'a, B> {
    type Item = Result<DirectoryRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.inner.next()? {
                Ok(record) if record.is_special() => continue,
                other => return Some(other),
            }
        }
    }
}

impl<'a, B: BlockIo> FusedIterator for Children<'a, B> {}

/// List the children of the directory at `extent_lba`
///
/// `root` supplies the block size and name encoding of the hierarchy.
pub fn list_children<'a, B: BlockIo>(
    source: &'a mut ImageSource<B>,
    root: &RootDirectory,
    extent_lba: u32,
    data_length: u32,
) -> Children<'a, B> {
    Children {
        inner: DirectoryIterator::new(source, extent_lba, data_length, root.block_size, root.encoding),
    }
}

/// Records matched from the root down to a path's target
#[derive(Debug, Clone)]
pub struct ResolvedPath {
    /// Root directory record the walk started from
    pub root: DirectoryRecord,

    /// One record per path segment, in order
    pub records: Vec<DirectoryRecord>,
}

impl ResolvedPath {
    /// The record the path names (the root for an empty path)
    pub fn target(&self) -> &DirectoryRecord {
        self.records.last().unwrap_or(&self.root)
    }

    /// Take the target record
    pub fn into_target(mut self) -> DirectoryRecord {
        self.records.pop().unwrap_or(self.root)
    }

    /// Whether the path named the root itself
    pub fn is_root(&self) -> bool {
        self.records.is_empty()
    }
}

/// Resolve path segments to the chain of records leading to the target
///
/// Matching is case-sensitive. Every segment but the last must name a
/// directory.
pub fn resolve_chain<B: BlockIo>(
    source: &mut ImageSource<B>,
    root: &RootDirectory,
    segments: &[&str],
) -> Result<ResolvedPath> {
    let mut records: Vec<DirectoryRecord> = Vec::with_capacity(segments.len());
    let mut current_lba = root.extent_lba;
    let mut current_len = root.data_length;

    for (depth, segment) in segments.iter().enumerate() {
        let is_last = depth == segments.len() - 1;

        let mut found = None;
        for entry in list_children(source, root, current_lba, current_len) {
            let entry = entry?;
            if entry.matches(segment) {
                found = Some(entry);
                break;
            }
        }

        let entry = found.ok_or_else(|| Iso9660Error::PathNotFound {
            segment: segment.to_string(),
        })?;

        if !is_last {
            if !entry.is_directory() {
                return Err(Iso9660Error::NotADirectory {
                    segment: segment.to_string(),
                });
            }
            current_lba = entry.extent_lba;
            current_len = entry.data_length;
        }

        log::debug!("resolved '{}' -> extent {} ({} bytes)", segment, entry.extent_lba, entry.data_length);
        records.push(entry);
    }

    Ok(ResolvedPath {
        root: root.record.clone(),
        records,
    })
}

/// Resolve path segments to the record they name
pub fn resolve_path<B: BlockIo>(
    source: &mut ImageSource<B>,
    root: &RootDirectory,
    segments: &[&str],
) -> Result<DirectoryRecord> {
    resolve_chain(source, root, segments).map(ResolvedPath::into_target)
}

/// Split a slash-delimited path into segments
///
/// Empty and `.` components are dropped, so `""`, `"/"` and `"/./"` all
/// name the root.
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('/')
        .filter(|c| !c.is_empty() && *c != ".")
        .collect()
}

/// Find a file or directory by path
///
/// Navigates the directory tree from root to locate a file/directory.
///
/// # Example
/// ```ignore
/// use iso9660::{mount, find_file, ImageSource};
///
/// let mut source = ImageSource::open("disc.iso")?;
/// let volume = mount(&mut source)?;
/// let file = find_file(&mut source, &volume, "/DOCS/NOTES.TXT")?;
/// println!("File size: {} bytes", file.data_length);
/// ```
pub fn find_file<B: BlockIo>(
    source: &mut ImageSource<B>,
    volume: &VolumeInfo,
    path: &str,
) -> Result<DirectoryRecord> {
    resolve_path(source, &volume.root, &split_path(path))
}

/// Collect the children of the directory at `path`
pub fn list_directory<B: BlockIo>(
    source: &mut ImageSource<B>,
    volume: &VolumeInfo,
    path: &str,
) -> Result<Vec<DirectoryRecord>> {
    let target = find_file(source, volume, path)?;
    if !target.is_directory() {
        return Err(Iso9660Error::NotADirectory {
            segment: target.name,
        });
    }

    list_children(source, &volume.root, target.extent_lba, target.data_length).collect()
}
