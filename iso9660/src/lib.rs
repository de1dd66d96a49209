//! ISO9660 Image Reader
//!
//! A `no_std` reader for ISO9660 (ECMA-119) images with Joliet name support.
//!
//! # Overview
//!
//! ISO9660 is the standard filesystem for CD-ROMs and DVDs. This crate provides:
//! - Volume descriptor parsing (Primary, Supplementary/Joliet)
//! - Directory record decoding and path resolution
//! - Full hierarchy walks
//! - Byte-exact file extraction, into memory or a `std::io::Write` sink
//!
//! # Architecture
//!
//! The implementation is layered:
//! 1. **Source layer** - Absolute byte reads over any [`gpt_disk_io::BlockIo`]
//! 2. **Volume layer** - Parses volume descriptors from sector 16 on
//! 3. **Directory layer** - Decodes directory records and navigates paths
//! 4. **File layer** - Reads file data from extents
//!
//! # Usage
//!
//! ```ignore
//! use iso9660::{extract, find_file, mount, ImageSource};
//!
//! let mut source = ImageSource::open("disc.iso")?;
//! let volume = mount(&mut source)?;
//!
//! let file = find_file(&mut source, &volume, "/DOCS/NOTES.TXT")?;
//! let data = extract(&mut source, volume.root.block_size, &file)?;
//! ```
//!
//! # Features
//!
//! - `std` (default): file-backed images, sink extraction, `std::error::Error`
//! - `joliet` (default): prefer a Joliet supplementary descriptor
//! - `strict-both-endian`: reject fields whose two byte orders disagree

#![no_std]
#![warn(missing_docs)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod directory;
pub mod error;
pub mod file;
pub mod source;
pub mod types;
pub mod utils;
pub mod volume;

pub use error::{Iso9660Error, Result};
pub use types::{FileFlags, NameEncoding, RootDirectory, VolumeInfo};

pub use directory::record::DirectoryRecord;
pub use source::ImageSource;

#[cfg(feature = "std")]
pub use source::FileImage;

// High-level API exports
pub use directory::{find_file, list_children, list_directory, resolve_path, walk_all};
pub use file::{extract, read_file, FileReader};
pub use volume::{mount, select_root_descriptor};

#[cfg(feature = "std")]
pub use file::{extract_to, extract_to_dir};
