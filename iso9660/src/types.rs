//! Common types and constants for ISO9660

use crate::directory::record::DirectoryRecord;
use crate::utils::datetime::DateTime17;
use crate::volume::VolumeDescriptor;
use alloc::string::String;

/// Volume descriptor sector size (always 2048 bytes, independent of the logical block size)
pub const SECTOR_SIZE: usize = 2048;

/// Primary Volume Descriptor sector
pub const PRIMARY_DESCRIPTOR_SECTOR: u64 = 16;

/// Supplementary (Joliet) Volume Descriptor sector in the common layout
pub const SUPPLEMENTARY_DESCRIPTOR_SECTOR: u64 = 17;

/// Upper bound on descriptor set length scanned for a supplementary descriptor
pub const MAX_DESCRIPTOR_SET_LEN: u64 = 100;

/// Standard identifier present in every volume descriptor
pub const STANDARD_IDENTIFIER: &[u8; 5] = b"CD001";

/// Volume descriptor type codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum VolumeDescriptorType {
    /// Boot Record (El Torito)
    BootRecord = 0,
    /// Primary Volume Descriptor
    Primary = 1,
    /// Supplementary Volume Descriptor (Joliet)
    Supplementary = 2,
    /// Volume Partition Descriptor
    Partition = 3,
    /// Volume Descriptor Set Terminator
    Terminator = 255,
}

impl VolumeDescriptorType {
    /// Parse a type code byte
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::BootRecord),
            1 => Some(Self::Primary),
            2 => Some(Self::Supplementary),
            3 => Some(Self::Partition),
            255 => Some(Self::Terminator),
            _ => None,
        }
    }
}

/// How file identifiers are encoded in a directory hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameEncoding {
    /// d-characters / a-characters (bytes, decoded lossily as UTF-8)
    Iso9660,
    /// UCS-2 big-endian (Joliet)
    Joliet,
}

/// Root directory chosen for traversal
///
/// Everything a walker needs to decode one directory hierarchy: where the
/// root lives, how extents are addressed and how names are encoded.
#[derive(Debug, Clone)]
pub struct RootDirectory {
    /// Root directory extent location (LBA)
    pub extent_lba: u32,

    /// Root directory extent length (bytes)
    pub data_length: u32,

    /// Logical block size used for extent addressing
    pub block_size: u32,

    /// Identifier encoding of this hierarchy
    pub encoding: NameEncoding,

    /// Root directory record embedded in the chosen descriptor
    pub record: DirectoryRecord,

    /// Which descriptor the root was taken from
    pub descriptor: VolumeDescriptorType,
}

/// Parsed volume information
#[derive(Debug, Clone)]
pub struct VolumeInfo {
    /// System identifier
    pub system_id: String,

    /// Volume identifier
    pub volume_id: String,

    /// Volume set identifier
    pub volume_set_id: String,

    /// Publisher identifier
    pub publisher_id: String,

    /// Data preparer identifier
    pub data_preparer_id: String,

    /// Application identifier
    pub application_id: String,

    /// Logical block size (usually 2048)
    pub logical_block_size: u16,

    /// Volume space size (total logical blocks)
    pub volume_space_size: u32,

    /// Number of volumes in the set
    pub volume_set_size: u16,

    /// Sequence number of this volume in its set
    pub volume_sequence_number: u16,

    /// Path table size (bytes)
    pub path_table_size: u32,

    /// Volume creation date
    pub creation_date: Option<DateTime17>,

    /// Last modification date
    pub modification_date: Option<DateTime17>,

    /// Whether a Joliet supplementary descriptor is present
    pub has_joliet: bool,

    /// Decoded Primary Volume Descriptor
    pub primary: Option<VolumeDescriptor>,

    /// Decoded Supplementary Volume Descriptor, if any
    pub supplementary: Option<VolumeDescriptor>,

    /// Root directory used for traversal
    pub root: RootDirectory,
}

/// File flags from directory record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileFlags {
    /// Hidden file
    pub hidden: bool,

    /// Directory (not a file)
    pub directory: bool,

    /// Associated file
    pub associated: bool,

    /// Extended attribute record format
    pub extended_format: bool,

    /// Owner/group permissions in extended attributes
    pub extended_permissions: bool,

    /// Not final directory record for this file
    pub not_final: bool,
}

impl FileFlags {
    /// Hidden bit
    pub const HIDDEN: u8 = 0x01;
    /// Directory bit
    pub const DIRECTORY: u8 = 0x02;
    /// Associated file bit
    pub const ASSOCIATED: u8 = 0x04;
    /// Record format bit
    pub const EXTENDED_FORMAT: u8 = 0x08;
    /// Permissions bit
    pub const EXTENDED_PERMISSIONS: u8 = 0x10;
    /// Multi-extent bit
    pub const NOT_FINAL: u8 = 0x80;

    /// Decode the flag byte of a directory record
    pub fn from_bits(bits: u8) -> Self {
        Self {
            hidden: bits & Self::HIDDEN != 0,
            directory: bits & Self::DIRECTORY != 0,
            associated: bits & Self::ASSOCIATED != 0,
            extended_format: bits & Self::EXTENDED_FORMAT != 0,
            extended_permissions: bits & Self::EXTENDED_PERMISSIONS != 0,
            not_final: bits & Self::NOT_FINAL != 0,
        }
    }
}
