//! Primary Volume Descriptor parsing
//!
//! The Primary Volume Descriptor (PVD) is always present and describes
//! the basic ISO9660 filesystem structure. Supplementary descriptors share
//! the same layout, so both decode through [`VolumeDescriptor::parse`].

use crate::directory::record::DirectoryRecord;
use crate::error::{Iso9660Error, Result};
use crate::types::{NameEncoding, VolumeDescriptorType, SECTOR_SIZE, STANDARD_IDENTIFIER};
use crate::utils::datetime::DateTime17;
use crate::utils::endian::{read_le_u32, read_be_u32, BothEndian16, BothEndian32};
use crate::utils::{sector, string};
use crate::volume::supplementary;
use alloc::string::String;

// Byte offsets within the 2048-byte descriptor (ECMA-119 8.4)
const OFF_TYPE: usize = 0;
const OFF_IDENTIFIER: usize = 1;
const OFF_VERSION: usize = 6;
const OFF_FLAGS: usize = 7;
const OFF_SYSTEM_ID: usize = 8;
const OFF_VOLUME_ID: usize = 40;
const OFF_VOLUME_SPACE_SIZE: usize = 80;
const OFF_ESCAPE_SEQUENCES: usize = 88;
const OFF_VOLUME_SET_SIZE: usize = 120;
const OFF_VOLUME_SEQUENCE: usize = 124;
const OFF_BLOCK_SIZE: usize = 128;
const OFF_PATH_TABLE_SIZE: usize = 132;
const OFF_TYPE_L_PATH_TABLE: usize = 140;
const OFF_TYPE_M_PATH_TABLE: usize = 148;
const OFF_ROOT_RECORD: usize = 156;
const ROOT_RECORD_LEN: usize = 34;
const OFF_VOLUME_SET_ID: usize = 190;
const OFF_PUBLISHER_ID: usize = 318;
const OFF_PREPARER_ID: usize = 446;
const OFF_APPLICATION_ID: usize = 574;
const OFF_CREATION_DATE: usize = 813;
const OFF_MODIFICATION_DATE: usize = 830;
const OFF_FILE_STRUCTURE_VERSION: usize = 881;

/// Decoded Primary or Supplementary Volume Descriptor
///
/// See ECMA-119 8.4 (primary) and 8.5 (supplementary).
#[derive(Debug, Clone)]
pub struct VolumeDescriptor {
    /// Sector the descriptor was read from
    pub sector: u64,

    /// Type code (1 primary, 2 supplementary)
    pub descriptor_type: VolumeDescriptorType,

    /// Standard identifier "CD001"
    pub identifier: [u8; 5],

    /// Version (1, or 2 for an enhanced supplementary descriptor)
    pub version: u8,

    /// Volume flags (supplementary only)
    pub flags: u8,

    /// System identifier
    pub system_id: String,

    /// Volume identifier
    pub volume_id: String,

    /// Volume space size (logical blocks)
    pub volume_space_size: u32,

    /// Escape sequences (supplementary only; selects Joliet)
    pub escape_sequences: [u8; 32],

    /// Volume set size
    pub volume_set_size: u16,

    /// Volume sequence number
    pub volume_sequence_number: u16,

    /// Logical block size (usually 2048)
    pub logical_block_size: u16,

    /// Path table size (bytes)
    pub path_table_size: u32,

    /// Type L path table location (32-bit LE)
    pub type_l_path_table: u32,

    /// Type M path table location (32-bit BE)
    pub type_m_path_table: u32,

    /// Root directory record
    pub root_directory_record: DirectoryRecord,

    /// Volume set identifier
    pub volume_set_id: String,

    /// Publisher identifier
    pub publisher_id: String,

    /// Data preparer identifier
    pub data_preparer_id: String,

    /// Application identifier
    pub application_id: String,

    /// Volume creation date
    pub creation_date: Option<DateTime17>,

    /// Volume modification date
    pub modification_date: Option<DateTime17>,

    /// File structure version
    pub file_structure_version: u8,

    /// Encoding of identifiers below this descriptor's root
    pub encoding: NameEncoding,
}

impl VolumeDescriptor {
    /// Parse a descriptor sector
    ///
    /// `expected` is the type the caller's slot requires.
    pub fn parse(data: &[u8], sector: u64, expected: VolumeDescriptorType) -> Result<Self> {
        let malformed = |reason| Iso9660Error::MalformedDescriptor { sector, reason };

        if data.len() != SECTOR_SIZE {
            return Err(malformed("descriptor is not 2048 bytes"));
        }

        if &data[OFF_IDENTIFIER..OFF_IDENTIFIER + 5] != STANDARD_IDENTIFIER {
            return Err(Iso9660Error::NotAnIsoImage);
        }

        let type_code = data[OFF_TYPE];
        if type_code != expected as u8 {
            return Err(malformed("unexpected descriptor type"));
        }

        let version = data[OFF_VERSION];
        let version_ok = match expected {
            VolumeDescriptorType::Supplementary => version == 1 || version == 2,
            _ => version == 1,
        };
        if !version_ok {
            return Err(malformed("unsupported descriptor version"));
        }

        let volume_space_size = BothEndian32::from_slice(&data[OFF_VOLUME_SPACE_SIZE..]);
        let volume_set_size = BothEndian16::from_slice(&data[OFF_VOLUME_SET_SIZE..]);
        let volume_sequence = BothEndian16::from_slice(&data[OFF_VOLUME_SEQUENCE..]);
        let block_size = BothEndian16::from_slice(&data[OFF_BLOCK_SIZE..]);
        let path_table_size = BothEndian32::from_slice(&data[OFF_PATH_TABLE_SIZE..]);

        check_both_endian(volume_space_size.is_consistent(), sector, "volume space size")?;
        check_both_endian(block_size.is_consistent(), sector, "logical block size")?;
        check_both_endian(path_table_size.is_consistent(), sector, "path table size")?;

        if !sector::is_valid_block_size(u32::from(block_size.get())) {
            return Err(malformed("logical block size is not a power of two"));
        }

        let mut escape_sequences = [0u8; 32];
        escape_sequences.copy_from_slice(&data[OFF_ESCAPE_SEQUENCES..OFF_ESCAPE_SEQUENCES + 32]);

        let encoding = match expected {
            VolumeDescriptorType::Supplementary if supplementary::is_joliet(&escape_sequences) => {
                NameEncoding::Joliet
            }
            _ => NameEncoding::Iso9660,
        };

        let root_offset = sector * SECTOR_SIZE as u64 + OFF_ROOT_RECORD as u64;
        let root_directory_record = DirectoryRecord::parse(
            &data[OFF_ROOT_RECORD..OFF_ROOT_RECORD + ROOT_RECORD_LEN],
            encoding,
            root_offset,
        )
        .map_err(|_| malformed("invalid root directory record"))?;

        let text = |offset: usize, len: usize| {
            string::decode_text_field(&data[offset..offset + len], encoding)
        };
        let date = |offset: usize| {
            let mut raw = [0u8; 17];
            raw.copy_from_slice(&data[offset..offset + 17]);
            DateTime17::from_bytes(&raw)
        };

        let mut identifier = [0u8; 5];
        identifier.copy_from_slice(&data[OFF_IDENTIFIER..OFF_IDENTIFIER + 5]);

        let descriptor = Self {
            sector,
            descriptor_type: expected,
            identifier,
            version,
            flags: data[OFF_FLAGS],
            system_id: text(OFF_SYSTEM_ID, 32),
            volume_id: text(OFF_VOLUME_ID, 32),
            volume_space_size: volume_space_size.get(),
            escape_sequences,
            volume_set_size: volume_set_size.get(),
            volume_sequence_number: volume_sequence.get(),
            logical_block_size: block_size.get(),
            path_table_size: path_table_size.get(),
            type_l_path_table: read_le_u32(data, OFF_TYPE_L_PATH_TABLE),
            type_m_path_table: read_be_u32(data, OFF_TYPE_M_PATH_TABLE),
            root_directory_record,
            volume_set_id: text(OFF_VOLUME_SET_ID, 128),
            publisher_id: text(OFF_PUBLISHER_ID, 128),
            data_preparer_id: text(OFF_PREPARER_ID, 128),
            application_id: text(OFF_APPLICATION_ID, 128),
            creation_date: date(OFF_CREATION_DATE),
            modification_date: date(OFF_MODIFICATION_DATE),
            file_structure_version: data[OFF_FILE_STRUCTURE_VERSION],
            encoding,
        };

        log::trace!(
            "descriptor @{}: type={:?} volume={:?} block_size={} root extent={} len={}",
            sector,
            descriptor.descriptor_type,
            descriptor.volume_id,
            descriptor.logical_block_size,
            descriptor.root_directory_record.extent_lba,
            descriptor.root_directory_record.data_length
        );

        Ok(descriptor)
    }

    /// Root directory extent location (LBA)
    pub fn root_extent_lba(&self) -> u32 {
        self.root_directory_record.extent_lba
    }

    /// Root directory data length (bytes)
    pub fn root_data_length(&self) -> u32 {
        self.root_directory_record.data_length
    }
}

#[cfg(not(feature = "strict-both-endian"))]
fn check_both_endian(consistent: bool, sector: u64, field: &'static str) -> Result<()> {
    if !consistent {
        log::warn!(
            "volume descriptor @{}: both-endian {} copies disagree, using little-endian",
            sector,
            field
        );
    }
    Ok(())
}

#[cfg(feature = "strict-both-endian")]
fn check_both_endian(consistent: bool, sector: u64, field: &'static str) -> Result<()> {
    if consistent {
        Ok(())
    } else {
        log::warn!("volume descriptor @{}: both-endian {} copies disagree", sector, field);
        Err(Iso9660Error::MalformedDescriptor {
            sector,
            reason: "both-endian copies disagree",
        })
    }
}
