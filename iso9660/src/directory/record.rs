//! Directory Record structure
//!
//! Directory records describe files and subdirectories. They are
//! self-describing: the first byte is the record length, byte 32 the
//! identifier length, and the identifier follows the 33-byte fixed header.

use crate::error::{Iso9660Error, Result};
use crate::types::{FileFlags, NameEncoding};
use crate::utils::datetime::DateTime7;
use crate::utils::endian::{BothEndian16, BothEndian32};
use crate::utils::string;
use alloc::string::String;
use alloc::vec::Vec;

// Byte offsets within a record (BP - 1)
const OFF_LENGTH: usize = 0;
const OFF_EXT_ATTR_LENGTH: usize = 1;
const OFF_EXTENT: usize = 2;
const OFF_DATA_LENGTH: usize = 10;
const OFF_RECORDING_DATE: usize = 18;
const OFF_FLAGS: usize = 25;
const OFF_FILE_UNIT_SIZE: usize = 26;
const OFF_INTERLEAVE_GAP: usize = 27;
const OFF_VOLUME_SEQUENCE: usize = 28;
const OFF_ID_LENGTH: usize = 32;

/// Directory Record (variable length), decoded into owned fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryRecord {
    /// Length of directory record (BP 1)
    pub length: u8,

    /// Extended attribute record length (BP 2)
    pub extended_attr_length: u8,

    /// Extent location (BP 3-10)
    pub extent_lba: u32,

    /// Data length in bytes (BP 11-18)
    pub data_length: u32,

    /// Recording date and time (BP 19-25)
    pub recording_datetime: DateTime7,

    /// Raw file flags (BP 26)
    pub file_flags: u8,

    /// Decoded file flags
    pub flags: FileFlags,

    /// File unit size (interleaved files) (BP 27)
    pub file_unit_size: u8,

    /// Interleave gap size (BP 28)
    pub interleave_gap: u8,

    /// Volume sequence number (BP 29-32)
    pub volume_sequence: u16,

    /// Raw file identifier (BP 34 onwards)
    pub identifier: Vec<u8>,

    /// Display name: identifier decoded, version suffix removed.
    /// `"."` and `".."` for the self and parent entries.
    pub name: String,
}

/// Outcome of decoding at one position of a directory block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordSlot {
    /// A record; advance by `record.length`
    Record(DirectoryRecord),
    /// Zero length byte: the rest of the block is padding
    EndOfBlock,
}

impl DirectoryRecord {
    /// Fixed header size before the identifier
    pub const HEADER_LENGTH: usize = 33;

    /// Minimum record length (header plus a one-byte identifier)
    pub const MIN_LENGTH: u8 = 34;

    /// Identifier of the "self" entry
    pub const SELF_ID: u8 = 0x00;

    /// Identifier of the "parent" entry
    pub const PARENT_ID: u8 = 0x01;

    /// Parse one record from the start of `data`
    ///
    /// `offset` is the absolute image offset of `data[0]`, used for error
    /// reporting only.
    pub fn parse(data: &[u8], encoding: NameEncoding, offset: u64) -> Result<Self> {
        let corrupt = |reason| Iso9660Error::CorruptRecord { offset, reason };

        if data.is_empty() || data[OFF_LENGTH] == 0 {
            return Err(corrupt("zero record length"));
        }

        let length = data[OFF_LENGTH];
        if length < Self::MIN_LENGTH {
            return Err(corrupt("record length below minimum"));
        }
        if length as usize > data.len() {
            return Err(corrupt("record crosses block boundary"));
        }

        let id_len = data[OFF_ID_LENGTH] as usize;
        if Self::HEADER_LENGTH + id_len > length as usize {
            return Err(corrupt("identifier overruns record"));
        }

        let extent = BothEndian32::from_slice(&data[OFF_EXTENT..]);
        let data_length = BothEndian32::from_slice(&data[OFF_DATA_LENGTH..]);
        let volume_sequence = BothEndian16::from_slice(&data[OFF_VOLUME_SEQUENCE..]);
        check_both_endian(extent.is_consistent(), offset, "extent location")?;
        check_both_endian(data_length.is_consistent(), offset, "data length")?;
        check_both_endian(volume_sequence.is_consistent(), offset, "volume sequence number")?;

        let mut datetime = [0u8; 7];
        datetime.copy_from_slice(&data[OFF_RECORDING_DATE..OFF_RECORDING_DATE + 7]);

        let identifier = data[Self::HEADER_LENGTH..Self::HEADER_LENGTH + id_len].to_vec();
        let name = match identifier.as_slice() {
            [Self::SELF_ID] => String::from("."),
            [Self::PARENT_ID] => String::from(".."),
            id => string::decode_identifier(id, encoding),
        };

        let file_flags = data[OFF_FLAGS];
        log::trace!(
            "record @{}: len={} extent={} size={} flags={:#04x} name={:?}",
            offset,
            length,
            extent.get(),
            data_length.get(),
            file_flags,
            name
        );

        Ok(Self {
            length,
            extended_attr_length: data[OFF_EXT_ATTR_LENGTH],
            extent_lba: extent.get(),
            data_length: data_length.get(),
            recording_datetime: DateTime7::from_bytes(&datetime),
            file_flags,
            flags: FileFlags::from_bits(file_flags),
            file_unit_size: data[OFF_FILE_UNIT_SIZE],
            interleave_gap: data[OFF_INTERLEAVE_GAP],
            volume_sequence: volume_sequence.get(),
            identifier,
            name,
        })
    }
}

/// Decode the record at `offset_within_block` of a directory block
///
/// `block_start` is the absolute image offset of `block[0]`. A zero length
/// byte, or too few bytes left to hold any record, yields
/// [`RecordSlot::EndOfBlock`]; the caller then continues at the next block.
pub fn decode_record(
    block: &[u8],
    offset_within_block: usize,
    block_start: u64,
    encoding: NameEncoding,
) -> Result<RecordSlot> {
    let window = block.get(offset_within_block..).unwrap_or(&[]);
    if window.len() < DirectoryRecord::MIN_LENGTH as usize || window[OFF_LENGTH] == 0 {
        return Ok(RecordSlot::EndOfBlock);
    }

    let offset = block_start + offset_within_block as u64;
    DirectoryRecord::parse(window, encoding, offset).map(RecordSlot::Record)
}

#[cfg(not(feature = "strict-both-endian"))]
fn check_both_endian(consistent: bool, offset: u64, field: &'static str) -> Result<()> {
    if !consistent {
        log::warn!(
            "directory record @{}: both-endian {} copies disagree, using little-endian",
            offset,
            field
        );
    }
    Ok(())
}

#[cfg(feature = "strict-both-endian")]
fn check_both_endian(consistent: bool, offset: u64, field: &'static str) -> Result<()> {
    if consistent {
        Ok(())
    } else {
        log::warn!("directory record @{}: both-endian {} copies disagree", offset, field);
        Err(Iso9660Error::CorruptRecord {
            offset,
            reason: "both-endian copies disagree",
        })
    }
}
