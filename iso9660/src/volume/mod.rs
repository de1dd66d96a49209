//! Volume descriptor parsing
//!
//! ISO9660 volume descriptors start at sector 16 and describe the filesystem layout.
//! The primary descriptor sits at sector 16; a Joliet supplementary
//! descriptor usually follows at 17 and, when present, is preferred for
//! traversal because its names are not limited to d-characters.

pub mod primary;
pub mod supplementary;

pub use primary::VolumeDescriptor;

use crate::error::{Iso9660Error, Result};
use crate::source::ImageSource;
use crate::types::{
    RootDirectory, VolumeDescriptorType, VolumeInfo, PRIMARY_DESCRIPTOR_SECTOR, SECTOR_SIZE,
    STANDARD_IDENTIFIER,
};
use gpt_disk_io::BlockIo;

/// Volume Descriptor header (first 7 bytes of each descriptor)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeDescriptorHeader {
    /// Type code (0=boot, 1=primary, 2=supplementary, 255=terminator)
    pub type_code: u8,

    /// Standard identifier "CD001"
    pub identifier: [u8; 5],

    /// Version (always 1)
    pub version: u8,
}

impl VolumeDescriptorHeader {
    /// Header size in bytes
    pub const SIZE: usize = 7;

    /// Split the header off a descriptor sector
    pub fn from_bytes(data: &[u8; Self::SIZE]) -> Self {
        Self {
            type_code: data[0],
            identifier: [data[1], data[2], data[3], data[4], data[5]],
            version: data[6],
        }
    }

    /// Check the standard identifier
    pub fn has_magic(&self) -> bool {
        &self.identifier == STANDARD_IDENTIFIER
    }
}

/// Decode the descriptor at `sector_index`
///
/// Fails with [`Iso9660Error::NotAnIsoImage`] when the sector lacks the
/// `CD001` identifier and with [`Iso9660Error::MalformedDescriptor`] when the
/// type code does not match `expected` or a field is out of range.
pub fn decode_at<B: BlockIo>(
    source: &mut ImageSource<B>,
    sector_index: u64,
    expected: VolumeDescriptorType,
) -> Result<VolumeDescriptor> {
    let data = source.read_exact(sector_index * SECTOR_SIZE as u64, SECTOR_SIZE as u32)?;
    VolumeDescriptor::parse(&data, sector_index, expected)
}

/// Read only the 7-byte header of a descriptor sector
pub fn read_header<B: BlockIo>(
    source: &mut ImageSource<B>,
    sector_index: u64,
) -> Result<VolumeDescriptorHeader> {
    let mut raw = [0u8; VolumeDescriptorHeader::SIZE];
    source.read_exact_into(sector_index * SECTOR_SIZE as u64, &mut raw)?;
    Ok(VolumeDescriptorHeader::from_bytes(&raw))
}

/// Pick the root directory used for traversal
///
/// Decodes the primary descriptor at sector 16 and the supplementary
/// descriptor at sector 17 (or later in the set). A supplementary root with
/// a non-zero extent wins; otherwise the primary root is used.
pub fn select_root_descriptor<B: BlockIo>(source: &mut ImageSource<B>) -> Result<RootDirectory> {
    let (primary, supplementary) = read_descriptors(source)?;
    choose_root(primary.as_ref(), supplementary.as_ref())
}

/// Mount an ISO9660 volume
///
/// Reads the volume descriptors and builds [`VolumeInfo`]. Display fields
/// come from the primary descriptor when there is one.
pub fn mount<B: BlockIo>(source: &mut ImageSource<B>) -> Result<VolumeInfo> {
    let (primary, supplementary) = read_descriptors(source)?;
    let root = choose_root(primary.as_ref(), supplementary.as_ref())?;

    let main = primary
        .as_ref()
        .or(supplementary.as_ref())
        .ok_or(Iso9660Error::NotAnIsoImage)?;

    let has_joliet = supplementary
        .as_ref()
        .is_some_and(|svd| svd.encoding == crate::types::NameEncoding::Joliet);

    Ok(VolumeInfo {
        system_id: main.system_id.clone(),
        volume_id: main.volume_id.clone(),
        volume_set_id: main.volume_set_id.clone(),
        publisher_id: main.publisher_id.clone(),
        data_preparer_id: main.data_preparer_id.clone(),
        application_id: main.application_id.clone(),
        logical_block_size: main.logical_block_size,
        volume_space_size: main.volume_space_size,
        volume_set_size: main.volume_set_size,
        volume_sequence_number: main.volume_sequence_number,
        path_table_size: main.path_table_size,
        creation_date: main.creation_date.clone(),
        modification_date: main.modification_date.clone(),
        has_joliet,
        primary,
        supplementary,
        root,
    })
}

fn read_descriptors<B: BlockIo>(
    source: &mut ImageSource<B>,
) -> Result<(Option<VolumeDescriptor>, Option<VolumeDescriptor>)> {
    let primary = match decode_at(source, PRIMARY_DESCRIPTOR_SECTOR, VolumeDescriptorType::Primary) {
        Ok(pvd) => Some(pvd),
        Err(Iso9660Error::NotAnIsoImage) => None,
        // Too small to hold a descriptor set at all
        Err(Iso9660Error::TruncatedRead { .. }) => return Err(Iso9660Error::NotAnIsoImage),
        Err(e) => return Err(e),
    };

    let supplementary = match find_supplementary(source) {
        Ok(svd) => svd,
        Err(e) if primary.is_some() => {
            log::warn!("ignoring unusable supplementary descriptor: {}", e);
            None
        }
        Err(e) => return Err(e),
    };

    if primary.is_none() && supplementary.is_none() {
        return Err(Iso9660Error::NotAnIsoImage);
    }

    Ok((primary, supplementary))
}

/// Find the first supplementary descriptor of the set
///
/// Starts at sector 17 and stops at the set terminator, at a sector without
/// the standard identifier, or at the end of the image.
#[cfg(feature = "joliet")]
fn find_supplementary<B: BlockIo>(source: &mut ImageSource<B>) -> Result<Option<VolumeDescriptor>> {
    use crate::types::{MAX_DESCRIPTOR_SET_LEN, SUPPLEMENTARY_DESCRIPTOR_SECTOR};

    let first = SUPPLEMENTARY_DESCRIPTOR_SECTOR;
    for sector in first..first + MAX_DESCRIPTOR_SET_LEN {
        let header = match read_header(source, sector) {
            Ok(header) => header,
            Err(Iso9660Error::TruncatedRead { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };

        if !header.has_magic() {
            return Ok(None);
        }

        match VolumeDescriptorType::from_code(header.type_code) {
            Some(VolumeDescriptorType::Supplementary) => {
                return decode_at(source, sector, VolumeDescriptorType::Supplementary).map(Some);
            }
            Some(VolumeDescriptorType::Terminator) => return Ok(None),
            _ => log::trace!("descriptor @{}: skipping type {}", sector, header.type_code),
        }
    }

    Ok(None)
}

#[cfg(not(feature = "joliet"))]
fn find_supplementary<B: BlockIo>(_source: &mut ImageSource<B>) -> Result<Option<VolumeDescriptor>> {
    Ok(None)
}

fn choose_root(
    primary: Option<&VolumeDescriptor>,
    supplementary: Option<&VolumeDescriptor>,
) -> Result<RootDirectory> {
    let chosen = match (supplementary, primary) {
        (Some(svd), _) if svd.root_extent_lba() != 0 => svd,
        (_, Some(pvd)) => pvd,
        _ => return Err(Iso9660Error::NotAnIsoImage),
    };

    log::debug!(
        "root directory from {:?} descriptor @{}: extent={} len={} encoding={:?}",
        chosen.descriptor_type,
        chosen.sector,
        chosen.root_extent_lba(),
        chosen.root_data_length(),
        chosen.encoding
    );

    Ok(RootDirectory {
        extent_lba: chosen.root_extent_lba(),
        data_length: chosen.root_data_length(),
        block_size: u32::from(chosen.logical_block_size),
        encoding: chosen.encoding,
        record: chosen.root_directory_record.clone(),
        descriptor: chosen.descriptor_type,
    })
}
