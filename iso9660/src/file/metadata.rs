//! File metadata accessors

use crate::directory::record::DirectoryRecord;
use crate::file::extent::Extent;

impl DirectoryRecord {
    /// Get file name as string
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get file extension, if the name has one
    pub fn extension(&self) -> Option<&str> {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
    }

    /// Is this a regular file?
    pub fn is_file(&self) -> bool {
        !self.flags.directory
    }

    /// Is this a directory?
    pub fn is_directory(&self) -> bool {
        self.flags.directory
    }

    /// Is this hidden?
    pub fn is_hidden(&self) -> bool {
        self.flags.hidden
    }

    /// The directory's own entry (identifier 0x00)
    pub fn is_self(&self) -> bool {
        self.identifier.as_slice() == [Self::SELF_ID]
    }

    /// The parent directory entry (identifier 0x01)
    pub fn is_parent(&self) -> bool {
        self.identifier.as_slice() == [Self::PARENT_ID]
    }

    /// Self or parent pseudo-entry, never shown in listings
    pub fn is_special(&self) -> bool {
        self.is_self() || self.is_parent()
    }

    /// Whether `segment` names this record
    ///
    /// Case-sensitive against the display name, or against the raw
    /// identifier so that `README.TXT;1` also matches.
    pub fn matches(&self, segment: &str) -> bool {
        self.name == segment || self.identifier.as_slice() == segment.as_bytes()
    }

    /// Data region described by this record
    pub fn extent(&self) -> Extent {
        Extent::new(self.extent_lba, self.data_length)
    }
}
