//! Error types for ISO9660 operations

use alloc::string::String;
use core::fmt;

/// Result type for ISO9660 operations
pub type Result<T> = core::result::Result<T, Iso9660Error>;

/// Errors that can occur during ISO9660 operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Iso9660Error {
    /// Opening or reading the underlying device failed
    Io(String),

    /// Fewer bytes available than requested
    TruncatedRead {
        /// Absolute byte offset of the read
        offset: u64,
        /// Bytes requested
        requested: u64,
        /// Bytes available from `offset` to the end of the image
        available: u64,
    },

    /// Volume descriptor failed structural validation
    MalformedDescriptor {
        /// Sector the descriptor was read from
        sector: u64,
        /// What was wrong with it
        reason: &'static str,
    },

    /// No `CD001` standard identifier where a volume descriptor must be
    NotAnIsoImage,

    /// Directory record with an impossible length
    CorruptRecord {
        /// Absolute byte offset of the record
        offset: u64,
        /// What was wrong with it
        reason: &'static str,
    },

    /// A path segment matched nothing in its directory
    PathNotFound {
        /// The unresolved segment
        segment: String,
    },

    /// A path segment that must be a directory names a file
    NotADirectory {
        /// The offending segment
        segment: String,
    },

    /// Extraction requested for a directory record
    IsADirectory {
        /// Name of the directory
        name: String,
    },

    /// The destination sink stopped accepting bytes
    ShortWrite {
        /// Bytes accepted before the sink gave up
        written: u64,
        /// Bytes that should have been written
        expected: u64,
    },
}

impl Iso9660Error {
    /// Map a block device error into [`Iso9660Error::Io`]
    pub(crate) fn io<E: fmt::Display>(err: E) -> Self {
        Self::Io(alloc::format!("{}", err))
    }
}

impl fmt::Display for Iso9660Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "I/O error: {}", msg),
            Self::TruncatedRead { offset, requested, available } => write!(
                f,
                "Truncated read at offset {}: wanted {} bytes, {} available",
                offset, requested, available
            ),
            Self::MalformedDescriptor { sector, reason } => {
                write!(f, "Malformed volume descriptor at sector {}: {}", sector, reason)
            }
            Self::NotAnIsoImage => write!(f, "Not an ISO9660 image (no CD001 volume descriptor)"),
            Self::CorruptRecord { offset, reason } => {
                write!(f, "Corrupted directory record at offset {}: {}", offset, reason)
            }
            Self::PathNotFound { segment } => write!(f, "Path component '{}' not found", segment),
            Self::NotADirectory { segment } => write!(f, "'{}' is not a directory", segment),
            Self::IsADirectory { name } => write!(f, "'{}' is a directory", name),
            Self::ShortWrite { written, expected } => write!(
                f,
                "Destination accepted {} of {} bytes",
                written, expected
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Iso9660Error {}
