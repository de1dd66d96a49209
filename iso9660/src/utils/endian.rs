//! Both-endian numeric fields
//!
//! ECMA-119 stores most multi-byte integers twice: little-endian first,
//! then big-endian. The little-endian copy is the one returned; the
//! big-endian copy is only used to detect damage.

/// Both-endian 32-bit value (stored as LE then BE)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BothEndian32 {
    /// Little-endian value
    pub le: [u8; 4],
    /// Big-endian value
    pub be: [u8; 4],
}

impl BothEndian32 {
    /// Encoded size in bytes
    pub const SIZE: usize = 8;

    /// Read from the first 8 bytes of `bytes`
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self {
            le: [bytes[0], bytes[1], bytes[2], bytes[3]],
            be: [bytes[4], bytes[5], bytes[6], bytes[7]],
        }
    }

    /// Get value (uses little-endian)
    pub fn get(&self) -> u32 {
        u32::from_le_bytes(self.le)
    }

    /// Whether both copies agree
    pub fn is_consistent(&self) -> bool {
        u32::from_le_bytes(self.le) == u32::from_be_bytes(self.be)
    }
}

/// Both-endian 16-bit value (stored as LE then BE)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BothEndian16 {
    /// Little-endian value
    pub le: [u8; 2],
    /// Big-endian value
    pub be: [u8; 2],
}

impl BothEndian16 {
    /// Encoded size in bytes
    pub const SIZE: usize = 4;

    /// Read from the first 4 bytes of `bytes`
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self {
            le: [bytes[0], bytes[1]],
            be: [bytes[2], bytes[3]],
        }
    }

    /// Get value (uses little-endian)
    pub fn get(&self) -> u16 {
        u16::from_le_bytes(self.le)
    }

    /// Whether both copies agree
    pub fn is_consistent(&self) -> bool {
        u16::from_le_bytes(self.le) == u16::from_be_bytes(self.be)
    }
}

/// Read a little-endian u32 at `offset`
pub fn read_le_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

/// Read a big-endian u32 at `offset`
pub fn read_be_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}
