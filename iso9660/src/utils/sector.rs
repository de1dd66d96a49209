//! Block alignment and address calculation utilities
//!
//! Extents are addressed in logical blocks whose size comes from the
//! volume descriptor, so every helper takes the block size explicitly.

/// Convert logical block number to byte offset
pub fn block_to_byte(lba: u32, block_size: u32) -> u64 {
    u64::from(lba) * u64::from(block_size)
}

/// Calculate number of blocks needed for byte count
pub fn blocks_for_bytes(byte_count: u32, block_size: u32) -> u32 {
    byte_count.div_ceil(block_size)
}

/// Check if value is a positive power of two usable as a block size
pub fn is_valid_block_size(block_size: u32) -> bool {
    block_size.is_power_of_two()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_math() {
        assert_eq!(block_to_byte(18, 2048), 36864);
        assert_eq!(blocks_for_bytes(2049, 2048), 2);
        assert_eq!(blocks_for_bytes(0, 2048), 0);
    }

    #[test]
    fn test_block_size_validation() {
        assert!(is_valid_block_size(2048));
        assert!(is_valid_block_size(512));
        assert!(!is_valid_block_size(0));
        assert!(!is_valid_block_size(3000));
    }
}
