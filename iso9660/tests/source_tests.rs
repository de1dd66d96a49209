//! Image source and block I/O tests

mod common;

use common::{pattern, scratch_dir, MemoryBlockDevice};
use gpt_disk_io::BlockIo;
use gpt_disk_types::Lba;
use iso9660::{ImageSource, Iso9660Error};

#[test]
fn test_memory_block_device_creation() {
    let data = vec![0u8; 10 * 2048];
    let mut device = MemoryBlockDevice::new(data);

    assert_eq!(device.block_size().to_u32(), 2048);
    assert_eq!(device.num_blocks().unwrap(), 10);
}

#[test]
fn test_read_out_of_bounds() {
    let data = vec![0u8; 10 * 2048];
    let mut device = MemoryBlockDevice::new(data);
    let mut buffer = [0u8; 2048];

    let result = device.read_blocks(Lba(10), &mut buffer);
    assert!(result.is_err(), "Should fail reading beyond device");
}

#[test]
fn test_source_length_from_block_count() {
    let source = ImageSource::new(MemoryBlockDevice::new(vec![0u8; 10 * 2048])).unwrap();
    assert_eq!(source.len(), 10 * 2048);
    assert!(!source.is_empty());
}

#[test]
fn test_aligned_read() {
    let data = pattern(10 * 2048);
    let mut source = ImageSource::new(MemoryBlockDevice::new(data.clone())).unwrap();

    let block = source.read_exact(3 * 2048, 2 * 2048).expect("read should succeed");
    assert_eq!(block, &data[3 * 2048..5 * 2048]);
}

#[test]
fn test_unaligned_read_spanning_blocks() {
    let data = pattern(10 * 2048);
    let mut source = ImageSource::new(MemoryBlockDevice::new(data.clone())).unwrap();

    for (offset, len) in [(1u64, 1u32), (2047, 2), (2000, 5000), (4095, 2049), (20479, 1)] {
        let got = source.read_exact(offset, len).expect("read should succeed");
        let start = offset as usize;
        assert_eq!(got, &data[start..start + len as usize], "offset {} len {}", offset, len);
    }
}

#[test]
fn test_read_with_small_device_blocks() {
    let data = pattern(8 * 512);
    let mut source = ImageSource::new(MemoryBlockDevice::with_block_size(data.clone(), 512)).unwrap();

    assert_eq!(source.len(), 8 * 512);
    let got = source.read_exact(500, 600).unwrap();
    assert_eq!(got, &data[500..1100]);
}

#[test]
fn test_zero_length_read_at_end() {
    let mut source = ImageSource::new(MemoryBlockDevice::new(vec![0u8; 2048])).unwrap();
    assert!(source.read_exact(2048, 0).unwrap().is_empty());
}

#[test]
fn test_truncated_read() {
    let mut source = ImageSource::new(MemoryBlockDevice::new(vec![0u8; 4 * 2048])).unwrap();

    let err = source.read_exact(3 * 2048 + 100, 2048).unwrap_err();
    assert_eq!(
        err,
        Iso9660Error::TruncatedRead {
            offset: 3 * 2048 + 100,
            requested: 2048,
            available: 2048 - 100,
        }
    );

    let err = source.read_exact(10 * 2048, 1).unwrap_err();
    assert!(matches!(err, Iso9660Error::TruncatedRead { available: 0, .. }));
}

#[test]
fn test_file_image_reads() {
    let dir = scratch_dir("source");
    let path = dir.join("image.bin");
    let data = pattern(5 * 2048);
    std::fs::write(&path, &data).unwrap();

    let mut source = ImageSource::open(&path).expect("image should open");
    assert_eq!(source.len(), 5 * 2048);
    assert_eq!(source.read_exact(2040, 20).unwrap(), &data[2040..2060]);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_open_missing_file() {
    let dir = scratch_dir("missing");
    let result = ImageSource::open(dir.join("does-not-exist.iso"));
    assert!(matches!(result, Err(Iso9660Error::Io(_))));
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_file_image_trailing_partial_block() {
    let dir = scratch_dir("tail");
    let path = dir.join("image.bin");
    let data = pattern(20 * 2048 + 100);
    std::fs::write(&path, &data).unwrap();

    let mut source = ImageSource::open(&path).expect("image should open");
    assert_eq!(source.len(), 20 * 2048 + 100);
    assert_eq!(source.read_exact(20 * 2048, 100).unwrap(), &data[20 * 2048..]);
    assert_eq!(source.read_exact(20 * 2048 - 50, 150).unwrap(), &data[20 * 2048 - 50..]);
    assert_eq!(
        source.read_exact(20 * 2048, 101).unwrap_err(),
        Iso9660Error::TruncatedRead {
            offset: 20 * 2048,
            requested: 101,
            available: 100,
        }
    );

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_with_len_clamps_to_device() {
    let device = MemoryBlockDevice::new(vec![0u8; 2 * 2048]);
    let source = ImageSource::with_len(device.clone(), 3000).unwrap();
    assert_eq!(source.len(), 3000);

    let source = ImageSource::with_len(device, 1 << 20).unwrap();
    assert_eq!(source.len(), 2 * 2048);
}

#[test]
fn test_oversized_read_rejected_up_front() {
    let mut source = ImageSource::new(MemoryBlockDevice::new(vec![0u8; 4 * 2048])).unwrap();

    let err = source.read_exact(2048, u32::MAX).unwrap_err();
    assert_eq!(
        err,
        Iso9660Error::TruncatedRead {
            offset: 2048,
            requested: u64::from(u32::MAX),
            available: 3 * 2048,
        }
    );
}
