//! Minimal ISO9660 image writer for tests
//!
//! Layout: system area, PVD at 16, optional boot record, optional Joliet
//! SVD, terminator, then the primary directories, the Joliet directories
//! and finally file data. Entries keep insertion order. A record that does
//! not fit in the rest of a block starts the next one.

use crate::common::MemoryBlockDevice;

const BLOCK: usize = 2048;

struct FileNode {
    name: String,
    content: Vec<u8>,
}

struct DirNode {
    name: String,
    parent: usize,
    entries: Vec<Entry>,
}

#[derive(Clone, Copy)]
enum Entry {
    File(usize),
    Dir(usize),
}

#[derive(Clone, Copy)]
enum Target {
    SelfDir,
    Parent,
    Entry(Entry),
}

struct Listing {
    records: Vec<(Vec<u8>, Target)>,
    offsets: Vec<usize>,
    blocks: usize,
}

pub struct IsoBuilder {
    volume_id: String,
    joliet: bool,
    boot_record: bool,
    files: Vec<FileNode>,
    dirs: Vec<DirNode>,
}

impl IsoBuilder {
    pub fn new() -> Self {
        Self {
            volume_id: "TEST_VOLUME".to_string(),
            joliet: false,
            boot_record: false,
            files: Vec::new(),
            dirs: vec![DirNode {
                name: String::new(),
                parent: 0,
                entries: Vec::new(),
            }],
        }
    }

    pub fn volume_id(&mut self, id: &str) -> &mut Self {
        self.volume_id = id.to_string();
        self
    }

    /// Add a Joliet SVD whose hierarchy keeps names as given
    ///
    /// The primary hierarchy always carries upper-cased names.
    pub fn joliet(&mut self) -> &mut Self {
        self.joliet = true;
        self
    }

    /// Put an El Torito style boot record in front of the SVD
    pub fn boot_record(&mut self) -> &mut Self {
        self.boot_record = true;
        self
    }

    /// Add a file; `/` in `path` creates intermediate directories
    pub fn add_file(&mut self, path: &str, content: &[u8]) -> &mut Self {
        let (dir_path, name) = match path.rsplit_once('/') {
            Some((dir, name)) => (dir, name),
            None => ("", path),
        };
        let dir = self.ensure_dir(dir_path);
        self.files.push(FileNode {
            name: name.to_string(),
            content: content.to_vec(),
        });
        let id = self.files.len() - 1;
        self.dirs[dir].entries.push(Entry::File(id));
        self
    }

    /// Add a directory (and its parents) without files
    pub fn add_dir(&mut self, path: &str) -> &mut Self {
        self.ensure_dir(path);
        self
    }

    fn ensure_dir(&mut self, path: &str) -> usize {
        let mut current = 0;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            let existing = self.dirs[current].entries.iter().find_map(|entry| match entry {
                Entry::Dir(id) if self.dirs[*id].name == segment => Some(*id),
                _ => None,
            });
            current = match existing {
                Some(id) => id,
                None => {
                    self.dirs.push(DirNode {
                        name: segment.to_string(),
                        parent: current,
                        entries: Vec::new(),
                    });
                    let id = self.dirs.len() - 1;
                    self.dirs[current].entries.push(Entry::Dir(id));
                    id
                }
            };
        }
        current
    }

    pub fn build(&self) -> MemoryBlockDevice {
        let mut next_lba = 17;
        if self.boot_record {
            next_lba += 1;
        }
        let svd_lba = next_lba;
        if self.joliet {
            next_lba += 1;
        }
        let terminator_lba = next_lba;
        next_lba += 1;

        let primary: Vec<Listing> = (0..self.dirs.len()).map(|d| self.listing(d, false)).collect();
        let primary_lbas = allocate(&primary, &mut next_lba);

        let joliet: Vec<Listing> = if self.joliet {
            (0..self.dirs.len()).map(|d| self.listing(d, true)).collect()
        } else {
            Vec::new()
        };
        let joliet_lbas = allocate(&joliet, &mut next_lba);

        let mut file_lbas = Vec::with_capacity(self.files.len());
        for file in &self.files {
            if file.content.is_empty() {
                file_lbas.push(0);
            } else {
                file_lbas.push(next_lba as u32);
                next_lba += (file.content.len() + BLOCK - 1) / BLOCK;
            }
        }

        let total_blocks = next_lba;
        let mut data = vec![0u8; total_blocks * BLOCK];

        let root_len = (primary[0].blocks * BLOCK) as u32;
        self.write_descriptor(&mut data, 16, 1, primary_lbas[0], root_len, total_blocks as u32, false);

        if self.boot_record {
            let off = 17 * BLOCK;
            data[off] = 0;
            data[off + 1..off + 6].copy_from_slice(b"CD001");
            data[off + 6] = 1;
            write_padded(&mut data[off + 7..off + 39], b"EL TORITO SPECIFICATION", 0);
        }

        if self.joliet {
            let root_len = (joliet[0].blocks * BLOCK) as u32;
            self.write_descriptor(&mut data, svd_lba, 2, joliet_lbas[0], root_len, total_blocks as u32, true);
        }

        let off = terminator_lba * BLOCK;
        data[off] = 255;
        data[off + 1..off + 6].copy_from_slice(b"CD001");
        data[off + 6] = 1;

        self.write_directories(&mut data, &primary, &primary_lbas, &file_lbas);
        if self.joliet {
            self.write_directories(&mut data, &joliet, &joliet_lbas, &file_lbas);
        }

        for (file, &lba) in self.files.iter().zip(&file_lbas) {
            let off = lba as usize * BLOCK;
            data[off..off + file.content.len()].copy_from_slice(&file.content);
        }

        MemoryBlockDevice::new(data)
    }

    fn identifier(name: &str, joliet: bool) -> Vec<u8> {
        if joliet {
            name.encode_utf16().flat_map(|u| u.to_be_bytes()).collect()
        } else {
            name.to_ascii_uppercase().into_bytes()
        }
    }

    fn listing(&self, dir: usize, joliet: bool) -> Listing {
        let mut records = vec![(vec![0u8], Target::SelfDir), (vec![1u8], Target::Parent)];
        for entry in &self.dirs[dir].entries {
            let name = match entry {
                Entry::File(id) => &self.files[*id].name,
                Entry::Dir(id) => &self.dirs[*id].name,
            };
            records.push((Self::identifier(name, joliet), Target::Entry(*entry)));
        }

        let mut offsets = Vec::with_capacity(records.len());
        let mut offset = 0;
        for (id, _) in &records {
            let len = record_len(id.len());
            if offset % BLOCK + len > BLOCK {
                offset = (offset / BLOCK + 1) * BLOCK;
            }
            offsets.push(offset);
            offset += len;
        }

        Listing {
            records,
            offsets,
            blocks: ((offset + BLOCK - 1) / BLOCK).max(1),
        }
    }

    fn write_directories(&self, data: &mut [u8], listings: &[Listing], lbas: &[u32], file_lbas: &[u32]) {
        for (dir, listing) in listings.iter().enumerate() {
            let base = lbas[dir] as usize * BLOCK;
            for ((id, target), &offset) in listing.records.iter().zip(&listing.offsets) {
                let (lba, size, flags) = match target {
                    Target::SelfDir => (lbas[dir], dir_len(&listings[dir]), 0x02),
                    Target::Parent => {
                        let parent = self.dirs[dir].parent;
                        (lbas[parent], dir_len(&listings[parent]), 0x02)
                    }
                    Target::Entry(Entry::Dir(child)) => (lbas[*child], dir_len(&listings[*child]), 0x02),
                    Target::Entry(Entry::File(file)) => {
                        (file_lbas[*file], self.files[*file].content.len() as u32, 0x00)
                    }
                };
                write_record(&mut data[base + offset..], id, lba, size, flags);
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn write_descriptor(
        &self,
        data: &mut [u8],
        sector: usize,
        type_code: u8,
        root_lba: u32,
        root_len: u32,
        space_size: u32,
        joliet: bool,
    ) {
        let off = sector * BLOCK;
        let d = &mut data[off..off + BLOCK];
        d[0] = type_code;
        d[1..6].copy_from_slice(b"CD001");
        d[6] = 1;

        let text = |s: &str| -> Vec<u8> {
            if joliet {
                s.encode_utf16().flat_map(|u| u.to_be_bytes()).collect()
            } else {
                s.as_bytes().to_vec()
            }
        };
        let pad = if joliet { 0 } else { b' ' };

        write_padded(&mut d[8..40], &text("LINUX"), pad);
        write_padded(&mut d[40..72], &text(&self.volume_id), pad);
        write_both_endian_u32(&mut d[80..], space_size);
        if joliet {
            d[88..91].copy_from_slice(b"%/E");
        }
        write_both_endian_u16(&mut d[120..], 1);
        write_both_endian_u16(&mut d[124..], 1);
        write_both_endian_u16(&mut d[128..], BLOCK as u16);
        write_both_endian_u32(&mut d[132..], 0);
        write_record(&mut d[156..190], &[0], root_lba, root_len, 0x02);
        write_padded(&mut d[190..318], &text("TEST_SET"), pad);
        write_padded(&mut d[318..446], &text("TEST_PUBLISHER"), pad);
        write_padded(&mut d[446..574], &text("TEST_PREPARER"), pad);
        write_padded(&mut d[574..702], &text("ISO9660-RS TESTS"), pad);
        d[813..830].copy_from_slice(b"2024010112000000\0");
        d[830..847].copy_from_slice(b"2024010112000000\0");
        d[881] = 1;
    }
}

fn allocate(listings: &[Listing], next_lba: &mut usize) -> Vec<u32> {
    listings
        .iter()
        .map(|listing| {
            let lba = *next_lba as u32;
            *next_lba += listing.blocks;
            lba
        })
        .collect()
}

fn dir_len(listing: &Listing) -> u32 {
    (listing.blocks * BLOCK) as u32
}

/// On-disk length of a record with an `id_len`-byte identifier
pub fn record_len(id_len: usize) -> usize {
    let len = 33 + id_len;
    len + len % 2
}

fn write_record(dst: &mut [u8], id: &[u8], lba: u32, size: u32, flags: u8) {
    let len = record_len(id.len());
    dst[0] = len as u8;
    dst[1] = 0;
    write_both_endian_u32(&mut dst[2..], lba);
    write_both_endian_u32(&mut dst[10..], size);
    dst[18..25].copy_from_slice(&[124, 1, 1, 12, 0, 0, 0]);
    dst[25] = flags;
    write_both_endian_u16(&mut dst[28..], 1);
    dst[32] = id.len() as u8;
    dst[33..33 + id.len()].copy_from_slice(id);
}

fn write_padded(dst: &mut [u8], src: &[u8], pad: u8) {
    dst.fill(pad);
    dst[..src.len()].copy_from_slice(src);
}

fn write_both_endian_u32(dst: &mut [u8], value: u32) {
    dst[0..4].copy_from_slice(&value.to_le_bytes());
    dst[4..8].copy_from_slice(&value.to_be_bytes());
}

fn write_both_endian_u16(dst: &mut [u8], value: u16) {
    dst[0..2].copy_from_slice(&value.to_le_bytes());
    dst[2..4].copy_from_slice(&value.to_be_bytes());
}
