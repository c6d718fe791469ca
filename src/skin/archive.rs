use std::{
    fs::File,
    io::{Read, Seek, SeekFrom},
    path::Path,
};

use crate::error::PlayerError;

/// Local-file-header signature, "PK\x03\x04" read as little-endian u32.
const LOCAL_HEADER_MAGIC: u32 = 0x0403_4b50;

/// Bytes of local-header fields between the signature and the filename.
const LOCAL_HEADER_FIXED_LEN: usize = 26;

const METHOD_STORED: u16 = 0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Compression {
    Stored,
    /// Any method this reader does not extract. The raw method id is kept so
    /// the error can name it.
    Other(u16),
}

/// One named byte range inside the container file. Immutable once scanned.
#[derive(Clone, Debug)]
pub struct ArchiveEntry {
    pub name: String,
    pub compression: Compression,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    /// Absolute file offset of the entry payload (first byte after the
    /// extra field).
    pub data_offset: u64,
}

/// Minimal reader for the ZIP subset skin bundles use: a run of local file
/// headers with stored payloads. Only local headers are trusted; the central
/// directory is never parsed, and nothing here knows how to inflate.
#[derive(Debug)]
pub struct Archive {
    file: File,
    entries: Vec<ArchiveEntry>,
}

impl Archive {
    /// Scans local headers sequentially from offset 0 until the 4-byte
    /// signature stops matching. A mismatch (or EOF) at any record boundary
    /// means end-of-entries, not an error; a file that starts with garbage
    /// simply yields an empty directory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PlayerError> {
        let path = path.as_ref();
        let mut file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PlayerError::NotFound(path.display().to_string())
            } else {
                PlayerError::Io(e)
            }
        })?;

        let mut entries = Vec::new();
        loop {
            let mut signature = [0_u8; 4];
            match file.read_exact(&mut signature) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(e.into()),
            }
            if u32::from_le_bytes(signature) != LOCAL_HEADER_MAGIC {
                break;
            }

            // Fixed-order fields: version(2) flags(2) method(2) mtime(2)
            // mdate(2) crc32(4) csize(4) usize(4) name_len(2) extra_len(2).
            let mut header = [0_u8; LOCAL_HEADER_FIXED_LEN];
            file.read_exact(&mut header)
                .map_err(|_| PlayerError::Malformed("local header truncated after signature"))?;

            let method = u16::from_le_bytes([header[4], header[5]]);
            let compressed_size =
                u32::from_le_bytes([header[14], header[15], header[16], header[17]]);
            let uncompressed_size =
                u32::from_le_bytes([header[18], header[19], header[20], header[21]]);
            let name_len = u16::from_le_bytes([header[22], header[23]]) as usize;
            let extra_len = u16::from_le_bytes([header[24], header[25]]) as i64;

            let mut name_bytes = vec![0_u8; name_len];
            file.read_exact(&mut name_bytes)
                .map_err(|_| PlayerError::Malformed("entry name truncated"))?;
            let name = String::from_utf8_lossy(&name_bytes).into_owned();

            file.seek(SeekFrom::Current(extra_len))?;
            let data_offset = file.stream_position()?;
            // Skip the payload without reading it; the next local header (or
            // the end of the entry run) starts right after it.
            file.seek(SeekFrom::Current(i64::from(compressed_size)))?;

            let compression = if method == METHOD_STORED {
                Compression::Stored
            } else {
                Compression::Other(method)
            };
            entries.push(ArchiveEntry {
                name,
                compression,
                compressed_size,
                uncompressed_size,
                data_offset,
            });
        }

        log::info!(
            "Scanned skin archive {}: {} entries",
            path.display(),
            entries.len()
        );
        Ok(Self { file, entries })
    }

    /// Entries in file order.
    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    /// Case-insensitive name lookup. Non-stored entries are still listed
    /// here; only extraction rejects them.
    pub fn lookup(&self, name: &str) -> Option<&ArchiveEntry> {
        self.entries
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(name))
    }

    /// Reads the payload of a stored entry. Fails with
    /// `UnsupportedCompression` for any other method; inflate is deliberately
    /// not implemented.
    pub fn read_entry(&self, entry: &ArchiveEntry) -> Result<Vec<u8>, PlayerError> {
        if let Compression::Other(method) = entry.compression {
            return Err(PlayerError::UnsupportedCompression(method));
        }

        // For stored entries compressed_size == uncompressed_size, so this
        // read covers the whole payload.
        let mut file = &self.file;
        file.seek(SeekFrom::Start(entry.data_offset))?;
        let mut data = vec![0_u8; entry.compressed_size as usize];
        file.read_exact(&mut data)
            .map_err(|_| PlayerError::Malformed("entry payload extends past end of file"))?;
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::{Archive, Compression};
    use crate::error::PlayerError;
    use std::io::Write;
    use std::path::PathBuf;

    fn temp_archive_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("retroamp-archive-{tag}-{}.wsz", std::process::id()))
    }

    /// Writes one local-file-header record with the given method.
    fn push_entry(out: &mut Vec<u8>, name: &str, payload: &[u8], method: u16, extra: &[u8]) {
        out.extend_from_slice(&0x0403_4b50_u32.to_le_bytes());
        out.extend_from_slice(&20_u16.to_le_bytes()); // version needed
        out.extend_from_slice(&0_u16.to_le_bytes()); // flags
        out.extend_from_slice(&method.to_le_bytes());
        out.extend_from_slice(&0_u16.to_le_bytes()); // mtime
        out.extend_from_slice(&0_u16.to_le_bytes()); // mdate
        out.extend_from_slice(&0_u32.to_le_bytes()); // crc32 (ignored)
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.extend_from_slice(&(name.len() as u16).to_le_bytes());
        out.extend_from_slice(&(extra.len() as u16).to_le_bytes());
        out.extend_from_slice(name.as_bytes());
        out.extend_from_slice(extra);
        out.extend_from_slice(payload);
    }

    fn write_archive(tag: &str, bytes: &[u8]) -> PathBuf {
        let path = temp_archive_path(tag);
        let mut file = std::fs::File::create(&path).expect("temp archive should be writable");
        file.write_all(bytes).expect("temp archive write");
        path
    }

    #[test]
    fn scans_and_reads_stored_entries() {
        let mut bytes = Vec::new();
        push_entry(&mut bytes, "MAIN.BMP", b"main-pixels", 0, &[]);
        push_entry(&mut bytes, "CBUTTONS.BMP", b"button-pixels", 0, b"\x01\x02extra");
        push_entry(&mut bytes, "VOLUME.BMP", b"volume-pixels", 0, &[]);
        let path = write_archive("stored", &bytes);

        let archive = Archive::open(&path).expect("archive should open");
        assert_eq!(archive.entries().len(), 3);

        for (name, payload) in [
            ("MAIN.BMP", b"main-pixels".as_slice()),
            ("CBUTTONS.BMP", b"button-pixels".as_slice()),
            ("VOLUME.BMP", b"volume-pixels".as_slice()),
        ] {
            let entry = archive.lookup(name).expect("entry should resolve");
            assert_eq!(entry.uncompressed_size as usize, payload.len());
            let data = archive.read_entry(entry).expect("stored entry should read");
            assert_eq!(data, payload);
        }

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let mut bytes = Vec::new();
        push_entry(&mut bytes, "Main.bmp", b"x", 0, &[]);
        let path = write_archive("case", &bytes);

        let archive = Archive::open(&path).expect("archive should open");
        assert!(archive.lookup("MAIN.BMP").is_some());
        assert!(archive.lookup("main.bmp").is_some());
        assert!(archive.lookup("balance.bmp").is_none());

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn garbled_signature_yields_empty_directory() {
        let path = write_archive("garbled", b"this is not a zip file at all");
        let archive = Archive::open(&path).expect("open should still succeed");
        assert!(archive.entries().is_empty());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn empty_file_yields_empty_directory() {
        let path = write_archive("empty", &[]);
        let archive = Archive::open(&path).expect("open should still succeed");
        assert!(archive.entries().is_empty());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn deflated_entry_is_listed_but_not_readable() {
        let mut bytes = Vec::new();
        push_entry(&mut bytes, "PLEDIT.TXT", b"deflate-bits", 8, &[]);
        push_entry(&mut bytes, "MAIN.BMP", b"stored-bits", 0, &[]);
        let path = write_archive("deflate", &bytes);

        let archive = Archive::open(&path).expect("archive should open");
        // The scan keeps going past the unsupported entry.
        assert_eq!(archive.entries().len(), 2);

        let entry = archive.lookup("pledit.txt").expect("listed despite method");
        assert_eq!(entry.compression, Compression::Other(8));
        match archive.read_entry(entry) {
            Err(PlayerError::UnsupportedCompression(8)) => {}
            other => panic!("expected UnsupportedCompression, got {other:?}"),
        }

        // The stored sibling remains extractable.
        let stored = archive.lookup("MAIN.BMP").expect("stored entry listed");
        assert_eq!(archive.read_entry(stored).expect("stored read"), b"stored-bits");

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn missing_file_maps_to_not_found() {
        let path = temp_archive_path("missing-nonexistent");
        match Archive::open(&path) {
            Err(PlayerError::NotFound(_)) => {}
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn truncated_header_after_signature_is_malformed() {
        let path = write_archive("trunc", &0x0403_4b50_u32.to_le_bytes());
        match Archive::open(&path) {
            Err(PlayerError::Malformed(_)) => {}
            other => panic!("expected Malformed, got {other:?}"),
        }
        let _ = std::fs::remove_file(path);
    }
}
