//! In-memory archive builder.
//!
//! ## Layout
//!
//! Entries are appended to two buffers kept in the same order:
//!
//! - the body: `LFH + name + payload` per entry
//! - the central directory: `CDFH + name` per entry
//!
//! [`ArchiveBuilder::finalize`] copies the central directory behind the body
//! and appends the EOCD record, after which the body is the finished archive.
//!
//! ## Example
//!
//! ```
//! use memzip::{ArchiveBuilder, CompressionMethod, EntryOptions};
//!
//! let mut builder = ArchiveBuilder::new();
//! builder.add_entry("hello.txt", b"hello", &EntryOptions::default())?;
//! builder.add_entry(
//!     "raw.bin",
//!     &[0u8; 16],
//!     &EntryOptions::new(CompressionMethod::Stored),
//! )?;
//! builder.finalize()?;
//!
//! let archive = builder.into_bytes();
//! assert_eq!(&archive[archive.len() - 22..][..4], b"PK\x05\x06");
//! # Ok::<(), memzip::ZipError>(())
//! ```

use tracing::debug;

use super::structures::{
    CentralDirectoryHeader, CompressionMethod, DEFAULT_UNIX_MODE, EndOfCentralDirectory,
    FLAG_LZMA_EOS, FLAG_UTF8, LocalFileHeader,
};
use super::time::DosDateTime;
use crate::error::ZipError;

/// Per-entry settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryOptions {
    pub compression_method: CompressionMethod,
    /// Full Unix mode (type and permission bits), stored in the high 16
    /// bits of the external attributes. Bits above 0xFFFF are ignored.
    pub unix_mode: u32,
}

impl EntryOptions {
    pub fn new(compression_method: CompressionMethod) -> Self {
        Self {
            compression_method,
            ..Self::default()
        }
    }

    pub fn unix_mode(mut self, mode: u32) -> Self {
        self.unix_mode = mode;
        self
    }
}

impl Default for EntryOptions {
    fn default() -> Self {
        Self {
            compression_method: CompressionMethod::Deflate,
            unix_mode: DEFAULT_UNIX_MODE,
        }
    }
}

/// What was committed for one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRecord {
    pub file_name: String,
    pub compression_method: CompressionMethod,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub lfh_offset: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuilderState {
    Open,
    Finalized,
}

/// Builds a ZIP archive in memory, one entry at a time.
///
/// All entries share the timestamp captured when the builder was created.
/// A builder is driven by a single owner; `add_entry` and `finalize` take
/// `&mut self`.
#[derive(Debug)]
pub struct ArchiveBuilder {
    body: Vec<u8>,
    central_directory: Vec<u8>,
    entry_count: u16,
    timestamp: DosDateTime,
    state: BuilderState,
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveBuilder {
    /// Create an empty builder stamped with the current local time.
    pub fn new() -> Self {
        Self::with_timestamp(DosDateTime::now())
    }

    /// Create an empty builder with a fixed timestamp, for reproducible output.
    pub fn with_timestamp(timestamp: DosDateTime) -> Self {
        Self {
            body: Vec::new(),
            central_directory: Vec::new(),
            entry_count: 0,
            timestamp,
            state: BuilderState::Open,
        }
    }

    /// Compress `content` and append it as entry `name`.
    ///
    /// Either both buffers receive the complete entry or neither changes:
    /// compression and every size check happen before the first byte is
    /// written.
    ///
    /// # Errors
    ///
    /// - [`ZipError::ArchiveFinalized`] after [`finalize`](Self::finalize)
    /// - [`ZipError::UnsupportedCompressionMethod`] for
    ///   [`CompressionMethod::Other`]
    /// - a codec failure, or one of the 32-bit limit errors
    pub fn add_entry(
        &mut self,
        name: &str,
        content: &[u8],
        options: &EntryOptions,
    ) -> Result<EntryRecord, ZipError> {
        if self.state == BuilderState::Finalized {
            return Err(ZipError::ArchiveFinalized);
        }
        if self.entry_count == u16::MAX {
            return Err(ZipError::TooManyEntries);
        }

        let name_bytes = name.as_bytes();
        let name_len =
            u16::try_from(name_bytes.len()).map_err(|_| ZipError::NameTooLong(name_bytes.len()))?;
        let uncompressed_size = u32::try_from(content.len())
            .map_err(|_| ZipError::EntryTooLarge(content.len() as u64))?;

        let lfh_offset =
            u32::try_from(self.body.len()).map_err(|_| ZipError::ArchiveTooLarge)?;
        let method = options.compression_method;
        let crc32 = crc32fast::hash(content);
        let payload = method.encode(content)?;
        let compressed_size = u32::try_from(payload.len())
            .map_err(|_| ZipError::EntryTooLarge(payload.len() as u64))?;

        // Offsets in the directory and EOCD are 32-bit, so the finished
        // archive minus the EOCD itself must stay addressable.
        let local_len = LocalFileHeader::SIZE + name_bytes.len() + payload.len();
        let central_len = CentralDirectoryHeader::SIZE + name_bytes.len();
        let total = self.body.len() as u64
            + self.central_directory.len() as u64
            + local_len as u64
            + central_len as u64;
        if total > u64::from(u32::MAX) {
            return Err(ZipError::ArchiveTooLarge);
        }

        let mut flags = 0;
        if !name.is_ascii() {
            flags |= FLAG_UTF8;
        }
        if method == CompressionMethod::Lzma {
            flags |= FLAG_LZMA_EOS;
        }

        let lfh = LocalFileHeader {
            version_needed: method.version_needed(),
            flags,
            compression_method: method.as_u16(),
            last_mod_time: self.timestamp.time,
            last_mod_date: self.timestamp.date,
            crc32,
            compressed_size,
            uncompressed_size,
            file_name_length: name_len,
        };
        // Only the low 16 bits of a mode fit the external attributes.
        let external_attrs = (options.unix_mode & 0xFFFF) << 16;
        let cdfh = CentralDirectoryHeader::for_local(&lfh, external_attrs, lfh_offset);

        // Nothing below can fail.
        self.body.reserve(local_len);
        self.body.extend_from_slice(&lfh.to_bytes());
        self.body.extend_from_slice(name_bytes);
        self.body.extend_from_slice(&payload);

        self.central_directory.reserve(central_len);
        self.central_directory.extend_from_slice(&cdfh.to_bytes());
        self.central_directory.extend_from_slice(name_bytes);

        self.entry_count += 1;

        debug!(
            entry = name,
            method = method.as_u16(),
            crc32,
            compressed_size,
            uncompressed_size,
            lfh_offset,
            "entry added"
        );

        Ok(EntryRecord {
            file_name: name.to_string(),
            compression_method: method,
            crc32,
            compressed_size,
            uncompressed_size,
            lfh_offset,
        })
    }

    /// Append the central directory and EOCD record.
    ///
    /// Calling this again on a finalized builder does nothing.
    pub fn finalize(&mut self) -> Result<(), ZipError> {
        match self.state {
            BuilderState::Finalized => return Ok(()),
            BuilderState::Open => {}
        }

        let cd_offset = u32::try_from(self.body.len()).map_err(|_| ZipError::ArchiveTooLarge)?;
        let cd_size = u32::try_from(self.central_directory.len())
            .map_err(|_| ZipError::ArchiveTooLarge)?;

        let eocd = EndOfCentralDirectory {
            disk_entries: self.entry_count,
            total_entries: self.entry_count,
            cd_size,
            cd_offset,
        };

        self.body
            .reserve(self.central_directory.len() + EndOfCentralDirectory::SIZE);
        self.body.extend_from_slice(&self.central_directory);
        self.body.extend_from_slice(&eocd.to_bytes());
        self.state = BuilderState::Finalized;

        debug!(
            entries = self.entry_count,
            cd_offset,
            cd_size,
            total = self.body.len(),
            "archive finalized"
        );
        Ok(())
    }

    /// Number of entries added so far.
    pub fn entry_count(&self) -> u16 {
        self.entry_count
    }

    pub fn is_finalized(&self) -> bool {
        self.state == BuilderState::Finalized
    }

    /// Timestamp shared by every entry.
    pub fn timestamp(&self) -> DosDateTime {
        self.timestamp
    }

    /// Bytes accumulated so far; a complete archive once finalized.
    pub fn as_bytes(&self) -> &[u8] {
        &self.body
    }

    /// Central directory records written so far, in entry order.
    pub fn central_directory(&self) -> &[u8] {
        &self.central_directory
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed() -> ArchiveBuilder {
        ArchiveBuilder::with_timestamp(DosDateTime::from_parts(2024, 5, 17, 10, 30, 0))
    }

    fn u16_at(buf: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes([buf[offset], buf[offset + 1]])
    }

    fn u32_at(buf: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]])
    }

    #[test]
    fn empty_archive_is_bare_eocd() {
        let mut builder = fixed();
        builder.finalize().expect("finalize should succeed");

        let out = builder.as_bytes();
        assert_eq!(out.len(), EndOfCentralDirectory::SIZE);
        assert_eq!(u32_at(out, 0), EndOfCentralDirectory::SIGNATURE);
        assert_eq!(u16_at(out, 10), 0);
        assert_eq!(u32_at(out, 12), 0);
        assert_eq!(u32_at(out, 16), 0);
    }

    #[test]
    fn offsets_follow_body_length() {
        let mut builder = fixed();
        let mut expected_offset = 0u32;

        for (i, method) in [
            CompressionMethod::Deflate,
            CompressionMethod::Stored,
            CompressionMethod::Bzip2,
        ]
        .into_iter()
        .enumerate()
        {
            let before = builder.as_bytes().len() as u32;
            assert_eq!(before, expected_offset);

            let name = format!("file{i}.txt");
            let content = b"some repeated content content content";
            let record = builder
                .add_entry(&name, content, &EntryOptions::new(method))
                .expect("add_entry should succeed");

            assert_eq!(record.lfh_offset, before);
            expected_offset = before
                + (LocalFileHeader::SIZE + name.len()) as u32
                + record.compressed_size;
        }

        assert_eq!(builder.entry_count(), 3);
        assert_eq!(builder.as_bytes().len() as u32, expected_offset);
    }

    #[test]
    fn stored_entry_sizes_match_input() {
        let mut builder = fixed();
        let content = b"stored bytes";
        let record = builder
            .add_entry("a.bin", content, &EntryOptions::new(CompressionMethod::Stored))
            .expect("add_entry should succeed");

        assert_eq!(record.compressed_size, content.len() as u32);
        assert_eq!(record.uncompressed_size, content.len() as u32);
        assert_eq!(record.crc32, crc32fast::hash(content));

        let body = builder.as_bytes();
        assert_eq!(u16_at(body, 4), 10);
        assert_eq!(&body[LocalFileHeader::SIZE..LocalFileHeader::SIZE + 5], b"a.bin");
        assert_eq!(&body[LocalFileHeader::SIZE + 5..], content);
    }

    #[test]
    fn headers_share_builder_timestamp() {
        let mut builder = fixed();
        let ts = builder.timestamp();
        builder
            .add_entry("one", b"1", &EntryOptions::default())
            .expect("add_entry should succeed");
        builder
            .add_entry("two", b"2", &EntryOptions::default())
            .expect("add_entry should succeed");

        let cd = builder.central_directory();
        let second = CentralDirectoryHeader::SIZE + 3;
        for base in [0, second] {
            assert_eq!(u16_at(cd, base + 12), ts.time);
            assert_eq!(u16_at(cd, base + 14), ts.date);
        }
    }

    #[test]
    fn flags_and_attributes() {
        let mut builder = fixed();
        let options = EntryOptions::new(CompressionMethod::Lzma).unix_mode(0o100755);
        builder
            .add_entry("données.txt", b"x", &options)
            .expect("add_entry should succeed");

        let cd = builder.central_directory();
        let flags = u16_at(cd, 8);
        assert_eq!(flags & FLAG_UTF8, FLAG_UTF8);
        assert_eq!(flags & FLAG_LZMA_EOS, FLAG_LZMA_EOS);
        assert_eq!(u16_at(cd, 6), 63);
        assert_eq!(u32_at(cd, 38), 0o100755 << 16);
    }

    #[test]
    fn unsupported_method_leaves_buffers_untouched() {
        let mut builder = fixed();
        builder
            .add_entry("keep.txt", b"keep", &EntryOptions::default())
            .expect("add_entry should succeed");
        let body_len = builder.as_bytes().len();
        let cd_len = builder.central_directory().len();

        let err = builder
            .add_entry("bad.txt", b"bad", &EntryOptions::new(CompressionMethod::Other(99)))
            .expect_err("method 99 should fail");
        assert!(matches!(err, ZipError::UnsupportedCompressionMethod(99)));
        assert_eq!(builder.as_bytes().len(), body_len);
        assert_eq!(builder.central_directory().len(), cd_len);
        assert_eq!(builder.entry_count(), 1);
    }

    #[test]
    fn add_after_finalize_fails() {
        let mut builder = fixed();
        builder
            .add_entry("a", b"a", &EntryOptions::default())
            .expect("add_entry should succeed");
        builder.finalize().expect("finalize should succeed");
        let len = builder.as_bytes().len();

        let err = builder
            .add_entry("b", b"b", &EntryOptions::default())
            .expect_err("add after finalize should fail");
        assert!(matches!(err, ZipError::ArchiveFinalized));
        assert_eq!(builder.as_bytes().len(), len);
        assert_eq!(builder.entry_count(), 1);
    }

    #[test]
    fn finalize_is_idempotent() {
        let mut builder = fixed();
        builder
            .add_entry("a", b"abc", &EntryOptions::default())
            .expect("add_entry should succeed");
        builder.finalize().expect("finalize should succeed");
        let once = builder.as_bytes().to_vec();

        builder.finalize().expect("second finalize should succeed");
        assert!(builder.is_finalized());
        assert_eq!(builder.as_bytes(), &once[..]);
    }

    #[test]
    fn mode_bits_above_16_are_dropped() {
        let mut builder = fixed();
        let options = EntryOptions::default().unix_mode(0x7_0000 | 0o100600);
        builder
            .add_entry("wide.txt", b"w", &options)
            .expect("add_entry should succeed");

        assert_eq!(u32_at(builder.central_directory(), 38), 0o100600 << 16);
    }

    #[test]
    fn entry_count_caps_at_u16_max() {
        let mut builder = fixed();
        let stored = EntryOptions::new(CompressionMethod::Stored);
        for _ in 0..u16::MAX {
            builder
                .add_entry("e", b"", &stored)
                .expect("add_entry should succeed");
        }
        assert_eq!(builder.entry_count(), u16::MAX);

        let body_len = builder.as_bytes().len();
        let cd_len = builder.central_directory().len();
        let err = builder
            .add_entry("one-too-many", b"", &stored)
            .expect_err("entry 65536 should fail");
        assert!(matches!(err, ZipError::TooManyEntries));
        assert_eq!(builder.as_bytes().len(), body_len);
        assert_eq!(builder.central_directory().len(), cd_len);

        builder.finalize().expect("finalize should succeed");
        let out = builder.as_bytes();
        let eocd = out.len() - EndOfCentralDirectory::SIZE;
        assert_eq!(u16_at(out, eocd + 8), 0xFFFF);
        assert_eq!(u16_at(out, eocd + 10), 0xFFFF);
    }

    #[test]
    fn oversized_name_is_rejected() {
        let mut builder = fixed();
        let name = "n".repeat(usize::from(u16::MAX) + 1);
        let err = builder
            .add_entry(&name, b"", &EntryOptions::default())
            .expect_err("long name should fail");
        assert!(matches!(err, ZipError::NameTooLong(65536)));
        assert!(builder.as_bytes().is_empty());
        assert!(builder.central_directory().is_empty());
    }
}
