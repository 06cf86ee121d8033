use byteorder::{ByteOrder, LittleEndian};

/// ZIP compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionMethod {
    Stored,
    #[default]
    Deflate,
    Bzip2,
    Lzma,
    Xz,
    Other(u16),
}

impl CompressionMethod {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflate,
            12 => CompressionMethod::Bzip2,
            14 => CompressionMethod::Lzma,
            95 => CompressionMethod::Xz,
            _ => CompressionMethod::Other(value),
        }
    }

    pub fn as_u16(&self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Deflate => 8,
            CompressionMethod::Bzip2 => 12,
            CompressionMethod::Lzma => 14,
            CompressionMethod::Xz => 95,
            CompressionMethod::Other(v) => *v,
        }
    }

    /// Minimum "version needed to extract" for this method (APPNOTE 4.4.3).
    pub fn version_needed(&self) -> u16 {
        match self {
            CompressionMethod::Stored => 10,
            CompressionMethod::Deflate => 20,
            CompressionMethod::Bzip2 => 46,
            CompressionMethod::Lzma | CompressionMethod::Xz => 63,
            CompressionMethod::Other(_) => 20,
        }
    }

    /// Short verb used when reporting an added entry, as `zip(1)` does.
    pub fn verb(&self) -> &'static str {
        match self {
            CompressionMethod::Stored => "stored",
            CompressionMethod::Deflate => "deflated",
            CompressionMethod::Bzip2 => "bzipped",
            CompressionMethod::Lzma => "lzma'd",
            CompressionMethod::Xz => "xz'd",
            CompressionMethod::Other(_) => "compressed",
        }
    }
}

/// Version made by: upper byte is the host system (3 = Unix), lower byte
/// the APPNOTE version (6.3).
pub const VERSION_MADE_BY: u16 = (3 << 8) | 63;

/// General purpose flag bit 1: for LZMA, an end-of-stream marker terminates the data.
pub const FLAG_LZMA_EOS: u16 = 1 << 1;
/// General purpose flag bit 11: file name is UTF-8.
pub const FLAG_UTF8: u16 = 1 << 11;

/// Unix `S_IFREG` file type bits.
pub const S_IFREG: u32 = 0o100000;
/// Regular file, `rw-r--r--`.
pub const DEFAULT_UNIX_MODE: u32 = S_IFREG | 0o644;

/// Local File Header (LFH) - 30 bytes, followed by the name and payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFileHeader {
    pub version_needed: u16,
    pub flags: u16,
    pub compression_method: u16,
    pub last_mod_time: u16,
    pub last_mod_date: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub file_name_length: u16,
}

impl LocalFileHeader {
    pub const SIGNATURE: u32 = 0x0403_4b50;
    pub const SIZE: usize = 30;

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        LittleEndian::write_u32(&mut buf[0..4], Self::SIGNATURE);
        LittleEndian::write_u16(&mut buf[4..6], self.version_needed);
        LittleEndian::write_u16(&mut buf[6..8], self.flags);
        LittleEndian::write_u16(&mut buf[8..10], self.compression_method);
        LittleEndian::write_u16(&mut buf[10..12], self.last_mod_time);
        LittleEndian::write_u16(&mut buf[12..14], self.last_mod_date);
        LittleEndian::write_u32(&mut buf[14..18], self.crc32);
        LittleEndian::write_u32(&mut buf[18..22], self.compressed_size);
        LittleEndian::write_u32(&mut buf[22..26], self.uncompressed_size);
        LittleEndian::write_u16(&mut buf[26..28], self.file_name_length);
        // extra field length stays 0
        buf
    }
}

/// Central Directory File Header (CDFH) - 46 bytes, followed by the name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CentralDirectoryHeader {
    pub version_made_by: u16,
    pub version_needed: u16,
    pub flags: u16,
    pub compression_method: u16,
    pub last_mod_time: u16,
    pub last_mod_date: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub file_name_length: u16,
    pub external_attrs: u32,
    pub lfh_offset: u32,
}

impl CentralDirectoryHeader {
    pub const SIGNATURE: u32 = 0x0201_4b50;
    pub const SIZE: usize = 46;

    /// Builds the directory record matching a local header written at `lfh_offset`.
    pub fn for_local(lfh: &LocalFileHeader, external_attrs: u32, lfh_offset: u32) -> Self {
        Self {
            version_made_by: VERSION_MADE_BY,
            version_needed: lfh.version_needed,
            flags: lfh.flags,
            compression_method: lfh.compression_method,
            last_mod_time: lfh.last_mod_time,
            last_mod_date: lfh.last_mod_date,
            crc32: lfh.crc32,
            compressed_size: lfh.compressed_size,
            uncompressed_size: lfh.uncompressed_size,
            file_name_length: lfh.file_name_length,
            external_attrs,
            lfh_offset,
        }
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        LittleEndian::write_u32(&mut buf[0..4], Self::SIGNATURE);
        LittleEndian::write_u16(&mut buf[4..6], self.version_made_by);
        LittleEndian::write_u16(&mut buf[6..8], self.version_needed);
        LittleEndian::write_u16(&mut buf[8..10], self.flags);
        LittleEndian::write_u16(&mut buf[10..12], self.compression_method);
        LittleEndian::write_u16(&mut buf[12..14], self.last_mod_time);
        LittleEndian::write_u16(&mut buf[14..16], self.last_mod_date);
        LittleEndian::write_u32(&mut buf[16..20], self.crc32);
        LittleEndian::write_u32(&mut buf[20..24], self.compressed_size);
        LittleEndian::write_u32(&mut buf[24..28], self.uncompressed_size);
        LittleEndian::write_u16(&mut buf[28..30], self.file_name_length);
        // extra length, comment length, disk number start and internal
        // attributes (30..38) are always 0
        LittleEndian::write_u32(&mut buf[38..42], self.external_attrs);
        LittleEndian::write_u32(&mut buf[42..46], self.lfh_offset);
        buf
    }
}

/// End of Central Directory (EOCD) - 22 bytes, never carries a comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndOfCentralDirectory {
    pub disk_entries: u16,
    pub total_entries: u16,
    pub cd_size: u32,
    pub cd_offset: u32,
}

impl EndOfCentralDirectory {
    pub const SIGNATURE: u32 = 0x0605_4b50;
    pub const SIZE: usize = 22;

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        LittleEndian::write_u32(&mut buf[0..4], Self::SIGNATURE);
        // disk number and disk with central directory (4..8) are 0
        LittleEndian::write_u16(&mut buf[8..10], self.disk_entries);
        LittleEndian::write_u16(&mut buf[10..12], self.total_entries);
        LittleEndian::write_u32(&mut buf[12..16], self.cd_size);
        LittleEndian::write_u32(&mut buf[16..20], self.cd_offset);
        // comment length (20..22) is 0
        buf
    }
}
