use std::io;

use thiserror::Error;

/// Errors produced while building an archive.
///
/// Codec failures carry the underlying I/O error reported by the
/// compression library. None of these leave a partial entry behind.
#[derive(Debug, Error)]
pub enum ZipError {
    #[error("archive is already finalized")]
    ArchiveFinalized,
    #[error("unsupported compression method: {0}")]
    UnsupportedCompressionMethod(u16),
    #[error("deflate compression failed: {0}")]
    DeflateFailed(#[source] io::Error),
    #[error("bzip2 compression failed: {0}")]
    Bzip2Failed(#[source] io::Error),
    #[error("lzma compression failed: {0}")]
    LzmaFailed(#[source] io::Error),
    #[error("file name is {0} bytes, longer than 65535")]
    NameTooLong(usize),
    #[error("entry of {0} bytes does not fit a 32-bit zip")]
    EntryTooLarge(u64),
    #[error("too many entries for a 32-bit zip")]
    TooManyEntries,
    #[error("archive does not fit a 32-bit zip")]
    ArchiveTooLarge,
}
