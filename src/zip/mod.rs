//! ZIP archive construction.
//!
//! This module builds complete ZIP archives in memory from named byte
//! buffers, compressing each entry independently.
//!
//! ## Architecture
//!
//! The module is organized into four components:
//!
//! - [`structures`]: Fixed-layout ZIP records (local header, central directory header, EOCD)
//! - [`codec`]: Per-method payload compression
//! - [`time`]: MS-DOS timestamps
//! - [`builder`]: The archive builder tying the above together
//!
//! ## ZIP Format Overview
//!
//! A ZIP file consists of:
//! 1. Local file headers and compressed data for each file
//! 2. Central Directory with metadata for all files
//! 3. End of Central Directory (EOCD) record at the end
//!
//! The builder writes (1) and (2) side by side and joins them with (3) when
//! the archive is finalized.
//!
//! ## Supported Features
//!
//! - STORED, DEFLATE, BZIP2, LZMA and XZ compression methods
//! - Unix permissions in the external attributes
//! - UTF-8 file names
//!
//! ## Limitations
//!
//! - No ZIP64: entries and archives are limited to 4 GiB, 65535 entries
//! - No encryption, no multi-disk archives, no comments
//! - One archive-wide timestamp

pub mod builder;
pub mod codec;
pub mod structures;
pub mod time;

pub use builder::{ArchiveBuilder, EntryOptions, EntryRecord};
pub use structures::*;
pub use time::DosDateTime;
