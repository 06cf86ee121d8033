//! # memzip
//!
//! Build ZIP archives in memory from named byte buffers.
//!
//! This library turns a sequence of `(name, bytes, options)` triples into a
//! single archive blob, compressing each entry on its own. The caller keeps
//! the finished bytes and decides where they go. A small CLI on top packs
//! local files and HTTP URLs into an archive on disk.
//!
//! ## Features
//!
//! - STORED, DEFLATE, BZIP2, LZMA and XZ entries
//! - All-or-nothing entry insertion: a failing entry never leaves partial bytes
//! - Idempotent finalization
//! - Unix permissions and UTF-8 names
//!
//! ## Example
//!
//! ```
//! use memzip::{ArchiveBuilder, CompressionMethod, EntryOptions};
//!
//! let mut builder = ArchiveBuilder::new();
//! builder.add_entry("test1.txt", b"test1 content", &EntryOptions::default())?;
//! builder.add_entry(
//!     "test2.txt",
//!     b"test2 content",
//!     &EntryOptions::new(CompressionMethod::Stored),
//! )?;
//! builder.finalize()?;
//!
//! assert_eq!(builder.entry_count(), 2);
//! let archive: Vec<u8> = builder.into_bytes();
//! # assert!(archive.starts_with(b"PK\x03\x04"));
//! # Ok::<(), memzip::ZipError>(())
//! ```

pub mod cli;
pub mod error;
pub mod io;
pub mod zip;

pub use cli::Cli;
pub use error::ZipError;
pub use io::{HttpSource, LocalFileSource, Source};
pub use zip::{ArchiveBuilder, CompressionMethod, DosDateTime, EntryOptions, EntryRecord};
