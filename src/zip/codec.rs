//! Compression codecs for entry payloads.
//!
//! Every method takes the whole input and returns the whole payload as it
//! is stored in the archive, method-specific prefix included. The builder
//! never sees codec state; it only sees bytes or a [`ZipError`].

use std::borrow::Cow;
use std::io::{self, Write};

use bzip2::write::BzEncoder;
use flate2::write::DeflateEncoder;
use xz2::stream::{Check, LzmaOptions, Stream};
use xz2::write::XzEncoder;

use super::structures::CompressionMethod;
use crate::error::ZipError;

/// Input is fed to the encoders in blocks of this size.
const CHUNK_SIZE: usize = 64 * 1024;

/// liblzma preset used for both LZMA and XZ entries.
const LZMA_PRESET: u32 = 6;

/// LZMA SDK version recorded in the ZIP LZMA header (bundled liblzma 5.2).
const LZMA_VERSION_MAJOR: u8 = 5;
const LZMA_VERSION_MINOR: u8 = 2;

/// LZMA1 properties: lc/lp/pb byte plus a 4-byte dictionary size.
const LZMA_PROPS_SIZE: usize = 5;
/// `.lzma` (alone) header: properties followed by an 8-byte uncompressed size.
const LZMA_ALONE_HEADER_SIZE: usize = LZMA_PROPS_SIZE + 8;

impl CompressionMethod {
    /// Compress `data` into the payload stored after the local header.
    ///
    /// `Stored` borrows the input; every other method allocates.
    pub fn encode<'a>(&self, data: &'a [u8]) -> Result<Cow<'a, [u8]>, ZipError> {
        let out = match self {
            CompressionMethod::Stored => return Ok(Cow::Borrowed(data)),
            CompressionMethod::Deflate => deflate(data).map_err(ZipError::DeflateFailed)?,
            CompressionMethod::Bzip2 => bzip2(data).map_err(ZipError::Bzip2Failed)?,
            CompressionMethod::Lzma => lzma(data).map_err(ZipError::LzmaFailed)?,
            CompressionMethod::Xz => xz(data).map_err(ZipError::LzmaFailed)?,
            CompressionMethod::Other(code) => {
                return Err(ZipError::UnsupportedCompressionMethod(*code));
            }
        };

        tracing::trace!(
            method = self.as_u16(),
            input = data.len(),
            output = out.len(),
            "payload encoded"
        );
        Ok(Cow::Owned(out))
    }
}

fn feed<W: Write>(mut encoder: W, data: &[u8]) -> io::Result<W> {
    for chunk in data.chunks(CHUNK_SIZE) {
        encoder.write_all(chunk)?;
    }
    Ok(encoder)
}

/// Raw DEFLATE, no zlib header or trailer.
fn deflate(data: &[u8]) -> io::Result<Vec<u8>> {
    let encoder = DeflateEncoder::new(Vec::new(), flate2::Compression::default());
    feed(encoder, data)?.finish()
}

/// bzip2 with 900k blocks.
fn bzip2(data: &[u8]) -> io::Result<Vec<u8>> {
    let encoder = BzEncoder::new(Vec::new(), bzip2::Compression::best());
    feed(encoder, data)?.finish()
}

/// Raw LZMA1 behind the ZIP LZMA header.
///
/// liblzma only exposes LZMA1 through the `.lzma` container, whose header is
/// the 5 property bytes plus an 8-byte size. The properties are kept for the
/// ZIP header and the size field is dropped; the stream ends with an
/// end-of-stream marker.
fn lzma(data: &[u8]) -> io::Result<Vec<u8>> {
    let options = LzmaOptions::new_preset(LZMA_PRESET).map_err(io::Error::other)?;
    let stream = Stream::new_lzma_encoder(&options).map_err(io::Error::other)?;
    let alone = feed(XzEncoder::new_stream(Vec::new(), stream), data)?.finish()?;

    if alone.len() < LZMA_ALONE_HEADER_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "lzma encoder produced a truncated header",
        ));
    }
    let (props, raw) = (
        &alone[..LZMA_PROPS_SIZE],
        &alone[LZMA_ALONE_HEADER_SIZE..],
    );

    let mut out = Vec::with_capacity(4 + props.len() + raw.len());
    out.push(LZMA_VERSION_MAJOR);
    out.push(LZMA_VERSION_MINOR);
    out.extend_from_slice(&(LZMA_PROPS_SIZE as u16).to_le_bytes());
    out.extend_from_slice(props);
    out.extend_from_slice(raw);
    Ok(out)
}

/// Complete `.xz` stream with a CRC64 check.
fn xz(data: &[u8]) -> io::Result<Vec<u8>> {
    let stream = Stream::new_easy_encoder(LZMA_PRESET, Check::Crc64).map_err(io::Error::other)?;
    feed(XzEncoder::new_stream(Vec::new(), stream), data)?.finish()
}
