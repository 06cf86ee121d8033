use clap::{Parser, ValueEnum};

use crate::zip::{CompressionMethod, S_IFREG};

#[derive(Parser, Debug)]
#[command(name = "memzip")]
#[command(version)]
#[command(about = "Pack files and URLs into a ZIP archive built in memory", long_about = None)]
#[command(after_help = "Examples:\n  \
  memzip out.zip a.txt b.txt            deflate two files into out.zip\n  \
  memzip -Z xz -j out.zip logs/*.log    xz-compress logs without their paths\n  \
  memzip out.zip https://example.com/data.csv   pack a remote file")]
pub struct Cli {
    /// ZIP archive to create
    #[arg(value_name = "ARCHIVE")]
    pub archive: String,

    /// Files or HTTP URLs to add
    #[arg(value_name = "FILES", required = true)]
    pub files: Vec<String>,

    /// Compression method
    #[arg(short = 'Z', long, value_enum, default_value_t = Method::Deflate)]
    pub compression_method: Method,

    /// Permission bits for every entry, in octal (e.g. 644)
    #[arg(short = 'm', long, value_name = "OCTAL", value_parser = parse_octal_mode)]
    pub mode: Option<u32>,

    /// Junk paths (store only file names)
    #[arg(short = 'j')]
    pub junk_paths: bool,

    /// Overwrite an existing archive
    #[arg(short = 'o')]
    pub overwrite: bool,

    /// Print a summary table after packing
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,
}

/// Compression methods selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Method {
    Store,
    Deflate,
    Bzip2,
    Lzma,
    Xz,
}

impl From<Method> for CompressionMethod {
    fn from(method: Method) -> Self {
        match method {
            Method::Store => CompressionMethod::Stored,
            Method::Deflate => CompressionMethod::Deflate,
            Method::Bzip2 => CompressionMethod::Bzip2,
            Method::Lzma => CompressionMethod::Lzma,
            Method::Xz => CompressionMethod::Xz,
        }
    }
}

fn parse_octal_mode(s: &str) -> Result<u32, String> {
    let mode = u32::from_str_radix(s, 8).map_err(|e| format!("not an octal mode: {e}"))?;
    if mode > 0o7777 {
        return Err(format!("mode {s} has bits outside 7777"));
    }
    Ok(mode)
}

impl Cli {
    pub fn is_http_url(file: &str) -> bool {
        file.starts_with("http://") || file.starts_with("https://")
    }

    /// Full Unix mode for an entry: `-m` wins over the source's own mode.
    pub fn entry_mode(&self, source_mode: Option<u32>) -> Option<u32> {
        match self.mode {
            Some(bits) => Some(S_IFREG | bits),
            None => source_mode,
        }
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet > 0
    }

    pub fn is_very_quiet(&self) -> bool {
        self.quiet > 1
    }
}
