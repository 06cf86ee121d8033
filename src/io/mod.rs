mod http;
mod local;

pub use http::HttpSource;
pub use local::LocalFileSource;

use anyhow::Result;
use async_trait::async_trait;

/// Trait for an input whose whole contents become one archive entry
#[async_trait]
pub trait Source: Send + Sync {
    /// Read the complete contents into memory
    async fn read_all(&self) -> Result<Vec<u8>>;

    /// Name the entry gets when paths are kept
    fn entry_name(&self) -> &str;

    /// Unix mode of the input, if the source has one
    fn unix_mode(&self) -> Option<u32> {
        None
    }
}
