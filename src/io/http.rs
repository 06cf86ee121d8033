use async_trait::async_trait;
use reqwest::{Client, Url};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::warn;

use super::Source;
use anyhow::{Result, anyhow, bail};

/// Entry name used when the URL path has no final segment
const FALLBACK_NAME: &str = "index.html";

/// HTTP input, downloaded in full when read
pub struct HttpSource {
    client: Client,
    url: Url,
    entry_name: String,
    transferred_bytes: AtomicU64,
    max_retry: u32,
}

impl HttpSource {
    /// Create a new HTTP source
    ///
    /// Nothing is requested until [`Source::read_all`] is called
    pub fn new(url: &str) -> Result<Self> {
        let url = Url::parse(url).map_err(|e| anyhow!("invalid URL {url}: {e}"))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("unsupported URL scheme: {}", url.scheme());
        }

        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        let entry_name = entry_name_for(&url);

        Ok(Self {
            client,
            url,
            entry_name,
            transferred_bytes: AtomicU64::new(0),
            max_retry: 10,
        })
    }

    /// Get total bytes transferred from network
    pub fn transferred_bytes(&self) -> u64 {
        self.transferred_bytes.load(Ordering::Relaxed)
    }
}

fn entry_name_for(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|s| !s.is_empty())
        .unwrap_or(FALLBACK_NAME)
        .to_string()
}

#[async_trait]
impl Source for HttpSource {
    async fn read_all(&self) -> Result<Vec<u8>> {
        let mut retry_count = 0;

        loop {
            let result = self.client.get(self.url.clone()).send().await;

            match result {
                Ok(resp) => {
                    if !resp.status().is_success() {
                        bail!("HTTP request failed with status: {}", resp.status());
                    }

                    let bytes = resp.bytes().await?;
                    self.transferred_bytes
                        .fetch_add(bytes.len() as u64, Ordering::Relaxed);
                    return Ok(bytes.to_vec());
                }
                Err(e) if e.is_timeout() || e.is_connect() => {
                    retry_count += 1;
                    if retry_count >= self.max_retry {
                        bail!("Max retries exceeded");
                    }
                    warn!(
                        url = %self.url,
                        "connection error, retry {}/{}: {}",
                        retry_count, self.max_retry, e
                    );
                    tokio::time::sleep(Duration::from_millis(500 * retry_count as u64)).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn entry_name(&self) -> &str {
        &self.entry_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_from_last_segment() {
        let source = HttpSource::new("https://example.com/files/report.pdf?x=1")
            .expect("valid URL");
        assert_eq!(source.entry_name(), "report.pdf");

        let source = HttpSource::new("http://example.com/").expect("valid URL");
        assert_eq!(source.entry_name(), FALLBACK_NAME);
    }

    #[test]
    fn rejects_other_schemes() {
        assert!(HttpSource::new("ftp://example.com/a.txt").is_err());
        assert!(HttpSource::new("not a url").is_err());
    }
}
