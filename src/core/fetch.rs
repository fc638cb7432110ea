use crate::error::{FetchError, Result};
use reqwest::blocking::Client;
use reqwest::Url;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

const USER_AGENT: &str = concat!("cdrfetch/", env!("CARGO_PKG_VERSION"));
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const CHUNK_SIZE: usize = 64 * 1024;

/// Retrieves a remote resource into a local directory.
///
/// Implementations make exactly one attempt; retrying is left to callers.
pub trait Fetch {
    /// Download `url` into `dest_dir`, keeping the remote file name, and
    /// return the path of the written file.
    fn fetch(&self, url: &str, dest_dir: &Path) -> Result<PathBuf>;
}

impl<T: Fetch + ?Sized> Fetch for &T {
    fn fetch(&self, url: &str, dest_dir: &Path) -> Result<PathBuf> {
        (**self).fetch(url, dest_dir)
    }
}

/// File name of the last non-empty path segment of `url`.
pub fn remote_file_name(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|e| FetchError::config_error(format!("invalid URL '{url}': {e}")))?;
    parsed
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(str::to_string)
        .ok_or_else(|| FetchError::config_error(format!("URL '{url}' has no file name")))
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT)
            // Large archives on slow links; only the connect phase is bounded.
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| FetchError::config_error(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str, dest_dir: &Path) -> Result<PathBuf> {
        let file_name = remote_file_name(url)?;
        let destination = dest_dir.join(&file_name);

        tracing::info!(url, "downloading archive");
        let mut response = self
            .client
            .get(url)
            .send()
            .map_err(|e| FetchError::network(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::network(url, format!("server responded with {status}")));
        }

        // Must be read before the body is consumed.
        let expected = response.content_length();

        let mut file = File::create(&destination).map_err(|e| FetchError::disk(&destination, e))?;
        let mut buffer = vec![0u8; CHUNK_SIZE];
        let mut written: u64 = 0;
        loop {
            let read = match response.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(FetchError::network(url, format!("transfer interrupted: {e}"))),
            };
            file.write_all(&buffer[..read])
                .map_err(|e| FetchError::disk(&destination, e))?;
            written += read as u64;
        }
        file.flush().map_err(|e| FetchError::disk(&destination, e))?;

        if let Some(expected) = expected {
            if expected != written {
                return Err(FetchError::network(
                    url,
                    format!("expected {expected} bytes, received {written}"),
                ));
            }
        }

        tracing::debug!(path = %destination.display(), bytes = written, "archive downloaded");
        Ok(destination)
    }
}
