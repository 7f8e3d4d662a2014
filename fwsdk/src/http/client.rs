//! HTTP client implementation

use std::path::PathBuf;
use std::time::Duration;

use percent_encoding::percent_decode_str;
use reqwest::{header, Client, Response};
use tracing::{debug, error};
use url::Url;

use crate::errors::{Result, SdkError};
use crate::filesys::dir::Dir;

/// Default user agent sent with every request
pub const DEFAULT_USER_AGENT: &str = concat!("fwsdk/", env!("CARGO_PKG_VERSION"));

/// Transport configuration threaded into every loader that talks to the network
#[derive(Debug, Clone)]
pub struct TransportOptions {
    /// Connect and read-idle timeout for every request, and the total
    /// timeout for index documents. Artifact downloads have no total limit.
    pub timeout: Duration,

    /// Verify TLS certificates
    pub verify_certificates: bool,

    /// User-Agent header value
    pub user_agent: String,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            verify_certificates: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// HTTP client for index and artifact downloads
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    timeout: Duration,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(options: &TransportOptions) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(options.timeout)
            .read_timeout(options.timeout)
            .user_agent(options.user_agent.clone())
            .danger_accept_invalid_certs(!options.verify_certificates)
            .build()
            .map_err(|e| SdkError::ConfigError(format!("Unable to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            timeout: options.timeout,
        })
    }

    async fn get(&self, url: &str, total_timeout: Option<Duration>) -> Result<Response> {
        debug!("GET {}", url);

        let mut request = self.client.get(url).header(header::ACCEPT, "*/*");
        if let Some(timeout) = total_timeout {
            request = request.timeout(timeout);
        }
        let response = request
            .send()
            .await
            .map_err(|e| SdkError::transfer(url, e))?;

        if !response.status().is_success() {
            let status = response.status();
            error!("HTTP GET failed: {} - {}", url, status);
            return Err(SdkError::transfer(url, status));
        }

        Ok(response)
    }

    /// Fetch an index document as text, bounded by the total timeout
    pub async fn get_text(&self, url: &str) -> Result<String> {
        let response = self.get(url, Some(self.timeout)).await?;
        response.text().await.map_err(|e| SdkError::transfer(url, e))
    }

    /// Fetch an artifact as raw bytes. Only stalls time out.
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.get(url, None).await?;
        let body = response.bytes().await.map_err(|e| SdkError::transfer(url, e))?;
        Ok(body.to_vec())
    }

    /// Download `url` into `download_dir`, named after the last URL path segment.
    ///
    /// The whole body is buffered before anything is written to disk.
    pub async fn fetch_file(&self, url: &str, download_dir: &Dir) -> Result<PathBuf> {
        let file_name = file_name_from_url(url)?;
        download_dir.create().await?;

        let data = self.get_bytes(url).await?;
        let file = download_dir.file(&file_name);
        file.write_bytes(&data).await?;

        debug!("Saved {} bytes to {}", data.len(), file.path().display());
        Ok(file.path().to_path_buf())
    }
}

/// Last path segment of `url`, percent-decoded
pub fn file_name_from_url(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|e| SdkError::transfer(url, e))?;
    let segment = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default();

    let name = percent_decode_str(segment).decode_utf8_lossy().into_owned();
    if name.is_empty() {
        return Err(SdkError::transfer(url, "URL does not name a file"));
    }
    Ok(name)
}
