use async_trait::async_trait;
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, error, info};

use crate::config::StorageConfig;
use crate::error::{Result, StorageError};

/// Something that stores a file and returns its content identifier
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn upload(&self, file_name: &str, content_type: &str, bytes: Vec<u8>) -> Result<String>;

    /// URL the stored file can be opened at
    fn gateway_url(&self, cid: &str) -> String;
}

/// Remove the `ipfs://` scheme, keeping any path after the identifier
pub fn strip_ipfs_scheme(uri: &str) -> &str {
    uri.strip_prefix("ipfs://").unwrap_or(uri)
}

/// `https://<gateway>/ipfs/<cid>`
pub fn gateway_url(gateway: &str, cid: &str) -> String {
    let host = gateway
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/');
    format!("https://{}/ipfs/{}", host, strip_ipfs_scheme(cid))
}

/// Pull the identifier out of a pinning service response
///
/// Pinata answers `{"IpfsHash": …}`, the IPFS HTTP API `{"Hash": …}`, and
/// others `{"cid": …}` or an `ipfs://` URI.
pub fn parse_upload_response(body: &Value) -> Result<String> {
    ["IpfsHash", "Hash", "cid", "uri"]
        .iter()
        .find_map(|key| body.get(*key).and_then(|v| v.as_str()))
        .map(|cid| strip_ipfs_scheme(cid).to_string())
        .filter(|cid| !cid.is_empty())
        .ok_or_else(|| StorageError::InvalidResponse(format!("no content identifier in {}", body)))
}

pub struct IpfsClient {
    config: StorageConfig,
    client: reqwest::Client,
}

impl IpfsClient {
    pub fn new() -> Self {
        Self::with_config(StorageConfig::from_env())
    }

    pub fn with_config(config: StorageConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }
}

impl Default for IpfsClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FileStore for IpfsClient {
    async fn upload(&self, file_name: &str, content_type: &str, bytes: Vec<u8>) -> Result<String> {
        if bytes.is_empty() {
            return Err(StorageError::EmptyFile(file_name.to_string()));
        }

        info!("Uploading {} ({} bytes) to IPFS", file_name, bytes.len());
        let start = Instant::now();

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let mut request = self.client.post(&self.config.upload_url).multipart(form);
        if let Some(jwt) = &self.config.jwt {
            request = request.bearer_auth(jwt);
        }

        let response = request.send().await?;
        debug!("Upload answered in {:?}", start.elapsed());

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!("IPFS upload failed: {} {}", status, message);
            return Err(StorageError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| StorageError::InvalidResponse(e.to_string()))?;
        let cid = parse_upload_response(&body)?;
        info!("Uploaded {} as {}", file_name, cid);
        Ok(cid)
    }

    fn gateway_url(&self, cid: &str) -> String {
        gateway_url(&self.config.gateway, cid)
    }
}
