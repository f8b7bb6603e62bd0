use anyhow::Result;
use reqwest::{Client, StatusCode, header::CONTENT_TYPE};
use serde::Deserialize;
use tracing::{info, warn};

/// Client for the external photo object store. The store owns the bytes;
/// this adapter uploads, hands back the public URL, and deletes orphans
/// when registration fails after the upload.
pub struct PhotoStore {
    client: Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Deserialize)]
struct UploadedPhoto {
    url: String,
}

impl PhotoStore {
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    pub async fn upload(&self, content_type: &str, bytes: Vec<u8>) -> Result<String> {
        let mut req = self
            .client
            .post(format!("{}/photos", self.base_url))
            .header(CONTENT_TYPE, content_type)
            .body(bytes);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let uploaded: UploadedPhoto = req.send().await?.error_for_status()?.json().await?;
        info!("Stored profile photo at {}", uploaded.url);
        Ok(uploaded.url)
    }

    pub async fn delete(&self, url: &str) -> Result<()> {
        let mut req = self.client.delete(url);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            warn!("Photo {} already gone", url);
            return Ok(());
        }
        resp.error_for_status()?;

        info!("Deleted photo {}", url);
        Ok(())
    }
}
