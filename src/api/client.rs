use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT},
    multipart::{Form, Part},
    Client,
};

use super::traits::GalleryApi;
use super::types::{
    ensure_ok, parse_created_gallery, parse_uploaded_image, CreatedGallery, ImageUpload,
    UploadedImage,
};
use crate::app::ApiConfig;
use crate::constants::{ACCEPT_JSON, GALLERIES_ENDPOINT, IMAGES_ENDPOINT, IMAGE_FIELD};
use crate::utils::{log_debug, PixupError, Result};

/// pixhost API client over reqwest
pub struct PixhostClient {
    client: Client,
    base_url: String,
}

impl PixhostClient {
    /// Build a client from the `[api]` config section
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_JSON));

        let mut builder = Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.clone());

        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| PixupError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send and hand back status plus body; the typed parsing lives in `types`
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<(u16, String)> {
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        log_debug(format!("HTTP {} ({} bytes)", status, body.len()));
        Ok((status, body))
    }
}

#[async_trait]
impl GalleryApi for PixhostClient {
    async fn create_gallery(&self, name: &str) -> Result<CreatedGallery> {
        let request = self
            .client
            .post(self.url(GALLERIES_ENDPOINT))
            .form(&[("gallery_name", name)]);

        let (status, body) = self.send(request).await?;
        parse_created_gallery(status, &body)
    }

    async fn upload_image(&self, upload: ImageUpload) -> Result<UploadedImage> {
        let part = Part::bytes(upload.bytes).file_name(upload.file_name);
        let form = Form::new()
            .part(IMAGE_FIELD, part)
            .text("content_type", upload.content_type)
            .text("gallery_hash", upload.gallery_hash)
            .text("gallery_upload_hash", upload.gallery_upload_hash)
            .text("max_th_size", upload.max_th_size);

        let request = self.client.post(self.url(IMAGES_ENDPOINT)).multipart(form);

        let (status, body) = self.send(request).await?;
        parse_uploaded_image(status, &body)
    }

    async fn finalize_gallery(&self, gallery_hash: &str, upload_hash: &str) -> Result<()> {
        let path = format!("{}/{}/finalize", GALLERIES_ENDPOINT, gallery_hash);
        let request = self
            .client
            .post(self.url(&path))
            .form(&[("gallery_upload_hash", upload_hash)]);

        let (status, _) = self.send(request).await?;
        ensure_ok("finalize gallery", status)
    }
}
