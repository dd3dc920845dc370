use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::utils::{PixupError, Result};

/// Body of a successful `POST /galleries`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedGallery {
    pub gallery_name: String,
    pub gallery_hash: String,
    pub gallery_upload_hash: String,
    pub gallery_url: String,
}

/// Body of a successful `POST /images`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedImage {
    pub show_url: String,
    #[serde(default)]
    pub th_url: Option<String>,
}

/// Everything one multipart image upload carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub gallery_hash: String,
    pub gallery_upload_hash: String,
    pub max_th_size: String,
}

/// Map a raw HTTP exchange to a typed body.
///
/// Anything but 200 is a remote error; a 200 whose body does not decode is a
/// protocol error.
pub fn parse_json_body<T: DeserializeOwned>(
    operation: &'static str,
    status: u16,
    body: &str,
) -> Result<T> {
    ensure_ok(operation, status)?;
    serde_json::from_str(body).map_err(|e| PixupError::ProtocolError {
        operation,
        reason: e.to_string(),
    })
}

pub fn ensure_ok(operation: &'static str, status: u16) -> Result<()> {
    if status != 200 {
        return Err(PixupError::RemoteError { operation, status });
    }
    Ok(())
}

pub fn parse_created_gallery(status: u16, body: &str) -> Result<CreatedGallery> {
    let created: CreatedGallery = parse_json_body("create gallery", status, body)?;
    if created.gallery_hash.is_empty() || created.gallery_upload_hash.is_empty() {
        return Err(PixupError::ProtocolError {
            operation: "create gallery",
            reason: "response carried an empty gallery hash".to_string(),
        });
    }
    Ok(created)
}

pub fn parse_uploaded_image(status: u16, body: &str) -> Result<UploadedImage> {
    let uploaded: UploadedImage = parse_json_body("upload image", status, body)?;
    if uploaded.show_url.is_empty() {
        return Err(PixupError::ProtocolError {
            operation: "upload image",
            reason: "response carried an empty show_url".to_string(),
        });
    }
    Ok(uploaded)
}
