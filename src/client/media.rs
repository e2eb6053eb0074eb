//! Media: upload, lookup, download and deletion

use super::{ApiError, ApiResult, SuccessResponse, WhatsAppClient};
use crate::consts::MESSAGING_PRODUCT;
use serde::Deserialize;

/// Response from the media upload API
#[derive(Debug, Deserialize)]
pub struct MediaUploadResponse {
    /// Uploaded media ID
    pub id: String,
}

/// Media metadata with a short-lived download URL
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MediaInfo {
    pub id: String,
    /// Valid for five minutes, needs the bearer token to download
    pub url: String,
    pub mime_type: String,
    pub sha256: String,
    pub file_size: u64,
    pub messaging_product: String,
}

impl WhatsAppClient {
    /// Uploads media (document, image, etc.) and returns its media ID
    ///
    /// # Arguments
    /// * `file_bytes` - The file content as bytes
    /// * `mime_type` - MIME type of the file (e.g., "application/pdf", "image/jpeg")
    /// * `filename` - Name of the file
    pub async fn upload_media(
        &self,
        file_bytes: Vec<u8>,
        mime_type: &str,
        filename: &str,
    ) -> ApiResult<String> {
        let file_part = reqwest::multipart::Part::bytes(file_bytes)
            .file_name(filename.to_string())
            .mime_str(mime_type)
            .map_err(|e| ApiError::InvalidMedia(e.to_string()))?;

        let form = reqwest::multipart::Form::new()
            .text("messaging_product", MESSAGING_PRODUCT)
            .text("type", mime_type.to_string())
            .part("file", file_part);

        let upload: MediaUploadResponse = self
            .post_multipart(&self.phone_path("media"), form)
            .await?;

        Ok(upload.id)
    }

    /// Looks up the download URL and metadata of `media_id`
    pub async fn get_media_url(&self, media_id: &str) -> ApiResult<MediaInfo> {
        self.get_json(
            media_id,
            &[("phone_number_id", self.config.phone_number_id.clone())],
        )
        .await
    }

    /// Downloads media from a URL returned by [`get_media_url`](Self::get_media_url)
    pub async fn download_media(&self, url: &str) -> ApiResult<Vec<u8>> {
        let request = self
            .client
            .get(url)
            .bearer_auth(&self.config.access_token);

        let response = self.send_raw(request).await?;

        Ok(response.bytes().await?.to_vec())
    }

    /// Resolves `media_id` and downloads it
    pub async fn download_media_by_id(&self, media_id: &str) -> ApiResult<(MediaInfo, Vec<u8>)> {
        let info = self.get_media_url(media_id).await?;
        let bytes = self.download_media(&info.url).await?;

        Ok((info, bytes))
    }

    pub async fn delete_media(&self, media_id: &str) -> ApiResult<SuccessResponse> {
        self.delete_json(
            media_id,
            &[("phone_number_id", self.config.phone_number_id.clone())],
        )
        .await
    }
}
