use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use super::error::StorageError;
use super::image::{blob_name_from_ref, check_image, generate_blob_stem};
use super::traits::{BlobEntry, BlobStore, ImageUpload, StorageKind, StoredBlob};
use crate::config::CloudinaryConfig;

/// Cloudinary-backed image store.
///
/// Uploads are signed with SHA-256 and land in a fixed folder under an
/// explicit `public_id`, so the id can be recovered from the returned URL for
/// deletion. The remote folder is not enumerated.
pub struct CloudinaryStore {
    client: reqwest::Client,
    config: CloudinaryConfig,
    max_size: u64,
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
    #[serde(default)]
    bytes: Option<u64>,
}

#[derive(Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

impl CloudinaryStore {
    pub fn new(config: CloudinaryConfig, max_size: u64) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            max_size,
        }
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/{}/image/{action}",
            self.config.api_base.trim_end_matches('/'),
            self.config.cloud_name
        )
    }

    fn ensure_credentials(&self) -> Result<(), StorageError> {
        let missing = self.config.missing_credentials();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(StorageError::Provider(format!(
                "Cloudinary credentials are not configured (missing {})",
                missing.join(", ")
            )))
        }
    }

    /// Append `api_key` and the signature over `params` to the form.
    fn signed_form(&self, mut params: Vec<(&'static str, String)>) -> Vec<(&'static str, String)> {
        let signature = sign(&params, &self.config.api_secret);
        params.push(("api_key", self.config.api_key.clone()));
        params.push(("signature", signature));
        params.push(("signature_algorithm", "sha256".into()));
        params
    }

    async fn post_form<T: for<'de> Deserialize<'de>>(
        &self,
        action: &str,
        form: &[(&'static str, String)],
    ) -> Result<T, StorageError> {
        let res = self
            .client
            .post(self.endpoint(action))
            .form(form)
            .send()
            .await
            .map_err(|e| StorageError::Provider(format!("{action} request failed: {e}")))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(StorageError::Provider(format!(
                "{action} returned {status}: {message}"
            )));
        }

        res.json::<T>()
            .await
            .map_err(|e| StorageError::Provider(format!("invalid {action} response: {e}")))
    }
}

/// Cloudinary request signature: SHA-256 over the `&`-joined, key-sorted
/// `key=value` pairs followed by the API secret, hex encoded.
pub fn sign(params: &[(&str, String)], api_secret: &str) -> String {
    let mut sorted: Vec<_> = params
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Recover the `public_id` (folder included, extension and version dropped)
/// from a Cloudinary delivery URL.
pub fn public_id_from_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next()?;
    let (_, after) = path.split_once("/upload/")?;

    let mut segments: Vec<&str> = after.split('/').filter(|s| !s.is_empty()).collect();
    if segments
        .first()
        .is_some_and(|s| s.len() > 1 && s.starts_with('v') && s[1..].chars().all(|c| c.is_ascii_digit()))
    {
        segments.remove(0);
    }

    let last = segments.pop()?;
    let stem = last.rsplit_once('.').map_or(last, |(stem, _)| stem);
    if stem.is_empty() {
        return None;
    }
    segments.push(stem);
    Some(segments.join("/"))
}

#[async_trait]
impl BlobStore for CloudinaryStore {
    fn kind(&self) -> StorageKind {
        StorageKind::Cloudinary
    }

    async fn put(&self, upload: ImageUpload<'_>) -> Result<StoredBlob, StorageError> {
        let ext = check_image(&upload, self.max_size)?;
        self.ensure_credentials()?;

        let mime = mime_guess::from_ext(&ext).first_or_octet_stream();
        let data_uri = format!("data:{};base64,{}", mime.essence_str(), STANDARD.encode(upload.data));

        let params = vec![
            ("folder", self.config.folder.clone()),
            ("public_id", generate_blob_stem()),
            ("timestamp", Utc::now().timestamp().to_string()),
        ];
        let mut form = self.signed_form(params);
        form.push(("file", data_uri));

        let uploaded: UploadResponse = self.post_form("upload", &form).await?;
        let name = blob_name_from_ref(&uploaded.secure_url)
            .ok_or_else(|| StorageError::Provider(format!(
                "upload returned an unusable URL: {}",
                uploaded.secure_url
            )))?
            .to_string();

        debug!(url = %uploaded.secure_url, "Stored image on Cloudinary");

        Ok(StoredBlob {
            name,
            size: uploaded.bytes.unwrap_or(upload.data.len() as u64),
            image_ref: uploaded.secure_url,
        })
    }

    async fn list(&self) -> Result<Option<Vec<BlobEntry>>, StorageError> {
        Ok(None)
    }

    async fn delete(&self, image_ref: &str) -> Result<bool, StorageError> {
        let public_id = public_id_from_url(image_ref)
            .ok_or_else(|| StorageError::InvalidReference(image_ref.to_string()))?;
        self.ensure_credentials()?;

        let form = self.signed_form(vec![
            ("public_id", public_id),
            ("timestamp", Utc::now().timestamp().to_string()),
        ]);
        let destroyed: DestroyResponse = self.post_form("destroy", &form).await?;

        match destroyed.result.as_str() {
            "ok" => Ok(true),
            "not found" => Ok(false),
            other => Err(StorageError::Provider(format!("destroy returned '{other}'"))),
        }
    }
}
