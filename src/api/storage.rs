use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use md5::Md5;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tokio::fs::File;
use tokio_util::codec::{BytesCodec, FramedRead};

use crate::api::ObjectStore;
use crate::api::client::GoogleClient;

const STORAGE_HOST: &str = "storage.googleapis.com";
const SIGNING_ALGORITHM: &str = "GOOG4-HMAC-SHA256";

type HmacSha256 = Hmac<Sha256>;

/// Error document returned by the storage XML API.
#[derive(Debug, thiserror::Error)]
#[error("{code} (HTTP {status}): {message}")]
pub struct StorageError {
    pub status: u16,
    pub code: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StorageErrorBody {
    code: String,
    #[serde(default)]
    message: String,
}

impl StorageError {
    /// Parse an `<Error><Code/><Message/></Error>` body, keeping the raw text when it isn't one.
    pub fn from_response(status: u16, body: &str) -> Self {
        match quick_xml::de::from_str::<StorageErrorBody>(body) {
            Ok(parsed) => Self {
                status,
                code: parsed.code,
                message: parsed.message,
            },
            Err(_) => Self {
                status,
                code: "Unknown".to_string(),
                message: body.trim().to_string(),
            },
        }
    }
}

/// HMAC key pair used to issue V4 signed URLs.
#[derive(Clone)]
pub struct UrlSigner {
    pub access_id: String,
    pub secret: String,
}

impl UrlSigner {
    /// Build a `GET` URL for `bucket/object` valid for `expires` from `now`.
    pub fn sign_get(
        &self,
        bucket: &str,
        object: &str,
        now: DateTime<Utc>,
        expires: Duration,
    ) -> Result<String> {
        let datestamp = now.format("%Y%m%d").to_string();
        let timestamp = now.format("%Y%m%dT%H%M%SZ").to_string();
        let scope = format!("{}/auto/storage/goog4_request", datestamp);
        let credential = format!("{}/{}", self.access_id, scope);

        let path = format!("/{}/{}", bucket, percent_encode(object, true));
        let query = [
            ("X-Goog-Algorithm", SIGNING_ALGORITHM.to_string()),
            ("X-Goog-Credential", credential),
            ("X-Goog-Date", timestamp.clone()),
            ("X-Goog-Expires", expires.as_secs().to_string()),
            ("X-Goog-SignedHeaders", "host".to_string()),
        ]
        .iter()
        .map(|(k, v)| format!("{}={}", k, percent_encode(v, false)))
        .collect::<Vec<_>>()
        .join("&");

        let canonical_request = format!(
            "GET\n{}\n{}\nhost:{}\n\nhost\nUNSIGNED-PAYLOAD",
            path, query, STORAGE_HOST
        );
        let string_to_sign = format!(
            "{}\n{}\n{}\n{}",
            SIGNING_ALGORITHM,
            timestamp,
            scope,
            hex::encode(Sha256::digest(canonical_request.as_bytes()))
        );

        let mut key = hmac_sha256(format!("GOOG4{}", self.secret).as_bytes(), &datestamp)?;
        for part in ["auto", "storage", "goog4_request"] {
            key = hmac_sha256(&key, part)?;
        }
        let signature = hex::encode(hmac_sha256(&key, &string_to_sign)?);

        Ok(format!(
            "https://{}{}?{}&X-Goog-Signature={}",
            STORAGE_HOST, path, query, signature
        ))
    }
}

fn hmac_sha256(key: &[u8], data: &str) -> Result<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|_| anyhow!("Invalid HMAC key"))?;
    mac.update(data.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

/// RFC 3986 percent-encoding; `/` survives only in object paths.
fn percent_encode(s: &str, keep_slash: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            b'/' if keep_slash => out.push('/'),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Objects are staged in one bucket and addressed by file name.
pub struct StorageClient {
    pub client: GoogleClient,
    pub bucket: String,
    pub signer: UrlSigner,
}

impl StorageClient {
    pub fn new(client: GoogleClient, bucket: &str, signer: UrlSigner) -> Self {
        Self {
            client,
            bucket: bucket.to_string(),
            signer,
        }
    }

    fn object_url(&self, name: &str) -> String {
        format!(
            "https://{}/{}/{}",
            STORAGE_HOST,
            self.bucket,
            percent_encode(name, true)
        )
    }
}

impl ObjectStore for StorageClient {
    /// Upload a local file as `name`, with retries on server errors.
    async fn upload_object(&self, name: &str, path: &Path) -> Result<()> {
        let url = self.object_url(name);

        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let md5 = STANDARD.encode(Md5::digest(&bytes));
        let file_size = bytes.len() as u64;
        drop(bytes);

        let max_attempts = 3;
        for attempt in 1..=max_attempts {
            let file = File::open(path)
                .await
                .with_context(|| format!("Failed to open {}", path.display()))?;

            let stream = FramedRead::new(file, BytesCodec::new());
            let body = reqwest::Body::wrap_stream(stream);

            let resp = self
                .client
                .http
                .put(&url)
                .bearer_auth(&self.client.token)
                .header(CONTENT_TYPE, content_type_for(path))
                .header(CONTENT_LENGTH, file_size)
                .header("x-goog-hash", format!("md5={}", md5))
                .body(body)
                .send()
                .await
                .with_context(|| format!("Failed to upload {}", name))?;

            if resp.status().is_success() {
                return Ok(());
            }

            let status = resp.status();
            let resp_body = resp.text().await.unwrap_or_default();

            if attempt < max_attempts && status.is_server_error() {
                log::warn!(
                    "Upload attempt {}/{} for {} failed (HTTP {}), retrying in 10s...",
                    attempt,
                    max_attempts,
                    name,
                    status
                );
                tokio::time::sleep(Duration::from_secs(10)).await;
            } else {
                return Err(StorageError::from_response(status.as_u16(), &resp_body))
                    .with_context(|| format!("Failed to upload {}", name));
            }
        }

        bail!("Failed to upload {} after {} attempts", name, max_attempts)
    }

    fn signed_url(&self, name: &str, expires: Duration) -> Result<String> {
        self.signer.sign_get(&self.bucket, name, Utc::now(), expires)
    }

    async fn delete_object(&self, name: &str) -> Result<()> {
        let resp = self
            .client
            .http
            .delete(self.object_url(name))
            .bearer_auth(&self.client.token)
            .send()
            .await
            .with_context(|| format!("Failed to delete {}", name))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(StorageError::from_response(status.as_u16(), &body))
                .with_context(|| format!("Failed to delete {}", name));
        }

        Ok(())
    }
}
