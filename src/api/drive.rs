use anyhow::{Context, Result, bail};

use crate::api::FileStore;
use crate::api::client::GoogleClient;
use crate::models::drive::{CreateFileRequest, DriveFile, FileList};

const DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";

impl FileStore for GoogleClient {
    /// Fetch one page of a `files.list` query.
    async fn list_files(&self, query: &str, page_token: Option<&str>) -> Result<FileList> {
        let mut params = vec![
            ("q", query),
            ("spaces", "drive"),
            ("fields", "nextPageToken,files(id,name,mimeType)"),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        let resp = self
            .http
            .get(DRIVE_FILES_URL)
            .bearer_auth(&self.token)
            .query(&params)
            .send()
            .await
            .context("Failed to list Drive files")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("Failed to list Drive files (HTTP {}): {}", status, body);
        }

        resp.json()
            .await
            .context("Failed to parse Drive file list response")
    }

    async fn create_file(&self, request: &CreateFileRequest) -> Result<DriveFile> {
        let resp = self
            .http
            .post(DRIVE_FILES_URL)
            .bearer_auth(&self.token)
            .query(&[("fields", "id,name,mimeType")])
            .json(request)
            .send()
            .await
            .with_context(|| format!("Failed to create '{}'", request.name))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!(
                "Failed to create '{}' (HTTP {}): {}",
                request.name,
                status,
                body
            );
        }

        resp.json()
            .await
            .context("Failed to parse Drive create response")
    }
}
