//! Thin clients for the three Google services a guide is built from.
//!
//! The traits below are the seams the guide flow is written against, so the
//! whole call sequence can run against an in-process fake in tests.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;

use crate::models::drive::{CreateFileRequest, DriveFile, FileList};
use crate::models::slides::{BatchUpdateResponse, Presentation, Request};

pub mod auth;
pub mod client;
pub mod drive;
pub mod slides;
pub mod storage;

/// Drive `files` operations.
#[allow(async_fn_in_trait)]
pub trait FileStore {
    async fn list_files(&self, query: &str, page_token: Option<&str>) -> Result<FileList>;

    async fn create_file(&self, request: &CreateFileRequest) -> Result<DriveFile>;
}

/// Slides `presentations` operations.
#[allow(async_fn_in_trait)]
pub trait DeckEditor {
    async fn get_presentation(&self, presentation_id: &str) -> Result<Presentation>;

    async fn batch_update(
        &self,
        presentation_id: &str,
        requests: &[Request],
    ) -> Result<BatchUpdateResponse>;
}

/// Bucket-scoped object staging.
#[allow(async_fn_in_trait)]
pub trait ObjectStore {
    async fn upload_object(&self, name: &str, path: &Path) -> Result<()>;

    fn signed_url(&self, name: &str, expires: Duration) -> Result<String>;

    async fn delete_object(&self, name: &str) -> Result<()>;
}
