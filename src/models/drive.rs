use serde::{Deserialize, Serialize};

pub const FOLDER_MIME: &str = "application/vnd.google-apps.folder";
pub const PRESENTATION_MIME: &str = "application/vnd.google-apps.presentation";

/// What a `files.create` call should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Folder,
    Presentation,
}

impl FileKind {
    pub fn mime_type(self) -> &'static str {
        match self {
            FileKind::Folder => FOLDER_MIME,
            FileKind::Presentation => PRESENTATION_MIME,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileList {
    #[serde(default)]
    pub files: Vec<DriveFile>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct DriveFile {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFileRequest {
    pub name: String,
    pub mime_type: String,
    pub parents: Vec<String>,
}

impl CreateFileRequest {
    pub fn in_parent(parent_id: &str, name: &str, kind: FileKind) -> Self {
        Self {
            name: name.to_string(),
            mime_type: kind.mime_type().to_string(),
            parents: vec![parent_id.to_string()],
        }
    }
}

/// Drive query matching a non-trashed folder with exactly this name.
pub fn folder_query(name: &str) -> String {
    format!(
        "name='{}' and mimeType='{}' and trashed=false",
        escape_query_value(name),
        FOLDER_MIME
    )
}

/// Backslash-escape `\` and `'` inside a quoted Drive query string.
fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}
