//! services/api/src/uploads.rs
//!
//! Disk persistence for multipart uploads. Each upload kind gets its own
//! folder under the configured upload root, and stored files are prefixed
//! with a millisecond timestamp so repeated uploads of the same name never
//! collide.

use std::io;
use std::path::Path;

use chrono::Utc;

/// What is being uploaded; decides the destination folder.
#[derive(Debug, Clone, Copy)]
pub enum UploadKind {
    PetImage,
    UserDocument,
}

impl UploadKind {
    fn folder(&self) -> &'static str {
        match self {
            UploadKind::PetImage => "pets",
            UploadKind::UserDocument => "documents",
        }
    }
}

/// A stored upload: the original (sanitized) name and the path it lives at.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub name: String,
    pub path: String,
}

/// Keeps the filename filesystem-safe without losing the extension.
fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

/// Writes the bytes under `<root>/<kind folder>/<timestamp>-<name>` and
/// returns the stored location. The destination folder is created on demand.
pub async fn save_upload(
    root: &Path,
    kind: UploadKind,
    original_name: &str,
    data: &[u8],
) -> io::Result<StoredFile> {
    let folder = root.join(kind.folder());
    tokio::fs::create_dir_all(&folder).await?;

    let name = sanitize_filename(original_name);
    let filename = format!("{}-{}", Utc::now().timestamp_millis(), name);
    let destination = folder.join(&filename);
    tokio::fs::write(&destination, data).await?;

    Ok(StoredFile {
        name,
        path: destination.to_string_lossy().into_owned(),
    })
}
