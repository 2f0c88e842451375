use std::path::Path;

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::models::{RecordDocument, UploadedFile, UserError};

const MAX_FILENAME_LEN: usize = 100;

/// Strips path components and anything outside `[A-Za-z0-9._-]`.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|&c| c != '/' && c != '\\' && c != '\0')
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.replace("..", "");
    let cleaned: String = cleaned.chars().take(MAX_FILENAME_LEN).collect();

    if cleaned.trim_matches('.').is_empty() {
        "document".to_string()
    } else {
        cleaned
    }
}

/// Writes `file` under `upload_dir` with a collision-free name and returns the
/// descriptor to append to the record.
pub async fn store_upload(upload_dir: &str, file: UploadedFile) -> Result<RecordDocument, UserError> {
    tokio::fs::create_dir_all(upload_dir).await?;

    let stored_name = format!("{}-{}", Uuid::new_v4(), sanitize_filename(&file.filename));
    let path = Path::new(upload_dir).join(stored_name);
    tokio::fs::write(&path, &file.bytes).await?;

    debug!("Stored {} bytes at {}", file.bytes.len(), path.display());

    Ok(RecordDocument {
        filename: file.filename,
        path: path.to_string_lossy().into_owned(),
        upload_date: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("scan-2024.pdf"), "scan-2024.pdf");
        assert_eq!(sanitize_filename("my file (1).jpg"), "my_file__1_.jpg");
        assert_eq!(sanitize_filename("../../etc/passwd"), "etcpasswd");
        assert_eq!(sanitize_filename(""), "document");
        assert_eq!(sanitize_filename(".."), "document");
        assert_eq!(sanitize_filename(&"a".repeat(300)).len(), MAX_FILENAME_LEN);
    }

    #[tokio::test]
    async fn test_store_upload_writes_unique_files() {
        let dir = tempfile::tempdir().unwrap();
        let upload_dir = dir.path().join("uploads");
        let upload_dir = upload_dir.to_str().unwrap();

        let first = store_upload(upload_dir, UploadedFile { filename: "x-ray.png".into(), bytes: b"one".to_vec() })
            .await
            .unwrap();
        let second = store_upload(upload_dir, UploadedFile { filename: "x-ray.png".into(), bytes: b"two".to_vec() })
            .await
            .unwrap();

        assert_eq!(first.filename, "x-ray.png");
        assert_ne!(first.path, second.path);
        assert_eq!(tokio::fs::read(&first.path).await.unwrap(), b"one");
        assert!(first.path.ends_with("-x-ray.png"));
    }
}
