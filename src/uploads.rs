//! Profile images on local disk, served back under [`PUBLIC_PREFIX`].

use std::path::{Path, PathBuf};

use chrono::Utc;
use rand::Rng;
use tracing::info;

use crate::{config::UploadsConfig, error::AppError};

pub const PUBLIC_PREFIX: &str = "/uploads";

const ALLOWED_MIME: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/gif"];
const ALLOWED_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "gif"];
const ONLY_IMAGES: &str = "Only image files are allowed (jpeg, jpg, png, gif)";
const MAX_NAME_LEN: usize = 100;

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    max_bytes: usize,
}

impl UploadStore {
    pub fn new(cfg: &UploadsConfig) -> Self {
        Self {
            dir: cfg.dir.clone(),
            max_bytes: cfg.max_bytes,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Rejects anything that is not a small JPEG, PNG or GIF.
    pub fn check(
        &self,
        file_name: Option<&str>,
        content_type: Option<&str>,
        len: usize,
    ) -> Result<(), AppError> {
        if len == 0 {
            return Err(AppError::bad_request("No file uploaded"));
        }
        if len > self.max_bytes {
            return Err(AppError::bad_request(format!(
                "File too large. Maximum size is {}MB",
                self.max_bytes / (1024 * 1024)
            )));
        }

        let mime_ok = content_type
            .map(|mime| ALLOWED_MIME.contains(&mime.trim().to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        let extension_ok = file_name
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(true);
        if !mime_ok || !extension_ok {
            return Err(AppError::bad_request(ONLY_IMAGES));
        }
        Ok(())
    }

    /// Writes the file and returns its public path, `/uploads/<file>`.
    pub async fn save(
        &self,
        file_name: Option<&str>,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<String, AppError> {
        self.check(file_name, content_type, bytes.len())?;

        let stored = stored_name(file_name.unwrap_or("image"));
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|err| AppError::internal(format!("Failed to create upload dir: {err}")))?;
        tokio::fs::write(self.dir.join(&stored), bytes)
            .await
            .map_err(|err| AppError::internal(format!("Failed to store upload: {err}")))?;

        info!(file = %stored, bytes = bytes.len(), "upload stored");
        Ok(format!("{PUBLIC_PREFIX}/{stored}"))
    }
}

/// `{unix millis}-{random}-{sanitized name}`.
fn stored_name(original: &str) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    format!(
        "{}-{suffix}-{}",
        Utc::now().timestamp_millis(),
        sanitize_file_name(original)
    )
}

/// Keeps the last path component and maps anything outside `[A-Za-z0-9._-]`
/// to `_`.
fn sanitize_file_name(original: &str) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        return "image".to_string();
    }

    // keep the extension when truncating
    if cleaned.len() > MAX_NAME_LEN {
        return match cleaned.rsplit_once('.') {
            Some((stem, ext)) if ext.len() < 10 => {
                let keep = MAX_NAME_LEN.saturating_sub(ext.len() + 1);
                format!("{}.{ext}", &stem[..keep.min(stem.len())])
            }
            _ => cleaned[..MAX_NAME_LEN].to_string(),
        };
    }
    cleaned.to_string()
}
