use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use super::BlobStore;
use crate::error::UploadError;

const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

/// Attempts at finding a free object name before giving up.
const MAX_NAME_ATTEMPTS: u32 = 100;

/// A public bucket backed by a local directory.
///
/// Objects are written under `root` and addressed as `{public_base_url}/{name}`;
/// the HTTP layer serves the same directory at that base.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl FsBlobStore {
    pub async fn open(
        root: impl Into<PathBuf>,
        public_base_url: &str,
    ) -> Result<Self, UploadError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        info!("Blob bucket ready at {}", root.display());
        Ok(Self {
            root,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn check_type(mime_type: &str, name: &str) -> Result<(), UploadError> {
        let extension = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if !mime_type.starts_with("image/") || !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(UploadError::UnsupportedType(format!("{mime_type} ({name})")));
        }
        Ok(())
    }

    /// `name` on the first attempt, then `{stem}_{n}.{ext}` from `n = 2`.
    fn candidate_name(name: &str, attempt: u32) -> String {
        if attempt <= 1 {
            return name.to_string();
        }
        match name.rsplit_once('.') {
            Some((stem, ext)) => format!("{stem}_{attempt}.{ext}"),
            None => format!("{name}_{attempt}"),
        }
    }

    /// Writes into a freshly created file, never over an existing object.
    async fn write_new(
        &self,
        suggested_name: &str,
        bytes: &[u8],
    ) -> Result<String, UploadError> {
        for attempt in 1..=MAX_NAME_ATTEMPTS {
            let name = Self::candidate_name(suggested_name, attempt);
            let path = self.root.join(&name);
            let mut file = match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            };
            file.write_all(bytes).await?;
            file.flush().await?;
            debug!(path = %path.display(), size = bytes.len(), "Stored blob");
            return Ok(name);
        }
        Err(std::io::Error::new(
            ErrorKind::AlreadyExists,
            format!("no free object name for {suggested_name}"),
        )
        .into())
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn upload_image(
        &self,
        bytes: &[u8],
        mime_type: &str,
        suggested_name: &str,
    ) -> Result<String, UploadError> {
        if bytes.is_empty() {
            return Err(UploadError::Empty);
        }
        Self::check_type(mime_type, suggested_name)?;

        let name = self.write_new(suggested_name, bytes).await?;
        Ok(format!("{}/{}", self.public_base_url, name))
    }
}
