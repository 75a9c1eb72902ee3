use std::{path::Path, sync::Arc};

use sparkit_model::UrlScheme;
use tracing::info;

use crate::{api::ObjectStore, error::UploadError};

/// Makes local artifacts (jars, scripts, data files) readable by the cluster.
#[derive(Clone)]
pub struct Uploader {
    store: Arc<dyn ObjectStore>,
}

impl Uploader {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Upload `path` and return the `http` URL drivers fetch it from.
    pub async fn upload(&self, path: impl AsRef<Path>) -> Result<String, UploadError> {
        self.upload_as(path, UrlScheme::Http).await
    }

    /// Upload `path` and return its URL in `scheme`.
    pub async fn upload_as(
        &self,
        path: impl AsRef<Path>,
        scheme: UrlScheme,
    ) -> Result<String, UploadError> {
        let path = path.as_ref();
        if path.file_name().is_none() {
            return Err(UploadError::InvalidPath(path.to_path_buf()));
        }
        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.is_file() => {}
            _ => return Err(UploadError::MissingArtifact(path.to_path_buf())),
        }

        let key = self
            .store
            .upload(path)
            .await
            .map_err(|e| UploadError::Rejected {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let url = self.store.url_for(&key, scheme);
        info!(target: "sparkit.core.upload", path = %path.display(), %url, "artifact uploaded");
        Ok(url)
    }
}
