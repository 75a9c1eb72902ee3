use std::path::Path;

use async_trait::async_trait;
use sparkit_core::{CollaboratorError, ObjectStore};
use sparkit_model::{ObjectKey, UrlScheme};
use tracing::info;

use crate::{cli::DcosCli, errors::DcosError};

const WHO: &str = "object store";

/// S3 bucket driven through the `aws` CLI. Objects are public-read so drivers
/// can fetch them over plain http.
#[derive(Clone)]
pub struct S3ObjectStore {
    cli: DcosCli,
}

impl S3ObjectStore {
    pub fn new(cli: DcosCli) -> Self {
        Self { cli }
    }

    /// `<prefix>/<key>`, or just `key` without a prefix.
    fn object_path(&self, key: &str) -> String {
        let prefix = &self.cli.config().prefix;
        if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{prefix}/{key}")
        }
    }

    fn s3_uri(&self, key: &str) -> String {
        format!("s3://{}/{}", self.cli.config().bucket, self.object_path(key))
    }

    async fn ls(&self, prefix: &str) -> Result<Vec<ObjectKey>, DcosError> {
        let cmd = self
            .cli
            .aws(["s3".to_string(), "ls".to_string(), "--recursive".to_string(), self.s3_uri(prefix)])
            .allow_non_zero();
        let out = self.cli.exec(&cmd).await?;

        // `aws s3 ls` exits 1 with nothing on stderr when no key matches.
        match out.code {
            Some(0) => {}
            Some(1) if out.stderr.trim().is_empty() => return Ok(Vec::new()),
            code => {
                let reason = out.stderr.trim();
                return Err(DcosError::Rejected(if reason.is_empty() {
                    format!("aws s3 ls exited with {code:?}")
                } else {
                    reason.to_string()
                }));
            }
        }

        let store_prefix = self.object_path("");
        Ok(out
            .stdout
            .lines()
            .filter_map(|line| line.split_whitespace().last())
            .map(|path| path.strip_prefix(store_prefix.as_str()).unwrap_or(path).to_string())
            .collect())
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn upload(&self, path: &Path) -> Result<ObjectKey, CollaboratorError> {
        let key = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| CollaboratorError::new(WHO, format!("no file name in {}", path.display())))?;

        let cmd = self.cli.aws([
            "s3".to_string(),
            "cp".to_string(),
            path.display().to_string(),
            self.s3_uri(&key),
            "--acl".to_string(),
            "public-read".to_string(),
        ]);
        self.cli.stdout(&cmd).await.map_err(|e| e.by(WHO))?;

        info!(target: "sparkit.dcos.s3", %key, bucket = %self.cli.config().bucket, "uploaded");
        Ok(key)
    }

    async fn list(&self, prefix: &str) -> Result<Vec<ObjectKey>, CollaboratorError> {
        self.ls(prefix).await.map_err(|e| e.by(WHO))
    }

    fn url_for(&self, key: &str, scheme: UrlScheme) -> String {
        let bucket = &self.cli.config().bucket;
        let path = self.object_path(key);
        match scheme {
            UrlScheme::Http => format!("http://{bucket}.s3.amazonaws.com/{path}"),
            UrlScheme::S3n | UrlScheme::S3a => format!("{scheme}://{bucket}/{path}"),
        }
    }
}
