use crate::common::interface::storage::{BlobStorage, ObjectAcl, PutObjectOptions};
use crate::errors::error::DataStoreError;
use crate::errors::{Error, Result};
use async_trait::async_trait;
use log::debug;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Blob store on the local file system. Objects live at `<root>/<bucket>/<key>`.
pub struct FileBlobStorage {
    base_path: PathBuf,
}

impl FileBlobStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf> {
        check_segment(bucket)?;
        check_segment(key)?;
        Ok(self.base_path.join(bucket).join(key))
    }

    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::from(DataStoreError::SaveFailed(Box::new(e))))?;
        }
        Ok(())
    }
}

/// Keys may contain `/` but must stay below the store root.
fn check_segment(segment: &str) -> Result<()> {
    let path = Path::new(segment);
    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if segment.is_empty() || escapes {
        return Err(DataStoreError::InvalidKey(segment.to_string()).into());
    }
    Ok(())
}

#[cfg(unix)]
async fn apply_acl(path: &Path, acl: ObjectAcl) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mode = match acl {
        ObjectAcl::Private => 0o600,
        ObjectAcl::PublicRead => 0o644,
    };
    fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
        .await
        .map_err(|e| Error::from(DataStoreError::SaveFailed(Box::new(e))))
}

#[cfg(not(unix))]
async fn apply_acl(_path: &Path, _acl: ObjectAcl) -> Result<()> {
    Ok(())
}

#[async_trait]
impl BlobStorage for FileBlobStorage {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        data: &[u8],
        options: &PutObjectOptions,
    ) -> Result<()> {
        if options.content_length != data.len() {
            return Err(DataStoreError::InvalidData(
                format!(
                    "content length {} does not match body length {}",
                    options.content_length,
                    data.len()
                )
                .into(),
            )
            .into());
        }

        let file_path = self.object_path(bucket, key)?;
        self.ensure_dir(&file_path).await?;

        let mut file = fs::File::create(&file_path)
            .await
            .map_err(|e| Error::from(DataStoreError::SaveFailed(Box::new(e))))?;

        file.write_all(data)
            .await
            .map_err(|e| Error::from(DataStoreError::SaveFailed(Box::new(e))))?;

        file.flush()
            .await
            .map_err(|e| Error::from(DataStoreError::SaveFailed(Box::new(e))))?;

        apply_acl(&file_path, options.acl).await?;

        debug!("Offloaded {} bytes to {}", data.len(), file_path.display());
        Ok(())
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let file_path = self.object_path(bucket, key)?;
        let data = fs::read(&file_path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                Error::from(DataStoreError::NotFound(format!("{bucket}/{key}")))
            }
            _ => Error::from(DataStoreError::InvalidData(Box::new(e))),
        })?;
        Ok(data)
    }
}
