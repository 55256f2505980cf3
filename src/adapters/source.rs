use crate::domain::ports::{ByteSource, ObjectStore};
use crate::utils::error::{EtlError, Result};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LocalFileSource {
    path: PathBuf,
}

impl LocalFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Relative inputs are looked up inside the output folder.
    pub fn resolve(base_dir: impl AsRef<Path>, input: impl AsRef<Path>) -> Self {
        let input = input.as_ref();
        if input.is_absolute() {
            Self::new(input)
        } else {
            Self::new(base_dir.as_ref().join(input))
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteSource for LocalFileSource {
    async fn read(&self) -> Result<Vec<u8>> {
        tokio::fs::read(&self.path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => EtlError::NotFoundError {
                path: self.path.display().to_string(),
            },
            _ => EtlError::IoError(e),
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

pub struct ObjectSource<'a, O: ObjectStore> {
    store: &'a O,
    bucket: String,
    key: String,
}

impl<'a, O: ObjectStore> ObjectSource<'a, O> {
    pub fn new(store: &'a O, bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl<O: ObjectStore> ByteSource for ObjectSource<'_, O> {
    async fn read(&self) -> Result<Vec<u8>> {
        self.store.get_object(&self.bucket, &self.key).await
    }

    fn describe(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.key)
    }
}
