use crate::config::OutputFormat;
use crate::domain::model::Payload;
use crate::domain::ports::{ObjectStore, Publish};
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

/// POSTs the payload as JSON. Only `201 Created` counts as delivered.
pub struct HttpPublisher {
    client: Client,
    endpoint: String,
}

impl HttpPublisher {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(Client::new(), endpoint)
    }

    pub fn with_client(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl Publish for HttpPublisher {
    async fn publish(&self, payload: &Payload) -> Result<String> {
        let body = payload.to_json()?;
        tracing::info!(endpoint = %self.endpoint, records = payload.len(), "posting data to API");

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| EtlError::PublishError {
                status: None,
                body: e.to_string(),
                source: Some(e),
            })?;

        let status = response.status();
        if status != StatusCode::CREATED {
            let body = response.text().await.unwrap_or_default();
            return Err(EtlError::PublishError {
                status: Some(status.as_u16()),
                body,
                source: None,
            });
        }

        tracing::info!(status = status.as_u16(), "request successful: data posted");
        Ok(self.endpoint.clone())
    }
}

#[derive(Debug, Clone)]
pub struct BucketTarget {
    pub bucket: String,
    pub region: String,
    pub key_prefix: String,
}

impl BucketTarget {
    pub fn object_key(&self, file_name: &str) -> String {
        let prefix = self.key_prefix.trim_matches('/');
        if prefix.is_empty() {
            file_name.to_string()
        } else {
            format!("{}/{}", prefix, file_name)
        }
    }
}

/// Writes the payload under the output folder, then uploads the file when a bucket is set.
pub struct StoragePublisher<O: ObjectStore> {
    output_dir: PathBuf,
    file_stem: String,
    format: Option<OutputFormat>,
    upload: Option<(O, BucketTarget)>,
    sequence: AtomicU64,
}

impl<O: ObjectStore> StoragePublisher<O> {
    pub fn new(output_dir: impl Into<PathBuf>, file_stem: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            file_stem: file_stem.into(),
            format: None,
            upload: None,
            sequence: AtomicU64::new(0),
        }
    }

    /// Overrides the per-payload default (JSON for customers, CSV for the report).
    pub fn with_format(mut self, format: Option<OutputFormat>) -> Self {
        self.format = format;
        self
    }

    pub fn with_upload(mut self, store: O, target: BucketTarget) -> Self {
        self.upload = Some((store, target));
        self
    }

    fn format_for(&self, payload: &Payload) -> OutputFormat {
        self.format.unwrap_or(match payload {
            Payload::Customers(_) => OutputFormat::Json,
            Payload::TopCustomers(_) => OutputFormat::Csv,
        })
    }

    /// `<stem>_<YYYYmmdd-HHMMSS>-<millis>-<seq>.<ext>`; the sequence keeps runs through one
    /// publisher apart even within the same millisecond.
    fn file_name(&self, format: OutputFormat) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!(
            "{}_{}-{}.{}",
            self.file_stem,
            chrono::Local::now().format("%Y%m%d-%H%M%S-%3f"),
            seq,
            format.extension()
        )
    }

    async fn upload_file(
        &self,
        store: &O,
        target: &BucketTarget,
        key: &str,
        data: Vec<u8>,
    ) -> Result<()> {
        if !store.bucket_exists(&target.bucket).await? {
            tracing::info!(bucket = %target.bucket, region = %target.region, "creating bucket");
            store.create_bucket(&target.bucket, &target.region).await?;
        }
        store.put_object(&target.bucket, key, data).await
    }
}

fn storage_error(err: EtlError) -> EtlError {
    match err {
        EtlError::StorageError { .. } => err,
        other => EtlError::StorageError {
            message: other.to_string(),
        },
    }
}

#[async_trait]
impl<O: ObjectStore> Publish for StoragePublisher<O> {
    async fn publish(&self, payload: &Payload) -> Result<String> {
        let format = self.format_for(payload);
        let data = match format {
            OutputFormat::Json => payload.to_json()?,
            OutputFormat::Csv => payload.to_csv()?,
        };

        let file_name = self.file_name(format);
        let local_path = self.output_dir.join(&file_name);

        if !self.output_dir.exists() {
            tracing::info!(path = %self.output_dir.display(), "creating output folder");
        }
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| EtlError::StorageError {
                message: format!("cannot create {}: {}", self.output_dir.display(), e),
            })?;
        tokio::fs::write(&local_path, &data)
            .await
            .map_err(|e| EtlError::StorageError {
                message: format!("cannot write {}: {}", local_path.display(), e),
            })?;
        tracing::info!(
            path = %local_path.display(),
            records = payload.len(),
            "data written to local file"
        );

        let Some((store, target)) = &self.upload else {
            return Ok(local_path.display().to_string());
        };

        let key = target.object_key(&file_name);
        self.upload_file(store, target, &key, data)
            .await
            .map_err(storage_error)?;

        let destination = format!("s3://{}/{}", target.bucket, key);
        tracing::info!(destination = %destination, "file uploaded");
        Ok(destination)
    }
}

/// The configured destination of a run.
pub enum Sink<O: ObjectStore> {
    Http(HttpPublisher),
    Storage(StoragePublisher<O>),
}

#[async_trait]
impl<O: ObjectStore> Publish for Sink<O> {
    async fn publish(&self, payload: &Payload) -> Result<String> {
        match self {
            Sink::Http(publisher) => publisher.publish(payload).await,
            Sink::Storage(publisher) => publisher.publish(payload).await,
        }
    }
}
