//! Turns an [`AppConfig`] into sources and sinks for the engine.

use crate::adapters::source::{LocalFileSource, ObjectSource};
use crate::config::{AppConfig, AwsConfig};
use crate::core::etl::EtlEngine;
use crate::core::publish::{BucketTarget, HttpPublisher, Sink, StoragePublisher};
use crate::domain::model::PipelineOutcome;
use crate::domain::ports::{Connector, ObjectStore, Publish};
use crate::event::S3Event;
use crate::utils::error::{EtlError, Result};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum SourceKind {
    /// Read the id file from the local filesystem
    Local,
    /// Read the id file from the configured bucket
    S3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum SinkKind {
    /// POST the records to the configured API
    Http,
    /// Write a file to the output folder and upload it to the bucket
    Storage,
}

pub fn bucket_target(aws: &AwsConfig) -> BucketTarget {
    BucketTarget {
        bucket: aws.bucket_name.clone(),
        region: aws.region.clone(),
        key_prefix: aws.key_prefix.clone(),
    }
}

/// Sink for the customer lookup flow.
pub fn lookup_sink<O: ObjectStore>(config: &AppConfig, kind: SinkKind, store: O) -> Result<Sink<O>> {
    match kind {
        SinkKind::Http => Ok(Sink::Http(HttpPublisher::new(config.api_url()?))),
        SinkKind::Storage => {
            let aws = config.aws()?;
            Ok(Sink::Storage(
                StoragePublisher::new(&config.output.folder, "customers")
                    .with_format(config.output.format)
                    .with_upload(store, bucket_target(aws)),
            ))
        }
    }
}

/// Publisher for the top customers report. Stays local when no bucket is configured.
pub fn report_publisher<O: ObjectStore>(config: &AppConfig, store: Option<O>) -> StoragePublisher<O> {
    let publisher = StoragePublisher::new(
        &config.output.folder,
        format!("top_{}_customers", config.report.limit),
    )
    .with_format(config.output.format);

    match (store, &config.aws) {
        (Some(store), Some(aws)) => publisher.with_upload(store, bucket_target(aws)),
        _ => publisher,
    }
}

/// Resolves the id source and runs one lookup. Errors here mean the run never started.
pub async fn run_lookup<C, P, O>(
    engine: &EtlEngine<C, P>,
    config: &AppConfig,
    source: SourceKind,
    input: Option<&str>,
    store: &O,
) -> Result<PipelineOutcome>
where
    C: Connector,
    P: Publish,
    O: ObjectStore,
{
    match source {
        SourceKind::Local => {
            let input = input.ok_or_else(|| EtlError::MissingConfigError {
                field: "--input-data".to_string(),
            })?;
            let source = LocalFileSource::resolve(&config.output.folder, input);
            Ok(engine.run_lookup(&source).await)
        }
        SourceKind::S3 => {
            let aws = config.aws()?;
            let key = input
                .or(aws.file_path_s3.as_deref())
                .ok_or_else(|| EtlError::MissingConfigError {
                    field: "aws.file_path_s3".to_string(),
                })?;
            let source = ObjectSource::new(store, aws.bucket_name.as_str(), key);
            Ok(engine.run_lookup(&source).await)
        }
    }
}

/// Result of one record of an object-created event.
#[derive(Debug, Clone, Serialize)]
pub struct RecordReport {
    pub bucket: String,
    pub key: String,
    pub state: &'static str,
    pub records: usize,
    pub destination: Option<String>,
    pub error: Option<String>,
}

/// Runs one lookup per event record, in order. A failed record is reported and the rest still run.
pub async fn run_event<C, P, O>(
    engine: &EtlEngine<C, P>,
    store: &O,
    event: &S3Event,
) -> Vec<RecordReport>
where
    C: Connector,
    P: Publish,
    O: ObjectStore,
{
    let objects = event.objects();
    tracing::info!(records = objects.len(), "received S3 event");

    let mut reports = Vec::with_capacity(objects.len());
    for object in objects {
        let source = ObjectSource::new(store, object.bucket.as_str(), object.key.as_str());
        let outcome = engine.run_lookup(&source).await;
        let state = outcome.state().as_str();

        let report = match outcome {
            PipelineOutcome::Done {
                records,
                destination,
            } => RecordReport {
                bucket: object.bucket,
                key: object.key,
                state,
                records,
                destination: Some(destination),
                error: None,
            },
            PipelineOutcome::Failed { kind, error } => {
                tracing::warn!(key = %object.key, kind = ?kind, "record failed, continuing");
                RecordReport {
                    bucket: object.bucket,
                    key: object.key,
                    state,
                    records: 0,
                    destination: None,
                    error: Some(error.user_friendly_message()),
                }
            }
        };
        reports.push(report);
    }
    reports
}
