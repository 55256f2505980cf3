pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod event;
pub mod runner;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;
pub use config::AppConfig;

#[cfg(feature = "s3")]
pub use adapters::s3::S3ObjectStore;
pub use adapters::{
    mysql::MySqlConnector,
    source::{LocalFileSource, ObjectSource},
};

pub use core::{
    etl::EtlEngine,
    publish::{BucketTarget, HttpPublisher, Sink, StoragePublisher},
};
pub use domain::model::{FailureKind, PipelineOutcome, PipelineState};
pub use utils::error::{EtlError, Result};
