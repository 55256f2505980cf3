use crate::config::AwsConfig;
use crate::domain::ports::ObjectStore;
use crate::utils::error::{EtlError, Result};
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::operation::create_bucket::CreateBucketError;
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::operation::head_bucket::HeadBucketError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use aws_sdk_s3::Client as S3Client;
use secrecy::ExposeSecret;

#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: S3Client,
}

impl S3ObjectStore {
    pub fn new(client: S3Client) -> Self {
        Self { client }
    }

    pub async fn from_env() -> Self {
        let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Self::new(S3Client::new(&sdk_config))
    }

    /// Static keys when configured, otherwise the default AWS credential chain.
    pub async fn from_config(config: &AwsConfig) -> Self {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(config.region.clone()));

        if let (Some(access_key), Some(secret_key)) = (&config.access_key, &config.secret_key) {
            let credentials = aws_sdk_s3::config::Credentials::new(
                access_key.clone(),
                secret_key.expose_secret().clone(),
                None,
                None,
                "static",
            );
            loader = loader.credentials_provider(credentials);
        }

        let sdk_config = loader.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build();

        Self::new(S3Client::from_conf(s3_config))
    }
}

impl ObjectStore for S3ObjectStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let message = DisplayErrorContext(&e).to_string();
                match e.into_service_error() {
                    GetObjectError::NoSuchKey(_) => EtlError::NotFoundError {
                        path: format!("s3://{}/{}", bucket, key),
                    },
                    _ => EtlError::IoError(std::io::Error::other(message)),
                }
            })?;

        let data = resp
            .body
            .collect()
            .await
            .map_err(|e| EtlError::IoError(std::io::Error::other(e)))?;

        Ok(data.into_bytes().to_vec())
    }

    async fn put_object(&self, bucket: &str, key: &str, data: Vec<u8>) -> Result<()> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| EtlError::StorageError {
                message: format!(
                    "upload to s3://{}/{} failed: {}",
                    bucket,
                    key,
                    DisplayErrorContext(&e)
                ),
            })?;
        Ok(())
    }

    async fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(true),
            Err(e) => {
                let message = DisplayErrorContext(&e).to_string();
                match e.into_service_error() {
                    HeadBucketError::NotFound(_) => Ok(false),
                    _ => Err(EtlError::StorageError {
                        message: format!("could not check bucket {}: {}", bucket, message),
                    }),
                }
            }
        }
    }

    async fn create_bucket(&self, bucket: &str, region: &str) -> Result<()> {
        let mut request = self.client.create_bucket().bucket(bucket);

        // us-east-1 rejects an explicit location constraint
        if region != "us-east-1" {
            let configuration = CreateBucketConfiguration::builder()
                .location_constraint(BucketLocationConstraint::from(region))
                .build();
            request = request.create_bucket_configuration(configuration);
        }

        match request.send().await {
            Ok(_) => Ok(()),
            Err(e) => {
                let message = DisplayErrorContext(&e).to_string();
                match e.into_service_error() {
                    CreateBucketError::BucketAlreadyOwnedByYou(_) => Ok(()),
                    _ => Err(EtlError::StorageError {
                        message: format!("could not create bucket {}: {}", bucket, message),
                    }),
                }
            }
        }
    }
}
